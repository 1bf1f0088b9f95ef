//! Free-slot extraction.
//!
//! Finds the maximal free gaps inside the working-hours window that are long
//! enough to host a hangout.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::busy::{BusyInterval, BusyMap};
use super::event::{DateRange, MemberId};
use super::span::TimeSpan;
use crate::error::ValidationError;

/// Daily window during which hangouts may be proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 21,
        }
    }
}

impl WorkingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, ValidationError> {
        let hours = Self {
            start_hour,
            end_hour,
        };
        hours.window()?;
        Ok(hours)
    }

    /// The window as a minute span.
    pub fn window(&self) -> Result<TimeSpan, ValidationError> {
        self.start_hour
            .checked_mul(60)
            .zip(self.end_hour.checked_mul(60))
            .and_then(|(start, end)| TimeSpan::new(start, end))
            .ok_or(ValidationError::InvalidWorkingHours {
                start: self.start_hour,
                end: self.end_hour,
            })
    }
}

/// A free gap for one member on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeInterval {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub span: TimeSpan,
}

impl FreeInterval {
    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        self.span.duration_minutes()
    }
}

/// Free intervals per member, per date.
pub type FreeMap = BTreeMap<MemberId, BTreeMap<NaiveDate, Vec<FreeInterval>>>;

/// Extractor of free gaps from normalized busy intervals.
#[derive(Debug, Clone)]
pub struct FreeSlotExtractor {
    window: TimeSpan,
    /// Minimum free gap to keep (in minutes)
    min_minutes: i64,
}

impl FreeSlotExtractor {
    /// Create an extractor for the given working hours and a 60 minute minimum.
    pub fn new(hours: WorkingHours) -> Result<Self, ValidationError> {
        Ok(Self {
            window: hours.window()?,
            min_minutes: 60,
        })
    }

    /// Set the minimum free gap duration
    pub fn with_min_minutes(mut self, minutes: i64) -> Self {
        self.min_minutes = minutes;
        self
    }

    pub fn window(&self) -> TimeSpan {
        self.window
    }

    /// Free gaps for one member on one date.
    ///
    /// `busy` must be sorted by start, as produced by the normalizer.
    pub fn find_free(&self, date: NaiveDate, busy: &[BusyInterval]) -> Vec<FreeInterval> {
        let mut free = Vec::new();
        let mut cursor = self.window.start;

        for interval in busy {
            let Some(clipped) = interval.span.clip(&self.window) else {
                continue;
            };

            if clipped.start > cursor {
                self.push_gap(&mut free, date, cursor, clipped.start);
            }
            cursor = cursor.max(clipped.end);
        }

        if cursor < self.window.end {
            self.push_gap(&mut free, date, cursor, self.window.end);
        }

        free
    }

    /// Free gaps restricted to spans the member declared available, such as
    /// submitted check-in slots. `available` must be sorted and merged.
    pub fn find_within(&self, date: NaiveDate, available: &[TimeSpan]) -> Vec<FreeInterval> {
        let mut free = Vec::new();
        for span in available {
            if let Some(clipped) = span.clip(&self.window) {
                self.push_gap(&mut free, date, clipped.start, clipped.end);
            }
        }
        free
    }

    /// Free gaps for every member on every date of `range`.
    ///
    /// Members without busy time on a date are free for the whole window.
    pub fn extract_all(
        &self,
        members: &BTreeSet<MemberId>,
        busy: &BusyMap,
        range: DateRange,
    ) -> FreeMap {
        let mut free_map = FreeMap::new();
        for member in members {
            let member_busy = busy.get(member);
            let days = range
                .days()
                .map(|date| {
                    let day_busy = member_busy
                        .and_then(|days| days.get(&date))
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    (date, self.find_free(date, day_busy))
                })
                .collect();
            free_map.insert(member.clone(), days);
        }
        free_map
    }

    fn push_gap(&self, free: &mut Vec<FreeInterval>, date: NaiveDate, start: u32, end: u32) {
        if let Some(span) = TimeSpan::new(start, end) {
            if span.duration_minutes() >= self.min_minutes {
                free.push(FreeInterval { date, span });
            }
        }
    }
}

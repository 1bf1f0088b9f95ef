//! Multi-member intersection.
//!
//! Partitions each day at every free-interval boundary, tags each piece with
//! the members free throughout it, and merges neighbouring pieces that share
//! the same attendee set into maximal candidate windows.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::event::MemberId;
use super::free::FreeMap;
use super::span::TimeSpan;

/// A window considered for a hangout, with everyone free throughout it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub span: TimeSpan,
    pub attendees: BTreeSet<MemberId>,
}

impl CandidateSlot {
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        self.span.duration_minutes()
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Attendee ids concatenated in order, used as the final tie-break key.
    pub fn attendee_key(&self) -> String {
        self.attendees
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Boundary-sweep intersector over all members' free intervals.
#[derive(Debug, Clone)]
pub struct Intersector {
    /// Minimum meeting length to keep (in minutes)
    min_meeting_minutes: i64,
}

impl Intersector {
    pub fn new(min_meeting_minutes: i64) -> Self {
        Self {
            min_meeting_minutes,
        }
    }

    /// Candidate windows for every date present in `free`, ordered by date
    /// then start time.
    pub fn candidates(&self, free: &FreeMap) -> Vec<CandidateSlot> {
        let mut by_date: BTreeMap<NaiveDate, Vec<(&MemberId, TimeSpan)>> = BTreeMap::new();
        for (member, days) in free {
            for (date, intervals) in days {
                by_date
                    .entry(*date)
                    .or_default()
                    .extend(intervals.iter().map(|f| (member, f.span)));
            }
        }

        by_date
            .into_iter()
            .flat_map(|(date, spans)| self.candidates_for_day(date, &spans))
            .collect()
    }

    fn candidates_for_day(
        &self,
        date: NaiveDate,
        spans: &[(&MemberId, TimeSpan)],
    ) -> Vec<CandidateSlot> {
        // Each boundary carries the members entering and leaving there.
        let mut boundaries: BTreeMap<u32, (Vec<&MemberId>, Vec<&MemberId>)> = BTreeMap::new();
        for (member, span) in spans {
            boundaries.entry(span.start).or_default().0.push(member);
            boundaries.entry(span.end).or_default().1.push(member);
        }

        let mut active: BTreeMap<&MemberId, usize> = BTreeMap::new();
        let mut pieces: Vec<(TimeSpan, BTreeSet<MemberId>)> = Vec::new();
        let points: Vec<_> = boundaries.into_iter().collect();

        for pair in points.windows(2) {
            let (at, (entering, leaving)) = &pair[0];
            let next = pair[1].0;

            for member in leaving {
                if let Some(count) = active.get_mut(*member) {
                    *count -= 1;
                    if *count == 0 {
                        active.remove(*member);
                    }
                }
            }
            for member in entering {
                *active.entry(*member).or_default() += 1;
            }

            if active.is_empty() {
                continue;
            }
            let Some(span) = TimeSpan::new(*at, next) else {
                continue;
            };
            let attendees: BTreeSet<MemberId> = active.keys().map(|m| (*m).clone()).collect();

            match pieces.last_mut() {
                Some((last, set)) if last.end == span.start && *set == attendees => {
                    last.end = span.end;
                }
                _ => pieces.push((span, attendees)),
            }
        }

        pieces
            .into_iter()
            .filter(|(span, _)| span.duration_minutes() >= self.min_meeting_minutes)
            .map(|(span, attendees)| CandidateSlot {
                date,
                span,
                attendees,
            })
            .collect()
    }
}

//! Calendar input types.
//!
//! Calendar integrations deliver events as loosely-typed records; they are
//! validated into [`CalendarEvent`] here before any matching runs.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Unique identifier for a group member.
pub type MemberId = String;

/// One busy entry from a member's calendar, in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub member_id: MemberId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub all_day: bool,
}

impl CalendarEvent {
    /// Create a timed event.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEvent`] if `end` is before `start`.
    pub fn new(
        member_id: impl Into<MemberId>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        let event = Self {
            member_id: member_id.into(),
            start,
            end,
            all_day: false,
        };
        event.validate()?;
        Ok(event)
    }

    /// Create an all-day event covering `date`.
    pub fn all_day(member_id: impl Into<MemberId>, date: NaiveDate) -> Self {
        let start = date.and_time(chrono::NaiveTime::MIN);
        let end = date
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(chrono::NaiveTime::MIN))
            .unwrap_or_else(|| date.and_hms_nano_opt(23, 59, 59, 999_999_999).expect("valid time"));
        Self {
            member_id: member_id.into(),
            start,
            end,
            all_day: true,
        }
    }

    /// Build from timezone-aware instants, keeping the wall-clock time of the
    /// offset the instants carry.
    pub fn from_instants(
        member_id: impl Into<MemberId>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        all_day: bool,
    ) -> Result<Self, ValidationError> {
        let event = Self {
            member_id: member_id.into(),
            start: start.naive_local(),
            end: end.naive_local(),
            all_day,
        };
        event.validate()?;
        Ok(event)
    }

    /// Timed events must not end before they start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.all_day && self.end < self.start {
            return Err(ValidationError::InvalidEvent {
                member: self.member_id.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Zero-length timed events carry no busy time.
    pub fn is_degenerate(&self) -> bool {
        !self.all_day && self.start == self.end
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Calendar event as delivered by a calendar integration.
///
/// Instants are RFC 3339 strings with an offset; the offset is taken to be
/// the group's local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRecord {
    pub member_id: MemberId,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub all_day: bool,
    /// Event title; dropped at the boundary, free/busy needs no content.
    #[serde(default)]
    pub summary: Option<String>,
}

impl TryFrom<CalendarEventRecord> for CalendarEvent {
    type Error = ValidationError;

    fn try_from(record: CalendarEventRecord) -> Result<Self, Self::Error> {
        CalendarEvent::from_instants(record.member_id, record.start, record.end, record.all_day)
    }
}

/// Inclusive range of local dates to match over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDateRange`] if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end < self.start {
            return Err(ValidationError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.checked_add_days(Days::new(1)))
            .take_while(move |d| *d <= end)
    }

    /// Number of days in the range.
    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days().max(-1) + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

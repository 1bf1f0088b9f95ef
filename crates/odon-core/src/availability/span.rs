//! Minute-of-day spans.
//!
//! All matching arithmetic happens on local wall-clock minutes since midnight,
//! where `1440` stands for the end of the day (`24:00`).

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Half-open `[start, end)` span of minutes within one local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    #[serde(with = "hhmm")]
    pub start: u32,
    #[serde(with = "hhmm")]
    pub end: u32,
}

impl TimeSpan {
    /// Create a span. Returns `None` unless `start < end <= 1440`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start < end && end <= MINUTES_PER_DAY).then_some(Self { start, end })
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        i64::from(self.end) - i64::from(self.start)
    }

    /// Whether the two spans share at least one minute.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely inside this span.
    pub fn covers(&self, other: &TimeSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intersection with `window`, if non-empty.
    pub fn clip(&self, window: &TimeSpan) -> Option<TimeSpan> {
        TimeSpan::new(self.start.max(window.start), self.end.min(window.end))
    }

    /// Hour of day the span starts in.
    pub fn start_hour(&self) -> u32 {
        self.start / 60
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_minute(self.start), format_minute(self.end))
    }
}

/// Minute of day for a wall-clock time.
pub fn minute_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Render a minute of day as `HH:MM`.
pub fn format_minute(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Parse `HH:MM` (or `HH:MM:SS`, seconds ignored) into a minute of day.
/// `24:00` is accepted as end of day.
pub fn parse_minute(text: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidTimeOfDay(text.to_string());
    let mut parts = text.trim().split(':');
    let hours: u32 = parts.next().and_then(|h| h.parse().ok()).ok_or_else(invalid)?;
    let minutes: u32 = parts.next().and_then(|m| m.parse().ok()).ok_or_else(invalid)?;
    if let Some(seconds) = parts.next() {
        seconds.parse::<u32>().map_err(|_| invalid())?;
    }
    if parts.next().is_some() || minutes >= 60 || hours > 24 {
        return Err(invalid());
    }
    let total = hours * 60 + minutes;
    if total > MINUTES_PER_DAY {
        return Err(invalid());
    }
    Ok(total)
}

/// Serde adapter writing minutes of day as `"HH:MM"`.
pub mod hhmm {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(minute: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_minute(*minute))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_minute(&text).map_err(serde::de::Error::custom)
    }
}

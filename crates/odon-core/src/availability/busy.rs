//! Busy-interval normalization.
//!
//! Reduces each member's raw calendar events to sorted, non-overlapping,
//! non-adjacent busy spans per local date.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::event::{CalendarEvent, DateRange, MemberId};
use super::span::{minute_of, TimeSpan, MINUTES_PER_DAY};

/// A merged busy span for one member on one local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub span: TimeSpan,
}

/// Busy intervals per member, per date. Dates with no busy time are absent.
pub type BusyMap = BTreeMap<MemberId, BTreeMap<NaiveDate, Vec<BusyInterval>>>;

/// Normalizer from raw calendar events to [`BusyMap`].
#[derive(Debug, Clone, Default)]
pub struct BusyNormalizer {
    /// Whether all-day events block the whole day instead of being dropped.
    all_day_blocks: bool,
}

impl BusyNormalizer {
    /// Create a normalizer that drops all-day events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make all-day events block every date they cover.
    pub fn with_all_day_blocks(mut self, enabled: bool) -> Self {
        self.all_day_blocks = enabled;
        self
    }

    /// Normalize events for every member within `range`.
    ///
    /// The map key is the owning member; timed events crossing midnight are
    /// split into one piece per local date.
    pub fn normalize(
        &self,
        events_by_member: &BTreeMap<MemberId, Vec<CalendarEvent>>,
        range: DateRange,
    ) -> BusyMap {
        let mut busy = BusyMap::new();

        for (member, events) in events_by_member {
            let mut per_day: BTreeMap<NaiveDate, Vec<TimeSpan>> = BTreeMap::new();

            for event in events {
                for (date, span) in self.day_pieces(event, range) {
                    per_day.entry(date).or_default().push(span);
                }
            }

            let days: BTreeMap<_, _> = per_day
                .into_iter()
                .map(|(date, spans)| {
                    let merged = merge_spans(spans)
                        .into_iter()
                        .map(|span| BusyInterval { date, span })
                        .collect::<Vec<_>>();
                    (date, merged)
                })
                .filter(|(_, intervals)| !intervals.is_empty())
                .collect();

            if !days.is_empty() {
                busy.insert(member.clone(), days);
            }
        }

        busy
    }

    /// Split an event into per-date spans inside `range`.
    fn day_pieces(&self, event: &CalendarEvent, range: DateRange) -> Vec<(NaiveDate, TimeSpan)> {
        if event.all_day {
            if !self.all_day_blocks {
                return Vec::new();
            }
            let first = event.start.date();
            // All-day end dates are exclusive; a same-day end still blocks that day.
            let last = event.end.date().pred_opt().unwrap_or(first).max(first);
            return range
                .days()
                .filter(|d| first <= *d && *d <= last)
                .filter_map(|d| TimeSpan::new(0, MINUTES_PER_DAY).map(|s| (d, s)))
                .collect();
        }

        if event.is_degenerate() || event.end < event.start {
            return Vec::new();
        }

        let first = event.start.date();
        let last = event.end.date();
        range
            .days()
            .filter(|d| first <= *d && *d <= last)
            .filter_map(|date| {
                let start = if date == first { minute_floor(event.start) } else { 0 };
                let end = if date == last {
                    minute_ceil(event.end)
                } else {
                    MINUTES_PER_DAY
                };
                TimeSpan::new(start, end).map(|span| (date, span))
            })
            .collect()
    }
}

/// Sort spans and merge any that overlap or touch.
pub fn merge_spans(mut spans: Vec<TimeSpan>) -> Vec<TimeSpan> {
    spans.sort();
    let mut merged: Vec<TimeSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(current) if span.start <= current.end => {
                current.end = current.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged
}

fn minute_floor(at: NaiveDateTime) -> u32 {
    minute_of(at.time())
}

fn minute_ceil(at: NaiveDateTime) -> u32 {
    let minute = minute_of(at.time());
    if at.second() > 0 || at.nanosecond() > 0 {
        (minute + 1).min(MINUTES_PER_DAY)
    } else {
        minute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(d: &str, t: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{d} {t}"), "%Y-%m-%d %H:%M").unwrap()
    }

    fn event(member: &str, d: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent::new(member, at(d, start), at(d, end)).unwrap()
    }

    fn one_day(d: &str) -> DateRange {
        DateRange::new(date(d), date(d)).unwrap()
    }

    fn spans(busy: &BusyMap, member: &str, d: &str) -> Vec<(u32, u32)> {
        busy.get(member)
            .and_then(|days| days.get(&date(d)))
            .map(|v| v.iter().map(|b| (b.span.start, b.span.end)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn merges_overlapping_and_adjacent_events() {
        let d = "2026-10-19";
        let events = BTreeMap::from([(
            "alice".to_string(),
            vec![
                event("alice", d, "13:00", "14:00"),
                event("alice", d, "09:00", "10:00"),
                event("alice", d, "09:30", "11:00"),
                event("alice", d, "11:00", "12:00"),
            ],
        )]);

        let busy = BusyNormalizer::new().normalize(&events, one_day(d));
        assert_eq!(spans(&busy, "alice", d), vec![(540, 720), (780, 840)]);
    }

    #[test]
    fn drops_degenerate_and_all_day_events() {
        let d = "2026-10-19";
        let events = BTreeMap::from([(
            "bob".to_string(),
            vec![
                event("bob", d, "10:00", "10:00"),
                CalendarEvent::all_day("bob", date(d)),
            ],
        )]);

        let busy = BusyNormalizer::new().normalize(&events, one_day(d));
        assert!(busy.get("bob").is_none());
    }

    #[test]
    fn all_day_blocks_when_enabled() {
        let d = "2026-10-19";
        let events = BTreeMap::from([(
            "bob".to_string(),
            vec![CalendarEvent::all_day("bob", date(d))],
        )]);

        let busy = BusyNormalizer::new()
            .with_all_day_blocks(true)
            .normalize(&events, one_day(d));
        assert_eq!(spans(&busy, "bob", d), vec![(0, MINUTES_PER_DAY)]);
    }

    #[test]
    fn splits_events_crossing_midnight() {
        let events = BTreeMap::from([(
            "carol".to_string(),
            vec![CalendarEvent::new("carol", at("2026-10-19", "22:00"), at("2026-10-20", "10:00"))
                .unwrap()],
        )]);
        let range = DateRange::new(date("2026-10-19"), date("2026-10-20")).unwrap();

        let busy = BusyNormalizer::new().normalize(&events, range);
        assert_eq!(spans(&busy, "carol", "2026-10-19"), vec![(1320, MINUTES_PER_DAY)]);
        assert_eq!(spans(&busy, "carol", "2026-10-20"), vec![(0, 600)]);
    }

    #[test]
    fn ignores_events_outside_range() {
        let events = BTreeMap::from([(
            "dave".to_string(),
            vec![event("dave", "2026-10-25", "10:00", "11:00")],
        )]);

        let busy = BusyNormalizer::new().normalize(&events, one_day("2026-10-19"));
        assert!(busy.is_empty());
    }
}

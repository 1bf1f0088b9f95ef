//! Human-readable text around match results.
//!
//! Everything here is deterministic: the same match always produces the same
//! sentence, so the "why" text for a pick never changes between renders.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability::event::MemberId;
use crate::availability::ranking::RankedMatch;
use crate::availability::span::TimeSpan;

/// One-sentence reason for showing `m` as the pick.
pub fn explain_match(m: &RankedMatch, group_size: usize, ideal_minutes: i64) -> String {
    let b = &m.breakdown;
    let mut parts = vec![format!(
        "{} of {} members free",
        m.attendee_count(),
        group_size
    )];

    if m.duration_minutes >= ideal_minutes {
        parts.push(format!(
            "{} window fits a {} hangout",
            format_duration(m.duration_minutes),
            format_duration(ideal_minutes)
        ));
    } else {
        parts.push(format!(
            "{} window, shorter than the ideal {}",
            format_duration(m.duration_minutes),
            format_duration(ideal_minutes)
        ));
    }

    parts.push(
        match (b.weekend, b.evening) {
            (true, true) => "weekend evening slot",
            (true, false) => "weekend slot",
            (false, true) => "evening slot",
            (false, false) => "daytime slot",
        }
        .to_string(),
    );

    if b.repeats_previous {
        parts.push("same weekday and hour as a recent hangout".to_string());
    }

    parts.join("; ")
}

/// Advice when no window reaches `min_attendees`.
pub fn no_match_hint(matches: &[RankedMatch], min_attendees: usize) -> String {
    match matches.iter().map(RankedMatch::attendee_count).max() {
        None => "No shared free time found; try a wider date range or longer working hours"
            .to_string(),
        Some(most) => format!(
            "At most {most} members are free together but {min_attendees} are needed; \
             lower the minimum or extend the date range"
        ),
    }
}

/// Render minutes as `3h`, `1h30m` or `45m`.
pub fn format_duration(minutes: i64) -> String {
    let (hours, mins) = (minutes / 60, minutes % 60);
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}

/// A ranked window as handed to the suggestion text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSummary {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub span: TimeSpan,
    pub available_members: Vec<MemberId>,
}

impl From<&RankedMatch> for SlotSummary {
    fn from(m: &RankedMatch) -> Self {
        Self {
            date: m.slot.date,
            span: m.slot.span,
            available_members: m.slot.attendees.iter().cloned().collect(),
        }
    }
}

impl fmt::Display for SlotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} available",
            self.date.format("%Y-%m-%d"),
            self.span,
            self.available_members.join(", ")
        )
    }
}

/// Kinds of group notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CheckIn,
    Reminder,
    Confirmed,
    Suggestion,
}

impl NotificationKind {
    /// Message used when generated text is unavailable.
    pub fn fallback_text(&self, group_name: &str) -> String {
        match self {
            Self::CheckIn => format!("Hey! When are you free for {group_name}?"),
            Self::Reminder => format!("{group_name} is waiting for your availability!"),
            Self::Confirmed => format!("Hangout confirmed with {group_name}!"),
            Self::Suggestion => format!("{group_name} found a time that works!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::intersect::CandidateSlot;
    use crate::availability::ranking::SlotRanker;
    use std::collections::BTreeSet;

    fn ranked(day: u32, start_h: u32, end_h: u32, who: &[&str]) -> RankedMatch {
        let slot = CandidateSlot {
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            span: TimeSpan::new(start_h * 60, end_h * 60).unwrap(),
            attendees: who.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        };
        SlotRanker::new(1).rank(vec![slot]).remove(0)
    }

    #[test]
    fn explains_long_evening_window() {
        let m = ranked(19, 9, 18, &["a", "b", "c"]);
        assert_eq!(
            explain_match(&m, 3, 180),
            "3 of 3 members free; 9h window fits a 3h hangout; evening slot"
        );
    }

    #[test]
    fn explains_short_weekend_daytime_window() {
        let m = ranked(24, 10, 11, &["a"]);
        assert_eq!(
            explain_match(&m, 4, 180),
            "1 of 4 members free; 1h window, shorter than the ideal 3h; weekend slot"
        );
    }

    #[test]
    fn hints_mention_threshold() {
        assert!(no_match_hint(&[], 2).starts_with("No shared free time"));
        let m = ranked(19, 18, 21, &["a", "b"]);
        assert!(no_match_hint(&[m], 3).contains("At most 2 members"));
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(180), "3h");
        assert_eq!(format_duration(90), "1h30m");
    }

    #[test]
    fn summary_line_lists_members() {
        let m = ranked(19, 18, 21, &["bob", "alice"]);
        let summary = SlotSummary::from(&m);
        assert_eq!(summary.to_string(), "2026-10-19 18:00-21:00: alice, bob available");
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2026-10-19");
        assert_eq!(json["end"], "21:00");
    }

    #[test]
    fn fallback_texts_name_the_group() {
        assert_eq!(
            NotificationKind::Reminder.fallback_text("Book Club"),
            "Book Club is waiting for your availability!"
        );
        let kind: NotificationKind = serde_json::from_str("\"check_in\"").unwrap();
        assert_eq!(kind, NotificationKind::CheckIn);
    }
}

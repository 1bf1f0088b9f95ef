//! Check-in availability submissions.
//!
//! Members answer a weekly check-in with explicit availability slots. A
//! member's confirmed slots replace whatever free time their calendar implies.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::availability::busy::merge_spans;
use crate::availability::event::{DateRange, MemberId};
use crate::availability::span::{parse_minute, TimeSpan};
use crate::error::ValidationError;

/// Availability slot as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlotRecord {
    pub user_id: MemberId,
    pub slot_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub confirmed: bool,
}

fn default_true() -> bool {
    true
}

/// A validated availability slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilitySlot<'a> {
    pub member_id: &'a str,
    pub date: NaiveDate,
    pub span: TimeSpan,
}

impl AvailabilitySlotRecord {
    /// Validate into a typed slot.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed times or a slot that ends before it
    /// starts. Zero-length slots yield `Ok(None)`.
    pub fn validate(&self) -> Result<Option<AvailabilitySlot<'_>>, ValidationError> {
        let start = parse_minute(&self.start_time)?;
        let end = parse_minute(&self.end_time)?;
        if end < start {
            return Err(ValidationError::InvalidSlot {
                member: self.user_id.clone(),
                date: self.slot_date,
                start: self.start_time.clone(),
                end: self.end_time.clone(),
            });
        }
        Ok(TimeSpan::new(start, end).map(|span| AvailabilitySlot {
            member_id: &self.user_id,
            date: self.slot_date,
            span,
        }))
    }
}

/// Merged declared availability per member, per date.
pub type SubmittedMap = BTreeMap<MemberId, BTreeMap<NaiveDate, Vec<TimeSpan>>>;

/// Validate and group confirmed submissions from `members` inside `range`.
///
/// A member appears in the result as soon as one confirmed slot of theirs is
/// in range; dates they left out count as unavailable.
pub fn collect_submissions(
    records: &[AvailabilitySlotRecord],
    members: &BTreeSet<MemberId>,
    range: DateRange,
) -> Result<SubmittedMap, ValidationError> {
    let mut grouped: BTreeMap<MemberId, BTreeMap<NaiveDate, Vec<TimeSpan>>> = BTreeMap::new();

    for record in records {
        let Some(slot) = record.validate()? else {
            continue;
        };
        if !record.confirmed {
            continue;
        }
        if !members.contains(slot.member_id) {
            warn!(member = slot.member_id, "ignoring availability from non-member");
            continue;
        }
        if !range.contains(slot.date) {
            warn!(member = slot.member_id, date = %slot.date, "ignoring availability outside date range");
            continue;
        }
        grouped
            .entry(slot.member_id.to_string())
            .or_default()
            .entry(slot.date)
            .or_default()
            .push(slot.span);
    }

    Ok(grouped
        .into_iter()
        .map(|(member, days)| {
            let days = days
                .into_iter()
                .map(|(date, spans)| (date, merge_spans(spans)))
                .collect();
            (member, days)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(member: &str, date: &str, start: &str, end: &str) -> AvailabilitySlotRecord {
        AvailabilitySlotRecord {
            user_id: member.to_string(),
            slot_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            confirmed: true,
        }
    }

    fn week() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 25).unwrap(),
        )
        .unwrap()
    }

    fn members() -> BTreeSet<MemberId> {
        BTreeSet::from(["alice".to_string(), "bob".to_string()])
    }

    #[test]
    fn groups_and_merges_confirmed_slots() {
        let records = vec![
            record("alice", "2026-10-20", "18:00", "20:00"),
            record("alice", "2026-10-20", "19:30", "22:00"),
            record("alice", "2026-10-21", "12:00", "13:00"),
        ];
        let submitted = collect_submissions(&records, &members(), week()).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        assert_eq!(
            submitted["alice"][&tuesday],
            vec![TimeSpan::new(18 * 60, 22 * 60).unwrap()]
        );
        assert_eq!(submitted["alice"].len(), 2);
        assert!(!submitted.contains_key("bob"));
    }

    #[test]
    fn skips_unconfirmed_foreign_and_out_of_range_slots() {
        let mut unconfirmed = record("bob", "2026-10-20", "18:00", "20:00");
        unconfirmed.confirmed = false;
        let records = vec![
            unconfirmed,
            record("mallory", "2026-10-20", "18:00", "20:00"),
            record("alice", "2026-11-02", "18:00", "20:00"),
        ];
        let submitted = collect_submissions(&records, &members(), week()).unwrap();
        assert!(submitted.is_empty());
    }

    #[test]
    fn rejects_inverted_and_malformed_slots() {
        let inverted = vec![record("alice", "2026-10-20", "20:00", "18:00")];
        assert!(matches!(
            collect_submissions(&inverted, &members(), week()),
            Err(ValidationError::InvalidSlot { .. })
        ));

        let malformed = vec![record("alice", "2026-10-20", "6pm", "20:00")];
        assert!(matches!(
            collect_submissions(&malformed, &members(), week()),
            Err(ValidationError::InvalidTimeOfDay(_))
        ));
    }
}

//! End-to-end group matching.
//!
//! Runs the pipeline normalize → extract → intersect → rank over
//! caller-supplied calendar data. Every run is a pure function of its input.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::busy::BusyNormalizer;
use super::event::{CalendarEvent, CalendarEventRecord, DateRange, MemberId};
use super::free::{FreeInterval, FreeMap, FreeSlotExtractor, WorkingHours};
use super::intersect::Intersector;
use super::ranking::{PreviousSlot, RankedMatch, ScoringPolicy, SlotRanker};
use crate::checkin::{collect_submissions, AvailabilitySlotRecord, SubmittedMap};
use crate::error::ValidationError;
use crate::explain::{explain_match, no_match_hint, SlotSummary};

/// Matching parameters for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default)]
    pub working_hours: WorkingHours,
    /// Shortest free gap kept per member (minutes)
    #[serde(default = "default_min_slot")]
    pub min_slot_duration_minutes: i64,
    /// Shortest candidate window kept; defaults to the free-gap minimum
    #[serde(default)]
    pub min_meeting_minutes: Option<i64>,
    /// Attendees required for a best pick
    #[serde(default = "default_min_attendees")]
    pub min_attendees: usize,
    #[serde(default = "default_ideal_duration")]
    pub ideal_duration_minutes: i64,
    #[serde(default)]
    pub previous_slots: Vec<PreviousSlot>,
    #[serde(default)]
    pub scoring: ScoringPolicy,
    /// Whether all-day events block the whole day
    #[serde(default)]
    pub all_day_blocks: bool,
}

fn default_min_slot() -> i64 {
    60
}
fn default_min_attendees() -> usize {
    2
}
fn default_ideal_duration() -> i64 {
    180
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours::default(),
            min_slot_duration_minutes: default_min_slot(),
            min_meeting_minutes: None,
            min_attendees: default_min_attendees(),
            ideal_duration_minutes: default_ideal_duration(),
            previous_slots: Vec::new(),
            scoring: ScoringPolicy::default(),
            all_day_blocks: false,
        }
    }
}

impl MatchConfig {
    pub fn min_meeting(&self) -> i64 {
        self.min_meeting_minutes
            .unwrap_or(self.min_slot_duration_minutes)
    }

    /// Reject configurations no run could honour.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.working_hours.window()?;
        for (field, value) in [
            ("min_slot_duration_minutes", self.min_slot_duration_minutes),
            ("min_meeting_minutes", self.min_meeting()),
            ("ideal_duration_minutes", self.ideal_duration_minutes),
        ] {
            if value < 0 {
                return Err(ValidationError::NegativeDuration {
                    field: field.to_string(),
                    value,
                });
            }
        }
        let scoring = &self.scoring;
        let weights = [
            ("scoring.attendee_points", scoring.attendee_points),
            ("scoring.duration_penalty_per_minute", scoring.duration_penalty_per_minute),
            ("scoring.novelty_penalty", scoring.novelty_penalty),
            ("scoring.daytime_penalty", scoring.daytime_penalty),
        ];
        if let Some((field, _)) = weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: "must be a finite number".to_string(),
            });
        }
        if scoring.evening_start_hour > 24 {
            return Err(ValidationError::InvalidValue {
                field: "scoring.evening_start_hour".to_string(),
                message: format!("{} is not an hour of the day", scoring.evening_start_hour),
            });
        }
        Ok(())
    }

    fn extractor(&self) -> Result<FreeSlotExtractor, ValidationError> {
        Ok(FreeSlotExtractor::new(self.working_hours)?
            .with_min_minutes(self.min_slot_duration_minutes))
    }

    fn ranker(&self) -> SlotRanker {
        SlotRanker::new(self.min_attendees)
            .with_policy(self.scoring.clone())
            .with_ideal_minutes(self.ideal_duration_minutes)
            .with_previous(self.previous_slots.clone())
    }
}

/// Rank every hangout window in `range` for the given members.
///
/// Members without events are free for the full working window each day.
/// Events keyed under non-members are ignored.
///
/// # Errors
///
/// Fails before any computation on an empty member set, an inverted date
/// range, an invalid config, or an event that ends before it starts.
pub fn compute_matches(
    members: &BTreeSet<MemberId>,
    busy_events: &BTreeMap<MemberId, Vec<CalendarEvent>>,
    range: DateRange,
    config: &MatchConfig,
) -> Result<Vec<RankedMatch>, ValidationError> {
    run(members, busy_events, &SubmittedMap::new(), range, config)
}

/// Free intervals of a single member over `range`, in date order.
pub fn free_intervals_for(
    events: &[CalendarEvent],
    range: DateRange,
    config: &MatchConfig,
) -> Result<Vec<FreeInterval>, ValidationError> {
    range.validate()?;
    config.validate()?;
    for event in events {
        event.validate()?;
    }

    let key = MemberId::new();
    let by_member = BTreeMap::from([(key.clone(), events.to_vec())]);
    let busy = BusyNormalizer::new()
        .with_all_day_blocks(config.all_day_blocks)
        .normalize(&by_member, range);
    let free = config
        .extractor()?
        .extract_all(&BTreeSet::from([key]), &busy, range);

    Ok(free
        .into_values()
        .flat_map(|days| days.into_values().flatten())
        .collect())
}

fn run(
    members: &BTreeSet<MemberId>,
    busy_events: &BTreeMap<MemberId, Vec<CalendarEvent>>,
    submitted: &SubmittedMap,
    range: DateRange,
    config: &MatchConfig,
) -> Result<Vec<RankedMatch>, ValidationError> {
    if members.is_empty() {
        return Err(ValidationError::EmptyMembers);
    }
    range.validate()?;
    config.validate()?;
    for event in busy_events.values().flatten() {
        event.validate()?;
    }

    let member_events: BTreeMap<MemberId, Vec<CalendarEvent>> = busy_events
        .iter()
        .filter(|(member, events)| {
            let known = members.contains(*member);
            if !known {
                warn!(member = member.as_str(), events = events.len(), "ignoring events of non-member");
            }
            known
        })
        .map(|(member, events)| (member.clone(), events.clone()))
        .collect();

    let busy = BusyNormalizer::new()
        .with_all_day_blocks(config.all_day_blocks)
        .normalize(&member_events, range);
    debug!(members = members.len(), days = range.len(), busy_members = busy.len(), "normalized busy time");

    let extractor = config.extractor()?;
    let mut free = extractor.extract_all(members, &busy, range);
    apply_submissions(&mut free, submitted, &extractor, range);

    let candidates = Intersector::new(config.min_meeting()).candidates(&free);
    debug!(candidates = candidates.len(), "intersected free time");

    let ranked = config.ranker().rank(candidates);
    debug!(
        matches = ranked.len(),
        best_pick = ranked.iter().any(|m| m.best_pick),
        "ranked candidate slots"
    );
    Ok(ranked)
}

/// Replace calendar-derived free time with declared availability for members
/// who answered the check-in.
fn apply_submissions(
    free: &mut FreeMap,
    submitted: &SubmittedMap,
    extractor: &FreeSlotExtractor,
    range: DateRange,
) {
    for (member, declared) in submitted {
        let Some(days) = free.get_mut(member) else {
            continue;
        };
        for date in range.days() {
            let spans = declared.get(&date).map(Vec::as_slice).unwrap_or_default();
            days.insert(date, extractor.find_within(date, spans));
        }
    }
}

/// A complete matching request, as handed over by the backend layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub group_name: Option<String>,
    pub members: BTreeSet<MemberId>,
    pub date_range: DateRange,
    #[serde(default)]
    pub events: Vec<CalendarEventRecord>,
    /// Confirmed check-in availability; overrides calendars for its members
    #[serde(default)]
    pub availability: Vec<AvailabilitySlotRecord>,
    /// Per-request settings; the caller's defaults apply when absent
    #[serde(default)]
    pub config: Option<MatchConfig>,
}

impl MatchRequest {
    /// Parse a request document.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate raw event records and group them by owning member.
    pub fn events_by_member(
        &self,
    ) -> Result<BTreeMap<MemberId, Vec<CalendarEvent>>, ValidationError> {
        let mut grouped: BTreeMap<MemberId, Vec<CalendarEvent>> = BTreeMap::new();
        for record in &self.events {
            let event = CalendarEvent::try_from(record.clone())?;
            grouped
                .entry(event.member_id.clone())
                .or_default()
                .push(event);
        }
        Ok(grouped)
    }

    /// The config this request runs with.
    pub fn effective_config(&self, defaults: &MatchConfig) -> MatchConfig {
        self.config.clone().unwrap_or_else(|| defaults.clone())
    }

    /// Run the request with its own config, or `defaults` if it has none.
    pub fn compute(&self, defaults: &MatchConfig) -> Result<MatchReport, ValidationError> {
        let config = self.effective_config(defaults);
        let events = self.events_by_member()?;
        self.date_range.validate()?;
        let submitted = collect_submissions(&self.availability, &self.members, self.date_range)?;
        let matches = run(&self.members, &events, &submitted, self.date_range, &config)?;
        Ok(MatchReport::new(matches, self.members.len(), &config))
    }
}

/// Ranked matches plus the explanation the UI shows for the best pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub matches: Vec<RankedMatch>,
    #[serde(default)]
    pub best_pick: Option<RankedMatch>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Advice for the group admin when nothing meets the threshold
    #[serde(default)]
    pub hint: Option<String>,
}

impl MatchReport {
    pub fn new(matches: Vec<RankedMatch>, group_size: usize, config: &MatchConfig) -> Self {
        let best_pick = matches.iter().find(|m| m.best_pick).cloned();
        let reason = best_pick
            .as_ref()
            .map(|m| explain_match(m, group_size, config.ideal_duration_minutes));
        let hint = best_pick
            .is_none()
            .then(|| no_match_hint(&matches, config.min_attendees));
        Self {
            matches,
            best_pick,
            reason,
            hint,
        }
    }

    /// Whether some window met the attendee threshold.
    pub fn has_match(&self) -> bool {
        self.best_pick.is_some()
    }

    /// Keep only the first `n` matches. The best pick is kept separately.
    pub fn truncate(&mut self, n: usize) {
        self.matches.truncate(n);
    }

    /// Slot lines handed to the suggestion text generator.
    pub fn summaries(&self) -> Vec<SlotSummary> {
        self.matches.iter().map(SlotSummary::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn at(day: u32, hh: u32, mm: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hh, mm, 0).unwrap()
    }

    fn members(ids: &[&str]) -> BTreeSet<MemberId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_empty_members_and_inverted_range() {
        let range = DateRange {
            start: date(20),
            end: date(19),
        };
        let config = MatchConfig::default();
        assert_eq!(
            compute_matches(&BTreeSet::new(), &BTreeMap::new(), range, &config),
            Err(ValidationError::EmptyMembers)
        );
        assert!(matches!(
            compute_matches(&members(&["a"]), &BTreeMap::new(), range, &config),
            Err(ValidationError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn rejects_negative_durations() {
        let range = DateRange::new(date(19), date(19)).unwrap();
        let config = MatchConfig {
            min_slot_duration_minutes: -5,
            ..MatchConfig::default()
        };
        assert!(matches!(
            compute_matches(&members(&["a"]), &BTreeMap::new(), range, &config),
            Err(ValidationError::NegativeDuration { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_evening_hour() {
        let range = DateRange::new(date(19), date(19)).unwrap();
        let config = MatchConfig {
            scoring: ScoringPolicy {
                evening_start_hour: u32::MAX,
                ..ScoringPolicy::default()
            },
            ..MatchConfig::default()
        };
        assert!(matches!(
            compute_matches(&members(&["a"]), &BTreeMap::new(), range, &config),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "scoring.evening_start_hour"
        ));
    }

    #[test]
    fn rejects_inverted_events() {
        let range = DateRange::new(date(19), date(19)).unwrap();
        let bad = CalendarEvent {
            member_id: "a".to_string(),
            start: at(19, 12, 0),
            end: at(19, 11, 0),
            all_day: false,
        };
        let events = BTreeMap::from([("a".to_string(), vec![bad])]);
        assert!(matches!(
            compute_matches(&members(&["a"]), &events, range, &MatchConfig::default()),
            Err(ValidationError::InvalidEvent { .. })
        ));
    }

    #[test]
    fn members_without_events_are_free_all_day() {
        let range = DateRange::new(date(19), date(20)).unwrap();
        let ranked =
            compute_matches(&members(&["a", "b"]), &BTreeMap::new(), range, &MatchConfig::default())
                .unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|m| m.attendee_count() == 2));
        assert!(ranked.iter().all(|m| m.duration_minutes == 12 * 60));
        assert!(ranked[0].best_pick);
        assert_eq!(ranked[0].slot.date, date(19));
    }

    #[test]
    fn events_of_non_members_are_ignored() {
        let range = DateRange::new(date(19), date(19)).unwrap();
        let events = BTreeMap::from([(
            "stranger".to_string(),
            vec![CalendarEvent::new("stranger", at(19, 9, 0), at(19, 21, 0)).unwrap()],
        )]);
        let ranked =
            compute_matches(&members(&["a"]), &events, range, &MatchConfig::default()).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].slot.attendees, members(&["a"]));
    }

    #[test]
    fn free_intervals_for_single_member() {
        let range = DateRange::new(date(19), date(20)).unwrap();
        let events = vec![
            CalendarEvent::new("a", at(19, 10, 0), at(19, 12, 30)).unwrap(),
            CalendarEvent::new("a", at(19, 20, 30), at(19, 23, 0)).unwrap(),
        ];
        let free = free_intervals_for(&events, range, &MatchConfig::default()).unwrap();
        let spans: Vec<_> = free.iter().map(|f| (f.date, f.span.to_string())).collect();
        assert_eq!(
            spans,
            vec![
                (date(19), "12:30-20:30".to_string()),
                (date(20), "09:00-21:00".to_string()),
            ]
        );
    }

    #[test]
    fn submitted_availability_overrides_calendar() {
        let request: MatchRequest = serde_json::from_str(
            r#"{
                "members": ["a", "b"],
                "date_range": {"start": "2026-10-19", "end": "2026-10-19"},
                "availability": [
                    {"user_id": "b", "slot_date": "2026-10-19", "start_time": "18:00", "end_time": "21:00"}
                ]
            }"#,
        )
        .unwrap();
        let report = request.compute(&MatchConfig::default()).unwrap();
        let best = report.best_pick.expect("pair window");
        assert_eq!(best.slot.span.to_string(), "18:00-21:00");
        assert_eq!(best.attendee_count(), 2);
        assert!(report.reason.is_some());
        assert!(report.hint.is_none());
    }

    #[test]
    fn request_config_overrides_defaults() {
        let request: MatchRequest = serde_json::from_str(
            r#"{
                "members": ["a"],
                "date_range": {"start": "2026-10-19", "end": "2026-10-19"},
                "config": {"working_hours": {"start_hour": 18, "end_hour": 22}, "min_attendees": 1}
            }"#,
        )
        .unwrap();
        let report = request.compute(&MatchConfig::default()).unwrap();
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].slot.span.to_string(), "18:00-22:00");
        assert!(report.has_match());
    }
}

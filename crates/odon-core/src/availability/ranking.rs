//! Slot ranking.
//!
//! Scores candidate windows with a fixed, explainable formula:
//!
//! ```text
//! score = attendees × 100 − duration_penalty − novelty_penalty − time_of_day_penalty
//! ```
//!
//! | Term | Value |
//! |------|-------|
//! | duration_penalty | 0.5 × (ideal − min(duration, ideal)) |
//! | novelty_penalty | 20 when (weekday, start hour) was used before |
//! | time_of_day_penalty | 0 for evening or weekend windows, 10 otherwise |
//!
//! Ties are broken by earlier date, earlier start, then the smallest attendee
//! key, so identical input always produces the same order and best pick.

use std::cmp::Ordering;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use super::intersect::CandidateSlot;

/// A slot used by an earlier hangout, for novelty scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousSlot {
    pub weekday: Weekday,
    pub start_hour: u32,
}

/// Constants of the scoring formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Points per attendee
    pub attendee_points: f64,
    /// Penalty points per minute of distance from the ideal duration
    pub duration_penalty_per_minute: f64,
    /// Penalty for reusing a previous (weekday, start hour)
    pub novelty_penalty: f64,
    /// Penalty for weekday windows that end before the evening
    pub daytime_penalty: f64,
    /// Hour from which a window counts as an evening window
    pub evening_start_hour: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            attendee_points: 100.0,
            duration_penalty_per_minute: 0.5,
            novelty_penalty: 20.0,
            daytime_penalty: 10.0,
            evening_start_hour: 17,
        }
    }
}

/// Per-term score breakdown for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub attendance: f64,
    pub duration_penalty: f64,
    pub novelty_penalty: f64,
    pub time_of_day_penalty: f64,
    /// Length of hangout the window can host, capped at the ideal duration
    pub hosted_minutes: i64,
    pub evening: bool,
    pub weekend: bool,
    pub repeats_previous: bool,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.attendance - self.duration_penalty - self.novelty_penalty - self.time_of_day_penalty
    }
}

/// A scored candidate slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    #[serde(flatten)]
    pub slot: CandidateSlot,
    pub weekday: Weekday,
    pub duration_minutes: i64,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Set on at most one match per run; omitted from output otherwise.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub best_pick: bool,
}

impl RankedMatch {
    pub fn attendee_count(&self) -> usize {
        self.slot.attendee_count()
    }
}

/// Ranker turning candidate windows into an ordered match list.
#[derive(Debug, Clone)]
pub struct SlotRanker {
    policy: ScoringPolicy,
    ideal_minutes: i64,
    min_attendees: usize,
    previous: Vec<PreviousSlot>,
}

impl SlotRanker {
    /// Create a ranker with the default policy and a 180 minute ideal.
    pub fn new(min_attendees: usize) -> Self {
        Self {
            policy: ScoringPolicy::default(),
            ideal_minutes: 180,
            min_attendees,
            previous: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_ideal_minutes(mut self, minutes: i64) -> Self {
        self.ideal_minutes = minutes;
        self
    }

    pub fn with_previous(mut self, previous: Vec<PreviousSlot>) -> Self {
        self.previous = previous;
        self
    }

    /// Score a single candidate.
    pub fn score(&self, slot: &CandidateSlot) -> ScoreBreakdown {
        let duration = slot.duration_minutes();
        let hosted_minutes = duration.min(self.ideal_minutes);
        let weekday = slot.date.weekday();
        let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        let evening = slot.span.end > self.policy.evening_start_hour.saturating_mul(60);
        let repeats_previous = self
            .previous
            .iter()
            .any(|p| p.weekday == weekday && p.start_hour == slot.span.start_hour());

        ScoreBreakdown {
            attendance: slot.attendee_count() as f64 * self.policy.attendee_points,
            duration_penalty: (self.ideal_minutes - hosted_minutes) as f64
                * self.policy.duration_penalty_per_minute,
            novelty_penalty: if repeats_previous {
                self.policy.novelty_penalty
            } else {
                0.0
            },
            time_of_day_penalty: if evening || weekend {
                0.0
            } else {
                self.policy.daytime_penalty
            },
            hosted_minutes,
            evening,
            weekend,
            repeats_previous,
        }
    }

    /// Score, sort and flag the best pick.
    ///
    /// The best pick is the highest ranked match with at least
    /// `min_attendees` attendees; when none qualifies nothing is flagged.
    pub fn rank(&self, candidates: Vec<CandidateSlot>) -> Vec<RankedMatch> {
        let mut ranked: Vec<RankedMatch> = candidates
            .into_iter()
            .map(|slot| {
                let breakdown = self.score(&slot);
                RankedMatch {
                    weekday: slot.date.weekday(),
                    duration_minutes: slot.duration_minutes(),
                    score: breakdown.total(),
                    breakdown,
                    slot,
                    best_pick: false,
                }
            })
            .collect();

        ranked.sort_by(compare_ranked);

        if let Some(best) = ranked
            .iter_mut()
            .find(|m| m.attendee_count() >= self.min_attendees)
        {
            best.best_pick = true;
        }

        ranked
    }
}

/// Total order: score descending, then date, start, attendee key ascending.
pub fn compare_ranked(a: &RankedMatch, b: &RankedMatch) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.slot.date.cmp(&b.slot.date))
        .then_with(|| a.slot.span.start.cmp(&b.slot.span.start))
        .then_with(|| a.slot.attendee_key().cmp(&b.slot.attendee_key()))
}

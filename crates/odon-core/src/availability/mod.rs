//! Group availability matching.
//!
//! This module provides:
//! - Busy-interval normalization of member calendars
//! - Free-slot extraction inside working hours
//! - Multi-member intersection into candidate windows
//! - Deterministic slot ranking and best-pick selection

pub mod busy;
pub mod event;
pub mod free;
pub mod intersect;
pub mod matcher;
pub mod ranking;
pub mod span;

pub use busy::{merge_spans, BusyInterval, BusyMap, BusyNormalizer};
pub use event::{CalendarEvent, CalendarEventRecord, DateRange, MemberId};
pub use free::{FreeInterval, FreeMap, FreeSlotExtractor, WorkingHours};
pub use intersect::{CandidateSlot, Intersector};
pub use matcher::{compute_matches, free_intervals_for, MatchConfig, MatchReport, MatchRequest};
pub use ranking::{PreviousSlot, RankedMatch, ScoreBreakdown, ScoringPolicy, SlotRanker};
pub use span::TimeSpan;

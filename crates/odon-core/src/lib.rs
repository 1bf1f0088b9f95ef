//! # Odon Core Library
//!
//! Core logic behind Odon's hangout planning: turning each group member's
//! calendar into free time, intersecting it across the group, and ranking
//! the shared windows so one of them can be offered as the pick.
//!
//! ## Architecture
//!
//! - **Availability**: a pure pipeline normalize → extract → intersect → rank;
//!   every run is a function of its input with no I/O
//! - **Check-ins**: declared availability that overrides calendar free time
//! - **Explain**: deterministic reason and fallback notification text
//! - **Storage**: TOML-based configuration of matching defaults
//!
//! ## Key Components
//!
//! - [`compute_matches`]: ranked hangout windows for a group
//! - [`MatchRequest`]: serde request document, run via [`MatchRequest::compute`]
//! - [`Config`]: persisted defaults

pub mod availability;
pub mod checkin;
pub mod error;
pub mod explain;
pub mod storage;

pub use availability::{
    compute_matches, free_intervals_for, BusyInterval, CalendarEvent, CalendarEventRecord,
    CandidateSlot, DateRange, FreeInterval, MatchConfig, MatchReport, MatchRequest, MemberId,
    PreviousSlot, RankedMatch, ScoreBreakdown, ScoringPolicy, TimeSpan, WorkingHours,
};
pub use checkin::{AvailabilitySlot, AvailabilitySlotRecord};
pub use error::{ConfigError, CoreError, ValidationError};
pub use explain::{NotificationKind, SlotSummary};
pub use storage::Config;

//! Core error types for odon-core.
//!
//! Input validation failures are the only errors the matching pipeline can
//! produce; configuration errors come from the TOML settings layer.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Core error type for odon-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Configuration directory could not be resolved or created
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Input validation errors, raised before any computation starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Date range ends before it starts
    #[error("Invalid date range: end ({end}) is before start ({start})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// No members to match
    #[error("Member set is empty")]
    EmptyMembers,

    /// Working hours are not a non-empty window inside one day
    #[error("Invalid working hours {start}:00-{end}:00: start must be before end and end at most 24")]
    InvalidWorkingHours { start: u32, end: u32 },

    /// Negative duration or threshold
    #[error("Invalid duration for '{field}': {value} minutes")]
    NegativeDuration { field: String, value: i64 },

    /// Timed event ends before it starts
    #[error("Invalid event for member '{member}': end ({end}) is before start ({start})")]
    InvalidEvent {
        member: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Submitted availability slot ends before it starts
    #[error("Invalid availability slot for member '{member}' on {date}: {start}-{end}")]
    InvalidSlot {
        member: String,
        date: NaiveDate,
        start: String,
        end: String,
    },

    /// Unparseable `HH:MM` time of day
    #[error("Invalid time of day '{0}': expected HH:MM between 00:00 and 24:00")]
    InvalidTimeOfDay(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! TOML-based application configuration.
//!
//! Stores the group defaults used when a match request carries no config
//! of its own:
//! - Working hours and minimum slot length
//! - Attendee threshold and ideal hangout length
//! - Scoring constants
//! - CLI output preferences
//!
//! Configuration is stored at `~/.config/odon/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::availability::{MatchConfig, ScoringPolicy, WorkingHours};
use crate::error::ConfigError;

/// Matching defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_work_start_hour")]
    pub work_start_hour: u32,
    #[serde(default = "default_work_end_hour")]
    pub work_end_hour: u32,
    #[serde(default = "default_min_slot_minutes")]
    pub min_slot_minutes: i64,
    #[serde(default = "default_min_attendees")]
    pub min_attendees: usize,
    #[serde(default = "default_ideal_duration_minutes")]
    pub ideal_duration_minutes: i64,
    #[serde(default = "default_novelty_penalty")]
    pub novelty_penalty: f64,
    #[serde(default = "default_daytime_penalty")]
    pub daytime_penalty: f64,
    #[serde(default = "default_evening_start_hour")]
    pub evening_start_hour: u32,
    /// All-day events block the whole day instead of being ignored.
    #[serde(default)]
    pub all_day_blocks: bool,
}

/// CLI output preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: bool,
    /// Matches shown by default
    #[serde(default = "default_top")]
    pub top: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/odon/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// Default functions
fn default_work_start_hour() -> u32 {
    9
}
fn default_work_end_hour() -> u32 {
    21
}
fn default_min_slot_minutes() -> i64 {
    60
}
fn default_min_attendees() -> usize {
    2
}
fn default_ideal_duration_minutes() -> i64 {
    180
}
fn default_novelty_penalty() -> f64 {
    20.0
}
fn default_daytime_penalty() -> f64 {
    10.0
}
fn default_evening_start_hour() -> u32 {
    17
}
fn default_top() -> usize {
    5
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            work_start_hour: default_work_start_hour(),
            work_end_hour: default_work_end_hour(),
            min_slot_minutes: default_min_slot_minutes(),
            min_attendees: default_min_attendees(),
            ideal_duration_minutes: default_ideal_duration_minutes(),
            novelty_penalty: default_novelty_penalty(),
            daytime_penalty: default_daytime_penalty(),
            evening_start_hour: default_evening_start_hour(),
            all_day_blocks: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            top: default_top(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting matching settings would be rejected by a run.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated
            .match_config()
            .validate()
            .map_err(|e| invalid(e.to_string()))?;
        *self = updated;
        Ok(())
    }

    /// Matching parameters these defaults describe.
    pub fn match_config(&self) -> MatchConfig {
        let m = &self.matching;
        MatchConfig {
            working_hours: WorkingHours {
                start_hour: m.work_start_hour,
                end_hour: m.work_end_hour,
            },
            min_slot_duration_minutes: m.min_slot_minutes,
            min_meeting_minutes: None,
            min_attendees: m.min_attendees,
            ideal_duration_minutes: m.ideal_duration_minutes,
            previous_slots: Vec::new(),
            scoring: ScoringPolicy {
                novelty_penalty: m.novelty_penalty,
                daytime_penalty: m.daytime_penalty,
                evening_start_hour: m.evening_start_hour,
                ..ScoringPolicy::default()
            },
            all_day_blocks: m.all_day_blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[matching]\nmin_attendees = 4\n").unwrap();
        assert_eq!(parsed.matching.min_attendees, 4);
        assert_eq!(parsed.matching.work_end_hour, 21);
        assert_eq!(parsed.output.top, 5);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("matching.work_start_hour").as_deref(), Some("9"));
        assert_eq!(cfg.get("matching.all_day_blocks").as_deref(), Some("false"));
        assert_eq!(cfg.get("matching.novelty_penalty").as_deref(), Some("20.0"));
        assert!(cfg.get("matching.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("matching.min_attendees", "3").unwrap();
        cfg.set("matching.all_day_blocks", "true").unwrap();
        cfg.set("matching.daytime_penalty", "12.5").unwrap();
        assert_eq!(cfg.matching.min_attendees, 3);
        assert!(cfg.matching.all_day_blocks);
        assert_eq!(cfg.matching.daytime_penalty, 12.5);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("matching.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("output.json", "not_a_bool"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("matching.work_end_hour", "8"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("matching.min_slot_minutes", "-10"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("matching.evening_start_hour", "4294967295"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn match_config_carries_defaults() {
        let mc = Config::default().match_config();
        assert_eq!(mc, MatchConfig::default());
    }

    #[test]
    fn load_from_creates_and_reloads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, Config::default());

        let mut cfg = created;
        cfg.set("output.top", "3").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().output.top, 3);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "matching = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}

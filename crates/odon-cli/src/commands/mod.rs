pub mod config;
pub mod free;
pub mod matching;

use std::io::Read;
use std::path::Path;

use odon_core::{Config, MatchRequest};

/// Read a match request from a file, or from stdin when `input` is `-`.
pub fn read_request(input: &str) -> Result<MatchRequest, Box<dyn std::error::Error>> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("cannot read {input}: {e}"))?
    };
    Ok(MatchRequest::from_json(&text)?)
}

/// Load the config from an explicit path or the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    })
}

/// Persist the config to an explicit path or the default location.
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}

//! Per-member free time command.

use std::path::Path;

use clap::Args;
use odon_core::explain::format_duration;
use odon_core::free_intervals_for;

use super::{load_config, read_request};

#[derive(Args)]
pub struct FreeArgs {
    /// Match request JSON file, or "-" for stdin
    #[arg(long, short)]
    input: String,
    /// Member whose calendar to read
    #[arg(long, short)]
    member: String,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: FreeArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let request = read_request(&args.input)?;
    if !request.members.contains(&args.member) {
        return Err(format!("{} is not a member of this group", args.member).into());
    }

    let match_config = request.effective_config(&config.match_config());
    let events = request
        .events_by_member()?
        .remove(&args.member)
        .unwrap_or_default();
    let free = free_intervals_for(&events, request.date_range, &match_config)?;

    if args.json || config.output.json {
        println!("{}", serde_json::to_string_pretty(&free)?);
        return Ok(());
    }

    if free.is_empty() {
        println!("{} has no free time in range.", args.member);
        return Ok(());
    }
    for interval in &free {
        println!(
            "{} {}  ({})",
            interval.date.format("%a %Y-%m-%d"),
            interval.span,
            format_duration(interval.duration_minutes())
        );
    }
    Ok(())
}

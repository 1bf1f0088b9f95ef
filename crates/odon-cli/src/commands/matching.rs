//! Group matching command.

use std::path::Path;

use clap::Args;
use odon_core::explain::format_duration;
use odon_core::{MatchReport, RankedMatch};

use super::{load_config, read_request};

#[derive(Args)]
pub struct MatchArgs {
    /// Match request JSON file, or "-" for stdin
    #[arg(long, short)]
    input: String,
    /// Override the attendee threshold
    #[arg(long)]
    min_attendees: Option<usize>,
    /// Number of matches to show
    #[arg(long)]
    top: Option<usize>,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: MatchArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut request = read_request(&args.input)?;

    let mut defaults = config.match_config();
    if let Some(min) = args.min_attendees {
        defaults.min_attendees = min;
        if let Some(own) = request.config.as_mut() {
            own.min_attendees = min;
        }
    }

    let mut report = request.compute(&defaults)?;
    report.truncate(args.top.unwrap_or(config.output.top));

    if args.json || config.output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, request.members.len());
    }
    Ok(())
}

fn print_report(report: &MatchReport, group_size: usize) {
    match (&report.best_pick, &report.reason) {
        (Some(best), Some(reason)) => {
            println!("Best pick: {}", describe(best, group_size));
            println!("  why: {reason}");
        }
        _ => {
            println!("No match.");
            if let Some(hint) = &report.hint {
                println!("  {hint}");
            }
        }
    }

    if report.matches.is_empty() {
        return;
    }
    println!();
    println!("Candidates:");
    for m in &report.matches {
        let marker = if m.best_pick { "*" } else { " " };
        println!(
            "{marker} {}  [{}]  score {:.1}",
            describe(m, group_size),
            m.slot.attendees.iter().cloned().collect::<Vec<_>>().join(", "),
            m.score
        );
    }
}

fn describe(m: &RankedMatch, group_size: usize) -> String {
    format!(
        "{} {} {} ({}, {}/{} free)",
        m.weekday,
        m.slot.date.format("%Y-%m-%d"),
        m.slot.span,
        format_duration(m.duration_minutes),
        m.attendee_count(),
        group_size
    )
}

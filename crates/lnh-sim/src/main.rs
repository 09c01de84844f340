//! Headless match harness for the battle engine.
//!
//! Run `lnh-sim --help` for the flags. Without paths the bundled demo
//! catalog and roster are used. Log verbosity follows `RUST_LOG` (default
//! `info`).

mod runner;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lnh_core::{ActionCatalog, RosterDefinition};
use tracing_subscriber::EnvFilter;

use runner::{run_matches, Summary};

pub(crate) const DEMO_CATALOG: &str = include_str!("../data/catalog.json");
pub(crate) const DEMO_ROSTER: &str = include_str!("../data/roster.json");

/// Runs seeded AI-vs-AI matches and reports outcome counts.
#[derive(Debug, Parser)]
#[command(name = "lnh-sim", version, about)]
struct Args {
    /// Action catalog JSON (defaults to the bundled demo catalog)
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Roster JSON (defaults to the bundled demo roster)
    #[arg(long, value_name = "PATH")]
    roster: Option<PathBuf>,

    /// Seed of the first match; match `i` uses `seed + i`
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of matches to run
    #[arg(long, default_value_t = 100)]
    matches: u64,

    /// Rounds after which a match counts as unfinished
    #[arg(long, default_value_t = 100)]
    max_rounds: u32,
}

fn read_or_default(path: Option<&Path>, bundled: &str) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => Ok(bundled.to_string()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let catalog_json = read_or_default(args.catalog.as_deref(), DEMO_CATALOG)?;
    let catalog = ActionCatalog::from_json_str(&catalog_json).context("loading action catalog")?;
    let roster_json = read_or_default(args.roster.as_deref(), DEMO_ROSTER)?;
    let roster = RosterDefinition::from_json_str(&roster_json).context("loading roster")?;
    tracing::info!(
        actions = catalog.len(),
        combatants = roster.combatants.len(),
        "data loaded"
    );

    let results = run_matches(
        &Arc::new(catalog),
        &roster,
        args.seed,
        args.matches,
        args.max_rounds,
    )?;
    let summary = Summary::from_results(&results);

    println!("matches: {}", summary.matches);
    for (outcome, count) in &summary.outcomes {
        println!("  {outcome}: {count}");
    }
    println!("average rounds: {:.2}", summary.average_rounds);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("lnh-sim").chain(raw.iter().copied()))
    }

    #[test]
    fn defaults_without_flags() {
        let parsed = args(&[]).unwrap();
        assert!(parsed.catalog.is_none());
        assert_eq!(parsed.seed, 0);
        assert_eq!(parsed.matches, 100);
        assert_eq!(parsed.max_rounds, 100);
    }

    #[test]
    fn parses_every_flag() {
        let parsed = args(&[
            "--catalog", "c.json", "--roster", "r.json", "--seed", "9", "--matches", "3",
            "--max-rounds", "12",
        ])
        .unwrap();
        assert_eq!(parsed.catalog, Some(PathBuf::from("c.json")));
        assert_eq!(parsed.roster, Some(PathBuf::from("r.json")));
        assert_eq!(parsed.seed, 9);
        assert_eq!(parsed.matches, 3);
        assert_eq!(parsed.max_rounds, 12);
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(args(&["--fast"]).is_err());
        assert!(args(&["--seed"]).is_err());
        assert!(args(&["--seed", "abc"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

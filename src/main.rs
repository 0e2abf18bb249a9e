//! Applies the overlap rule to a fact dump and prints every element interval.
//!
//! Usage: `activity-overlap [--config FILE] [--max-passes N] [FACTS.json]`.
//! Settings come from `activity-overlap.toml` (optional) and `OVERLAP_*`
//! environment variables; arguments take precedence over the settings.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use activity_overlap::activity::Vocabulary;
use activity_overlap::cli::{interval_line, Cli};
use activity_overlap::construct::FactStore;
use activity_overlap::error::{OverlapError, Result};
use activity_overlap::load::load_file;
use activity_overlap::session::Database;
use activity_overlap::settings::Settings;
use activity_overlap::sparql;

fn run(settings: &Settings, cli: Cli) -> Result<()> {
    let facts = cli
        .facts
        .or_else(|| settings.facts.clone())
        .ok_or_else(|| OverlapError::Config("no fact dump given".into()))?;
    let max_passes = match cli.max_passes {
        Some(0) => return Err(OverlapError::Config("max_passes must be at least 1".into())),
        Some(n) => n,
        None => settings.max_passes,
    };

    let mut store = FactStore::new();
    let vocabulary = Vocabulary::intern(&mut store);
    load_file(&mut store, &facts)?;
    let rule = vocabulary.overlap_rule()?;
    let report = vocabulary.interval_report()?;

    let db = Database::new(store);
    let mut session = db.open()?;
    debug!(update = %sparql::render_update(&rule, session.store())?, "overlap rule");
    let passes = session.apply_until_stable(&rule, max_passes)?;
    info!(
        passes = passes.len(),
        rewrites = passes.iter().map(|p| p.rewrites).sum::<usize>(),
        "overlaps resolved"
    );

    debug!(query = %sparql::render_select(&report, session.store())?, "interval report");
    for row in session.project(&report)? {
        match interval_line(&row) {
            Some(line) => println!("{line}"),
            None => warn!(cells = row.cells().len(), "unexpected report row"),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(&settings, cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "run failed");
            ExitCode::FAILURE
        }
    }
}

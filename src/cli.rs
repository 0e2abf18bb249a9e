//! Command line surface of the `activity-overlap` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::project::Row;

#[derive(Debug, Parser)]
#[command(name = "activity-overlap", version, about = "Resolves overlapping activity intervals")]
pub struct Cli {
    /// JSON fact dump; overrides `facts` from the settings
    pub facts: Option<PathBuf>,

    /// Settings file to read instead of `activity-overlap.toml`
    #[arg(long)]
    pub config: Option<String>,

    /// Upper bound on rule applications; overrides `max_passes` from the settings
    #[arg(long)]
    pub max_passes: Option<usize>,
}

/// One line of the interval report, or None for a row of another shape.
pub fn interval_line(row: &Row) -> Option<String> {
    match row.texts().as_slice() {
        [element, start, end] => Some(format!("?e = {}, ?sd = {}, ?ed = {}", element, start, end)),
        _ => None,
    }
}

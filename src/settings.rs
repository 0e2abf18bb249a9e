// config lets you read a separate config file
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{OverlapError, Result};

pub const DEFAULT_CONFIG: &str = "activity-overlap";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // JSON fact dump to populate the store from
    pub facts: Option<PathBuf>,
    // how many times the overlap rule may be applied before reporting
    pub max_passes: usize,
    // used when RUST_LOG is not set
    pub log_filter: String,
}

impl Settings {
    /// Defaults, overridden by the config file (`activity-overlap.{toml,json,…}`
    /// unless another is named) and then by `OVERLAP_*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Settings> {
        let file = match path {
            Some(p) => File::with_name(p),
            None => File::with_name(DEFAULT_CONFIG).required(false),
        };
        let settings: Settings = Config::builder()
            .set_default("max_passes", 1_i64)?
            .set_default("log_filter", "info")?
            .add_source(file)
            .add_source(Environment::with_prefix("OVERLAP"))
            .build()?
            .try_deserialize()?;
        if settings.max_passes == 0 {
            return Err(OverlapError::Config("max_passes must be at least 1".into()));
        }
        Ok(settings)
    }
}

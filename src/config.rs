//! Runtime configuration.
//!
//! Layered lowest to highest: built-in defaults, a TOML file named by
//! `LAPLACIAN_CONFIG`, then the `LAPLACIAN_WORKERS` environment variable.

use std::env::{self, VarError};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::{FilterError, Result};

pub const CONFIG_ENV: &str = "LAPLACIAN_CONFIG";
pub const WORKERS_ENV: &str = "LAPLACIAN_WORKERS";

pub const DEFAULT_SUFFIX: &str = "_laplacian";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of partitions, and therefore workers, per filter pass.
    pub workers: NonZeroUsize,
    /// Appended to the input file stem to name the output.
    pub suffix: String,
}

/// Shape of the TOML file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    workers: Option<NonZeroUsize>,
    suffix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl Config {
    /// Defaults with an explicit worker count.
    pub fn with_workers(workers: usize) -> Result<Self> {
        Ok(Config {
            workers: parse_workers_count(workers)?,
            ..Config::default()
        })
    }

    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let file = env::var_os(CONFIG_ENV);
        let workers = read_env_var(WORKERS_ENV)?;

        Self::from_sources(file.as_deref().map(Path::new), workers.as_deref())
    }

    /// Layer an optional config file and optional overrides over the defaults.
    pub fn from_sources(file: Option<&Path>, workers: Option<&str>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = file {
            debug!("loading config from {}", path.display());
            let content = fs::read_to_string(path)?;
            config.merge(toml::from_str(&content)?);
        }

        if let Some(raw) = workers {
            let count = raw.trim().parse::<usize>().map_err(|_| {
                FilterError::config(format!("{} must be a positive integer, got '{}'", WORKERS_ENV, raw))
            })?;
            config.workers = parse_workers_count(count)?;
        }

        if config.suffix.is_empty() {
            return Err(FilterError::config("output suffix must not be empty"));
        }

        debug!("resolved config: {:?}", config);
        Ok(config)
    }

    fn merge(&mut self, file: FileConfig) {
        if let Some(workers) = file.workers {
            self.workers = workers;
        }
        if let Some(suffix) = file.suffix {
            self.suffix = suffix;
        }
    }
}

/// An unset variable is `None`; a set but non-UTF-8 one is an error.
fn read_env_var(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(FilterError::config(format!(
            "{} is not valid UTF-8",
            name
        ))),
    }
}

fn parse_workers_count(workers: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(workers).ok_or_else(|| FilterError::config("worker count must be at least 1"))
}

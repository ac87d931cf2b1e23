use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::validator::ValidatorConfig;

/// Application configuration module
/// This module handles loading and validating the tool's configuration:
/// logging verbosity and which consistency checks the validator runs.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationSettings,
}

/// Log level setting
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Normal output
    #[default]
    Info,
    /// Verbose output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    // @returns: log crate level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Which consistency checks the validation pass runs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationSettings {
    /// Flag same-group overlaps
    #[serde(default = "default_true")]
    pub check_overlaps: bool,

    /// Flag incompatible predecessors
    #[serde(default = "default_true")]
    pub check_predecessors: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            check_overlaps: true,
            check_predecessors: true,
        }
    }
}

impl From<&ValidationSettings> for ValidatorConfig {
    fn from(settings: &ValidationSettings) -> Self {
        ValidatorConfig {
            check_overlaps: settings.check_overlaps,
            check_predecessors: settings.check_predecessors,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the file if it exists, defaults otherwise.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

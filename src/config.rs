// File: src/config.rs
//
// Interpreter configuration.
//
// Settings come from a TOML file (an explicit path, or fun.toml in the working
// directory when present) and fall back to defaults for any missing key.
// Command-line flags are applied on top by the binary.

use crate::errors::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// File name looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "fun.toml";

pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Maximum number of nested user function calls before `StackExhaustion`
    pub max_call_depth: usize,

    /// Default log filter when RUST_LOG is not set
    pub log_level: String,

    /// Colorize diagnostics
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            log_level: "warn".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Load and validate configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        debug!("loading configuration from {}", path.display());
        content.parse()
    }

    /// Load from `explicit` if given, else from `fun.toml` if it exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            Self::from_file(local)
        } else {
            debug!("no {} found, using default configuration", CONFIG_FILE_NAME);
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_call_depth == 0 {
            return Err(Error::Config(
                "max_call_depth must be at least 1".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "invalid log_level '{}', expected one of: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

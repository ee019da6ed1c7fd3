//! Ledger configuration via `tessera.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Values are validated eagerly on load; a ledger never runs with a config
//! it could not honour.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_concurrency::DEFAULT_MAX_CALL_DEPTH;
use tessera_core::{Error, Result};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "tessera.toml";

/// Ledger configuration loaded from `tessera.toml`.
///
/// # Example
///
/// ```toml
/// # Deepest allowed chain of nested contract calls, outermost included.
/// max_call_depth = 16
///
/// # Forward contract output to the `tessera::console` log target.
/// console_output = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Maximum number of live frames in one call stack.
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Whether `print` output from contracts is emitted.
    #[serde(default = "default_console_output")]
    pub console_output: bool,
}

fn default_max_call_depth() -> usize {
    DEFAULT_MAX_CALL_DEPTH
}

fn default_console_output() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_call_depth: default_max_call_depth(),
            console_output: default_console_output(),
        }
    }
}

impl LedgerConfig {
    /// Check the values for consistency.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_call_depth` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_call_depth == 0 {
            return Err(Error::ConfigError(
                "max_call_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Tessera ledger configuration
#
# Deepest allowed chain of nested contract calls, outermost call included.
# A call that would exceed it fails with CallDepthExceeded.
max_call_depth = 16

# Forward contract print output to the "tessera::console" log target.
console_output = true
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LedgerConfig = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::ConfigError(msg) => {
                Error::ConfigError(format!("{} (in '{}')", msg, path.display()))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::ConfigError(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

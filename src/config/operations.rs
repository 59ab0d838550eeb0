//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::is_plain_identifier;
use crate::error::{DibsError, Result};
use crate::select::EnvFilter;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-user config file location (e.g. `~/.config/dibs/config.yaml`).
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "dibs")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DibsError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load the explicitly given file, or the per-user file if it exists, or
    /// fall back to defaults.
    ///
    /// An explicitly given file must exist.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| DibsError::ConfigError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    #[cfg(test)]
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            DibsError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - timeouts must be positive
    /// - `platform_domain` and `terminus_command` must be non-empty
    /// - readiness schema and tables must be plain identifiers
    /// - `default_filter`, when set, must compile
    pub fn validate(&self) -> Result<()> {
        if self.http_timeout_secs == 0 {
            return Err(DibsError::ConfigError(
                "config validation failed: http_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.channel_timeout_secs == 0 {
            return Err(DibsError::ConfigError(
                "config validation failed: channel_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.platform_domain.trim().is_empty() {
            return Err(DibsError::ConfigError(
                "config validation failed: platform_domain must be non-empty".to_string(),
            ));
        }

        if self.terminus_command.trim().is_empty() {
            return Err(DibsError::ConfigError(
                "config validation failed: terminus_command must be non-empty".to_string(),
            ));
        }

        if !is_plain_identifier(&self.readiness_schema) {
            return Err(DibsError::ConfigError(format!(
                "config validation failed: readiness_schema '{}' is not a plain identifier",
                self.readiness_schema
            )));
        }

        if self.readiness_tables.is_empty() {
            return Err(DibsError::ConfigError(
                "config validation failed: readiness_tables must list at least one table"
                    .to_string(),
            ));
        }

        for table in &self.readiness_tables {
            if !is_plain_identifier(table) {
                return Err(DibsError::ConfigError(format!(
                    "config validation failed: readiness_tables entry '{}' is not a plain identifier",
                    table
                )));
            }
        }

        if let Some(pattern) = &self.default_filter {
            EnvFilter::parse(pattern).map_err(|e| {
                DibsError::ConfigError(format!("config validation failed: default_filter: {}", e))
            })?;
        }

        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn channel_timeout(&self) -> Duration {
        Duration::from_secs(self.channel_timeout_secs)
    }

    /// The filter to use when a command is given `pattern` (or none).
    pub fn filter_for(&self, pattern: Option<&str>) -> Result<EnvFilter> {
        EnvFilter::from_option(pattern.or(self.default_filter.as_deref()))
    }
}

//! Configuration for the extraction engine and the rebuild driver.
//!
//! Follows a builder pattern with validation. Configuration files are YAML.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cap on tag body length, in code points.
pub const DEFAULT_MAX_TAG_LENGTH: usize = 100;

/// Markdown layer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum tag body length in code points; longer runs are truncated
    pub max_tag_length: usize,
    pub enable_tables: bool,
    pub enable_strikethrough: bool,
    pub enable_footnotes: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_tag_length: DEFAULT_MAX_TAG_LENGTH,
            enable_tables: true,
            enable_strikethrough: true,
            enable_footnotes: true,
        }
    }
}

/// Rebuild driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildConfig {
    /// Number of notes extracted concurrently
    pub concurrency: usize,
    /// Abort the run at the first note that fails to extract
    pub stop_on_error: bool,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            stop_on_error: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub parser: ParserConfig,
    pub rebuild: RebuildConfig,
    pub log_level: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            rebuild: RebuildConfig::default(),
            log_level: "INFO".to_string(),
        }
    }
}

impl IndexConfig {
    /// Create new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with builder
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::new()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.parser.max_tag_length == 0 {
            return Err(Error::config_error("max_tag_length must be at least 1"));
        }

        if self.rebuild.concurrency == 0 {
            return Err(Error::config_error("rebuild concurrency must be at least 1"));
        }

        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(Error::config_error(format!(
                "Unknown log level: {}",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Parsed log level, falling back to `Info`
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: IndexConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file; a missing file yields the defaults
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to load config from {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml_str(&content)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, yaml).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to save config to {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Builder for IndexConfig
#[derive(Debug, Default)]
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_tag_length(mut self, max: usize) -> Self {
        self.config.parser.max_tag_length = max;
        self
    }

    pub fn enable_tables(mut self, enable: bool) -> Self {
        self.config.parser.enable_tables = enable;
        self
    }

    pub fn enable_strikethrough(mut self, enable: bool) -> Self {
        self.config.parser.enable_strikethrough = enable;
        self
    }

    pub fn enable_footnotes(mut self, enable: bool) -> Self {
        self.config.parser.enable_footnotes = enable;
        self
    }

    pub fn rebuild_concurrency(mut self, concurrency: usize) -> Self {
        self.config.rebuild.concurrency = concurrency;
        self
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.config.rebuild.stop_on_error = stop;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<IndexConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

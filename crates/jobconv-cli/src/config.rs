//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables (`JOBCONV_*`)
//! - Command-line arguments

use crate::error::{Error, Result};
use jobconv_core::{ClassificationSettings, EngineSettings, FallbackPolicy, OracleConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-level configuration file name
pub const PROJECT_CONFIG_FILE: &str = ".jobconv.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classification oracle connection
    pub oracle: OracleConfig,

    /// Classification chain tunables
    pub classification: ClassificationConfig,

    /// Taxonomy table location
    pub taxonomy: TaxonomyConfig,

    /// Target column names with special meaning
    pub engine: EngineConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub fallback: FallbackPolicy,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_filter_key: Option<String>,

    /// Records converted concurrently
    pub concurrency: usize,

    /// Upper bound on one oracle call including retries, in seconds
    pub oracle_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// CSV with major, minor and optional link key columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub minor_column: String,
    pub major_column: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when neither -v nor RUST_LOG is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: String,

    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Show progress indicators
    pub progress: bool,

    /// Default directory for generated CSV files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        let settings = ClassificationSettings::default();
        Self {
            fallback: settings.fallback,
            link_filter_key: settings.link_filter_key,
            concurrency: 1,
            oracle_timeout_secs: settings.oracle_timeout_secs,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let settings = EngineSettings::default();
        Self {
            minor_column: settings.minor_column,
            major_column: settings.major_column,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: "compact".to_string(),
            file: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress: true,
            directory: None,
        }
    }
}

impl ClassificationConfig {
    pub fn settings(&self) -> ClassificationSettings {
        ClassificationSettings {
            fallback: self.fallback,
            link_filter_key: self.link_filter_key.clone(),
            oracle_timeout_secs: self.oracle_timeout_secs,
        }
    }
}

impl Config {
    /// Load configuration from a file; the format follows the extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content).map_err(|e| Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: format!("TOML ({})", e.message()),
            })?,
            _ => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        // logging is not initialised yet
                        eprintln!("Warning: Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load from a specific file or the default locations, then apply
    /// environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".jobconv.yaml"),
            PathBuf::from(".jobconv.json"),
            PathBuf::from(PROJECT_CONFIG_FILE),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let jobconv_dir = config_dir.join("jobconv");
            paths.push(jobconv_dir.join("config.yaml"));
            paths.push(jobconv_dir.join("config.json"));
            paths.push(jobconv_dir.join("config.toml"));
        }

        paths
    }

    /// User configuration file written by `config init --user`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jobconv").join("config.toml"))
    }

    /// Apply `JOBCONV_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("JOBCONV_MODEL") {
            self.oracle.model = model;
        }
        if let Some(url) = lookup("JOBCONV_BASE_URL") {
            self.oracle.base_url = url;
        }
        if let Some(name) = lookup("JOBCONV_API_KEY_ENV") {
            self.oracle.api_key_env = name;
        }
        if let Some(fallback) = lookup("JOBCONV_FALLBACK") {
            self.classification.fallback = fallback
                .parse()
                .map_err(|e: jobconv_core::Error| Error::config(e.to_string()))?;
        }
        if let Some(key) = lookup("JOBCONV_LINK_KEY") {
            self.classification.link_filter_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(value) = lookup("JOBCONV_CONCURRENCY") {
            self.classification.concurrency = parse_number("JOBCONV_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("JOBCONV_ORACLE_TIMEOUT") {
            self.classification.oracle_timeout_secs =
                parse_number("JOBCONV_ORACLE_TIMEOUT", &value)?;
        }
        if let Some(path) = lookup("JOBCONV_TAXONOMY") {
            self.taxonomy.path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup("JOBCONV_OUTPUT_DIR") {
            self.output.directory = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Engine settings derived from this configuration
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            minor_column: self.engine.minor_column.clone(),
            major_column: self.engine.major_column.clone(),
            concurrency: self.classification.concurrency.max(1),
        }
    }

    /// Save configuration to a file; the format follows the extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
            _ => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{} must be a number, got '{}'", name, value)))
}

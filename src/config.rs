//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analytics::{
    AnalyticsResult, DuplicatePolicy, ProgressThresholds, TimeWindow, TimelineZoom,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub timeline: TimelineConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

fn default_data_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("vetwatch").join("monitoring.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./vetwatch_data/monitoring.json".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

/// Statistics and progress configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_moderate_threshold")]
    pub moderate_threshold: f64,

    #[serde(default = "default_significant_threshold")]
    pub significant_threshold: f64,

    #[serde(default)]
    pub default_window: TimeWindow,
}

fn default_moderate_threshold() -> f64 {
    5.0
}

fn default_significant_threshold() -> f64 {
    15.0
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            moderate_threshold: default_moderate_threshold(),
            significant_threshold: default_significant_threshold(),
            default_window: TimeWindow::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Validated progress thresholds
    pub fn thresholds(&self) -> AnalyticsResult<ProgressThresholds> {
        ProgressThresholds::new(self.moderate_threshold, self.significant_threshold)
    }
}

/// Timeline zoom configuration, in days
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_min_time_range")]
    pub min_time_range: u32,

    #[serde(default = "default_max_time_range")]
    pub max_time_range: u32,

    #[serde(default = "default_time_range")]
    pub default_time_range: u32,
}

fn default_min_time_range() -> u32 {
    7
}

fn default_max_time_range() -> u32 {
    365
}

fn default_time_range() -> u32 {
    30
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_time_range: default_min_time_range(),
            max_time_range: default_max_time_range(),
            default_time_range: default_time_range(),
        }
    }
}

impl TimelineConfig {
    /// Initial zoom state
    pub fn zoom(&self) -> AnalyticsResult<TimelineZoom> {
        TimelineZoom::new(
            self.default_time_range,
            self.min_time_range,
            self.max_time_range,
        )
    }
}

/// Export configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    fn parse(content: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analytics
            .thresholds()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.timeline
            .zoom()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("vetwatch").join("config.toml")),
            Some(PathBuf::from("/etc/vetwatch/config.toml")),
            Some(PathBuf::from("./vetwatch.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(data_file) = std::env::var("VETWATCH_DATA_FILE") {
            self.storage.data_file = data_file;
        }

        if let Ok(policy) = std::env::var("VETWATCH_DUPLICATE_POLICY") {
            match policy.parse() {
                Ok(p) => self.export.duplicate_policy = p,
                Err(e) => tracing::warn!("Ignoring VETWATCH_DUPLICATE_POLICY: {}", e),
            }
        }

        if let Ok(level) = std::env::var("VETWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("VETWATCH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    let data_file = toml::Value::String(default_data_file()).to_string();

    format!(
        r#"# VetWatch Configuration
#
# Environment variables override these settings:
# - VETWATCH_DATA_FILE
# - VETWATCH_DUPLICATE_POLICY
# - VETWATCH_LOG_LEVEL
# - VETWATCH_LOG_FORMAT

[storage]
# JSON snapshot holding schemas and observations
data_file = {data_file}

[analytics]
# Percent change at which a change counts as Moderate
moderate_threshold = 5.0

# Percent change at which a change counts as Significant
significant_threshold = 15.0

# Window used when none is given: 7days, 14days, 30days, 90days, all
default_window = "30days"

[timeline]
# Zoom bounds and starting range, in days
min_time_range = 7
max_time_range = 365
default_time_range = 30

[export]
# Same-day duplicates in exports: last, first or average
duplicate_policy = "last"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.analytics.moderate_threshold, 5.0);
        assert_eq!(config.analytics.significant_threshold, 15.0);
        assert_eq!(config.analytics.default_window, TimeWindow::Last30Days);
        assert_eq!(config.timeline.zoom().unwrap().time_range(), 30);
        assert_eq!(config.export.duplicate_policy, DuplicatePolicy::Last);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_default_config_data_file_is_resolved() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.storage.data_file, default_data_file());
        assert!(!config.storage.data_file.starts_with('~'));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
[export]
duplicate_policy = "average"

[timeline]
max_time_range = 180
"#,
        )
        .unwrap();

        assert_eq!(config.export.duplicate_policy, DuplicatePolicy::Average);
        assert_eq!(config.timeline.min_time_range, 7);
        assert_eq!(config.timeline.zoom().unwrap().bounds(), (7, 180));
        assert_eq!(config.analytics.thresholds().unwrap(), ProgressThresholds::default());
    }

    #[test]
    fn test_rejects_inconsistent_values() {
        let err = Config::parse(
            r#"
[analytics]
moderate_threshold = 20.0
significant_threshold = 10.0
"#,
        );
        assert!(err.is_err());

        let err = Config::parse(
            r#"
[timeline]
min_time_range = 400
"#,
        );
        assert!(err.is_err());

        let err = Config::parse(
            r#"
[analytics]
default_window = "fortnight"
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vetwatch.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.logging.level, "debug");

        let missing = Config::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}

// RUNTIME PREFERENCES (User Experience)

use crate::logging::{codes, Code};
use crate::rules::{FeatureFlag, MatchPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid runtime configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn error_code(&self) -> Code {
        codes::system::CONFIGURATION_ERROR
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerPreferences {
    /// Stop at the first unmatched character instead of recovering
    pub halt_on_error: bool,

    /// How competing rules in a mode are resolved
    pub match_policy: MatchPolicy,

    /// Whether to collect per-kind token counts
    pub collect_detailed_metrics: bool,

    /// Whether to count keyword occurrences by name
    pub track_keyword_usage: bool,

    /// Whether to show line/column information in diagnostic messages
    pub include_position_in_errors: bool,

    /// Feature flags that unlock gated rules
    pub enabled_features: BTreeSet<FeatureFlag>,
}

impl Default for TokenizerPreferences {
    fn default() -> Self {
        Self {
            halt_on_error: env::var(env_vars::TOKENIZER_HALT_ON_ERROR)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            match_policy: env::var(env_vars::TOKENIZER_MATCH_POLICY)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            collect_detailed_metrics: env::var(env_vars::TOKENIZER_DETAILED_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            track_keyword_usage: env::var(env_vars::TOKENIZER_TRACK_KEYWORDS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_position_in_errors: env::var(env_vars::TOKENIZER_INCLUDE_POSITIONS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            enabled_features: env::var(env_vars::TOKENIZER_FEATURES)
                .ok()
                .map(|v| parse_feature_list(&v))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include timing and throughput figures in completion events
    pub log_performance_events: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var(env_vars::LOGGING_LOG_PERFORMANCE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Level for a numeric severity floor, saturating at `Debug`
    pub fn from_u8(level: u8) -> Self {
        match level {
            0 => LogLevel::Error,
            1 => LogLevel::Warning,
            2 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Parse a comma separated feature list, ignoring names that are not recognised
fn parse_feature_list(value: &str) -> BTreeSet<FeatureFlag> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| name.parse().ok())
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tokenizer: TokenizerPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a runtime configuration document; absent keys fall back to environment defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Tokenizer
    pub const TOKENIZER_HALT_ON_ERROR: &str = "ESQL_TOKENIZER_HALT_ON_ERROR";
    pub const TOKENIZER_MATCH_POLICY: &str = "ESQL_TOKENIZER_MATCH_POLICY";
    pub const TOKENIZER_DETAILED_METRICS: &str = "ESQL_TOKENIZER_DETAILED_METRICS";
    pub const TOKENIZER_TRACK_KEYWORDS: &str = "ESQL_TOKENIZER_TRACK_KEYWORDS";
    pub const TOKENIZER_INCLUDE_POSITIONS: &str = "ESQL_TOKENIZER_INCLUDE_POSITIONS";
    pub const TOKENIZER_FEATURES: &str = "ESQL_TOKENIZER_FEATURES";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ESQL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ESQL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ESQL_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "ESQL_LOGGING_LOG_PERFORMANCE";
}

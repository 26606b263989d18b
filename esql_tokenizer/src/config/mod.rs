//! Configuration module for the ESQL tokenizer
//! Compile-time limits come from TOML via build.rs; preferences are resolved at runtime

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod constants;
pub mod runtime;

pub use runtime::{ConfigError, LogLevel, LoggingPreferences, RuntimeConfig, TokenizerPreferences};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        super::compile_time::PROFILE
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("ESQL_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

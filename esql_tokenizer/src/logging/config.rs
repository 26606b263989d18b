//! Logging configuration
//!
//! Limits come from the compile-time constants; level and output format are
//! runtime preferences, installed once and otherwise read from the environment.

use crate::config::compile_time::logging::*;
use crate::config::runtime::{LogLevel, LoggingPreferences};
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; fails if they were already installed
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Level below which events are never suppressed for this build profile
pub fn get_security_log_level() -> LogLevel {
    LogLevel::from_u8(SECURITY_MIN_LOG_LEVEL)
}

/// User preference, widened so the profile's floor is always logged
pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences()
        .min_log_level
        .max(get_security_log_level())
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn log_performance_events() -> bool {
    get_runtime_preferences().log_performance_events
}

/// Events retained by in-memory loggers
pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Clip a message to the configured maximum on a character boundary
pub fn truncate_message(message: &str) -> &str {
    let limit = get_max_log_message_length();
    if message.len() <= limit {
        return message;
    }
    let mut end = limit;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE == 0 {
        return Err("Log buffer size must be non-zero".to_string());
    }

    if LOG_BUFFER_SIZE > 100_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }

    if SECURITY_MIN_LOG_LEVEL > 2 {
        return Err(format!(
            "Security minimum log level out of range: {}",
            SECURITY_MIN_LOG_LEVEL
        ));
    }

    Ok(())
}

pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Compile-time ({}) ===\n\
         - Log buffer size: {}\n\
         - Max message length: {}\n\
         - Security min level: {}\n\
         === Runtime ===\n\
         - Min log level: {}\n\
         - Effective min level: {}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Performance events: {}",
        crate::config::build_info::profile(),
        LOG_BUFFER_SIZE,
        MAX_LOG_MESSAGE_LENGTH,
        get_security_log_level().as_str(),
        preferences.min_log_level.as_str(),
        get_min_log_level().as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.log_performance_events,
    )
}

//! Logging macros taking a `Code` and `key => value` context pairs
//!
//! Context values may be any `Display` type. Nothing is formatted unless the
//! event would actually be delivered.

/// Render `key => value` pairs as owned strings
#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($($key:expr => $value:expr),+) => {
        vec![$(($key, format!("{}", $value))),+]
    };
}

// ============================================================================
// ERROR
// ============================================================================

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Error) {
            let context_strings: Vec<(&str, String)> = $crate::__log_context!($($key => $value),+);
            let context = $crate::logging::context_refs(&context_strings);
            $crate::logging::log_error_with_context($code, $message, Some($span), context);
        }
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Error) {
            let context_strings: Vec<(&str, String)> = $crate::__log_context!($($key => $value),+);
            let context = $crate::logging::context_refs(&context_strings);
            $crate::logging::log_error_with_context($code, $message, None, context);
        }
    };
}

// ============================================================================
// WARNING
// ============================================================================

#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr) => {
        $crate::logging::log_warning_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_warning_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Warning) {
            let context_strings: Vec<(&str, String)> = $crate::__log_context!($($key => $value),+);
            let context = $crate::logging::context_refs(&context_strings);
            $crate::logging::log_warning_with_context($code, $message, Some($span), context);
        }
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Warning) {
            let context_strings: Vec<(&str, String)> = $crate::__log_context!($($key => $value),+);
            let context = $crate::logging::context_refs(&context_strings);
            $crate::logging::log_warning_with_context($code, $message, None, context);
        }
    };
}

// ============================================================================
// SUCCESS / INFO / DEBUG
// ============================================================================

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Info) {
            let context_strings: Vec<(&str, String)> = $crate::__log_context!($($key => $value),+);
            let context = $crate::logging::context_refs(&context_strings);
            $crate::logging::log_success_with_context($code, $message, context);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Info) {
            let context_strings: Vec<(&str, String)> = $crate::__log_context!($($key => $value),+);
            let context = $crate::logging::context_refs(&context_strings);
            $crate::logging::log_info_with_context($message, context);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        $crate::logging::log_debug_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Debug) {
            let context_strings: Vec<(&str, String)> = $crate::__log_context!($($key => $value),+);
            let context = $crate::logging::context_refs(&context_strings);
            $crate::logging::log_debug_with_context($message, context);
        }
    };
}

//! Global logging for the tokenizer
//!
//! A process-wide [`LoggingService`] is installed once with
//! [`init_global_logging`]. Until then every macro is a silent no-op, so the
//! library can be embedded without any logging setup. A thread can temporarily
//! route its events elsewhere with [`with_scoped_logger`].

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::utils::Span;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, EventSummary, Logger, LoggingService, MemoryLogger, MultiLogger, NullLogger,
    StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static SCOPED_LOGGER: RefCell<Option<Arc<LoggingService>>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the service described by the runtime logging preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let service = Arc::new(service::create_configured_service());
    init_global_logging_with_service(service.clone())?;

    service.log_success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    );
    Ok(())
}

/// Install a specific service
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Run `f` with this thread's events routed to `service` instead of the global logger
pub fn with_scoped_logger<F, R>(service: Arc<LoggingService>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = SCOPED_LOGGER.with(|slot| slot.borrow_mut().replace(service));
    let result = f();
    SCOPED_LOGGER.with(|slot| *slot.borrow_mut() = previous);
    result
}

/// Whether an event at `level` would reach any logger on this thread
pub fn is_enabled(level: LogLevel) -> bool {
    let scoped = SCOPED_LOGGER.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|service| service.should_log(level))
    });
    scoped.unwrap_or_else(|| {
        try_get_global_logger()
            .map(|service| service.should_log(level))
            .unwrap_or(false)
    })
}

/// Deliver an event to the scoped logger if one is set, else the global one
pub fn dispatch(event: LogEvent) {
    let scoped = SCOPED_LOGGER.with(|slot| slot.borrow().clone());
    match scoped {
        Some(service) => service.log_event(event),
        None => {
            if let Some(service) = try_get_global_logger() {
                service.log_event(event);
            }
        }
    }
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Borrow rendered context pairs in the shape the logging functions take
pub fn context_refs<'a>(pairs: &'a [(&'a str, String)]) -> Vec<(&'a str, &'a str)> {
    pairs.iter().map(|(key, value)| (*key, value.as_str())).collect()
}

fn build_event(
    event: LogEvent,
    span: Option<Span>,
    context: Vec<(&str, &str)>,
) -> LogEvent {
    let mut event = event;
    if let Some(span) = span {
        event = event.with_span(span);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<Span>,
    context: Vec<(&str, &str)>,
) {
    if is_enabled(LogLevel::Error) {
        let event = LogEvent::error(code, config::truncate_message(message));
        dispatch(build_event(event, span, context));
    }
}

pub fn log_warning_with_context(
    code: Code,
    message: &str,
    span: Option<Span>,
    context: Vec<(&str, &str)>,
) {
    if is_enabled(LogLevel::Warning) {
        let event = LogEvent::warning_with_code(code, config::truncate_message(message));
        dispatch(build_event(event, span, context));
    }
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if is_enabled(LogLevel::Info) {
        let event = LogEvent::success(code, config::truncate_message(message));
        dispatch(build_event(event, None, context));
    }
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    if is_enabled(LogLevel::Info) {
        let event = LogEvent::info(config::truncate_message(message));
        dispatch(build_event(event, None, context));
    }
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    if is_enabled(LogLevel::Debug) {
        let event = LogEvent::debug(config::truncate_message(message));
        dispatch(build_event(event, None, context));
    }
}

/// Error logging that falls back to stderr when no logger is installed
pub fn safe_log_error(code: Code, message: &str) {
    if is_enabled(LogLevel::Error) {
        dispatch(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] [{}] {}", code, message);
    }
}

//! Log codes and their classification
//!
//! Every event the tokenizer emits carries a [`Code`]. Error and warning codes
//! have metadata (category, severity, recoverability) registered below so
//! loggers can enrich events without the call site knowing about it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code wrapper shared by error, warning and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// Problems with the text handed to the tokenizer
pub mod input {
    use super::Code;

    pub const INPUT_TOO_LARGE: Code = Code::new("E010");
    pub const INPUT_READ_FAILED: Code = Code::new("E011");
}

pub mod rules {
    use super::Code;

    pub const INVALID_RULE_TABLE: Code = Code::new("E015");
}

pub mod tokenizer {
    use super::Code;

    pub const UNRECOGNIZED_CHARACTER: Code = Code::new("E020");
    pub const UNBALANCED_MODE_STACK: Code = Code::new("W021");
    pub const MODE_STACK_OVERFLOW: Code = Code::new("W022");
    pub const UNKNOWN_INITIAL_MODE: Code = Code::new("W023");
    pub const TOKENIZATION_HALTED: Code = Code::new("E024");
    pub const DIAGNOSTIC_LIMIT_REACHED: Code = Code::new("W025");
    pub const EMPTY_INPUT: Code = Code::new("I021");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const RULE_TABLE_BUILT: Code = Code::new("I015");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

const REGISTERED: &[ErrorMetadata] = &[
    ErrorMetadata {
        code: "ERR001",
        category: "System",
        severity: Severity::Critical,
        recoverable: false,
        requires_halt: true,
        description: "Critical internal error",
        recommended_action: "File a bug report with the input that triggered it",
    },
    ErrorMetadata {
        code: "ERR002",
        category: "System",
        severity: Severity::Critical,
        recoverable: false,
        requires_halt: true,
        description: "Logging or runtime initialization failed",
        recommended_action: "Check the runtime configuration and environment",
    },
    ErrorMetadata {
        code: "ERR003",
        category: "System",
        severity: Severity::High,
        recoverable: false,
        requires_halt: true,
        description: "Runtime configuration could not be loaded",
        recommended_action: "Fix the configuration file or ESQL_* environment variables",
    },
    ErrorMetadata {
        code: "E010",
        category: "Input",
        severity: Severity::High,
        recoverable: false,
        requires_halt: true,
        description: "Input exceeds the maximum size for this build profile",
        recommended_action: "Split the query or build with a larger max_input_size",
    },
    ErrorMetadata {
        code: "E011",
        category: "Input",
        severity: Severity::High,
        recoverable: false,
        requires_halt: true,
        description: "Input could not be read",
        recommended_action: "Check that the file exists and is valid UTF-8",
    },
    ErrorMetadata {
        code: "E015",
        category: "Rules",
        severity: Severity::Critical,
        recoverable: false,
        requires_halt: true,
        description: "Rule table failed validation",
        recommended_action: "Fix the mode declarations reported in the message",
    },
    ErrorMetadata {
        code: "E020",
        category: "Tokenizer",
        severity: Severity::Medium,
        recoverable: true,
        requires_halt: false,
        description: "No rule in the active mode matches the input",
        recommended_action: "Remove or quote the offending character",
    },
    ErrorMetadata {
        code: "W021",
        category: "Tokenizer",
        severity: Severity::Low,
        recoverable: true,
        requires_halt: false,
        description: "Input ended with modes still open",
        recommended_action: "Close the string, quoted identifier or comment",
    },
    ErrorMetadata {
        code: "W022",
        category: "Tokenizer",
        severity: Severity::Medium,
        recoverable: true,
        requires_halt: false,
        description: "Mode push ignored because the stack is at its depth limit",
        recommended_action: "Reduce nesting or raise max_mode_depth",
    },
    ErrorMetadata {
        code: "W023",
        category: "Tokenizer",
        severity: Severity::Low,
        recoverable: true,
        requires_halt: false,
        description: "Requested initial mode is not declared; using the default mode",
        recommended_action: "Use one of the mode names declared by the rule table",
    },
    ErrorMetadata {
        code: "E024",
        category: "Tokenizer",
        severity: Severity::High,
        recoverable: false,
        requires_halt: true,
        description: "Tokenization stopped at the first unrecognized character",
        recommended_action: "Fix the input or disable halt_on_error",
    },
    ErrorMetadata {
        code: "W025",
        category: "Tokenizer",
        severity: Severity::Low,
        recoverable: true,
        requires_halt: false,
        description: "Further diagnostics were dropped after reaching the limit",
        recommended_action: "Fix the reported problems and re-run",
    },
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTERED
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_and_warning_code_is_registered() {
        let codes = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            system::CONFIGURATION_ERROR,
            input::INPUT_TOO_LARGE,
            input::INPUT_READ_FAILED,
            rules::INVALID_RULE_TABLE,
            tokenizer::UNRECOGNIZED_CHARACTER,
            tokenizer::UNBALANCED_MODE_STACK,
            tokenizer::MODE_STACK_OVERFLOW,
            tokenizer::UNKNOWN_INITIAL_MODE,
            tokenizer::TOKENIZATION_HALTED,
            tokenizer::DIAGNOSTIC_LIMIT_REACHED,
        ];
        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_registry_has_unique_codes() {
        assert_eq!(get_error_registry().len(), REGISTERED.len());
    }

    #[test]
    fn test_classification_of_tokenizer_codes() {
        let unrecognized = tokenizer::UNRECOGNIZED_CHARACTER.as_str();
        assert!(is_recoverable(unrecognized));
        assert!(!requires_halt(unrecognized));
        assert_eq!(get_category(unrecognized), "Tokenizer");

        let halted = tokenizer::TOKENIZATION_HALTED.as_str();
        assert!(requires_halt(halted));
        assert_eq!(get_severity(halted), Severity::High);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
        assert!(is_recoverable("X999"));
    }
}

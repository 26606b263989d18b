//! Session diagnostics
//!
//! Problems found while tokenizing are collected on the session instead of
//! being returned as errors, so callers decide what counts as fatal.

use crate::logging::{codes, Code};
use crate::rules::ModeId;
use crate::utils::{SourceMap, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    #[error("Unrecognized character {character:?}")]
    UnrecognizedCharacter { character: char },

    #[error("Input ended with open modes: {}", .open_modes.join(", "))]
    UnbalancedModeStack { open_modes: Vec<String> },

    #[error("Empty input")]
    EmptyInput,

    #[error("Cannot enter {mode}: mode stack depth limit {limit} reached")]
    ModeStackOverflow { mode: String, limit: usize },

    #[error("Unknown initial mode {requested}, using the default mode")]
    UnknownInitialMode { requested: ModeId },
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::UnrecognizedCharacter { .. } => Severity::Error,
            DiagnosticKind::UnbalancedModeStack { .. }
            | DiagnosticKind::ModeStackOverflow { .. }
            | DiagnosticKind::UnknownInitialMode { .. } => Severity::Warning,
            DiagnosticKind::EmptyInput => Severity::Info,
        }
    }

    /// Reported once per session, at its start or at EOF
    pub fn is_session_level(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::UnbalancedModeStack { .. }
                | DiagnosticKind::EmptyInput
                | DiagnosticKind::UnknownInitialMode { .. }
        )
    }

    pub fn code(&self) -> Code {
        match self {
            DiagnosticKind::UnrecognizedCharacter { .. } => {
                codes::tokenizer::UNRECOGNIZED_CHARACTER
            }
            DiagnosticKind::UnbalancedModeStack { .. } => codes::tokenizer::UNBALANCED_MODE_STACK,
            DiagnosticKind::EmptyInput => codes::tokenizer::EMPTY_INPUT,
            DiagnosticKind::ModeStackOverflow { .. } => codes::tokenizer::MODE_STACK_OVERFLOW,
            DiagnosticKind::UnknownInitialMode { .. } => codes::tokenizer::UNKNOWN_INITIAL_MODE,
        }
    }
}

/// A problem found during a session, with where and in which mode it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub span: Span,
    pub mode: ModeId,
    /// Set when the diagnostic stopped the session
    pub fatal: bool,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, mode: ModeId) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            span,
            mode,
            fatal: false,
        }
    }

    pub fn into_fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    pub fn code(&self) -> Code {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Warning or worse
    pub fn is_problem(&self) -> bool {
        self.severity >= Severity::Warning
    }

    /// Source excerpt with a caret under the span
    pub fn render(&self, source_map: &SourceMap<'_>) -> String {
        let label = format!("{} {}", self.severity, self.code());
        source_map.format_error(&self.span, &label, &self.message())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} at {}",
            self.severity,
            self.code(),
            self.kind,
            self.span.start
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn span_at(offset: usize, column: u32) -> Span {
        Span::new(
            Position::new(offset, 1, column),
            Position::new(offset + 1, 1, column + 1),
        )
    }

    #[test]
    fn test_severity_by_kind() {
        let unrecognized = DiagnosticKind::UnrecognizedCharacter { character: '@' };
        assert_eq!(unrecognized.severity(), Severity::Error);
        assert_eq!(DiagnosticKind::EmptyInput.severity(), Severity::Info);
        assert_eq!(
            DiagnosticKind::UnbalancedModeStack {
                open_modes: vec!["STRING_MODE".into()]
            }
            .severity(),
            Severity::Warning
        );
        assert!(Severity::Error > Severity::Warning);
    }

    #[test]
    fn test_display_and_code() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnrecognizedCharacter { character: '@' },
            span_at(4, 5),
            ModeId(1),
        );

        assert_eq!(diagnostic.code(), codes::tokenizer::UNRECOGNIZED_CHARACTER);
        assert_eq!(
            diagnostic.to_string(),
            "error [E020] Unrecognized character '@' at 1:5"
        );
        assert!(!diagnostic.fatal);
        assert!(diagnostic.clone().into_fatal().fatal);
    }

    #[test]
    fn test_render_points_at_source() {
        let source = "row @";
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnrecognizedCharacter { character: '@' },
            span_at(4, 5),
            ModeId(1),
        );

        let rendered = diagnostic.render(&SourceMap::new(source));
        assert!(rendered.contains("row @"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnbalancedModeStack {
                open_modes: vec!["EXPRESSION_MODE".into(), "STRING_MODE".into()],
            },
            Span::empty_at(Position::new(7, 1, 8)),
            ModeId(9),
        );

        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["kind"], "unbalanced_mode_stack");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["open_modes"][1], "STRING_MODE");
        assert_eq!(json["mode"], 9);
    }
}

//! Mode-stack tokenization
//!
//! [`tokenize`] and [`Tokenizer`] start a session over a source string and a
//! shared [`RuleTable`]. The session is lazy: tokens are produced as the
//! returned [`TokenStream`] is iterated, and problems are collected as
//! [`Diagnostic`]s on the stream instead of being raised.

pub mod diagnostics;
pub(crate) mod engine;
pub mod metrics;
pub(crate) mod mode_stack;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::TokenizerPreferences;
use crate::logging::{codes, Code};
use crate::rules::{FeatureFlag, MatchPolicy, ModeId, RuleTable};
use crate::tokens::{Token, TokenStream};
use engine::Session;
use std::collections::BTreeSet;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use metrics::TokenizerMetrics;
pub use mode_stack::ModeStackError;

// ============================================================================
// OPTIONS
// ============================================================================

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Bottom of the mode stack; the table's default mode when `None`
    pub initial_mode: Option<ModeId>,
    pub halt_on_error: bool,
    pub match_policy: MatchPolicy,
    /// Features that unlock gated rules
    pub enabled_features: BTreeSet<FeatureFlag>,
    pub collect_detailed_metrics: bool,
    pub track_keyword_usage: bool,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            initial_mode: None,
            halt_on_error: false,
            match_policy: MatchPolicy::LongestMatch,
            enabled_features: BTreeSet::new(),
            collect_detailed_metrics: true,
            track_keyword_usage: false,
        }
    }
}

impl TokenizeOptions {
    pub fn from_preferences(preferences: &TokenizerPreferences) -> Self {
        Self {
            initial_mode: None,
            halt_on_error: preferences.halt_on_error,
            match_policy: preferences.match_policy,
            enabled_features: preferences.enabled_features.clone(),
            collect_detailed_metrics: preferences.collect_detailed_metrics,
            track_keyword_usage: preferences.track_keyword_usage,
        }
    }

    pub fn with_initial_mode(mut self, mode: ModeId) -> Self {
        self.initial_mode = Some(mode);
        self
    }

    pub fn with_halt_on_error(mut self, halt: bool) -> Self {
        self.halt_on_error = halt;
        self
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn with_feature(mut self, feature: FeatureFlag) -> Self {
        self.enabled_features.insert(feature);
        self
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failures of the checked and strict entry points. The lazy entry points never fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenizeError {
    #[error("Input too large: {size} bytes (max {limit})")]
    InputTooLarge { size: usize, limit: usize },

    #[error("Tokenization halted: {0}")]
    Halted(Diagnostic),

    #[error("{count} diagnostic(s) in strict mode, first: {first}")]
    Strict { count: usize, first: Diagnostic },

    #[error("Token {name} is {length} bytes long (max {limit})")]
    TokenTooLong {
        name: String,
        length: usize,
        limit: usize,
    },
}

impl TokenizeError {
    pub fn error_code(&self) -> Code {
        match self {
            TokenizeError::InputTooLarge { .. } => codes::input::INPUT_TOO_LARGE,
            TokenizeError::Halted(_) => codes::tokenizer::TOKENIZATION_HALTED,
            TokenizeError::Strict { first, .. } => first.code(),
            TokenizeError::TokenTooLong { .. } => codes::input::INPUT_TOO_LARGE,
        }
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Start a lazy tokenization session
pub fn tokenize<'t, 'src>(
    table: &'t RuleTable,
    source: &'src str,
    options: TokenizeOptions,
) -> TokenStream<'t, 'src> {
    TokenStream::new(Session::new(table, source, options))
}

/// Reusable entry point binding a table to a set of options
#[derive(Debug, Clone)]
pub struct Tokenizer<'t> {
    table: &'t RuleTable,
    options: TokenizeOptions,
}

impl<'t> Tokenizer<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            options: TokenizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TokenizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TokenizeOptions {
        &self.options
    }

    pub fn table(&self) -> &'t RuleTable {
        self.table
    }

    pub fn tokenize<'src>(&self, source: &'src str) -> TokenStream<'t, 'src> {
        tokenize(self.table, source, self.options.clone())
    }

    /// Like [`tokenize`](Self::tokenize) but rejects input over `MAX_INPUT_SIZE`
    pub fn tokenize_checked<'src>(
        &self,
        source: &'src str,
    ) -> Result<TokenStream<'t, 'src>, TokenizeError> {
        if source.len() > MAX_INPUT_SIZE {
            crate::log_error!(
                codes::input::INPUT_TOO_LARGE,
                "Input exceeds the configured size limit",
                "size" => source.len(),
                "limit" => MAX_INPUT_SIZE
            );
            return Err(TokenizeError::InputTooLarge {
                size: source.len(),
                limit: MAX_INPUT_SIZE,
            });
        }
        Ok(self.tokenize(source))
    }

    /// Collect every token, failing on a halt, any warning-or-worse
    /// diagnostic, or a token longer than `MAX_TOKEN_TEXT_LENGTH`
    pub fn tokenize_strict(&self, source: &str) -> Result<Vec<Token>, TokenizeError> {
        let result = self.tokenize_checked(source)?.finish();

        if let Some(fatal) = result.diagnostics.iter().find(|d| d.fatal) {
            return Err(TokenizeError::Halted(fatal.clone()));
        }

        let mut problems = result.diagnostics.iter().filter(|d| d.is_problem());
        if let Some(first) = problems.next() {
            return Err(TokenizeError::Strict {
                count: 1 + problems.count(),
                first: first.clone(),
            });
        }

        if let Some(long) = result
            .tokens
            .iter()
            .find(|token| token.text.len() > MAX_TOKEN_TEXT_LENGTH)
        {
            return Err(TokenizeError::TokenTooLong {
                name: long.name.clone(),
                length: long.text.len(),
                limit: MAX_TOKEN_TEXT_LENGTH,
            });
        }

        Ok(result.tokens)
    }
}

// ============================================================================
// MODULE VALIDATION
// ============================================================================

/// Check that every diagnostic code is registered and the compile-time limits are usable
pub fn validate_tokenization() -> Result<(), String> {
    let diagnostic_codes = [
        codes::tokenizer::UNRECOGNIZED_CHARACTER,
        codes::tokenizer::UNBALANCED_MODE_STACK,
        codes::tokenizer::MODE_STACK_OVERFLOW,
        codes::tokenizer::UNKNOWN_INITIAL_MODE,
        codes::tokenizer::TOKENIZATION_HALTED,
        codes::tokenizer::DIAGNOSTIC_LIMIT_REACHED,
        codes::input::INPUT_TOO_LARGE,
        codes::rules::INVALID_RULE_TABLE,
    ];

    for code in &diagnostic_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Tokenizer code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if MAX_MODE_DEPTH < 2 {
        return Err("MAX_MODE_DEPTH must allow at least one pushed mode".to_string());
    }
    if MAX_INPUT_SIZE == 0 || MAX_DIAGNOSTICS == 0 {
        return Err("MAX_INPUT_SIZE and MAX_DIAGNOSTICS cannot be zero".to_string());
    }

    crate::log_debug!("Tokenizer limits validated",
        "max_input_size" => MAX_INPUT_SIZE,
        "max_mode_depth" => MAX_MODE_DEPTH,
        "max_diagnostics" => MAX_DIAGNOSTICS
    );

    Ok(())
}

/// Compile-time limits in effect, for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerLimits {
    pub max_input_size: usize,
    pub max_token_text_length: usize,
    pub max_mode_depth: usize,
    pub max_diagnostics: usize,
}

pub fn get_tokenizer_limits() -> TokenizerLimits {
    TokenizerLimits {
        max_input_size: MAX_INPUT_SIZE,
        max_token_text_length: MAX_TOKEN_TEXT_LENGTH,
        max_mode_depth: MAX_MODE_DEPTH,
        max_diagnostics: MAX_DIAGNOSTICS,
    }
}

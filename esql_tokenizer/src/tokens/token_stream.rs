//! Lazy token stream over a tokenization session

use super::buffer::TokenBuffer;
use super::token::Token;
use crate::lexical::engine::{Session, SessionState};
use crate::lexical::{Diagnostic, TokenizerMetrics};
use crate::rules::ModeId;
use serde::Serialize;
use std::iter::FusedIterator;

/// Tokens in source order, produced on demand.
///
/// The stream is finite and cannot be restarted; tokenize the source again
/// for a second pass. Diagnostics accumulate as the stream advances and are
/// complete once it is exhausted.
#[derive(Debug)]
pub struct TokenStream<'t, 'src> {
    session: Session<'t, 'src>,
}

impl<'t, 'src> TokenStream<'t, 'src> {
    pub(crate) fn new(session: Session<'t, 'src>) -> Self {
        Self { session }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.session.diagnostics()
    }

    /// Stopped on unrecognized input with `halt_on_error` set
    pub fn is_halted(&self) -> bool {
        self.session.state() == SessionState::Halted
    }

    /// EOF was emitted or the session halted
    pub fn is_exhausted(&self) -> bool {
        self.session.state() != SessionState::Running
    }

    pub fn current_mode(&self) -> ModeId {
        self.session.current_mode()
    }

    pub fn mode_depth(&self) -> usize {
        self.session.mode_depth()
    }

    pub fn metrics(&self) -> &TokenizerMetrics {
        self.session.metrics()
    }

    pub fn source(&self) -> &'src str {
        self.session.source()
    }

    /// Drain the remaining tokens into a result with the final diagnostics and metrics
    pub fn finish(mut self) -> TokenizationResult {
        let tokens: Vec<Token> = self.session.by_ref().collect();
        let halted = self.is_halted();
        let (diagnostics, metrics) = self.session.into_parts();

        TokenizationResult {
            tokens,
            diagnostics,
            metrics,
            halted,
        }
    }
}

impl Iterator for TokenStream<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.session.next_token()
    }
}

impl FusedIterator for TokenStream<'_, '_> {}

/// Everything a finished session produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenizationResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
    pub metrics: TokenizerMetrics,
    pub halted: bool,
}

impl TokenizationResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Any warning-or-worse diagnostic
    pub fn has_problems(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_problem)
    }

    /// Default-channel tokens only
    pub fn significant_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| token.is_significant())
    }

    /// Concatenated token text; equals the source unless the session halted
    pub fn reconstruct(&self) -> String {
        self.tokens.iter().map(|token| token.text.as_str()).collect()
    }

    pub fn into_buffer(self) -> TokenBuffer {
        TokenBuffer::new(self.tokens)
    }
}

//! Tokenizer engine
//!
//! A session walks the character source one token at a time. At each
//! position the active mode's rules are tried under the session's match
//! policy; the winner becomes a token and its transition is applied to the
//! mode stack. Unmatched input is either skipped one character at a time or
//! stops the session, depending on `halt_on_error`.

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::metrics::TokenizerMetrics;
use super::mode_stack::{ModeStack, ModeStackError};
use super::TokenizeOptions;
use crate::config::compile_time::lexical::MAX_DIAGNOSTICS;
use crate::config::constants::LOG_PREVIEW_CHARS;
use crate::logging::codes;
use crate::rules::{ModeId, ModeTransition, RuleTable};
use crate::source::CharSource;
use crate::tokens::Token;
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success, log_warning};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    Running,
    /// EOF has been emitted
    Finished,
    /// Stopped on unmatched input; no EOF follows
    Halted,
}

/// State of one tokenization run. Owned by a `TokenStream`.
#[derive(Debug)]
pub(crate) struct Session<'t, 'src> {
    table: &'t RuleTable,
    source: CharSource<'src>,
    stack: ModeStack,
    options: TokenizeOptions,
    diagnostics: Vec<Diagnostic>,
    metrics: TokenizerMetrics,
    state: SessionState,
    started: Instant,
}

impl<'t, 'src> Session<'t, 'src> {
    pub fn new(table: &'t RuleTable, source: &'src str, options: TokenizeOptions) -> Self {
        let requested = options.initial_mode;
        let initial = requested
            .filter(|mode| table.mode(*mode).is_some())
            .unwrap_or_else(|| table.default_mode());

        let mut session = Self {
            table,
            source: CharSource::new(source),
            stack: ModeStack::new(initial),
            options,
            diagnostics: Vec::new(),
            metrics: TokenizerMetrics::new(),
            state: SessionState::Running,
            started: Instant::now(),
        };

        if let Some(requested) = requested.filter(|mode| *mode != initial) {
            log_warning!(
                codes::tokenizer::UNKNOWN_INITIAL_MODE,
                "Requested initial mode is not declared, using the default mode",
                "requested" => requested,
                "default" => table.mode_name(initial)
            );
            session.report(Diagnostic::new(
                DiagnosticKind::UnknownInitialMode { requested },
                Span::empty_at(Position::start()),
                initial,
            ));
        }

        log_debug!("Tokenization session started",
            "bytes" => source.len(),
            "initial_mode" => table.mode_name(initial),
            "policy" => session.options.match_policy,
            "halt_on_error" => session.options.halt_on_error
        );

        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_mode(&self) -> ModeId {
        self.stack.current()
    }

    pub fn mode_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn metrics(&self) -> &TokenizerMetrics {
        &self.metrics
    }

    pub fn source(&self) -> &'src str {
        self.source.source()
    }

    pub fn into_parts(self) -> (Vec<Diagnostic>, TokenizerMetrics) {
        (self.diagnostics, self.metrics)
    }

    /// Produce the next token, or `None` once the session is over
    pub fn next_token(&mut self) -> Option<Token> {
        if self.state != SessionState::Running {
            return None;
        }

        if self.source.is_at_end() {
            return Some(self.finish());
        }

        let table = self.table;
        let mode = self.stack.current();
        let start = self.source.position();
        let selected = table.select(
            mode,
            self.source.rest(),
            self.options.match_policy,
            &self.options.enabled_features,
        );

        let token = match selected {
            Some(found) => {
                let text = self.source.advance_bytes(found.len);
                let span = self.source.span_from(start);
                let rule = found.rule;
                let token = Token::new(rule.kind, rule.name, text, rule.channel, mode, span);
                self.apply_transition(rule.transition, span);
                token
            }
            None => self.recover(mode, start)?,
        };

        self.metrics.record_token(
            &token,
            self.options.collect_detailed_metrics,
            self.options.track_keyword_usage,
        );
        Some(token)
    }

    fn apply_transition(&mut self, transition: ModeTransition, span: Span) {
        match transition {
            ModeTransition::None => {}
            ModeTransition::Push(target) => match self.stack.push(target) {
                Ok(()) => self.metrics.record_push(self.stack.depth()),
                Err(ModeStackError::Overflow { mode, limit }) => {
                    let mode_name = self.table.mode_name(mode);
                    log_warning!(
                        codes::tokenizer::MODE_STACK_OVERFLOW,
                        "Mode stack depth limit reached, transition ignored",
                        span = span,
                        "mode" => mode_name,
                        "limit" => limit
                    );
                    self.report(Diagnostic::new(
                        DiagnosticKind::ModeStackOverflow {
                            mode: mode_name,
                            limit,
                        },
                        span,
                        self.stack.current(),
                    ));
                }
            },
            ModeTransition::Pop => {
                if self.stack.pop().is_some() {
                    self.metrics.record_pop();
                }
            }
        }
    }

    /// No rule matched at `start`
    fn recover(&mut self, mode: ModeId, start: Position) -> Option<Token> {
        let character = self.source.peek_or_eof(0);
        let error_span = Span::new(start, start.advance(character));
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnrecognizedCharacter { character },
            error_span,
            mode,
        );

        if self.options.halt_on_error {
            log_error!(
                codes::tokenizer::TOKENIZATION_HALTED,
                "Tokenization halted on unrecognized input",
                span = error_span,
                "character" => format!("{:?}", character),
                "mode" => self.table.mode_name(mode)
            );
            self.report(diagnostic.into_fatal());
            self.state = SessionState::Halted;
            self.stamp_duration();
            return None;
        }

        log_warning!(
            codes::tokenizer::UNRECOGNIZED_CHARACTER,
            "Skipping unrecognized character",
            span = error_span,
            "character" => format!("{:?}", character),
            "mode" => self.table.mode_name(mode)
        );
        self.report(diagnostic);

        let text = self.source.advance(1);
        Some(Token::unrecognized(text, mode, self.source.span_from(start)))
    }

    fn finish(&mut self) -> Token {
        self.state = SessionState::Finished;
        let mode = self.stack.current();
        let span = Span::empty_at(self.source.position());

        if self.source.source().is_empty() {
            self.report(Diagnostic::new(DiagnosticKind::EmptyInput, span, mode));
        }

        let open_modes: Vec<String> = if self.stack.is_balanced() {
            Vec::new()
        } else {
            self.stack.modes()[1..]
                .iter()
                .filter(|open| !self.table.mode(**open).is_some_and(|m| m.closes_at_eof))
                .map(|open| self.table.mode_name(*open))
                .collect()
        };
        if !open_modes.is_empty() {
            log_warning!(
                codes::tokenizer::UNBALANCED_MODE_STACK,
                "Input ended inside a pushed mode",
                span = span,
                "open_modes" => open_modes.join(", ")
            );
            self.report(Diagnostic::new(
                DiagnosticKind::UnbalancedModeStack { open_modes },
                span,
                mode,
            ));
        }

        let token = Token::eof(mode, span);
        self.metrics.record_token(
            &token,
            self.options.collect_detailed_metrics,
            self.options.track_keyword_usage,
        );
        self.stamp_duration();
        self.log_completion();
        token
    }

    fn stamp_duration(&mut self) {
        self.metrics.duration_micros =
            u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX);
    }

    fn log_completion(&self) {
        let preview: String = self.source.source().chars().take(LOG_PREVIEW_CHARS).collect();

        if crate::logging::config::log_performance_events() {
            log_success!(
                codes::success::TOKENIZATION_COMPLETE,
                "Tokenization complete",
                "tokens" => self.metrics.total_tokens,
                "diagnostics" => self.diagnostics.len(),
                "duration_us" => self.metrics.duration_micros,
                "tokens_per_second" => format!("{:.0}", self.metrics.tokens_per_second()),
                "preview" => preview
            );
        } else {
            log_success!(
                codes::success::TOKENIZATION_COMPLETE,
                "Tokenization complete",
                "tokens" => self.metrics.total_tokens,
                "diagnostics" => self.diagnostics.len(),
                "preview" => preview
            );
        }
    }

    /// Record a diagnostic. Past the session limit only fatal and
    /// session-level diagnostics are kept.
    fn report(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.len() < MAX_DIAGNOSTICS
            || diagnostic.fatal
            || diagnostic.kind.is_session_level()
        {
            self.diagnostics.push(diagnostic);
            return;
        }

        if self.metrics.suppressed_diagnostics == 0 {
            log_warning!(
                codes::tokenizer::DIAGNOSTIC_LIMIT_REACHED,
                "Diagnostic limit reached, further diagnostics are counted only",
                "limit" => MAX_DIAGNOSTICS
            );
        }
        self.metrics.suppressed_diagnostics += 1;
    }
}

impl Iterator for Session<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

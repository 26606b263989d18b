//! Per-session tokenizer metrics

use crate::config::compile_time::lexical::METRICS_BUFFER_SIZE;
use crate::tokens::{Token, TokenKind};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenizerMetrics {
    /// Every token emitted, EOF included
    pub total_tokens: usize,
    /// Only filled when detailed metrics are enabled
    pub tokens_by_kind: BTreeMap<TokenKind, usize>,
    pub hidden_tokens: usize,
    pub unrecognized_count: usize,
    pub bytes_processed: usize,
    pub max_mode_depth: usize,
    pub mode_pushes: usize,
    pub mode_pops: usize,
    /// Diagnostics dropped after the per-session limit was reached
    pub suppressed_diagnostics: usize,
    /// Keyword occurrences by rule name, bounded to `METRICS_BUFFER_SIZE` names
    pub keyword_usage: BTreeMap<String, usize>,
    pub duration_micros: u64,
}

impl TokenizerMetrics {
    pub(crate) fn new() -> Self {
        Self {
            max_mode_depth: 1,
            ..Self::default()
        }
    }

    pub(crate) fn record_token(&mut self, token: &Token, detailed: bool, track_keywords: bool) {
        self.total_tokens += 1;
        self.bytes_processed += token.text.len();

        if token.is_hidden() {
            self.hidden_tokens += 1;
        }
        if token.kind == TokenKind::Unrecognized {
            self.unrecognized_count += 1;
        }
        if detailed {
            *self.tokens_by_kind.entry(token.kind).or_insert(0) += 1;
        }
        if track_keywords && token.kind == TokenKind::Keyword {
            self.record_keyword(&token.name);
        }
    }

    fn record_keyword(&mut self, name: &str) {
        if let Some(count) = self.keyword_usage.get_mut(name) {
            *count += 1;
        } else if self.keyword_usage.len() < METRICS_BUFFER_SIZE {
            self.keyword_usage.insert(name.to_string(), 1);
        }
    }

    pub(crate) fn record_push(&mut self, depth: usize) {
        self.mode_pushes += 1;
        self.max_mode_depth = self.max_mode_depth.max(depth);
    }

    pub(crate) fn record_pop(&mut self) {
        self.mode_pops += 1;
    }

    pub fn count_of(&self, kind: TokenKind) -> usize {
        self.tokens_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn tokens_per_second(&self) -> f64 {
        if self.duration_micros == 0 {
            return 0.0;
        }
        self.total_tokens as f64 * 1_000_000.0 / self.duration_micros as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "{} tokens ({} hidden, {} unrecognized), {} bytes, max mode depth {}, {} pushes / {} pops",
            self.total_tokens,
            self.hidden_tokens,
            self.unrecognized_count,
            self.bytes_processed,
            self.max_mode_depth,
            self.mode_pushes,
            self.mode_pops
        )
    }
}

//! Collected, navigable token view for parsers
//!
//! Keeps every token with its original span but navigates only the default
//! channel, so a parser can skip comments and whitespace without losing the
//! ability to report exact source locations.

use super::token::{Token, TokenKind};
use crate::utils::{SourceMap, Span};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenBufferError {
    #[error("Expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Expected {expected}, but reached end of input")]
    UnexpectedEnd { expected: String },
}

#[derive(Debug, Clone)]
pub struct TokenBuffer {
    /// Every token, hidden channel included
    all_tokens: Vec<Token>,
    /// Indices into `all_tokens` of default-channel tokens
    significant_indices: Vec<usize>,
    /// Cursor into `significant_indices`
    position: usize,
}

impl TokenBuffer {
    pub fn new(tokens: Vec<Token>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_significant())
            .map(|(index, _)| index)
            .collect();

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
        }
    }

    /// Navigate every token, hidden ones included
    pub fn with_all_tokens(tokens: Vec<Token>) -> Self {
        let significant_indices = (0..tokens.len()).collect();
        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
        }
    }

    // === Navigation ===

    pub fn current(&self) -> Option<&Token> {
        self.peek_ahead(0)
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|token| token.span)
    }

    pub fn peek(&self) -> Option<&Token> {
        self.peek_ahead(1)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&index| self.all_tokens.get(index))
    }

    /// Move to the next significant token and return it
    pub fn advance(&mut self) -> Option<&Token> {
        if self.position < self.significant_indices.len() {
            self.position += 1;
        }
        self.current()
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.significant_indices.len()
    }

    /// Number of significant tokens
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_count(&self) -> usize {
        self.significant_indices.len().saturating_sub(self.position)
    }

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved: usize) {
        self.position = saved.min(self.significant_indices.len());
    }

    /// Index into [`all_tokens`](Self::all_tokens) of the current token
    pub fn current_original_index(&self) -> Option<usize> {
        self.significant_indices.get(self.position).copied()
    }

    // === Matching ===

    pub fn check_kind(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|token| token.kind == kind)
    }

    pub fn check_name(&self, name: &str) -> bool {
        self.current().is_some_and(|token| token.is_named(name))
    }

    pub fn consume_if<F>(&mut self, predicate: F) -> Option<Token>
    where
        F: FnOnce(&Token) -> bool,
    {
        let token = self.current().filter(|token| predicate(token)).cloned()?;
        self.advance();
        Some(token)
    }

    pub fn expect_kind(&mut self, kind: TokenKind) -> Result<Token, TokenBufferError> {
        self.expect_with(kind.as_str(), |token| token.kind == kind)
    }

    pub fn expect_name(&mut self, name: &str) -> Result<Token, TokenBufferError> {
        self.expect_with(name, |token| token.is_named(name))
    }

    fn expect_with<F>(&mut self, expected: &str, predicate: F) -> Result<Token, TokenBufferError>
    where
        F: FnOnce(&Token) -> bool,
    {
        let current = self
            .current()
            .ok_or_else(|| TokenBufferError::UnexpectedEnd {
                expected: expected.to_string(),
            })?;

        if predicate(current) {
            let token = current.clone();
            self.advance();
            Ok(token)
        } else {
            Err(TokenBufferError::UnexpectedToken {
                expected: expected.to_string(),
                found: current.name.clone(),
                span: current.span,
            })
        }
    }

    // === Spans ===

    pub fn span_at_position(&self, position: usize) -> Option<Span> {
        self.significant_indices
            .get(position)
            .and_then(|&index| self.all_tokens.get(index))
            .map(|token| token.span)
    }

    /// Span from the token at `start_position` through the current one
    pub fn span_from(&self, start_position: usize) -> Option<Span> {
        match (self.span_at_position(start_position), self.current_span()) {
            (Some(start), Some(current)) => Some(start.merge(current)),
            (start, current) => current.or(start),
        }
    }

    pub fn span_range(&self, start_pos: usize, end_pos: usize) -> Option<Span> {
        match (
            self.span_at_position(start_pos),
            self.span_at_position(end_pos),
        ) {
            (Some(start), Some(end)) => Some(start.merge(end)),
            (start, end) => start.or(end),
        }
    }

    /// All tokens, hidden ones included, between two significant positions
    pub fn tokens_between(&self, start_pos: usize, end_pos: usize) -> &[Token] {
        match (
            self.significant_indices.get(start_pos),
            self.significant_indices.get(end_pos),
        ) {
            (Some(&start), Some(&end)) if start <= end => &self.all_tokens[start..=end],
            _ => &[],
        }
    }

    // === Views ===

    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &Token> {
        self.significant_indices
            .iter()
            .map(|&index| &self.all_tokens[index])
    }

    pub fn remaining_tokens(&self) -> impl Iterator<Item = &Token> {
        self.significant_indices[self.position.min(self.significant_indices.len())..]
            .iter()
            .map(|&index| &self.all_tokens[index])
    }

    /// Significant tokens within `radius` of the cursor
    pub fn context_snippet(&self, radius: usize) -> Vec<&Token> {
        let start = self.position.saturating_sub(radius);
        let end = (self.position + radius + 1).min(self.significant_indices.len());
        (start..end)
            .filter_map(|position| self.peek_ahead_absolute(position))
            .collect()
    }

    fn peek_ahead_absolute(&self, position: usize) -> Option<&Token> {
        self.significant_indices
            .get(position)
            .and_then(|&index| self.all_tokens.get(index))
    }

    pub fn has_eof(&self) -> bool {
        self.all_tokens.last().is_some_and(Token::is_eof)
    }

    /// Concatenated text of every token
    pub fn reconstruct(&self) -> String {
        self.all_tokens
            .iter()
            .map(|token| token.text.as_str())
            .collect()
    }

    /// Message with a source excerpt under `span`
    pub fn format_error(&self, source_map: &SourceMap<'_>, span: Span, message: &str) -> String {
        source_map.format_error(&span, "error", message)
    }

    pub fn diagnostic(&self) -> String {
        let current = self
            .current()
            .map(|token| token.to_string())
            .unwrap_or_else(|| "<end>".to_string());

        format!(
            "TokenBuffer(pos: {}/{}, current: {})",
            self.position,
            self.significant_indices.len(),
            current
        )
    }
}

/// Structural checks over collected tokens
pub mod validation {
    use super::*;

    /// Each token starts where the previous one ended
    pub fn validate_span_order(tokens: &[Token]) -> Result<(), String> {
        for window in tokens.windows(2) {
            let (current, next) = (&window[0], &window[1]);
            if current.end_offset() != next.start_offset() {
                return Err(format!(
                    "Span discontinuity: {} ends at {} but {} starts at {}",
                    current.name,
                    current.end_offset(),
                    next.name,
                    next.start_offset()
                ));
            }
        }
        Ok(())
    }

    /// Token spans tile `source` exactly and each token's text matches its span
    pub fn validate_span_coverage(tokens: &[Token], source: &str) -> Result<(), String> {
        validate_span_order(tokens)?;

        let first = tokens.first().map_or(0, Token::start_offset);
        let last = tokens.last().map_or(0, Token::end_offset);
        if first != 0 || last != source.len() {
            return Err(format!(
                "Tokens cover {}..{} but the source is {} bytes",
                first,
                last,
                source.len()
            ));
        }

        for token in tokens {
            let slice = source
                .get(token.start_offset()..token.end_offset())
                .ok_or_else(|| format!("Span of {} is not a valid slice", token.name))?;
            if slice != token.text {
                return Err(format!(
                    "Text of {} does not match its span {}",
                    token.name, token.span
                ));
            }
        }
        Ok(())
    }

    /// Significant positions resolve to the same spans as the underlying tokens
    pub fn validate_buffer(buffer: &TokenBuffer) -> Result<(), String> {
        validate_span_order(&buffer.all_tokens)?;
        for (position, &index) in buffer.significant_indices.iter().enumerate() {
            let token = buffer
                .all_tokens
                .get(index)
                .ok_or_else(|| format!("Invalid original index {}", index))?;
            if buffer.span_at_position(position) != Some(token.span) {
                return Err(format!("Span mismatch at significant position {}", position));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;
    use crate::lexical::{tokenize, TokenizeOptions};
    use crate::rules::RuleTable;
    use assert_matches::assert_matches;

    fn buffer_for(source: &str) -> TokenBuffer {
        let table = RuleTable::esql().unwrap();
        tokenize(&table, source, TokenizeOptions::default())
            .finish()
            .into_buffer()
    }

    #[test]
    fn test_navigation_skips_hidden_tokens() {
        let mut buffer = buffer_for("from a /* c */ , b");

        assert!(buffer.check_name("FROM"));
        assert_eq!(buffer.peek().map(|t| t.text.as_str()), Some("a"));
        buffer.advance();
        buffer.advance();
        assert!(buffer.check_name("COMMA"));
        assert_eq!(buffer.peek_ahead(2).map(Token::is_eof), Some(true));
        assert_eq!(buffer.remaining_count(), 3);
    }

    #[test]
    fn test_expect_and_consume() {
        let mut buffer = buffer_for("keep host");

        assert_eq!(buffer.expect_kind(TokenKind::Keyword).unwrap().name, "KEEP");
        assert_matches!(
            buffer.expect_name("COMMA"),
            Err(TokenBufferError::UnexpectedToken { ref found, .. }) if found == "ID_PATTERN"
        );
        assert!(buffer.consume_if(|t| t.kind == TokenKind::Identifier).is_some());
        assert!(buffer.consume_if(|t| t.kind == TokenKind::Identifier).is_none());
        buffer.advance();
        assert_matches!(
            buffer.expect_kind(TokenKind::Eof),
            Err(TokenBufferError::UnexpectedEnd { .. })
        );
    }

    #[test]
    fn test_backtracking() {
        let mut buffer = buffer_for("row a, b");
        let saved = buffer.save_position();
        buffer.advance();
        buffer.advance();
        assert!(buffer.check_name("COMMA"));

        buffer.restore_position(saved);
        assert!(buffer.check_name("ROW"));
        buffer.restore_position(999);
        assert!(buffer.is_at_end());
    }

    #[test]
    fn test_span_helpers() {
        let buffer = buffer_for("row a, b");

        let span = buffer.span_range(0, 3).unwrap();
        assert_eq!(span.start.offset, 0);
        assert_eq!(span.end.offset, 8);

        let between = buffer.tokens_between(1, 3);
        let names: Vec<&str> = between.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["UNQUOTED_IDENTIFIER", "COMMA", "WS", "UNQUOTED_IDENTIFIER"]);
        assert!(buffer.tokens_between(3, 1).is_empty());
        assert_eq!(buffer.context_snippet(1).len(), 2);
    }

    #[test]
    fn test_validation_accepts_engine_output() {
        let source = "from logs-* | where a == \"x\\\"y\" // c\n| limit 3";
        let buffer = buffer_for(source);

        assert!(validate_span_coverage(buffer.all_tokens(), source).is_ok());
        assert!(validate_buffer(&buffer).is_ok());
        assert_eq!(buffer.reconstruct(), source);
        assert!(buffer.has_eof());
    }

    #[test]
    fn test_validation_detects_gaps() {
        let mut tokens = buffer_for("row a").all_tokens().to_vec();
        tokens.remove(1);

        assert!(validate_span_order(&tokens).is_err());
        assert!(validate_span_coverage(&tokens, "row a").is_err());
    }

    #[test]
    fn test_all_tokens_mode_includes_hidden() {
        let tokens = buffer_for("row a").all_tokens().to_vec();
        let buffer = TokenBuffer::with_all_tokens(tokens);

        assert_eq!(buffer.len(), 4);
        assert!(buffer.diagnostic().contains("pos: 0/4"));
    }
}

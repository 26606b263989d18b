//! Character source
//!
//! A cursor over the full, resident input. Lookahead is unbounded within the
//! buffer and reading past the end yields `None` (or [`EOF_CHAR`]) rather than
//! panicking.

use crate::config::constants::EOF_CHAR;
use crate::utils::{Position, Span};

#[derive(Debug, Clone)]
pub struct CharSource<'src> {
    source: &'src str,
    position: Position,
}

impl<'src> CharSource<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: Position::start(),
        }
    }

    /// Character `offset` characters ahead of the cursor, `None` past the end
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    /// Like [`peek`](Self::peek) but returns the EOF sentinel past the end
    pub fn peek_or_eof(&self, offset: usize) -> char {
        self.peek(offset).unwrap_or(EOF_CHAR)
    }

    /// Consume up to `n` characters, stopping at end of input
    pub fn advance(&mut self, n: usize) -> &'src str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .nth(n)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        self.advance_bytes(len)
    }

    /// Consume `len` bytes of the remaining input.
    ///
    /// `len` is clamped to the end of input and must land on a character
    /// boundary, which holds for every length produced by a pattern match.
    pub fn advance_bytes(&mut self, len: usize) -> &'src str {
        let start = self.position.offset;
        let end = (start + len).min(self.source.len());
        let consumed = &self.source[start..end];
        self.position = self.position.advance_str(consumed);
        consumed
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Byte offset of the cursor
    pub fn offset(&self) -> usize {
        self.position.offset
    }

    /// Unconsumed input
    pub fn rest(&self) -> &'src str {
        &self.source[self.position.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.position.offset >= self.source.len()
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Source text between two byte offsets
    pub fn slice(&self, start: usize, end: usize) -> &'src str {
        &self.source[start..end]
    }

    /// Span from `start` to the cursor
    pub fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let source = CharSource::new("ab");
        assert_eq!(source.peek(0), Some('a'));
        assert_eq!(source.peek(1), Some('b'));
        assert_eq!(source.peek(0), Some('a'));
        assert_eq!(source.offset(), 0);
    }

    #[test]
    fn test_peek_past_end_returns_sentinel() {
        let source = CharSource::new("a");
        assert_eq!(source.peek(5), None);
        assert_eq!(source.peek_or_eof(1), EOF_CHAR);
    }

    #[test]
    fn test_advance_tracks_position() {
        let mut source = CharSource::new("ab\ncd");
        assert_eq!(source.advance(3), "ab\n");
        assert_eq!(source.position(), Position::new(3, 2, 1));
        assert_eq!(source.rest(), "cd");
    }

    #[test]
    fn test_advance_clamps_at_end() {
        let mut source = CharSource::new("xy");
        assert_eq!(source.advance(10), "xy");
        assert!(source.is_at_end());
        assert_eq!(source.advance(1), "");
        assert_eq!(source.peek(0), None);
    }

    #[test]
    fn test_advance_counts_characters_not_bytes() {
        let mut source = CharSource::new("éz");
        assert_eq!(source.advance(1), "é");
        assert_eq!(source.offset(), 2);
        assert_eq!(source.peek(0), Some('z'));
    }

    #[test]
    fn test_span_from_covers_consumed_text() {
        let mut source = CharSource::new("from logs");
        let start = source.position();
        source.advance_bytes(4);
        let span = source.span_from(start);
        assert_eq!(span.slice(source.source()), "from");
        assert_eq!(source.slice(5, 9), "logs");
    }
}

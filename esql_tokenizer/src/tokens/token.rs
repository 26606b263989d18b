//! Token types produced by the tokenizer
use crate::config::constants::{EOF_TOKEN_NAME, UNRECOGNIZED_TOKEN_NAME};
use crate::rules::ModeId;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Literal,
    Operator,
    Comment,
    Whitespace,
    /// Input no rule in the active mode could match
    Unrecognized,
    Eof,
}

impl TokenKind {
    pub const ALL: [TokenKind; 8] = [
        TokenKind::Keyword,
        TokenKind::Identifier,
        TokenKind::Literal,
        TokenKind::Operator,
        TokenKind::Comment,
        TokenKind::Whitespace,
        TokenKind::Unrecognized,
        TokenKind::Eof,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Literal => "literal",
            TokenKind::Operator => "operator",
            TokenKind::Comment => "comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Unrecognized => "unrecognized",
            TokenKind::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output channel; parsers read only the default channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Default,
    Hidden,
}

impl Channel {
    /// Comments and whitespace are hidden, everything else is visible
    pub const fn for_kind(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Comment | TokenKind::Whitespace => Channel::Hidden,
            _ => Channel::Default,
        }
    }
}

/// A classified slice of the source. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Symbolic name of the rule that produced the token
    pub name: String,
    pub text: String,
    pub channel: Channel,
    /// Mode that was active when the token was matched
    pub mode: ModeId,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        name: impl Into<String>,
        text: impl Into<String>,
        channel: Channel,
        mode: ModeId,
        span: Span,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            text: text.into(),
            channel,
            mode,
            span,
        }
    }

    pub fn eof(mode: ModeId, span: Span) -> Self {
        Self::new(
            TokenKind::Eof,
            EOF_TOKEN_NAME,
            "",
            Channel::Default,
            mode,
            span,
        )
    }

    pub fn unrecognized(text: impl Into<String>, mode: ModeId, span: Span) -> Self {
        Self::new(
            TokenKind::Unrecognized,
            UNRECOGNIZED_TOKEN_NAME,
            text,
            Channel::Default,
            mode,
            span,
        )
    }

    /// Byte offset of the first character
    pub fn start_offset(&self) -> usize {
        self.span.start.offset
    }

    /// Byte offset one past the last character
    pub fn end_offset(&self) -> usize {
        self.span.end.offset
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }

    /// Visible to a parser
    pub fn is_significant(&self) -> bool {
        self.channel == Channel::Default
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            write!(f, "{}@{}", self.name, self.span.start)
        } else {
            write!(f, "{}({:?})@{}", self.name, self.text, self.span)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_channel_for_kind() {
        assert_eq!(Channel::for_kind(TokenKind::Comment), Channel::Hidden);
        assert_eq!(Channel::for_kind(TokenKind::Whitespace), Channel::Hidden);
        assert_eq!(Channel::for_kind(TokenKind::Unrecognized), Channel::Default);
        assert_eq!(Channel::for_kind(TokenKind::Eof), Channel::Default);
    }

    #[test]
    fn test_token_offsets_and_display() {
        let start = Position::start();
        let span = Span::new(start, start.advance_str("from"));
        let token = Token::new(
            TokenKind::Keyword,
            "FROM",
            "from",
            Channel::Default,
            ModeId(0),
            span,
        );

        assert_eq!(token.start_offset(), 0);
        assert_eq!(token.end_offset(), 4);
        assert!(token.is_significant());
        assert_eq!(token.to_string(), "FROM(\"from\")@1:1-5");
    }

    #[test]
    fn test_eof_token_is_empty_and_visible() {
        let token = Token::eof(ModeId(2), Span::empty_at(Position::new(7, 1, 8)));
        assert!(token.is_eof());
        assert!(token.text.is_empty());
        assert!(token.is_significant());
        assert_eq!(token.mode, ModeId(2));
        assert_eq!(token.to_string(), "EOF@1:8");
    }

    #[test]
    fn test_token_serializes_with_snake_case_kind() {
        let token = Token::unrecognized("@", ModeId(0), Span::empty_at(Position::start()));
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["kind"], "unrecognized");
        assert_eq!(json["channel"], "default");
        assert_eq!(json["name"], "UNRECOGNIZED");
    }
}

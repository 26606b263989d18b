//! Token types and the views over them
//!
//! - [`Token`]: one classified slice of the source with its span, mode and channel
//! - [`TokenStream`]: lazy iterator over a tokenization session
//! - [`TokenizationResult`]: everything a finished session produced
//! - [`TokenBuffer`]: collected tokens with default-channel navigation for parsers
//!
//! Every token keeps its exact span, so concatenating token text always
//! reproduces the source (unless the session halted).

pub mod buffer;
pub mod token;
pub mod token_stream;

pub use buffer::{validation, TokenBuffer, TokenBufferError};
pub use token::{Channel, Token, TokenKind};
pub use token_stream::{TokenStream, TokenizationResult};

pub use crate::utils::{Position, SourceMap, Span};

//! Shared location primitives used by the character source, tokens and diagnostics

pub mod span;

pub use span::{Position, SourceMap, Span};

//! Fixed lexical constants that are not tunable per build profile

/// Sentinel returned by the character source past the end of input
pub const EOF_CHAR: char = '\0';

/// Symbolic name of the end-of-input token
pub const EOF_TOKEN_NAME: &str = "EOF";

/// Symbolic name of tokens emitted for unmatched input
pub const UNRECOGNIZED_TOKEN_NAME: &str = "UNRECOGNIZED";

/// Name of the mode a session starts in unless told otherwise
pub const DEFAULT_MODE_NAME: &str = "DEFAULT_MODE";

/// Longest token text shown verbatim in log messages
pub const LOG_PREVIEW_CHARS: usize = 32;

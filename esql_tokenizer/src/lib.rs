//! Mode-stack tokenizer for ES|QL query text
//!
//! Lexical modes are declared as static rule lists; rules may push a new mode
//! or pop back to the previous one. A [`RuleTable`] is validated once and then
//! shared read-only, and each call to [`tokenize`] starts an independent,
//! lazy session over one source string.
//!
//! ```no_run
//! use esql_tokenizer::{tokenize, RuleTable, TokenizeOptions};
//!
//! let table = RuleTable::esql()?;
//! for token in tokenize(&table, "from logs | limit 10", TokenizeOptions::default()) {
//!     println!("{}", token);
//! }
//! # Ok::<(), esql_tokenizer::RuleTableError>(())
//! ```

pub mod config;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod rules;
pub mod source;
pub mod tokens;
pub mod utils;

pub use config::{RuntimeConfig, TokenizerPreferences};
pub use lexical::{
    tokenize, Diagnostic, DiagnosticKind, Severity, TokenizeError, TokenizeOptions, Tokenizer,
    TokenizerMetrics,
};
pub use rules::{FeatureFlag, MatchPolicy, ModeId, RuleTable, RuleTableError};
pub use tokens::{Channel, Token, TokenBuffer, TokenKind, TokenStream, TokenizationResult};
pub use utils::{Position, SourceMap, Span};

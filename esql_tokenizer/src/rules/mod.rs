//! Rule tables
//!
//! Lexical modes are declared as static data: each [`Mode`] owns an ordered
//! list of [`Rule`]s, each rule pairs a [`Pattern`] with a token kind and an
//! optional mode-stack transition. A [`RuleTable`] validates the declarations
//! once and is then shared read-only by every tokenization session.

pub mod esql;
pub mod feature;
pub mod pattern;
pub mod rule;
pub mod table;

pub use feature::{FeatureFlag, UnknownFeatureFlag};
pub use pattern::{CharClass, Pattern};
pub use rule::{Mode, ModeId, ModeTransition, Rule};
pub use table::{MatchPolicy, RuleMatch, RuleTable, RuleTableBuilder, RuleTableError};

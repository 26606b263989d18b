//! Built-in ES|QL rule table
//!
//! A query is a source command followed by `|`-separated processing commands.
//! Each command keyword pushes the mode that lexes its arguments and the next
//! pipe pops back to `DEFAULT_MODE`. Strings, backquoted identifiers and block
//! comments get their own modes so an unterminated one is visible as an
//! unbalanced stack at end of input.

use super::feature::FeatureFlag;
use super::pattern::{CharClass, Pattern};
use super::rule::{Mode, ModeId, Rule};
use super::table::{RuleTable, RuleTableError};
use crate::tokens::TokenKind;

pub const DEFAULT_MODE: ModeId = ModeId(0);
pub const EXPRESSION_MODE: ModeId = ModeId(1);
pub const FROM_MODE: ModeId = ModeId(2);
pub const PROJECT_MODE: ModeId = ModeId(3);
pub const RENAME_MODE: ModeId = ModeId(4);
pub const ENRICH_MODE: ModeId = ModeId(5);
pub const MVEXPAND_MODE: ModeId = ModeId(6);
pub const SHOW_MODE: ModeId = ModeId(7);
pub const QUOTED_IDENTIFIER_MODE: ModeId = ModeId(8);
pub const STRING_MODE: ModeId = ModeId(9);
pub const COMMENT_MODE: ModeId = ModeId(10);

// ============================================================================
// Character classes and patterns
// ============================================================================

const INTEGER: Pattern = Pattern::repeat(CharClass::Digit);

const EXPONENT: Pattern = Pattern::Seq(&[
    Pattern::Class(CharClass::OneOf("eE")),
    Pattern::Opt(&Pattern::Class(CharClass::OneOf("+-"))),
    INTEGER,
]);

const DECIMAL: Pattern = Pattern::Alt(&[
    Pattern::Seq(&[
        INTEGER,
        Pattern::Literal("."),
        Pattern::Many(CharClass::Digit),
        Pattern::Opt(&EXPONENT),
    ]),
    Pattern::Seq(&[Pattern::Literal("."), INTEGER, Pattern::Opt(&EXPONENT)]),
    Pattern::Seq(&[INTEGER, EXPONENT]),
]);

/// `host`, `_id`, `@timestamp`
const UNQUOTED_IDENTIFIER: Pattern = Pattern::Alt(&[
    Pattern::Run {
        first: CharClass::Alpha,
        rest: CharClass::Word,
    },
    Pattern::Seq(&[
        Pattern::Class(CharClass::OneOf("_@")),
        Pattern::repeat(CharClass::Word),
    ]),
]);

const ID_PATTERN_CHARS: CharClass = CharClass::Union(&[CharClass::Word, CharClass::OneOf("*@")]);

/// Field names that may carry `*` wildcards, as in `KEEP host*`
const ID_PATTERN: Pattern = Pattern::Seq(&[
    Pattern::Class(CharClass::Union(&[CharClass::Alpha, CharClass::OneOf("*_@")])),
    Pattern::Many(ID_PATTERN_CHARS),
]);

/// Index and policy names such as `logs-*` or `remote:metrics.2024`
const INDEX_PATTERN: Pattern = Pattern::repeat(CharClass::Union(&[
    CharClass::Word,
    CharClass::OneOf("*.-:"),
]));

// ============================================================================
// Rules shared by several modes
// ============================================================================

const WS: Rule = Rule::new(
    "WS",
    TokenKind::Whitespace,
    Pattern::repeat(CharClass::Whitespace),
);

const LINE_COMMENT: Rule = Rule::new(
    "LINE_COMMENT",
    TokenKind::Comment,
    Pattern::Seq(&[Pattern::Literal("//"), Pattern::Many(CharClass::AnyExcept("\r\n"))]),
);

const MULTILINE_COMMENT_START: Rule = Rule::new(
    "MULTILINE_COMMENT_START",
    TokenKind::Comment,
    Pattern::Literal("/*"),
)
.push(COMMENT_MODE);

const PIPE: Rule = Rule::new("PIPE", TokenKind::Operator, Pattern::Literal("|")).pop();

const COMMA: Rule = Rule::new("COMMA", TokenKind::Operator, Pattern::Literal(","));
const DOT: Rule = Rule::new("DOT", TokenKind::Operator, Pattern::Literal("."));
const ASSIGN: Rule = Rule::new("ASSIGN", TokenKind::Operator, Pattern::Literal("="));
const OPENING_BRACKET: Rule =
    Rule::new("OPENING_BRACKET", TokenKind::Operator, Pattern::Literal("["));
const CLOSING_BRACKET: Rule =
    Rule::new("CLOSING_BRACKET", TokenKind::Operator, Pattern::Literal("]"));

const QUOTED_IDENTIFIER_START: Rule = Rule::new(
    "QUOTED_IDENTIFIER_START",
    TokenKind::Identifier,
    Pattern::Literal("`"),
)
.push(QUOTED_IDENTIFIER_MODE);

const STRING_START: Rule =
    Rule::new("STRING_START", TokenKind::Literal, Pattern::Literal("\"")).push(STRING_MODE);

const ID_PATTERN_RULE: Rule = Rule::new("ID_PATTERN", TokenKind::Identifier, ID_PATTERN);

const fn command(name: &'static str, keyword: &'static str, mode: ModeId) -> Rule {
    Rule::new(name, TokenKind::Keyword, Pattern::Keyword(keyword)).push(mode)
}

const fn keyword(name: &'static str, text: &'static str) -> Rule {
    Rule::new(name, TokenKind::Keyword, Pattern::Keyword(text))
}

const fn operator(name: &'static str, text: &'static str) -> Rule {
    Rule::new(name, TokenKind::Operator, Pattern::Literal(text))
}

// ============================================================================
// Modes
// ============================================================================

static DEFAULT_RULES: &[Rule] = &[
    WS,
    LINE_COMMENT,
    MULTILINE_COMMENT_START,
    command("DISSECT", "dissect", EXPRESSION_MODE),
    command("DROP", "drop", PROJECT_MODE),
    command("ENRICH", "enrich", ENRICH_MODE),
    command("EVAL", "eval", EXPRESSION_MODE),
    command("FROM", "from", FROM_MODE),
    command("GROK", "grok", EXPRESSION_MODE),
    command("KEEP", "keep", PROJECT_MODE),
    command("LIMIT", "limit", EXPRESSION_MODE),
    command("MV_EXPAND", "mv_expand", MVEXPAND_MODE),
    command("RENAME", "rename", RENAME_MODE),
    command("ROW", "row", EXPRESSION_MODE),
    command("SHOW", "show", SHOW_MODE),
    command("SORT", "sort", EXPRESSION_MODE),
    command("STATS", "stats", EXPRESSION_MODE),
    command("WHERE", "where", EXPRESSION_MODE),
    command("DEV_INLINESTATS", "inlinestats", EXPRESSION_MODE)
        .requires(FeatureFlag::DevInlineStats),
    command("DEV_LOOKUP", "lookup", EXPRESSION_MODE).requires(FeatureFlag::DevLookup),
    command("DEV_METRICS", "metrics", FROM_MODE).requires(FeatureFlag::DevMetrics),
    Rule::new(
        "UNKNOWN_CMD",
        TokenKind::Identifier,
        Pattern::Run {
            first: CharClass::Alpha,
            rest: CharClass::Word,
        },
    )
    .push(EXPRESSION_MODE),
];

static EXPRESSION_RULES: &[Rule] = &[
    WS,
    LINE_COMMENT,
    MULTILINE_COMMENT_START,
    PIPE,
    keyword("AND", "and"),
    keyword("AS", "as"),
    keyword("ASC", "asc"),
    keyword("BY", "by"),
    keyword("DESC", "desc"),
    keyword("FALSE", "false"),
    keyword("FIRST", "first"),
    keyword("IN", "in"),
    keyword("IS", "is"),
    keyword("LAST", "last"),
    keyword("LIKE", "like"),
    keyword("NOT", "not"),
    keyword("NULL", "null"),
    keyword("NULLS", "nulls"),
    keyword("OR", "or"),
    keyword("RLIKE", "rlike"),
    keyword("TRUE", "true"),
    operator("EQ", "=="),
    operator("CIEQ", "=~"),
    operator("NEQ", "!="),
    operator("LT", "<"),
    operator("LTE", "<="),
    operator("GT", ">"),
    operator("GTE", ">="),
    operator("PLUS", "+"),
    operator("MINUS", "-"),
    operator("ASTERISK", "*"),
    operator("SLASH", "/"),
    operator("PERCENT", "%"),
    operator("CAST_OP", "::"),
    operator("LP", "("),
    operator("RP", ")"),
    ASSIGN,
    COMMA,
    DOT,
    OPENING_BRACKET,
    CLOSING_BRACKET,
    Rule::new(
        "PARAM",
        TokenKind::Literal,
        Pattern::Seq(&[Pattern::Literal("?"), Pattern::Many(CharClass::Word)]),
    ),
    Rule::new("INTEGER_LITERAL", TokenKind::Literal, INTEGER),
    Rule::new("DECIMAL_LITERAL", TokenKind::Literal, DECIMAL),
    STRING_START,
    QUOTED_IDENTIFIER_START,
    Rule::new(
        "UNQUOTED_IDENTIFIER",
        TokenKind::Identifier,
        UNQUOTED_IDENTIFIER,
    ),
];

static FROM_RULES: &[Rule] = &[
    WS,
    LINE_COMMENT,
    MULTILINE_COMMENT_START,
    PIPE,
    COMMA,
    ASSIGN,
    OPENING_BRACKET,
    CLOSING_BRACKET,
    keyword("METADATA", "metadata"),
    STRING_START,
    QUOTED_IDENTIFIER_START,
    Rule::new("INDEX_PATTERN", TokenKind::Identifier, INDEX_PATTERN),
];

static PROJECT_RULES: &[Rule] = &[
    WS,
    LINE_COMMENT,
    MULTILINE_COMMENT_START,
    PIPE,
    COMMA,
    DOT,
    QUOTED_IDENTIFIER_START,
    ID_PATTERN_RULE,
];

static RENAME_RULES: &[Rule] = &[
    WS,
    LINE_COMMENT,
    MULTILINE_COMMENT_START,
    PIPE,
    COMMA,
    DOT,
    ASSIGN,
    keyword("AS", "as"),
    QUOTED_IDENTIFIER_START,
    ID_PATTERN_RULE,
];

static ENRICH_RULES: &[Rule] = &[
    WS,
    LINE_COMMENT,
    MULTILINE_COMMENT_START,
    PIPE,
    COMMA,
    ASSIGN,
    keyword("ON", "on"),
    keyword("WITH", "with"),
    QUOTED_IDENTIFIER_START,
    Rule::new("ENRICH_POLICY_NAME", TokenKind::Identifier, INDEX_PATTERN),
];

static MVEXPAND_RULES: &[Rule] = &[
    WS,
    LINE_COMMENT,
    MULTILINE_COMMENT_START,
    PIPE,
    DOT,
    QUOTED_IDENTIFIER_START,
    ID_PATTERN_RULE,
];

static SHOW_RULES: &[Rule] = &[
    WS,
    LINE_COMMENT,
    MULTILINE_COMMENT_START,
    PIPE,
    keyword("INFO", "info"),
];

static QUOTED_IDENTIFIER_RULES: &[Rule] = &[
    Rule::new(
        "QUOTED_IDENTIFIER_ESCAPE",
        TokenKind::Identifier,
        Pattern::Literal("``"),
    ),
    Rule::new(
        "QUOTED_IDENTIFIER_CONTENT",
        TokenKind::Identifier,
        Pattern::repeat(CharClass::AnyExcept("`")),
    ),
    Rule::new(
        "QUOTED_IDENTIFIER_END",
        TokenKind::Identifier,
        Pattern::Literal("`"),
    )
    .pop(),
];

static STRING_RULES: &[Rule] = &[
    Rule::new(
        "ESCAPE_SEQUENCE",
        TokenKind::Literal,
        Pattern::Escape {
            lead: '\\',
            allowed: CharClass::OneOf("tnr\"\\"),
        },
    ),
    Rule::new(
        "STRING_CONTENT",
        TokenKind::Literal,
        Pattern::repeat(CharClass::AnyExcept("\"\\\r\n")),
    ),
    Rule::new("STRING_END", TokenKind::Literal, Pattern::Literal("\"")).pop(),
];

static COMMENT_RULES: &[Rule] = &[
    MULTILINE_COMMENT_START,
    Rule::new(
        "MULTILINE_COMMENT_END",
        TokenKind::Comment,
        Pattern::Literal("*/"),
    )
    .pop(),
    Rule::new(
        "MULTILINE_COMMENT_TEXT",
        TokenKind::Comment,
        Pattern::repeat(CharClass::AnyExcept("*/")),
    ),
    Rule::new(
        "MULTILINE_COMMENT_TEXT",
        TokenKind::Comment,
        Pattern::Class(CharClass::OneOf("*/")),
    ),
];

/// Command modes end at `|` or at end of input
pub static MODES: &[Mode] = &[
    Mode::new(DEFAULT_MODE, "DEFAULT_MODE", DEFAULT_RULES),
    Mode::new(EXPRESSION_MODE, "EXPRESSION_MODE", EXPRESSION_RULES).closes_at_eof(),
    Mode::new(FROM_MODE, "FROM_MODE", FROM_RULES).closes_at_eof(),
    Mode::new(PROJECT_MODE, "PROJECT_MODE", PROJECT_RULES).closes_at_eof(),
    Mode::new(RENAME_MODE, "RENAME_MODE", RENAME_RULES).closes_at_eof(),
    Mode::new(ENRICH_MODE, "ENRICH_MODE", ENRICH_RULES).closes_at_eof(),
    Mode::new(MVEXPAND_MODE, "MVEXPAND_MODE", MVEXPAND_RULES).closes_at_eof(),
    Mode::new(SHOW_MODE, "SHOW_MODE", SHOW_RULES).closes_at_eof(),
    Mode::new(
        QUOTED_IDENTIFIER_MODE,
        "QUOTED_IDENTIFIER_MODE",
        QUOTED_IDENTIFIER_RULES,
    ),
    Mode::new(STRING_MODE, "STRING_MODE", STRING_RULES),
    Mode::new(COMMENT_MODE, "COMMENT_MODE", COMMENT_RULES),
];

impl RuleTable {
    /// The ES|QL table, validated
    pub fn esql() -> Result<RuleTable, RuleTableError> {
        RuleTable::builder()
            .modes(MODES.iter().copied())
            .default_mode(DEFAULT_MODE)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::MatchPolicy;
    use std::collections::BTreeSet;

    fn select(table: &RuleTable, mode: ModeId, input: &str) -> Option<(&'static str, usize)> {
        table
            .select(mode, input, MatchPolicy::LongestMatch, &BTreeSet::new())
            .map(|m| (m.rule.name, m.len))
    }

    #[test]
    fn test_esql_table_is_valid() {
        let table = RuleTable::esql().unwrap();
        assert_eq!(table.modes().len(), MODES.len());
        assert_eq!(table.default_mode(), DEFAULT_MODE);
        assert_eq!(
            table.mode_by_name("default_mode").map(|m| m.id),
            Some(DEFAULT_MODE)
        );
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        let table = RuleTable::esql().unwrap();
        assert_eq!(select(&table, DEFAULT_MODE, "FROM logs"), Some(("FROM", 4)));
        assert_eq!(select(&table, DEFAULT_MODE, "Where x"), Some(("WHERE", 5)));
        assert_eq!(
            select(&table, DEFAULT_MODE, "fromage"),
            Some(("UNKNOWN_CMD", 7))
        );
    }

    #[test]
    fn test_dev_commands_are_gated() {
        let table = RuleTable::esql().unwrap();
        assert_eq!(
            select(&table, DEFAULT_MODE, "lookup"),
            Some(("UNKNOWN_CMD", 6))
        );

        let features = BTreeSet::from([FeatureFlag::DevLookup]);
        let selected = table
            .select(DEFAULT_MODE, "lookup", MatchPolicy::LongestMatch, &features)
            .map(|m| m.rule.name);
        assert_eq!(selected, Some("DEV_LOOKUP"));
    }

    #[test]
    fn test_expression_literals_and_operators() {
        let table = RuleTable::esql().unwrap();
        assert_eq!(
            select(&table, EXPRESSION_MODE, "1.5e3 "),
            Some(("DECIMAL_LITERAL", 5))
        );
        assert_eq!(
            select(&table, EXPRESSION_MODE, "42)"),
            Some(("INTEGER_LITERAL", 2))
        );
        assert_eq!(select(&table, EXPRESSION_MODE, ".5"), Some(("DECIMAL_LITERAL", 2)));
        assert_eq!(select(&table, EXPRESSION_MODE, ".x"), Some(("DOT", 1)));
        assert_eq!(select(&table, EXPRESSION_MODE, "<= 3"), Some(("LTE", 2)));
        assert_eq!(select(&table, EXPRESSION_MODE, "::long"), Some(("CAST_OP", 2)));
        assert_eq!(select(&table, EXPRESSION_MODE, "?limit"), Some(("PARAM", 6)));
    }

    #[test]
    fn test_keywords_win_ties_but_not_longer_identifiers() {
        let table = RuleTable::esql().unwrap();
        assert_eq!(select(&table, EXPRESSION_MODE, "and "), Some(("AND", 3)));
        assert_eq!(select(&table, EXPRESSION_MODE, "NULLS"), Some(("NULLS", 5)));
        assert_eq!(
            select(&table, EXPRESSION_MODE, "android"),
            Some(("UNQUOTED_IDENTIFIER", 7))
        );
        assert_eq!(
            select(&table, EXPRESSION_MODE, "@timestamp"),
            Some(("UNQUOTED_IDENTIFIER", 10))
        );
    }

    #[test]
    fn test_source_patterns() {
        let table = RuleTable::esql().unwrap();
        assert_eq!(
            select(&table, FROM_MODE, "logs-*,metrics"),
            Some(("INDEX_PATTERN", 6))
        );
        assert_eq!(select(&table, FROM_MODE, "metadata _id"), Some(("METADATA", 8)));
        assert_eq!(select(&table, PROJECT_MODE, "host* "), Some(("ID_PATTERN", 5)));
    }

    #[test]
    fn test_string_and_comment_modes() {
        let table = RuleTable::esql().unwrap();
        assert_eq!(select(&table, STRING_MODE, "\\\"x"), Some(("ESCAPE_SEQUENCE", 2)));
        assert_eq!(select(&table, STRING_MODE, "abc\""), Some(("STRING_CONTENT", 3)));
        assert_eq!(select(&table, STRING_MODE, "\n"), None);
        assert_eq!(
            select(&table, COMMENT_MODE, "*/"),
            Some(("MULTILINE_COMMENT_END", 2))
        );
        assert_eq!(
            select(&table, COMMENT_MODE, "/* nested"),
            Some(("MULTILINE_COMMENT_START", 2))
        );
        assert_eq!(
            select(&table, QUOTED_IDENTIFIER_MODE, "``x"),
            Some(("QUOTED_IDENTIFIER_ESCAPE", 2))
        );
    }
}

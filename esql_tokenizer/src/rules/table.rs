//! Validated, immutable rule tables

use super::feature::FeatureFlag;
use super::rule::{Mode, ModeId, ModeTransition, Rule};
use crate::config::compile_time::lexical::MAX_RULES_PER_MODE;
use crate::logging::{codes, Code};
use crate::{log_error, log_success};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// How a mode chooses among rules that match at the same position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Maximal munch; equal lengths go to the rule declared first
    #[default]
    LongestMatch,
    /// The rule declared first wins regardless of length
    FirstMatch,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPolicy::LongestMatch => "longest_match",
            MatchPolicy::FirstMatch => "first_match",
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "longest" | "longest_match" => Ok(MatchPolicy::LongestMatch),
            "first" | "first_match" => Ok(MatchPolicy::FirstMatch),
            other => Err(format!("Unknown match policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleTableError {
    #[error("Rule table declares no modes")]
    NoModes,

    #[error("Mode id {id} is declared more than once")]
    DuplicateModeId { id: ModeId },

    #[error("Mode name '{name}' is declared more than once")]
    DuplicateModeName { name: &'static str },

    #[error("Rule '{rule}' in mode '{mode}' pushes unknown mode {target}")]
    UnknownPushTarget {
        mode: &'static str,
        rule: &'static str,
        target: ModeId,
    },

    #[error("Rule '{rule}' in mode '{mode}' can match empty input")]
    EmptyPattern {
        mode: &'static str,
        rule: &'static str,
    },

    #[error("Mode '{mode}' declares {count} rules (limit {limit})")]
    TooManyRules {
        mode: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("Default mode {0} is not declared")]
    UnknownDefaultMode(ModeId),
}

impl RuleTableError {
    pub fn error_code(&self) -> Code {
        codes::rules::INVALID_RULE_TABLE
    }
}

/// Winning rule at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    pub rule: &'t Rule,
    /// Byte length of the match, always non-zero
    pub len: usize,
}

/// Immutable mode → rules table. Build once, share by reference.
#[derive(Debug, Clone)]
pub struct RuleTable {
    modes: Vec<Mode>,
    index: HashMap<ModeId, usize>,
    default_mode: ModeId,
}

impl RuleTable {
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    pub fn mode(&self, id: ModeId) -> Option<&Mode> {
        self.index.get(&id).map(|&idx| &self.modes[idx])
    }

    pub fn mode_by_name(&self, name: &str) -> Option<&Mode> {
        self.modes
            .iter()
            .find(|mode| mode.name.eq_ignore_ascii_case(name))
    }

    /// Display name for a mode id, falling back to the numeric id
    pub fn mode_name(&self, id: ModeId) -> String {
        self.mode(id)
            .map(|mode| mode.name.to_string())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn default_mode(&self) -> ModeId {
        self.default_mode
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn rule_count(&self) -> usize {
        self.modes.iter().map(|mode| mode.rules.len()).sum()
    }

    /// Select the rule that wins at the start of `input` in `mode`.
    ///
    /// Rules gated on a feature outside `features` are skipped, as are
    /// zero-length matches.
    pub fn select(
        &self,
        mode: ModeId,
        input: &str,
        policy: MatchPolicy,
        features: &BTreeSet<FeatureFlag>,
    ) -> Option<RuleMatch<'_>> {
        let rules = self.mode(mode)?.rules;
        let mut candidates = rules
            .iter()
            .filter(|rule| rule.is_enabled(features))
            .filter_map(|rule| {
                rule.pattern
                    .match_len(input)
                    .filter(|&len| len > 0)
                    .map(|len| RuleMatch { rule, len })
            });

        match policy {
            MatchPolicy::FirstMatch => candidates.next(),
            MatchPolicy::LongestMatch => candidates.fold(None, |best, candidate| match best {
                Some(current) if current.len >= candidate.len => Some(current),
                _ => Some(candidate),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    modes: Vec<Mode>,
    default_mode: Option<ModeId>,
}

impl RuleTableBuilder {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.modes.push(mode);
        self
    }

    pub fn modes(mut self, modes: impl IntoIterator<Item = Mode>) -> Self {
        self.modes.extend(modes);
        self
    }

    /// Mode sessions start in; defaults to the first declared mode
    pub fn default_mode(mut self, id: ModeId) -> Self {
        self.default_mode = Some(id);
        self
    }

    pub fn build(self) -> Result<RuleTable, RuleTableError> {
        match self.validate() {
            Ok(table) => {
                log_success!(
                    codes::success::RULE_TABLE_BUILT,
                    "Rule table built",
                    "modes" => table.modes.len(),
                    "rules" => table.rule_count()
                );
                Ok(table)
            }
            Err(error) => {
                log_error!(error.error_code(), &error.to_string());
                Err(error)
            }
        }
    }

    fn validate(self) -> Result<RuleTable, RuleTableError> {
        let first = self.modes.first().ok_or(RuleTableError::NoModes)?;
        let default_mode = self.default_mode.unwrap_or(first.id);

        let mut index = HashMap::with_capacity(self.modes.len());
        let mut names = BTreeSet::new();
        for (idx, mode) in self.modes.iter().enumerate() {
            if index.insert(mode.id, idx).is_some() {
                return Err(RuleTableError::DuplicateModeId { id: mode.id });
            }
            if !names.insert(mode.name) {
                return Err(RuleTableError::DuplicateModeName { name: mode.name });
            }
            if mode.rules.len() > MAX_RULES_PER_MODE {
                return Err(RuleTableError::TooManyRules {
                    mode: mode.name,
                    count: mode.rules.len(),
                    limit: MAX_RULES_PER_MODE,
                });
            }
        }

        if !index.contains_key(&default_mode) {
            return Err(RuleTableError::UnknownDefaultMode(default_mode));
        }

        for mode in &self.modes {
            for rule in mode.rules {
                if rule.pattern.can_match_empty() {
                    return Err(RuleTableError::EmptyPattern {
                        mode: mode.name,
                        rule: rule.name,
                    });
                }
                if let ModeTransition::Push(target) = rule.transition {
                    if !index.contains_key(&target) {
                        return Err(RuleTableError::UnknownPushTarget {
                            mode: mode.name,
                            rule: rule.name,
                            target,
                        });
                    }
                }
            }
        }

        Ok(RuleTable {
            modes: self.modes,
            index,
            default_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::pattern::{CharClass, Pattern};
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;

    const MAIN: ModeId = ModeId(0);
    const INNER: ModeId = ModeId(1);

    static MAIN_RULES: &[Rule] = &[
        Rule::new("ASSIGN", TokenKind::Operator, Pattern::Literal("=")),
        Rule::new("EQ", TokenKind::Operator, Pattern::Literal("==")),
        Rule::new("IF", TokenKind::Keyword, Pattern::Keyword("if")),
        Rule::new("BETA", TokenKind::Keyword, Pattern::Keyword("beta"))
            .requires(FeatureFlag::DevLookup),
        Rule::new(
            "IDENT",
            TokenKind::Identifier,
            Pattern::repeat(CharClass::Alpha),
        ),
        Rule::new("OPEN", TokenKind::Operator, Pattern::Literal("(")).push(INNER),
    ];
    static INNER_RULES: &[Rule] =
        &[Rule::new("CLOSE", TokenKind::Operator, Pattern::Literal(")")).pop()];

    fn table() -> RuleTable {
        RuleTable::builder()
            .mode(Mode::new(MAIN, "MAIN", MAIN_RULES))
            .mode(Mode::new(INNER, "INNER", INNER_RULES))
            .build()
            .unwrap()
    }

    fn select_name(table: &RuleTable, input: &str, policy: MatchPolicy) -> Option<&'static str> {
        table
            .select(MAIN, input, policy, &BTreeSet::new())
            .map(|m| m.rule.name)
    }

    #[test]
    fn test_longest_match_prefers_longer_rule() {
        let table = table();
        assert_eq!(
            select_name(&table, "== 1", MatchPolicy::LongestMatch),
            Some("EQ")
        );
        assert_eq!(
            select_name(&table, "iffy", MatchPolicy::LongestMatch),
            Some("IDENT")
        );
    }

    #[test]
    fn test_longest_match_ties_go_to_first_declared() {
        let table = table();
        assert_eq!(
            select_name(&table, "if x", MatchPolicy::LongestMatch),
            Some("IF")
        );
    }

    #[test]
    fn test_first_match_uses_declaration_order() {
        let table = table();
        assert_eq!(
            select_name(&table, "== 1", MatchPolicy::FirstMatch),
            Some("ASSIGN")
        );
        assert_eq!(
            select_name(&table, "iffy", MatchPolicy::FirstMatch),
            Some("IF")
        );
    }

    #[test]
    fn test_gated_rule_requires_feature() {
        let table = table();
        let mut features = BTreeSet::new();
        assert_eq!(
            table
                .select(MAIN, "beta", MatchPolicy::LongestMatch, &features)
                .map(|m| m.rule.name),
            Some("IDENT")
        );

        features.insert(FeatureFlag::DevLookup);
        assert_eq!(
            table
                .select(MAIN, "beta", MatchPolicy::FirstMatch, &features)
                .map(|m| m.rule.name),
            Some("BETA")
        );
    }

    #[test]
    fn test_select_reports_no_match() {
        let table = table();
        assert!(table
            .select(MAIN, "@", MatchPolicy::LongestMatch, &BTreeSet::new())
            .is_none());
        assert!(table
            .select(ModeId(9), "if", MatchPolicy::LongestMatch, &BTreeSet::new())
            .is_none());
    }

    #[test]
    fn test_lookup_by_name_and_default() {
        let table = table();
        assert_eq!(table.default_mode(), MAIN);
        assert_eq!(table.mode_by_name("inner").map(|m| m.id), Some(INNER));
        assert_eq!(table.mode_name(INNER), "INNER");
        assert_eq!(table.mode_name(ModeId(7)), "#7");
        assert_eq!(table.rule_count(), 7);
    }

    #[test]
    fn test_build_rejects_empty_table() {
        assert_matches!(RuleTable::builder().build(), Err(RuleTableError::NoModes));
    }

    #[test]
    fn test_build_rejects_unknown_push_target() {
        static RULES: &[Rule] =
            &[Rule::new("GO", TokenKind::Operator, Pattern::Literal(">")).push(ModeId(5))];
        let result = RuleTable::builder()
            .mode(Mode::new(MAIN, "MAIN", RULES))
            .build();
        assert_matches!(
            result,
            Err(RuleTableError::UnknownPushTarget { rule: "GO", target, .. }) if target == ModeId(5)
        );
    }

    #[test]
    fn test_build_rejects_empty_pattern() {
        static RULES: &[Rule] = &[Rule::new(
            "SPACES",
            TokenKind::Whitespace,
            Pattern::Many(CharClass::Whitespace),
        )];
        let result = RuleTable::builder()
            .mode(Mode::new(MAIN, "MAIN", RULES))
            .build();
        assert_matches!(result, Err(RuleTableError::EmptyPattern { rule: "SPACES", .. }));
    }

    #[test]
    fn test_build_rejects_duplicates_and_unknown_default() {
        let duplicate_id = RuleTable::builder()
            .mode(Mode::new(MAIN, "MAIN", MAIN_RULES))
            .mode(Mode::new(MAIN, "OTHER", INNER_RULES))
            .build();
        assert_matches!(duplicate_id, Err(RuleTableError::DuplicateModeId { .. }));

        let duplicate_name = RuleTable::builder()
            .mode(Mode::new(MAIN, "MAIN", INNER_RULES))
            .mode(Mode::new(INNER, "MAIN", INNER_RULES))
            .build();
        assert_matches!(
            duplicate_name,
            Err(RuleTableError::DuplicateModeName { name: "MAIN" })
        );

        let unknown_default = RuleTable::builder()
            .mode(Mode::new(INNER, "INNER", INNER_RULES))
            .default_mode(ModeId(4))
            .build();
        assert_matches!(unknown_default, Err(RuleTableError::UnknownDefaultMode(_)));
    }

    #[test]
    fn test_match_policy_parsing() {
        assert_eq!("longest".parse(), Ok(MatchPolicy::LongestMatch));
        assert_eq!("FIRST-MATCH".parse(), Ok(MatchPolicy::FirstMatch));
        assert!("fastest".parse::<MatchPolicy>().is_err());
        assert_eq!(MatchPolicy::default(), MatchPolicy::LongestMatch);
    }
}

//! Rules and modes

use super::feature::FeatureFlag;
use super::pattern::Pattern;
use crate::tokens::{Channel, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a lexical mode within one rule table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ModeId(pub u16);

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Effect a matched rule has on the mode stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    None,
    Push(ModeId),
    /// Pop back to the previous mode; a no-op on the bottom mode
    Pop,
}

/// Mapping from a pattern to a token kind, with an optional mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub kind: TokenKind,
    pub pattern: Pattern,
    pub channel: Channel,
    pub transition: ModeTransition,
    /// Feature that must be enabled for the rule to be considered
    pub requires: Option<FeatureFlag>,
}

impl Rule {
    pub const fn new(name: &'static str, kind: TokenKind, pattern: Pattern) -> Self {
        Self {
            name,
            kind,
            pattern,
            channel: Channel::for_kind(kind),
            transition: ModeTransition::None,
            requires: None,
        }
    }

    pub const fn push(self, mode: ModeId) -> Self {
        Self {
            transition: ModeTransition::Push(mode),
            ..self
        }
    }

    pub const fn pop(self) -> Self {
        Self {
            transition: ModeTransition::Pop,
            ..self
        }
    }

    pub const fn hidden(self) -> Self {
        Self {
            channel: Channel::Hidden,
            ..self
        }
    }

    pub const fn requires(self, flag: FeatureFlag) -> Self {
        Self {
            requires: Some(flag),
            ..self
        }
    }

    pub fn is_enabled(&self, features: &BTreeSet<FeatureFlag>) -> bool {
        self.requires.map_or(true, |flag| features.contains(&flag))
    }
}

/// Named, ordered list of rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub id: ModeId,
    pub name: &'static str,
    pub rules: &'static [Rule],
    /// Input may legitimately end while this mode is open
    pub closes_at_eof: bool,
}

impl Mode {
    pub const fn new(id: ModeId, name: &'static str, rules: &'static [Rule]) -> Self {
        Self {
            id,
            name,
            rules,
            closes_at_eof: false,
        }
    }

    pub const fn closes_at_eof(self) -> Self {
        Self {
            closes_at_eof: true,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAR: Rule = Rule::new("STAR", TokenKind::Operator, Pattern::Literal("*"));

    #[test]
    fn test_rule_builders_compose() {
        const OPEN: Rule = Rule::new("OPEN", TokenKind::Operator, Pattern::Literal("("))
            .push(ModeId(3))
            .requires(FeatureFlag::DevLookup);

        assert_eq!(OPEN.transition, ModeTransition::Push(ModeId(3)));
        assert_eq!(OPEN.requires, Some(FeatureFlag::DevLookup));
        assert_eq!(OPEN.channel, Channel::Default);
        assert_eq!(STAR.pop().transition, ModeTransition::Pop);
        assert_eq!(STAR.hidden().channel, Channel::Hidden);
    }

    #[test]
    fn test_comment_rules_default_to_hidden() {
        let rule = Rule::new("COMMENT", TokenKind::Comment, Pattern::Literal("#"));
        assert_eq!(rule.channel, Channel::Hidden);
    }

    #[test]
    fn test_rule_enabled_by_features() {
        let gated = STAR.requires(FeatureFlag::DevMetrics);
        let mut features = BTreeSet::new();

        assert!(STAR.is_enabled(&features));
        assert!(!gated.is_enabled(&features));
        features.insert(FeatureFlag::DevMetrics);
        assert!(gated.is_enabled(&features));
    }
}

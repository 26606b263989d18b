//! Declarative lexical patterns
//!
//! Patterns are plain `const` data so rule tables can live in statics. Matching
//! is greedy and does not backtrack: a `Seq` commits to whatever each element
//! consumed. That is enough for token-level rules and keeps every match linear
//! in the length of the token.

/// A set of characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Any character
    Any,
    Char(char),
    /// Any of the listed characters
    OneOf(&'static str),
    /// Any character not listed
    AnyExcept(&'static str),
    /// Inclusive range
    Range(char, char),
    /// ASCII digit
    Digit,
    /// ASCII letter
    Alpha,
    /// ASCII letter, digit or underscore
    Word,
    Whitespace,
    Union(&'static [CharClass]),
}

impl CharClass {
    pub fn contains(&self, ch: char) -> bool {
        match self {
            CharClass::Any => true,
            CharClass::Char(c) => *c == ch,
            CharClass::OneOf(set) => set.contains(ch),
            CharClass::AnyExcept(set) => !set.contains(ch),
            CharClass::Range(lo, hi) => (*lo..=*hi).contains(&ch),
            CharClass::Digit => ch.is_ascii_digit(),
            CharClass::Alpha => ch.is_ascii_alphabetic(),
            CharClass::Word => ch.is_ascii_alphanumeric() || ch == '_',
            CharClass::Whitespace => ch.is_whitespace(),
            CharClass::Union(classes) => classes.iter().any(|class| class.contains(ch)),
        }
    }
}

/// Pattern a rule matches at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Exact, case-sensitive text
    Literal(&'static str),
    /// ASCII case-insensitive text
    Keyword(&'static str),
    /// Exactly one character of the class
    Class(CharClass),
    /// Zero or more characters of the class
    Many(CharClass),
    /// One character of `first` followed by any number of `rest`
    Run { first: CharClass, rest: CharClass },
    /// `lead` followed by one character of `allowed`
    Escape { lead: char, allowed: CharClass },
    Seq(&'static [Pattern]),
    Opt(&'static Pattern),
    /// Longest matching alternative, first declared on ties
    Alt(&'static [Pattern]),
}

impl Pattern {
    /// Run of one or more characters of a single class
    pub const fn repeat(class: CharClass) -> Self {
        Pattern::Run {
            first: class,
            rest: class,
        }
    }

    /// Byte length matched at the start of `input`, if any
    pub fn match_len(&self, input: &str) -> Option<usize> {
        match self {
            Pattern::Literal(text) => input.starts_with(text).then_some(text.len()),
            Pattern::Keyword(text) => {
                let candidate = input.get(..text.len())?;
                candidate.eq_ignore_ascii_case(text).then_some(text.len())
            }
            Pattern::Class(class) => {
                let ch = input.chars().next()?;
                class.contains(ch).then_some(ch.len_utf8())
            }
            Pattern::Many(class) => Some(run_len(input, class)),
            Pattern::Run { first, rest } => {
                let ch = input.chars().next()?;
                if !first.contains(ch) {
                    return None;
                }
                let head = ch.len_utf8();
                Some(head + run_len(&input[head..], rest))
            }
            Pattern::Escape { lead, allowed } => {
                let mut chars = input.chars();
                if chars.next()? != *lead {
                    return None;
                }
                let escaped = chars.next()?;
                allowed
                    .contains(escaped)
                    .then_some(lead.len_utf8() + escaped.len_utf8())
            }
            Pattern::Seq(parts) => {
                let mut consumed = 0;
                for part in parts.iter() {
                    consumed += part.match_len(&input[consumed..])?;
                }
                Some(consumed)
            }
            Pattern::Opt(inner) => Some(inner.match_len(input).unwrap_or(0)),
            Pattern::Alt(options) => {
                let mut best: Option<usize> = None;
                for len in options.iter().filter_map(|option| option.match_len(input)) {
                    if best.map_or(true, |current| len > current) {
                        best = Some(len);
                    }
                }
                best
            }
        }
    }

    /// Whether the pattern can succeed without consuming input
    pub fn can_match_empty(&self) -> bool {
        match self {
            Pattern::Literal(text) | Pattern::Keyword(text) => text.is_empty(),
            Pattern::Class(_) | Pattern::Run { .. } | Pattern::Escape { .. } => false,
            Pattern::Many(_) | Pattern::Opt(_) => true,
            Pattern::Seq(parts) => parts.iter().all(Pattern::can_match_empty),
            Pattern::Alt(options) => options.iter().any(Pattern::can_match_empty),
        }
    }
}

fn run_len(input: &str, class: &CharClass) -> usize {
    input
        .char_indices()
        .find(|&(_, ch)| !class.contains(ch))
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTEGER: Pattern = Pattern::repeat(CharClass::Digit);
    const EXPONENT: Pattern = Pattern::Seq(&[
        Pattern::Class(CharClass::OneOf("eE")),
        Pattern::Opt(&Pattern::Class(CharClass::OneOf("+-"))),
        INTEGER,
    ]);
    const DECIMAL: Pattern = Pattern::Seq(&[
        INTEGER,
        Pattern::Literal("."),
        Pattern::Many(CharClass::Digit),
        Pattern::Opt(&EXPONENT),
    ]);

    #[test]
    fn test_literal_and_keyword() {
        assert_eq!(Pattern::Literal("==").match_len("== 1"), Some(2));
        assert_eq!(Pattern::Literal("==").match_len("=1"), None);
        assert_eq!(Pattern::Keyword("from").match_len("FROM idx"), Some(4));
        assert_eq!(Pattern::Keyword("from").match_len("fro"), None);
        assert_eq!(Pattern::Literal("from").match_len("FROM"), None);
    }

    #[test]
    fn test_keyword_on_multibyte_input_does_not_panic() {
        assert_eq!(Pattern::Keyword("ab").match_len("aé"), None);
    }

    #[test]
    fn test_run_and_many() {
        let ident = Pattern::Run {
            first: CharClass::Alpha,
            rest: CharClass::Word,
        };
        assert_eq!(ident.match_len("host_1 = 2"), Some(6));
        assert_eq!(ident.match_len("1host"), None);
        assert_eq!(Pattern::Many(CharClass::Digit).match_len("abc"), Some(0));
    }

    #[test]
    fn test_decimal_sequence() {
        assert_eq!(DECIMAL.match_len("1.5e+3)"), Some(6));
        assert_eq!(DECIMAL.match_len("12."), Some(3));
        assert_eq!(DECIMAL.match_len("12"), None);
    }

    #[test]
    fn test_escape() {
        let escape = Pattern::Escape {
            lead: '\\',
            allowed: CharClass::OneOf("nt\"\\"),
        };
        assert_eq!(escape.match_len("\\n rest"), Some(2));
        assert_eq!(escape.match_len("\\q"), None);
        assert_eq!(escape.match_len("\\"), None);
    }

    #[test]
    fn test_alt_prefers_longest_alternative() {
        let op = Pattern::Alt(&[Pattern::Literal("<"), Pattern::Literal("<=")]);
        assert_eq!(op.match_len("<= 3"), Some(2));
        assert_eq!(op.match_len("< 3"), Some(1));
    }

    #[test]
    fn test_can_match_empty() {
        assert!(Pattern::Literal("").can_match_empty());
        assert!(Pattern::Many(CharClass::Any).can_match_empty());
        assert!(Pattern::Seq(&[Pattern::Opt(&INTEGER)]).can_match_empty());
        assert!(!DECIMAL.can_match_empty());
        assert!(!Pattern::Alt(&[INTEGER, Pattern::Literal("x")]).can_match_empty());
    }

    #[test]
    fn test_char_class_union() {
        let class = CharClass::Union(&[CharClass::Digit, CharClass::Char('_')]);
        assert!(class.contains('7'));
        assert!(class.contains('_'));
        assert!(!class.contains('a'));
        assert!(CharClass::AnyExcept("`").contains('a'));
        assert!(!CharClass::AnyExcept("`").contains('`'));
    }
}

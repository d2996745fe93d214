//! The rule table the lexer is driven by.
//!
//! A rule pairs a regex with cheap structural checks (a literal `peek`
//! prefix and constraints on the previous token) and a `build` function
//! that turns a match into partial node data. Rules are grouped into
//! [`Mode`]s; within a mode they are tried in declaration order, so
//! overlapping constructs are disambiguated by position in the list.
//!
//! [`RuleTable::standard`] is the grammar of the language. Callers can
//! build their own tables for tooling or tests.

pub mod code;
pub mod markup;

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::ast::{Fields, Operator, TokenType};

/// A named subset of rules active while scanning a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Prose, including line-start block rules
    Markup,
    /// Prose inside a single line (headings, list items, link text)
    Inline,
    /// The expression language inside macro calls
    Code,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markup" => Ok(Mode::Markup),
            "inline" => Ok(Mode::Inline),
            "code" => Ok(Mode::Code),
            other => Err(format!("unknown mode '{other}' (expected markup, inline or code)")),
        }
    }
}

/// What may precede a rule's match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Follow {
    /// The start of the region being scanned
    Start,
    /// A node of this kind; pending unmatched text counts as `Text`
    Kind(TokenType),
}

/// Builds partial node data from a match.
pub type Build = fn(&Captures<'_>) -> Partial;

/// The node data a rule's `build` produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    pub kind: TokenType,
    pub is_front: bool,
    /// For fronts, the mode active until they are closed (`None` keeps the
    /// current one). For other nodes with an `inner` range, the mode that
    /// range is lexed in (`None` leaves it unlexed).
    pub mode: Option<Mode>,
    pub matches: &'static [(TokenType, TokenType)],
    pub cannot_cross: &'static [TokenType],
    /// Content range, relative to the start of the match
    pub inner: Option<Range<usize>>,
    pub fields: Fields,
}

impl Partial {
    pub fn new(kind: TokenType) -> Self {
        Partial {
            kind,
            is_front: false,
            mode: None,
            matches: &[],
            cannot_cross: &[],
            inner: None,
            fields: Fields::default(),
        }
    }

    /// Mark as an opener; `mode` becomes active until it is closed.
    pub fn front(mut self, mode: Option<Mode>) -> Self {
        self.is_front = true;
        self.mode = mode;
        self
    }

    /// Make this node close (fold) the given front kinds.
    pub fn closes(mut self, matches: &'static [(TokenType, TokenType)]) -> Self {
        self.matches = matches;
        self
    }

    pub fn cannot_cross(mut self, kinds: &'static [TokenType]) -> Self {
        self.cannot_cross = kinds;
        self
    }

    /// Record a content range, lexed in `mode` if one is given.
    pub fn inner(mut self, range: Range<usize>, mode: Option<Mode>) -> Self {
        self.inner = Some(range);
        self.mode = mode;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.fields.name = Some(name.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.fields.value = Some(value.into());
        self
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.fields.operator = Some(operator);
        self
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.fields.depth = Some(depth);
        self
    }

    pub fn is_back(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Errors building a rule table.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid pattern for rule '{name}': {source}")]
    InvalidPattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Mode {mode:?} refers to unknown rule '{name}'")]
    UnknownRule { mode: Mode, name: String },
}

/// A single grammar rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    peek: Option<&'static str>,
    can_follow: Option<Vec<Follow>>,
    cannot_follow: Vec<Follow>,
    build: Build,
}

impl Rule {
    /// Compile a rule. The pattern is anchored at the cursor.
    pub fn new(name: &'static str, pattern: &str, build: Build) -> Result<Self, RuleError> {
        let pattern = Regex::new(&format!(r"\A(?:{pattern})"))
            .map_err(|source| RuleError::InvalidPattern { name, source })?;
        Ok(Rule {
            name,
            pattern,
            peek: None,
            can_follow: None,
            cannot_follow: Vec::new(),
            build,
        })
    }

    /// Only try the pattern when the text at the cursor starts with `prefix`.
    pub fn peek(mut self, prefix: &'static str) -> Self {
        self.peek = Some(prefix);
        self
    }

    pub fn can_follow(mut self, follows: &[Follow]) -> Self {
        self.can_follow = Some(follows.to_vec());
        self
    }

    pub fn cannot_follow(mut self, follows: &[Follow]) -> Self {
        self.cannot_follow = follows.to_vec();
        self
    }

    /// The structural checks, without running the pattern.
    pub fn admits(&self, rest: &str, previous: Follow) -> bool {
        if let Some(prefix) = self.peek
            && !rest.starts_with(prefix)
        {
            return false;
        }
        if let Some(allowed) = &self.can_follow
            && !allowed.contains(&previous)
        {
            return false;
        }
        !self.cannot_follow.contains(&previous)
    }

    /// Match at the start of `rest`. Empty matches never count.
    pub fn try_match<'h>(&self, rest: &'h str, previous: Follow) -> Option<Captures<'h>> {
        if !self.admits(rest, previous) {
            return None;
        }
        self.pattern
            .captures(rest)
            .filter(|caps| caps.get(0).is_some_and(|m| !m.is_empty()))
    }

    pub fn build(&self, captures: &Captures<'_>) -> Partial {
        (self.build)(captures)
    }
}

/// An ordered collection of rules, grouped by mode.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    modes: Vec<(Mode, Vec<usize>)>,
}

static STANDARD: Lazy<RuleTable> =
    Lazy::new(|| standard_table().expect("standard rule table is well-formed"));

fn standard_table() -> Result<RuleTable, RuleError> {
    let mut table = RuleTable::new();
    for rule in markup::rules()?.into_iter().chain(code::rules()?) {
        table.add(rule);
    }
    table
        .define_mode(Mode::Markup, markup::MARKUP_ORDER)?
        .define_mode(Mode::Inline, markup::INLINE_ORDER)?
        .define_mode(Mode::Code, code::CODE_ORDER)?;
    Ok(table)
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The language's own grammar, compiled once.
    pub fn standard() -> &'static RuleTable {
        &STANDARD
    }

    /// Register a rule so modes can refer to it by name.
    ///
    /// A later rule with the same name replaces the earlier one.
    pub fn add(&mut self, rule: Rule) {
        match self.rules.iter().position(|r| r.name == rule.name) {
            Some(idx) => self.rules[idx] = rule,
            None => self.rules.push(rule),
        }
    }

    /// Declare the ordered rules of a mode.
    pub fn define_mode(&mut self, mode: Mode, names: &[&str]) -> Result<&mut Self, RuleError> {
        let mut order = Vec::with_capacity(names.len());
        for name in names {
            let idx = self
                .rules
                .iter()
                .position(|r| r.name == *name)
                .ok_or_else(|| RuleError::UnknownRule {
                    mode,
                    name: name.to_string(),
                })?;
            order.push(idx);
        }
        self.modes.retain(|(m, _)| *m != mode);
        self.modes.push((mode, order));
        Ok(self)
    }

    /// The rules of `mode` in the order they are tried.
    pub fn rules_for(&self, mode: Mode) -> impl Iterator<Item = &Rule> {
        self.modes
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, order)| order.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&idx| &self.rules[idx])
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

/// Byte range of capture `group`, relative to the match.
pub(crate) fn group_range(captures: &Captures<'_>, group: usize) -> Option<Range<usize>> {
    captures.get(group).map(|m| m.range())
}

/// Text of capture `group`, or the empty string.
pub(crate) fn group_text<'h>(captures: &Captures<'h>, group: usize) -> &'h str {
    captures.get(group).map_or("", |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_anchored() {
        let rule = Rule::new("digits", r"\d+", |_| Partial::new(TokenType::Number)).unwrap();
        assert!(rule.try_match("12ab", Follow::Start).is_some());
        assert!(rule.try_match("ab12", Follow::Start).is_none());
    }

    #[test]
    fn test_follow_constraints() {
        let rule = Rule::new("kw", r"and\b", |_| Partial::new(TokenType::And))
            .unwrap()
            .peek("and")
            .cannot_follow(&[Follow::Kind(TokenType::Text)]);
        assert!(rule.try_match("and", Follow::Start).is_some());
        assert!(rule.try_match("and", Follow::Kind(TokenType::Text)).is_none());
        assert!(rule.try_match("or", Follow::Start).is_none());

        let line = Rule::new("hr", r"---", |_| Partial::new(TokenType::Hr))
            .unwrap()
            .can_follow(&[Follow::Start, Follow::Kind(TokenType::Br)]);
        assert!(line.try_match("---", Follow::Kind(TokenType::Br)).is_some());
        assert!(line.try_match("---", Follow::Kind(TokenType::Text)).is_none());
    }

    #[test]
    fn test_unknown_rule_in_mode() {
        let mut table = RuleTable::new();
        let err = table.define_mode(Mode::Code, &["missing"]).unwrap_err();
        assert!(matches!(err, RuleError::UnknownRule { .. }));
    }

    #[test]
    fn test_standard_table_has_every_mode() {
        let table = RuleTable::standard();
        for mode in [Mode::Markup, Mode::Inline, Mode::Code] {
            assert!(table.rules_for(mode).next().is_some(), "{mode:?} is empty");
        }
    }
}

//! Mutation rules expanding one base candidate into variants.

use std::{fmt::Display, str::FromStr};

use chrono::Local;
use itertools::Itertools;
use tracing::warn;

use crate::error::BrutyfError;

/// A single mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Keeps the candidate unchanged.
    None,
    Lowercase,
    Uppercase,
    /// Lowercases the candidate, then uppercases its first character.
    Capitalize,
    Reverse,
    /// a→4, e→3, i→1, o→0, s→5, t→7, case-insensitive.
    Leet,
    /// Concatenates the candidate with itself.
    Duplicate,
    /// Alternates the case of each character, starting uppercase.
    ToggleCase,
    /// Appends the current year on four digits.
    AppendYear,
    /// Appends the current year on two digits.
    AppendYearShort,
    Append(String),
    Prepend(String),
    /// Replaces every occurrence of the first character by the second one.
    Substitute(char, char),
}

impl Rule {
    /// Applies this rule to `base`.
    pub fn apply(&self, base: &str) -> String {
        match self {
            Rule::None => base.to_owned(),
            Rule::Lowercase => base.to_lowercase(),
            Rule::Uppercase => base.to_uppercase(),
            Rule::Capitalize => {
                let lower = base.to_lowercase();
                let mut chars = lower.chars();

                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => lower,
                }
            }
            Rule::Reverse => base.chars().rev().collect(),
            Rule::Leet => base
                .chars()
                .map(|c| match c.to_ascii_lowercase() {
                    'a' => '4',
                    'e' => '3',
                    'i' => '1',
                    'o' => '0',
                    's' => '5',
                    't' => '7',
                    _ => c,
                })
                .collect(),
            Rule::Duplicate => base.repeat(2),
            Rule::ToggleCase => base
                .chars()
                .enumerate()
                .flat_map(|(i, c)| {
                    if i % 2 == 0 {
                        c.to_uppercase().collect::<Vec<_>>()
                    } else {
                        c.to_lowercase().collect::<Vec<_>>()
                    }
                })
                .collect(),
            Rule::AppendYear => format!("{base}{}", Local::now().format("%Y")),
            Rule::AppendYearShort => format!("{base}{}", Local::now().format("%y")),
            Rule::Append(suffix) => format!("{base}{suffix}"),
            Rule::Prepend(prefix) => format!("{prefix}{base}"),
            Rule::Substitute(from, to) => base.replace(*from, &to.to_string()),
        }
    }
}

impl FromStr for Rule {
    type Err = BrutyfError;

    /// Parses a built-in rule name, or a custom rule:
    /// `^X` prepends `X`, `$X` appends `X` and `sXY` replaces `X` by `Y`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rule = match s {
            "none" => Rule::None,
            "lowercase" => Rule::Lowercase,
            "uppercase" => Rule::Uppercase,
            "capitalize" => Rule::Capitalize,
            "reverse" => Rule::Reverse,
            "leet" => Rule::Leet,
            "duplicate" => Rule::Duplicate,
            "toggle_case" => Rule::ToggleCase,
            "append_year" => Rule::AppendYear,
            "append_year_short" => Rule::AppendYearShort,
            "append_123" => Rule::Append("123".to_owned()),
            "append_1" => Rule::Append("1".to_owned()),
            "append_!" => Rule::Append("!".to_owned()),
            "prepend_123" => Rule::Prepend("123".to_owned()),
            custom => {
                let mut chars = custom.chars();
                let op = chars.next();
                let arg = chars.as_str();

                match op {
                    Some('^') if !arg.is_empty() => Rule::Prepend(arg.to_owned()),
                    Some('$') if !arg.is_empty() => Rule::Append(arg.to_owned()),
                    Some('s') => {
                        let mut arg = arg.chars();
                        match (arg.next(), arg.next()) {
                            (Some(from), Some(to)) => Rule::Substitute(from, to),
                            _ => return Err(malformed(s)),
                        }
                    }
                    _ => return Err(malformed(s)),
                }
            }
        };

        Ok(rule)
    }
}

fn malformed(rule: &str) -> BrutyfError {
    BrutyfError::Unrecognized {
        kind: "rule",
        value: rule.to_owned(),
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::None => f.write_str("none"),
            Rule::Lowercase => f.write_str("lowercase"),
            Rule::Uppercase => f.write_str("uppercase"),
            Rule::Capitalize => f.write_str("capitalize"),
            Rule::Reverse => f.write_str("reverse"),
            Rule::Leet => f.write_str("leet"),
            Rule::Duplicate => f.write_str("duplicate"),
            Rule::ToggleCase => f.write_str("toggle_case"),
            Rule::AppendYear => f.write_str("append_year"),
            Rule::AppendYearShort => f.write_str("append_year_short"),
            Rule::Append(suffix) => write!(f, "${suffix}"),
            Rule::Prepend(prefix) => write!(f, "^{prefix}"),
            Rule::Substitute(from, to) => write!(f, "s{from}{to}"),
        }
    }
}

/// Applies an ordered list of rules to candidates.
#[derive(Clone, Debug, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
    configured: bool,
}

impl RuleEngine {
    /// Creates a rule engine from rule names.
    /// Malformed rules are logged and produce no variant.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let rules = names
            .iter()
            .filter_map(|name| match name.as_ref().parse() {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!("Ignoring rule: {e}");
                    None
                }
            })
            .collect();

        Self {
            rules,
            configured: !names.is_empty(),
        }
    }

    /// The names of the built-in rules.
    pub fn default_rules() -> &'static [&'static str] {
        &[
            "none",
            "lowercase",
            "uppercase",
            "capitalize",
            "reverse",
            "leet",
            "append_123",
            "append_1",
            "append_!",
            "prepend_123",
            "duplicate",
            "toggle_case",
            "append_year",
            "append_year_short",
        ]
    }

    /// The parsed rules, in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns true if no rule is configured.
    pub fn is_empty(&self) -> bool {
        !self.configured
    }

    /// Returns one variant of `base` per rule, without duplicates, in rule order.
    /// Without any rule, `base` itself is the only variant.
    pub fn apply(&self, base: &str) -> Vec<String> {
        if !self.configured {
            return vec![base.to_owned()];
        }

        self.rules.iter().map(|rule| rule.apply(base)).unique().collect()
    }
}

//! The capability rule grammar.
//!
//! Rules take the textual form `kind[.instance][mod]` where `kind` and
//! `instance` are identifiers over `[A-Za-z0-9_-]` and `mod` is one of the
//! four cardinality symbols. Rules may also arrive as structured mappings
//! (`{kind, instance?, mod?}`); both forms are validated identically at the
//! ingestion boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wireup_common::error::{Result, WireupError};

/// How many providers may satisfy a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// `!` — exactly one provider.
    One,
    /// `?` — zero or one provider.
    ZeroOrOne,
    /// `+` — at least one provider.
    OneOrMany,
    /// `*` — any number of providers.
    ZeroOrMany,
}

impl Cardinality {
    /// Minimum number of providers this cardinality accepts.
    #[must_use]
    pub const fn min(self) -> usize {
        match self {
            Self::One | Self::OneOrMany => 1,
            Self::ZeroOrOne | Self::ZeroOrMany => 0,
        }
    }

    /// Maximum number of providers this cardinality accepts, if bounded.
    #[must_use]
    pub const fn max(self) -> Option<usize> {
        match self {
            Self::One | Self::ZeroOrOne => Some(1),
            Self::OneOrMany | Self::ZeroOrMany => None,
        }
    }

    /// Short modifier symbol used in the textual rule form.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::One => '!',
            Self::ZeroOrOne => '?',
            Self::OneOrMany => '+',
            Self::ZeroOrMany => '*',
        }
    }

    /// Long-form name accepted as a synonym in structured rules.
    #[must_use]
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::One => "one",
            Self::ZeroOrOne => "zero_or_one",
            Self::OneOrMany => "one_or_many",
            Self::ZeroOrMany => "zero_or_many",
        }
    }

    /// Parses a short modifier symbol.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '!' => Some(Self::One),
            '?' => Some(Self::ZeroOrOne),
            '+' => Some(Self::OneOrMany),
            '*' => Some(Self::ZeroOrMany),
            _ => None,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Cardinality {
    type Err = WireupError;

    /// Accepts both the short symbol and the long-form synonym.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "!" | "one" => Ok(Self::One),
            "?" | "zero_or_one" => Ok(Self::ZeroOrOne),
            "+" | "one_or_many" => Ok(Self::OneOrMany),
            "*" | "zero_or_many" => Ok(Self::ZeroOrMany),
            other => Err(WireupError::MalformedRule {
                rule: other.to_string(),
                reason: "unknown cardinality modifier".into(),
            }),
        }
    }
}

/// A rule accepted at the configuration boundary: either the textual form or
/// an already-structured mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    /// Textual rule, e.g. `"database.main?"`.
    Text(String),
    /// Structured rule with explicit parts.
    Parts {
        /// Capability kind.
        kind: String,
        /// Optional instance refinement.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instance: Option<String>,
        /// Optional cardinality, short symbol or long name.
        #[serde(default, rename = "mod", skip_serializing_if = "Option::is_none")]
        modifier: Option<String>,
    },
}

impl From<&str> for RuleSpec {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_string())
    }
}

/// A parsed rule: the validated parts of a provider or requirement
/// declaration, not yet bound to an owning resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Capability kind.
    pub kind: String,
    /// Optional instance refinement.
    pub instance: Option<String>,
    /// Optional cardinality; providers never carry one.
    pub modifier: Option<Cardinality>,
}

impl Rule {
    /// Parses a requirement rule, consuming a trailing cardinality symbol.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::MalformedRule`] if the kind is empty, an
    /// identifier contains invalid characters, or more than one `.` appears.
    pub fn parse_requirement(raw: &str) -> Result<Self> {
        let (body, modifier) = split_modifier(raw);
        let (kind, instance) = split_ident(raw, body)?;
        Ok(Self {
            kind,
            instance,
            modifier,
        })
    }

    /// Parses a provider rule.
    ///
    /// Providers carry no cardinality; a trailing modifier is stripped and
    /// surfaced as a warning.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::MalformedRule`] on the same grammar violations
    /// as [`Rule::parse_requirement`].
    pub fn parse_provider(raw: &str) -> Result<Self> {
        let (body, modifier) = split_modifier(raw);
        if modifier.is_some() {
            tracing::warn!(rule = raw, "provider rule carries a cardinality modifier; ignored");
        }
        let (kind, instance) = split_ident(raw, body)?;
        Ok(Self {
            kind,
            instance,
            modifier: None,
        })
    }

    /// Validates a structured rule as a requirement.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::MalformedRule`] on invalid identifiers or an
    /// unknown cardinality name.
    pub fn requirement_from_spec(spec: &RuleSpec) -> Result<Self> {
        match spec {
            RuleSpec::Text(raw) => Self::parse_requirement(raw),
            RuleSpec::Parts {
                kind,
                instance,
                modifier,
            } => {
                validate_parts(kind, instance.as_deref())?;
                let modifier = modifier.as_deref().map(Cardinality::from_str).transpose()?;
                Ok(Self {
                    kind: kind.clone(),
                    instance: instance.clone(),
                    modifier,
                })
            }
        }
    }

    /// Validates a structured rule as a provider, ignoring any modifier.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::MalformedRule`] on invalid identifiers.
    pub fn provider_from_spec(spec: &RuleSpec) -> Result<Self> {
        match spec {
            RuleSpec::Text(raw) => Self::parse_provider(raw),
            RuleSpec::Parts {
                kind,
                instance,
                modifier,
            } => {
                validate_parts(kind, instance.as_deref())?;
                if modifier.is_some() {
                    tracing::warn!(kind, "provider rule carries a cardinality modifier; ignored");
                }
                Ok(Self {
                    kind: kind.clone(),
                    instance: instance.clone(),
                    modifier: None,
                })
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_rule(
            &self.kind,
            self.instance.as_deref(),
            self.modifier,
        ))
    }
}

/// Canonical textual form of a rule: `kind[.instance][mod]`.
#[must_use]
pub fn format_rule(kind: &str, instance: Option<&str>, modifier: Option<Cardinality>) -> String {
    let mut out = String::from(kind);
    if let Some(instance) = instance {
        out.push('.');
        out.push_str(instance);
    }
    if let Some(modifier) = modifier {
        out.push(modifier.symbol());
    }
    out
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Splits a trailing cardinality symbol off the rule body, if present.
fn split_modifier(raw: &str) -> (&str, Option<Cardinality>) {
    match raw.chars().last().and_then(Cardinality::from_symbol) {
        Some(modifier) => (&raw[..raw.len() - 1], Some(modifier)),
        None => (raw, None),
    }
}

/// Splits the rule body on the first `.` into `(kind, instance?)`.
fn split_ident(raw: &str, body: &str) -> Result<(String, Option<String>)> {
    let malformed = |reason: &str| WireupError::MalformedRule {
        rule: raw.to_string(),
        reason: reason.into(),
    };

    let (kind, instance) = match body.split_once('.') {
        Some((kind, instance)) => {
            if instance.contains('.') {
                return Err(malformed("at most one `.` separator is allowed"));
            }
            if !is_ident(instance) {
                return Err(malformed("instance must be a non-empty identifier"));
            }
            (kind, Some(instance.to_string()))
        }
        None => (body, None),
    };

    if !is_ident(kind) {
        return Err(malformed("kind must be a non-empty identifier"));
    }
    Ok((kind.to_string(), instance))
}

fn validate_parts(kind: &str, instance: Option<&str>) -> Result<()> {
    if !is_ident(kind) {
        return Err(WireupError::MalformedRule {
            rule: kind.to_string(),
            reason: "kind must be a non-empty identifier".into(),
        });
    }
    if let Some(instance) = instance {
        if !is_ident(instance) {
            return Err(WireupError::MalformedRule {
                rule: instance.to_string(),
                reason: "instance must be a non-empty identifier".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_kind_only_defaults() {
        let rule = Rule::parse_requirement("database").expect("should parse");
        assert_eq!(rule.kind, "database");
        assert_eq!(rule.instance, None);
        assert_eq!(rule.modifier, None);
    }

    #[test]
    fn requirement_with_instance_and_modifier() {
        let rule = Rule::parse_requirement("cache.redis?").expect("should parse");
        assert_eq!(rule.kind, "cache");
        assert_eq!(rule.instance.as_deref(), Some("redis"));
        assert_eq!(rule.modifier, Some(Cardinality::ZeroOrOne));
    }

    #[test]
    fn requirement_each_modifier_symbol() {
        for (raw, expected) in [
            ("w!", Cardinality::One),
            ("w?", Cardinality::ZeroOrOne),
            ("w+", Cardinality::OneOrMany),
            ("w*", Cardinality::ZeroOrMany),
        ] {
            let rule = Rule::parse_requirement(raw).expect(raw);
            assert_eq!(rule.modifier, Some(expected), "for {raw}");
        }
    }

    #[test]
    fn provider_strips_modifier() {
        let rule = Rule::parse_provider("worker.a+").expect("should parse");
        assert_eq!(rule.kind, "worker");
        assert_eq!(rule.instance.as_deref(), Some("a"));
        assert_eq!(rule.modifier, None);
    }

    #[test]
    fn empty_kind_is_malformed() {
        for raw in ["", ".", ".x", "!", ".main?"] {
            let err = Rule::parse_requirement(raw).expect_err(raw);
            assert!(matches!(err, WireupError::MalformedRule { .. }), "for {raw:?}");
        }
    }

    #[test]
    fn multiple_separators_are_malformed() {
        let err = Rule::parse_requirement("a.b.c").expect_err("should fail");
        assert!(format!("{err}").contains("a.b.c"));
    }

    #[test]
    fn empty_instance_is_malformed() {
        assert!(Rule::parse_requirement("db.").is_err());
        assert!(Rule::parse_requirement("db.!").is_err());
    }

    #[test]
    fn invalid_ident_characters_rejected() {
        assert!(Rule::parse_requirement("da tabase").is_err());
        assert!(Rule::parse_requirement("db.ma/in").is_err());
    }

    #[test]
    fn identifiers_allow_dash_and_underscore() {
        let rule = Rule::parse_requirement("my-kind.some_inst*").expect("should parse");
        assert_eq!(rule.kind, "my-kind");
        assert_eq!(rule.instance.as_deref(), Some("some_inst"));
    }

    #[test]
    fn structured_requirement_accepts_long_names() {
        let spec = RuleSpec::Parts {
            kind: "worker".into(),
            instance: None,
            modifier: Some("one_or_many".into()),
        };
        let rule = Rule::requirement_from_spec(&spec).expect("should parse");
        assert_eq!(rule.modifier, Some(Cardinality::OneOrMany));
    }

    #[test]
    fn structured_requirement_rejects_unknown_modifier() {
        let spec = RuleSpec::Parts {
            kind: "worker".into(),
            instance: None,
            modifier: Some("some".into()),
        };
        assert!(Rule::requirement_from_spec(&spec).is_err());
    }

    #[test]
    fn structured_provider_ignores_modifier() {
        let spec = RuleSpec::Parts {
            kind: "worker".into(),
            instance: Some("a".into()),
            modifier: Some("+".into()),
        };
        let rule = Rule::provider_from_spec(&spec).expect("should parse");
        assert_eq!(rule.modifier, None);
    }

    #[test]
    fn parse_format_round_trip() {
        for raw in ["database", "database.main", "cache.redis?", "worker+", "x.y!"] {
            let rule = Rule::parse_requirement(raw).expect(raw);
            assert_eq!(rule.to_string(), raw, "canonical form of {raw}");
            let reparsed = Rule::parse_requirement(&rule.to_string()).expect(raw);
            assert_eq!(reparsed, rule, "round trip of {raw}");
        }
    }

    #[test]
    fn long_name_normalizes_to_symbol() {
        let spec = RuleSpec::Parts {
            kind: "db".into(),
            instance: Some("main".into()),
            modifier: Some("zero_or_one".into()),
        };
        let rule = Rule::requirement_from_spec(&spec).expect("should parse");
        assert_eq!(rule.to_string(), "db.main?");
    }

    #[test]
    fn cardinality_bounds_table() {
        assert_eq!(Cardinality::One.min(), 1);
        assert_eq!(Cardinality::One.max(), Some(1));
        assert_eq!(Cardinality::ZeroOrOne.min(), 0);
        assert_eq!(Cardinality::ZeroOrOne.max(), Some(1));
        assert_eq!(Cardinality::OneOrMany.min(), 1);
        assert_eq!(Cardinality::OneOrMany.max(), None);
        assert_eq!(Cardinality::ZeroOrMany.min(), 0);
        assert_eq!(Cardinality::ZeroOrMany.max(), None);
    }

    #[test]
    fn rule_spec_deserializes_both_forms() {
        let text: RuleSpec = serde_json::from_str("\"database.main\"").expect("text form");
        assert_eq!(text, RuleSpec::Text("database.main".into()));

        let parts: RuleSpec =
            serde_json::from_str(r#"{"kind": "database", "instance": "main", "mod": "?"}"#)
                .expect("structured form");
        let rule = Rule::requirement_from_spec(&parts).expect("should validate");
        assert_eq!(rule.to_string(), "database.main?");
    }
}

// crates/resource-gate-core/src/rules/condition.rs
// ============================================================================
// Module: Rule Conditions
// Description: Boolean algebra over field predicates.
// Purpose: Express when a cross-field rule applies.
// Dependencies: crate::{error, path, value}, smallvec
// ============================================================================

//! ## Overview
//! A [`Condition`] is a small boolean tree whose leaves read one field of the
//! configuration. Empty `All` is trivially true; empty `Any` is trivially
//! false. Evaluation short-circuits, since conditions have no side effects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use smallvec::SmallVec;

use crate::constraints::one_of_message;
use crate::error::RegistryError;
use crate::error::parse_path;
use crate::path::FieldPath;
use crate::path::PathError;
use crate::value::ConfigNode;
use crate::value::Scalar;

// ============================================================================
// SECTION: Field Predicates
// ============================================================================

/// Atomic test against one concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPredicate {
    /// The path holds a non-null value.
    Present(FieldPath),
    /// The path holds exactly this scalar.
    Equals(FieldPath, Scalar),
    /// The path holds one of these scalars.
    OneOf(FieldPath, Vec<Scalar>),
    /// The path holds a value other than null, `""`, `[]`, or `{}`.
    NonEmpty(FieldPath),
}

impl FieldPredicate {
    /// Evaluates the predicate.
    #[must_use]
    pub fn eval(&self, config: &ConfigNode) -> bool {
        match self {
            Self::Present(path) => config.has_value(path),
            Self::Equals(path, expected) => scalar_at(config, path).is_some_and(|value| value.same_value(expected)),
            Self::OneOf(path, allowed) => {
                scalar_at(config, path).is_some_and(|value| allowed.iter().any(|item| item.same_value(value)))
            }
            Self::NonEmpty(path) => config.get(path).is_some_and(|node| !node.is_empty_value()),
        }
    }
}

impl fmt::Display for FieldPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(path) => write!(f, "{path} is set"),
            Self::Equals(path, value) => write!(f, "{path} == {value}"),
            Self::OneOf(path, allowed) => {
                let rendered = one_of_message(allowed.iter());
                write!(f, "{path} in {}", rendered.trim_start_matches("value must be one of: "))
            }
            Self::NonEmpty(path) => write!(f, "{path} is non-empty"),
        }
    }
}

/// Returns the scalar at `path`, if any.
fn scalar_at<'a>(config: &'a ConfigNode, path: &FieldPath) -> Option<&'a Scalar> {
    config.get(path).and_then(ConfigNode::as_scalar)
}

/// Parses a condition path, which must be concrete.
fn concrete_path(text: &str) -> Result<FieldPath, RegistryError> {
    let path = parse_path(text)?;
    if path.is_concrete() {
        Ok(path)
    } else {
        Err(RegistryError::invalid_path(text, PathError::Wildcard(text.to_string())))
    }
}

// ============================================================================
// SECTION: Condition Tree
// ============================================================================

/// Boolean tree of field predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Every child holds. Empty is true.
    All(SmallVec<[Box<Self>; 4]>),
    /// At least one child holds. Empty is false.
    Any(SmallVec<[Box<Self>; 4]>),
    /// The child does not hold.
    Not(Box<Self>),
    /// Leaf predicate.
    Field(FieldPredicate),
}

impl Condition {
    /// Condition that always holds.
    #[must_use]
    pub fn always() -> Self {
        Self::All(SmallVec::new())
    }

    /// `path` holds a non-null value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPath`] for malformed or wildcard paths.
    pub fn present(path: &str) -> Result<Self, RegistryError> {
        Ok(Self::Field(FieldPredicate::Present(concrete_path(path)?)))
    }

    /// `path` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPath`] for malformed or wildcard paths.
    pub fn equals(path: &str, value: impl Into<Scalar>) -> Result<Self, RegistryError> {
        Ok(Self::Field(FieldPredicate::Equals(concrete_path(path)?, value.into())))
    }

    /// `path` equals one of `values`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPath`] for malformed or wildcard paths.
    pub fn one_of<V: Into<Scalar>>(path: &str, values: impl IntoIterator<Item = V>) -> Result<Self, RegistryError> {
        let values = values.into_iter().map(Into::into).collect();
        Ok(Self::Field(FieldPredicate::OneOf(concrete_path(path)?, values)))
    }

    /// `path` holds a non-empty value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPath`] for malformed or wildcard paths.
    pub fn non_empty(path: &str) -> Result<Self, RegistryError> {
        Ok(Self::Field(FieldPredicate::NonEmpty(concrete_path(path)?)))
    }

    /// Conjunction of `conditions`.
    #[must_use]
    pub fn all(conditions: impl IntoIterator<Item = Self>) -> Self {
        Self::All(conditions.into_iter().map(Box::new).collect())
    }

    /// Disjunction of `conditions`.
    #[must_use]
    pub fn any(conditions: impl IntoIterator<Item = Self>) -> Self {
        Self::Any(conditions.into_iter().map(Box::new).collect())
    }

    /// Negation of `condition`.
    #[must_use]
    pub fn not(condition: Self) -> Self {
        Self::Not(Box::new(condition))
    }

    /// Evaluates the condition against `config`.
    #[must_use]
    pub fn eval(&self, config: &ConfigNode) -> bool {
        match self {
            Self::Field(predicate) => predicate.eval(config),
            Self::Not(condition) => !condition.eval(config),
            Self::All(conditions) => conditions.iter().all(|condition| condition.eval(config)),
            Self::Any(conditions) => conditions.iter().any(|condition| condition.eval(config)),
        }
    }

    /// Returns true for the trivially-true empty conjunction.
    #[must_use]
    pub fn is_always(&self) -> bool {
        matches!(self, Self::All(conditions) if conditions.is_empty())
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(predicate) => fmt::Display::fmt(predicate, f),
            Self::Not(condition) => write!(f, "not ({condition})"),
            Self::All(conditions) if conditions.is_empty() => f.write_str("always"),
            Self::Any(conditions) if conditions.is_empty() => f.write_str("never"),
            Self::All(conditions) => write_joined(f, conditions, " and "),
            Self::Any(conditions) => write_joined(f, conditions, " or "),
        }
    }
}

/// Writes children joined by `separator`, parenthesized when there are several.
fn write_joined(f: &mut fmt::Formatter<'_>, conditions: &[Box<Condition>], separator: &str) -> fmt::Result {
    if conditions.len() == 1 {
        return fmt::Display::fmt(&conditions[0], f);
    }
    f.write_str("(")?;
    for (position, condition) in conditions.iter().enumerate() {
        if position > 0 {
            f.write_str(separator)?;
        }
        fmt::Display::fmt(condition, f)?;
    }
    f.write_str(")")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use serde_json::json;

    use super::Condition;
    use crate::error::RegistryError;
    use crate::value::ConfigNode;

    #[test]
    fn empty_groups_follow_identities() {
        let config = ConfigNode::empty_object();
        assert!(Condition::all([]).eval(&config));
        assert!(!Condition::any([]).eval(&config));
    }

    #[test]
    fn predicates_distinguish_null_and_empty() {
        let config = ConfigNode::from(json!({"script": "", "token": null, "operation": "custom"}));
        assert!(Condition::present("script").unwrap().eval(&config));
        assert!(!Condition::non_empty("script").unwrap().eval(&config));
        assert!(!Condition::present("token").unwrap().eval(&config));
        assert!(Condition::equals("operation", "custom").unwrap().eval(&config));
        assert!(Condition::not(Condition::one_of("operation", ["sum", "count"]).unwrap()).eval(&config));
    }

    #[test]
    fn wildcard_paths_are_rejected() {
        assert!(matches!(Condition::present("items[*].name"), Err(RegistryError::InvalidPath { .. })));
    }

    #[test]
    fn renders_readably() {
        let condition = Condition::all([
            Condition::equals("event_type", "log").unwrap(),
            Condition::not(Condition::present("script").unwrap()),
        ]);
        assert_eq!(condition.to_string(), "(event_type == log and not (script is set))");
    }
}

// crates/resource-gate-core/src/rules/mod.rs
// ============================================================================
// Module: Cross-Field Rule Engine
// Description: Rules spanning several fields, gated by active variants.
// Purpose: Evaluate dependencies the per-field constraints cannot express.
// Dependencies: crate::{diagnostics, error, path, registry, value}
// ============================================================================

//! ## Overview
//! A [`Rule`] is governed by zero or more variant keys and runs only when all
//! of them are active. Its check is either declarative (`when` a
//! [`Condition`] holds, every [`Expectation`] must hold) or a plain function.
//! Every rule runs on every call; one failing rule never prevents another
//! from reporting. All rule violations carry
//! [`ViolationKind::CrossFieldInvariantViolated`].

pub mod condition;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

pub use condition::Condition;
pub use condition::FieldPredicate;

use crate::constraints::one_of_message;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Violation;
use crate::diagnostics::ViolationKind;
use crate::error::RegistryError;
use crate::error::parse_path;
use crate::path::FieldPath;
use crate::registry::ActiveVariants;
use crate::registry::VariantKey;
use crate::registry::VariantRegistry;
use crate::value::ConfigNode;
use crate::value::Scalar;

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Something a rule demands once its condition holds.
///
/// Paths may contain wildcards; each expectation fans out over the concrete
/// list elements present in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// The path must hold a value other than null, `""`, `[]`, or `{}`.
    NonEmpty {
        /// Checked path.
        path: FieldPath,
        /// Message reported on failure.
        message: String,
    },
    /// The path must be absent or null.
    Absent {
        /// Checked path.
        path: FieldPath,
        /// Message reported on failure.
        message: String,
    },
    /// The path must hold exactly this value.
    Equals {
        /// Checked path.
        path: FieldPath,
        /// Required value.
        value: Scalar,
        /// Message reported on failure.
        message: String,
    },
    /// A present value must be one of these; the message enumerates them.
    OneOf {
        /// Checked path.
        path: FieldPath,
        /// Allowed values in declaration order.
        allowed: Vec<Scalar>,
    },
    /// At most one of these paths may hold a value.
    AtMostOne {
        /// Mutually exclusive paths (concrete).
        paths: Vec<FieldPath>,
    },
}

impl Expectation {
    /// Checks the expectation, appending one violation per failing path.
    pub fn check(&self, config: &ConfigNode, out: &mut Vec<Violation>) {
        match self {
            Self::NonEmpty {
                path,
                message,
            } => {
                for path in config.expand(path) {
                    if config.get(&path).is_none_or(ConfigNode::is_empty_value) {
                        out.push(Violation::cross_field(path, message.clone()));
                    }
                }
            }
            Self::Absent {
                path,
                message,
            } => {
                for path in config.expand(path) {
                    if config.has_value(&path) {
                        out.push(Violation::cross_field(path, message.clone()));
                    }
                }
            }
            Self::Equals {
                path,
                value,
                message,
            } => {
                for path in config.expand(path) {
                    if !config.get(&path).and_then(ConfigNode::as_scalar).is_some_and(|actual| actual.same_value(value)) {
                        out.push(Violation::cross_field(path, message.clone()));
                    }
                }
            }
            Self::OneOf {
                path,
                allowed,
            } => {
                for path in config.expand(path) {
                    let Some(node) = config.get(&path).filter(|node| !node.is_null()) else {
                        continue;
                    };
                    if !node.as_scalar().is_some_and(|value| allowed.iter().any(|item| item.same_value(value))) {
                        out.push(Violation::cross_field(path, one_of_message(allowed.iter())));
                    }
                }
            }
            Self::AtMostOne {
                paths,
            } => {
                let present: Vec<&FieldPath> = paths.iter().filter(|path| config.has_value(path)).collect();
                if present.len() > 1 {
                    let names: Vec<String> = paths.iter().map(ToString::to_string).collect();
                    let message = format!("only one of [{}] may be set", names.join(", "));
                    for path in present {
                        out.push(Violation::cross_field(path.clone(), message.clone()));
                    }
                }
            }
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonEmpty {
                path,
                ..
            } => write!(f, "{path} is non-empty"),
            Self::Absent {
                path,
                ..
            } => write!(f, "{path} is absent"),
            Self::Equals {
                path,
                value,
                ..
            } => write!(f, "{path} == {value}"),
            Self::OneOf {
                path,
                allowed,
            } => {
                let rendered = one_of_message(allowed.iter());
                write!(f, "{path} in {}", rendered.trim_start_matches("value must be one of: "))
            }
            Self::AtMostOne {
                paths,
            } => {
                let names: Vec<String> = paths.iter().map(ToString::to_string).collect();
                write!(f, "at most one of [{}]", names.join(", "))
            }
        }
    }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Signature of a rule implemented as a plain function.
pub type CustomCheck = fn(&ConfigNode, &ActiveVariants) -> Vec<Violation>;

/// How a rule checks a configuration.
#[derive(Debug, Clone)]
pub enum RuleCheck {
    /// `when` holds implies every expectation holds.
    Declarative {
        /// Applicability condition.
        when: Condition,
        /// Expectations checked when the condition holds.
        expect: Vec<Expectation>,
    },
    /// Arbitrary pure function.
    Custom(CustomCheck),
}

/// A named cross-field rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable rule name.
    name: String,
    /// Variant keys that must all be active for the rule to run.
    governing: Vec<VariantKey>,
    /// Check performed when governed variants are active.
    check: RuleCheck,
}

impl Rule {
    /// Starts a rule builder.
    #[must_use]
    pub fn builder(name: &str) -> RuleBuilder {
        RuleBuilder {
            name: name.to_string(),
            governing: Vec::new(),
            when: Condition::always(),
            expect: Vec::new(),
            custom: None,
            error: None,
        }
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the governing variant keys.
    #[must_use]
    pub fn governing(&self) -> &[VariantKey] {
        &self.governing
    }

    /// Returns the rule check.
    #[must_use]
    pub const fn check(&self) -> &RuleCheck {
        &self.check
    }

    /// Evaluates the rule. Returns nothing when a governing variant is inactive.
    #[must_use]
    pub fn evaluate(&self, config: &ConfigNode, active: &ActiveVariants) -> Vec<Violation> {
        if !active.contains_all(&self.governing) {
            return Vec::new();
        }
        match &self.check {
            RuleCheck::Declarative {
                when,
                expect,
            } => {
                let mut out = Vec::new();
                if when.eval(config) {
                    for expectation in expect {
                        expectation.check(config, &mut out);
                    }
                }
                out
            }
            RuleCheck::Custom(check) => check(config, active)
                .into_iter()
                .map(|violation| Violation {
                    kind: ViolationKind::CrossFieldInvariantViolated,
                    ..violation
                })
                .collect(),
        }
    }

    /// Renders the rule for reference documentation.
    #[must_use]
    pub fn describe(&self) -> String {
        let governed = if self.governing.is_empty() {
            String::new()
        } else {
            let keys: Vec<String> = self.governing.iter().map(ToString::to_string).collect();
            format!("[{}] ", keys.join(", "))
        };
        match &self.check {
            RuleCheck::Declarative {
                when,
                expect,
            } => {
                let expectations: Vec<String> = expect.iter().map(ToString::to_string).collect();
                if when.is_always() {
                    format!("{governed}expect {}", expectations.join("; "))
                } else {
                    format!("{governed}when {when} expect {}", expectations.join("; "))
                }
            }
            RuleCheck::Custom(_) => format!("{governed}custom check"),
        }
    }
}

/// Builder for [`Rule`].
///
/// Path errors are held until [`RuleBuilder::build`] so registrations read as
/// one chain.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    /// Rule name.
    name: String,
    /// Governing keys.
    governing: Vec<VariantKey>,
    /// Applicability condition.
    when: Condition,
    /// Expectations.
    expect: Vec<Expectation>,
    /// Custom check, replacing the declarative form.
    custom: Option<CustomCheck>,
    /// First registration error encountered.
    error: Option<RegistryError>,
}

impl RuleBuilder {
    /// Records the first error only.
    fn fail(&mut self, error: RegistryError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Parses a path, recording failures.
    fn path(&mut self, text: &str) -> Option<FieldPath> {
        match parse_path(text) {
            Ok(path) => Some(path),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    /// Runs the rule only while `path = value` is active.
    #[must_use]
    pub fn governed_by(mut self, path: &str, value: impl Into<Scalar>) -> Self {
        match VariantKey::new(path, value) {
            Ok(key) => self.governing.push(key),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Sets the applicability condition.
    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.when = condition;
        self
    }

    /// Expects `path` to be non-empty.
    #[must_use]
    pub fn expect_non_empty(mut self, path: &str, message: &str) -> Self {
        if let Some(path) = self.path(path) {
            self.expect.push(Expectation::NonEmpty {
                path,
                message: message.to_string(),
            });
        }
        self
    }

    /// Expects `path` to be absent or null.
    #[must_use]
    pub fn expect_absent(mut self, path: &str, message: &str) -> Self {
        if let Some(path) = self.path(path) {
            self.expect.push(Expectation::Absent {
                path,
                message: message.to_string(),
            });
        }
        self
    }

    /// Expects `path` to equal `value`.
    #[must_use]
    pub fn expect_equals(mut self, path: &str, value: impl Into<Scalar>, message: &str) -> Self {
        if let Some(path) = self.path(path) {
            self.expect.push(Expectation::Equals {
                path,
                value: value.into(),
                message: message.to_string(),
            });
        }
        self
    }

    /// Expects a present value at `path` to be one of `allowed`.
    #[must_use]
    pub fn expect_one_of<V: Into<Scalar>>(mut self, path: &str, allowed: impl IntoIterator<Item = V>) -> Self {
        if let Some(path) = self.path(path) {
            let allowed: Vec<Scalar> = allowed.into_iter().map(Into::into).collect();
            if allowed.is_empty() {
                self.fail(RegistryError::EmptyEnum(path.to_string()));
            } else {
                self.expect.push(Expectation::OneOf {
                    path,
                    allowed,
                });
            }
        }
        self
    }

    /// Expects at most one of `paths` to hold a value.
    #[must_use]
    pub fn expect_at_most_one<'a>(mut self, paths: impl IntoIterator<Item = &'a str>) -> Self {
        let parsed: Vec<FieldPath> = paths.into_iter().filter_map(|text| self.path(text)).collect();
        self.expect.push(Expectation::AtMostOne {
            paths: parsed,
        });
        self
    }

    /// Replaces the declarative form with a custom function.
    #[must_use]
    pub fn custom(mut self, check: CustomCheck) -> Self {
        self.custom = Some(check);
        self
    }

    /// Builds the rule.
    ///
    /// # Errors
    ///
    /// Returns the first path error recorded, or [`RegistryError::EmptyRule`]
    /// when neither expectations nor a custom check were supplied.
    pub fn build(self) -> Result<Rule, RegistryError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let check = match self.custom {
            Some(check) => RuleCheck::Custom(check),
            None if self.expect.is_empty() => return Err(RegistryError::EmptyRule(self.name)),
            None => RuleCheck::Declarative {
                when: self.when,
                expect: self.expect,
            },
        };
        Ok(Rule {
            name: self.name,
            governing: self.governing,
            check,
        })
    }
}

// ============================================================================
// SECTION: Rule Set
// ============================================================================

/// Rules of one schema, validated against its variant registry.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Rules in registration order.
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Builds a rule set.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRule`] for repeated names and
    /// [`RegistryError::UnknownGoverningVariant`] when a rule is governed by
    /// a variant `registry` does not register.
    pub fn new(rules: Vec<Rule>, registry: &VariantRegistry) -> Result<Self, RegistryError> {
        for (position, rule) in rules.iter().enumerate() {
            if rules[.. position].iter().any(|earlier| earlier.name == rule.name) {
                return Err(RegistryError::DuplicateRule(rule.name.clone()));
            }
            if let Some(key) = rule.governing.iter().find(|key| !registry.is_registered(key)) {
                return Err(RegistryError::UnknownGoverningVariant {
                    owner: rule.name.clone(),
                    key: key.to_string(),
                });
            }
        }
        Ok(Self {
            rules,
        })
    }

    /// Returns the rules.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluates every rule, aggregating all violations.
    #[must_use]
    pub fn evaluate(&self, config: &ConfigNode, active: &ActiveVariants) -> Diagnostics {
        self.rules.iter().flat_map(|rule| rule.evaluate(config, active)).collect()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use serde_json::json;

    use super::Condition;
    use super::Rule;
    use super::RuleSet;
    use crate::diagnostics::Violation;
    use crate::diagnostics::ViolationKind;
    use crate::error::RegistryError;
    use crate::path::FieldPath;
    use crate::registry::ActiveVariants;
    use crate::registry::Discriminator;
    use crate::registry::VariantDescriptor;
    use crate::registry::VariantKey;
    use crate::registry::VariantRegistry;
    use crate::value::ConfigNode;

    fn service_registry() -> VariantRegistry {
        let name = Discriminator::builder("name")
            .variant("slack", VariantDescriptor::default())
            .variant("webhook", VariantDescriptor::default())
            .build()
            .unwrap();
        VariantRegistry::new(vec![name]).unwrap()
    }

    #[test]
    fn declarative_rule_fires_only_when_condition_holds() {
        let rule = Rule::builder("custom_requires_script")
            .when(Condition::equals("operation", "custom").unwrap())
            .expect_non_empty("script", "custom operation requires script")
            .build()
            .unwrap();
        let active = ActiveVariants::default();
        let custom = ConfigNode::from(json!({"operation": "custom", "script": ""}));
        let violations = rule.evaluate(&custom, &active);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::CrossFieldInvariantViolated);
        assert_eq!(violations[0].message, "custom operation requires script");
        let sum = ConfigNode::from(json!({"operation": "sum"}));
        assert!(rule.evaluate(&sum, &active).is_empty());
    }

    #[test]
    fn governed_rule_is_isolated_to_its_variant() {
        let registry = service_registry();
        let rule = Rule::builder("slack_text")
            .governed_by("name", "slack")
            .expect_non_empty("message_text", "slack requires message_text")
            .build()
            .unwrap();
        let rules = RuleSet::new(vec![rule], &registry).unwrap();
        let webhook = ConfigNode::from(json!({"name": "webhook"}));
        assert!(rules.evaluate(&webhook, &registry.resolve_active_variants(&webhook)).is_empty());
        let slack = ConfigNode::from(json!({"name": "slack"}));
        assert_eq!(rules.evaluate(&slack, &registry.resolve_active_variants(&slack)).len(), 1);
    }

    #[test]
    fn unknown_governing_variant_is_rejected() {
        let rule = Rule::builder("teams")
            .governed_by("name", "teams")
            .expect_absent("uri", "no uri")
            .build()
            .unwrap();
        let result = RuleSet::new(vec![rule], &service_registry());
        assert!(matches!(result, Err(RegistryError::UnknownGoverningVariant { .. })));
    }

    #[test]
    fn builder_surfaces_path_errors_and_empty_rules() {
        let bad = Rule::builder("bad").expect_absent("a..b", "x").build();
        assert!(matches!(bad, Err(RegistryError::InvalidPath { .. })));
        let empty = Rule::builder("empty").build();
        assert!(matches!(empty, Err(RegistryError::EmptyRule(_))));
    }

    #[test]
    fn operator_allow_list_fans_out_and_enumerates() {
        let rule = Rule::builder("operators")
            .expect_one_of("conditional.expressions[*].operator", ["greater_than", "less_than"])
            .build()
            .unwrap();
        let config = ConfigNode::from(json!({"conditional": {"expressions": [
            {"operator": "greater_than"},
            {"operator": "percent_change_greater_than"}
        ]}}));
        let violations = rule.evaluate(&config, &ActiveVariants::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.to_string(), "conditional.expressions[1].operator");
        assert_eq!(violations[0].message, "value must be one of: [greater_than, less_than]");
    }

    #[test]
    fn custom_rules_are_normalized_to_cross_field_kind() {
        fn check(_: &ConfigNode, active: &ActiveVariants) -> Vec<Violation> {
            let key = VariantKey::new("name", "slack").unwrap();
            if active.contains(&key) {
                vec![Violation::new(FieldPath::root().child("uri"), ViolationKind::TypeMismatch, "custom")]
            } else {
                Vec::new()
            }
        }
        let registry = service_registry();
        let rule = Rule::builder("custom").custom(check).build().unwrap();
        let slack = ConfigNode::from(json!({"name": "slack"}));
        let violations = rule.evaluate(&slack, &registry.resolve_active_variants(&slack));
        assert_eq!(violations[0].kind, ViolationKind::CrossFieldInvariantViolated);
    }

    #[test]
    fn mutually_exclusive_fields_report_each_present_path() {
        let rule = Rule::builder("one_auth").expect_at_most_one(["token", "password"]).build().unwrap();
        let config = ConfigNode::from(json!({"token": "t", "password": "p"}));
        let violations = rule.evaluate(&config, &ActiveVariants::default());
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].message, "only one of [token, password] may be set");
    }
}

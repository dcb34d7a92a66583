// crates/resource-gate-core/src/constraints.rs
// ============================================================================
// Module: Constraint Evaluator
// Description: Required, forbidden, enum, and kind/length/range checks.
// Purpose: Walk a configuration against its active descriptors.
// Dependencies: crate::{defaults, diagnostics, error, path, registry, value}
// ============================================================================

//! ## Overview
//! The evaluator runs four passes in a fixed order: discriminator values,
//! required paths, forbidden paths, then enum and kind/length/range checks.
//! Descriptors are unioned across the base and every active variant.
//! Absence is reported once as "required" and never restated as an enum or
//! range failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::defaults::parent_is_object;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Violation;
use crate::diagnostics::ViolationKind;
use crate::error::RegistryError;
use crate::path::FieldPath;
use crate::registry::ActiveVariants;
use crate::registry::VariantDescriptor;
use crate::registry::VariantKey;
use crate::registry::VariantRegistry;
use crate::value::ConfigNode;
use crate::value::NodeKind;
use crate::value::Scalar;

// ============================================================================
// SECTION: Enum Constraints
// ============================================================================

/// Allowed value set for one path.
///
/// # Invariants
/// - `allowed` is non-empty and keeps declaration order for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstraint {
    /// Constrained path (may contain wildcards).
    pub path: FieldPath,
    /// Allowed values in declaration order.
    allowed: Vec<Scalar>,
}

impl EnumConstraint {
    /// Creates an enum constraint, dropping repeated values.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyEnum`] when `allowed` is empty.
    pub fn new(path: FieldPath, allowed: Vec<Scalar>) -> Result<Self, RegistryError> {
        if allowed.is_empty() {
            return Err(RegistryError::EmptyEnum(path.to_string()));
        }
        let mut unique: Vec<Scalar> = Vec::with_capacity(allowed.len());
        for value in allowed {
            if !unique.iter().any(|seen| seen.same_value(&value)) {
                unique.push(value);
            }
        }
        Ok(Self {
            path,
            allowed: unique,
        })
    }

    /// Returns the allowed values.
    #[must_use]
    pub fn allowed(&self) -> &[Scalar] {
        &self.allowed
    }

    /// Returns true when `value` is allowed.
    #[must_use]
    pub fn allows(&self, value: &Scalar) -> bool {
        self.allowed.iter().any(|allowed| allowed.same_value(value))
    }

    /// Renders the "value must be one of" message.
    #[must_use]
    pub fn message(&self) -> String {
        one_of_message(self.allowed.iter())
    }
}

/// Renders `value must be one of: [a, b, c]`.
pub(crate) fn one_of_message<'a>(values: impl Iterator<Item = &'a Scalar>) -> String {
    let rendered: Vec<String> = values.map(ToString::to_string).collect();
    format!("value must be one of: [{}]", rendered.join(", "))
}

// ============================================================================
// SECTION: Value Constraints
// ============================================================================

/// Kind, length, or range restriction on a present value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Node must have this kind. [`NodeKind::Number`] also accepts integers.
    Kind(NodeKind),
    /// Integer within an inclusive range.
    IntegerRange {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// String with a character count within bounds.
    StringLength {
        /// Minimum character count.
        min: usize,
        /// Maximum character count, if bounded.
        max: Option<usize>,
    },
    /// List with an item count within bounds.
    ListLength {
        /// Minimum item count.
        min: usize,
        /// Maximum item count, if bounded.
        max: Option<usize>,
    },
}

impl Constraint {
    /// Integer in `min ..= max`.
    #[must_use]
    pub const fn range(min: i64, max: i64) -> Self {
        Self::IntegerRange {
            min,
            max,
        }
    }

    /// Integer no smaller than `min`.
    #[must_use]
    pub const fn at_least(min: i64) -> Self {
        Self::IntegerRange {
            min,
            max: i64::MAX,
        }
    }

    /// String of at least one character.
    #[must_use]
    pub const fn non_empty_string() -> Self {
        Self::StringLength {
            min: 1,
            max: None,
        }
    }

    /// String of `min ..= max` characters.
    #[must_use]
    pub const fn string_length(min: usize, max: usize) -> Self {
        Self::StringLength {
            min,
            max: Some(max),
        }
    }

    /// List of at least `min` items.
    #[must_use]
    pub const fn min_items(min: usize) -> Self {
        Self::ListLength {
            min,
            max: None,
        }
    }

    /// Checks the constraint for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns a reason string when the bounds are inverted or the kind is
    /// unconstrainable.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Kind(NodeKind::Null) => Err("null is not a constrainable kind".to_string()),
            Self::Kind(_) => Ok(()),
            Self::IntegerRange {
                min,
                max,
            } if min > max => Err(format!("minimum {min} exceeds maximum {max}")),
            Self::StringLength {
                min,
                max: Some(max),
            }
            | Self::ListLength {
                min,
                max: Some(max),
            } if min > max => Err(format!("minimum {min} exceeds maximum {max}")),
            Self::IntegerRange {
                ..
            }
            | Self::StringLength {
                ..
            }
            | Self::ListLength {
                ..
            } => Ok(()),
        }
    }

    /// Checks a present, non-null node, returning the violation kind and
    /// message on failure.
    #[must_use]
    pub fn check(&self, node: &ConfigNode) -> Option<(ViolationKind, String)> {
        match self {
            Self::Kind(expected) => {
                let actual = node.kind();
                let matches = actual == *expected
                    || (*expected == NodeKind::Number && actual == NodeKind::Integer);
                (!matches).then(|| type_mismatch(*expected))
            }
            Self::IntegerRange {
                min,
                max,
            } => {
                if node.kind() != NodeKind::Integer {
                    return Some(type_mismatch(NodeKind::Integer));
                }
                let in_range =
                    node.as_scalar().and_then(Scalar::as_i64).is_some_and(|value| value >= *min && value <= *max);
                (!in_range).then(|| (ViolationKind::LengthOrRangeInvalid, range_message(*min, *max)))
            }
            Self::StringLength {
                min,
                max,
            } => {
                let Some(text) = node.as_str() else {
                    return Some(type_mismatch(NodeKind::String));
                };
                let count = text.chars().count();
                let in_range = count >= *min && max.is_none_or(|max| count <= max);
                (!in_range).then(|| (ViolationKind::LengthOrRangeInvalid, length_message("length", *min, *max)))
            }
            Self::ListLength {
                min,
                max,
            } => {
                let Some(items) = node.as_list() else {
                    return Some(type_mismatch(NodeKind::List));
                };
                let count = items.len();
                let in_range = count >= *min && max.is_none_or(|max| count <= max);
                (!in_range).then(|| (ViolationKind::LengthOrRangeInvalid, length_message("item count", *min, *max)))
            }
        }
    }

    /// Renders the constraint for reference documentation.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Kind(kind) => format!("kind: {kind}"),
            Self::IntegerRange {
                min,
                max,
            } => format!("integer, {}", range_message(*min, *max).trim_start_matches("must be ")),
            Self::StringLength {
                min,
                max,
            } => format!("string, {}", length_message("length", *min, *max)),
            Self::ListLength {
                min,
                max,
            } => format!("list, {}", length_message("item count", *min, *max)),
        }
    }
}

/// Builds a type mismatch result.
fn type_mismatch(expected: NodeKind) -> (ViolationKind, String) {
    (ViolationKind::TypeMismatch, format!("must be {}", expected.with_article()))
}

/// Renders an integer range message.
fn range_message(min: i64, max: i64) -> String {
    if max == i64::MAX { format!("must be at least {min}") } else { format!("must be between {min} and {max}") }
}

/// Renders a length or item-count message.
fn length_message(subject: &str, min: usize, max: Option<usize>) -> String {
    match max {
        Some(max) if max == min => format!("{subject} must be exactly {min}"),
        Some(max) => format!("{subject} must be between {min} and {max}"),
        None => format!("{subject} must be at least {min}"),
    }
}

/// A constraint bound to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConstraint {
    /// Constrained path (may contain wildcards).
    pub path: FieldPath,
    /// Constraint applied to present values.
    pub constraint: Constraint,
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Applies a schema's base descriptor and active variant descriptors.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintEvaluator<'a> {
    /// Descriptor that is always active.
    base: &'a VariantDescriptor,
    /// Discriminators and their variants.
    registry: &'a VariantRegistry,
}

impl<'a> ConstraintEvaluator<'a> {
    /// Creates an evaluator over one schema's descriptors.
    #[must_use]
    pub const fn new(base: &'a VariantDescriptor, registry: &'a VariantRegistry) -> Self {
        Self {
            base,
            registry,
        }
    }

    /// Evaluates `config` against the base and every active descriptor.
    #[must_use]
    pub fn evaluate(&self, config: &ConfigNode, active: &ActiveVariants) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.check_discriminators(config, &mut diagnostics);

        let mut descriptors: Vec<(Option<&VariantKey>, &VariantDescriptor)> = vec![(None, self.base)];
        descriptors.extend(self.registry.active_descriptors(active).into_iter().map(|(key, d)| (Some(key), d)));

        let defaulted: Vec<&FieldPath> =
            descriptors.iter().flat_map(|(_, descriptor)| descriptor.defaults()).map(|default| &default.path).collect();
        for (_, descriptor) in &descriptors {
            check_required(config, descriptor, &defaulted, &mut diagnostics);
        }
        for (key, descriptor) in &descriptors {
            check_forbidden(config, *key, descriptor, &mut diagnostics);
        }
        for (_, descriptor) in &descriptors {
            check_enums(config, descriptor, &mut diagnostics);
        }
        for (_, descriptor) in &descriptors {
            check_constraints(config, descriptor, &mut diagnostics);
        }
        diagnostics
    }

    /// Reports missing required discriminators and unregistered values.
    fn check_discriminators(&self, config: &ConfigNode, diagnostics: &mut Diagnostics) {
        for discriminator in self.registry.discriminators() {
            let path = discriminator.path();
            match config.get(path) {
                None | Some(ConfigNode::Null) => {
                    let defaults_here = discriminator.default_value().is_some() && parent_is_object(config, path);
                    if discriminator.is_required() && !defaults_here {
                        diagnostics.push(Violation::required(path.clone()));
                    }
                }
                Some(ConfigNode::Scalar(value)) => {
                    if discriminator.descriptor(value).is_none() {
                        diagnostics.push(Violation::new(
                            path.clone(),
                            ViolationKind::UnknownDiscriminatorValue,
                            one_of_message(discriminator.allowed_values().into_iter()),
                        ));
                    }
                }
                Some(node @ (ConfigNode::Object(_) | ConfigNode::List(_))) => {
                    diagnostics.push(Violation::new(
                        path.clone(),
                        ViolationKind::TypeMismatch,
                        format!("must be a scalar value, found {}", node.kind().with_article()),
                    ));
                }
            }
        }
    }
}

/// Reports required paths that are absent or null. A registered default
/// satisfies the requirement only where the injector can write it, that is
/// under an existing parent object.
fn check_required(
    config: &ConfigNode,
    descriptor: &VariantDescriptor,
    defaulted: &[&FieldPath],
    diagnostics: &mut Diagnostics,
) {
    for pattern in descriptor.required() {
        let has_default = defaulted.contains(&pattern);
        for path in config.expand(pattern) {
            if config.has_value(&path) || (has_default && parent_is_object(config, &path)) {
                continue;
            }
            diagnostics.push(Violation::required(path));
        }
    }
}

/// Reports forbidden paths that hold a value.
fn check_forbidden(
    config: &ConfigNode,
    key: Option<&VariantKey>,
    descriptor: &VariantDescriptor,
    diagnostics: &mut Diagnostics,
) {
    let message = key.map_or_else(|| "not allowed".to_string(), |key| format!("not allowed for variant {key}"));
    for pattern in descriptor.forbidden() {
        for path in config.expand(pattern) {
            if config.has_value(&path) {
                diagnostics.push(Violation::new(path, ViolationKind::FieldNotAllowedForVariant, message.clone()));
            }
        }
    }
}

/// Reports present values outside their enum.
fn check_enums(config: &ConfigNode, descriptor: &VariantDescriptor, diagnostics: &mut Diagnostics) {
    for constraint in descriptor.enums() {
        for path in config.expand(&constraint.path) {
            let Some(node) = config.get(&path).filter(|node| !node.is_null()) else {
                continue;
            };
            if !node.as_scalar().is_some_and(|value| constraint.allows(value)) {
                diagnostics.push(Violation::new(path, ViolationKind::EnumValueInvalid, constraint.message()));
            }
        }
    }
}

/// Reports present values failing a kind/length/range constraint.
fn check_constraints(config: &ConfigNode, descriptor: &VariantDescriptor, diagnostics: &mut Diagnostics) {
    for field in descriptor.constraints() {
        for path in config.expand(&field.path) {
            let Some(node) = config.get(&path).filter(|node| !node.is_null()) else {
                continue;
            };
            if let Some((kind, message)) = field.constraint.check(node) {
                diagnostics.push(Violation::new(path, kind, message));
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

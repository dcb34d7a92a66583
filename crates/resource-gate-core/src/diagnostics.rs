// crates/resource-gate-core/src/diagnostics.rs
// ============================================================================
// Module: Diagnostics Collector
// Description: Violation records and the aggregating collector.
// Purpose: Accumulate every violation of one validation pass, in order.
// Dependencies: crate::path, serde
// ============================================================================

//! ## Overview
//! Validation never stops at the first failure: every evaluator appends to a
//! [`Diagnostics`] collector and the caller receives the full list. The
//! collector drops exact duplicates and, once a path has been reported as
//! missing, suppresses later reports at that same path (they can only
//! restate the absence).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::path::FieldPath;

// ============================================================================
// SECTION: Violation Kinds
// ============================================================================

/// Classification of a reported violation.
///
/// # Invariants
/// - Variants and their labels are stable; callers key rendering off them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required field is absent or null.
    RequiredFieldMissing,
    /// A field is set although the active variant forbids it.
    FieldNotAllowedForVariant,
    /// A value is outside its allowed enumeration.
    EnumValueInvalid,
    /// A string/list length or numeric value is out of range.
    LengthOrRangeInvalid,
    /// A value has the wrong node kind.
    TypeMismatch,
    /// A rule spanning several fields does not hold.
    CrossFieldInvariantViolated,
    /// An immutable field differs from the stored prior state.
    ImmutableFieldChanged,
    /// A discriminator holds a value with no registered variant.
    UnknownDiscriminatorValue,
}

impl ViolationKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequiredFieldMissing => "required_field_missing",
            Self::FieldNotAllowedForVariant => "field_not_allowed_for_variant",
            Self::EnumValueInvalid => "enum_value_invalid",
            Self::LengthOrRangeInvalid => "length_or_range_invalid",
            Self::TypeMismatch => "type_mismatch",
            Self::CrossFieldInvariantViolated => "cross_field_invariant_violated",
            Self::ImmutableFieldChanged => "immutable_field_changed",
            Self::UnknownDiscriminatorValue => "unknown_discriminator_value",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Violation
// ============================================================================

/// One reported constraint failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Concrete path of the offending attribute.
    pub path: FieldPath,
    /// Violation classification.
    pub kind: ViolationKind,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(path: FieldPath, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Creates a [`ViolationKind::RequiredFieldMissing`] violation.
    #[must_use]
    pub fn required(path: FieldPath) -> Self {
        Self::new(path, ViolationKind::RequiredFieldMissing, "required")
    }

    /// Creates a [`ViolationKind::CrossFieldInvariantViolated`] violation.
    #[must_use]
    pub fn cross_field(path: FieldPath, message: impl Into<String>) -> Self {
        Self::new(path, ViolationKind::CrossFieldInvariantViolated, message)
    }

    /// Returns this violation with `prefix` prepended to its path.
    #[must_use]
    pub fn rebased(mut self, prefix: &FieldPath) -> Self {
        self.path = prefix.join(&self.path);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

// ============================================================================
// SECTION: Collector
// ============================================================================

/// Ordered, de-duplicated list of violations from one validation pass.
///
/// # Invariants
/// - Insertion order is preserved.
/// - No two entries are equal.
/// - No entry follows a [`ViolationKind::RequiredFieldMissing`] entry for the same path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Violations in evaluation order.
    violations: Vec<Violation>,
    /// Paths already reported as missing.
    #[serde(skip)]
    missing: BTreeSet<FieldPath>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation. Returns false when it was dropped as redundant.
    pub fn push(&mut self, violation: Violation) -> bool {
        if self.missing.contains(&violation.path) || self.violations.contains(&violation) {
            return false;
        }
        if violation.kind == ViolationKind::RequiredFieldMissing {
            self.missing.insert(violation.path.clone());
        }
        self.violations.push(violation);
        true
    }

    /// Records every violation from an iterator.
    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        for violation in violations {
            self.push(violation);
        }
    }

    /// Merges another collector, prefixing each of its paths.
    pub fn absorb(&mut self, prefix: &FieldPath, other: Self) {
        self.extend(other.violations.into_iter().map(|violation| violation.rebased(prefix)));
    }

    /// Returns true when no violations were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the number of violations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.violations.len()
    }

    /// Iterates violations in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Returns the violations as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the collector, returning the violations.
    #[must_use]
    pub fn into_vec(self) -> Vec<Violation> {
        self.violations
    }

    /// Returns every violation reported at `path`.
    #[must_use]
    pub fn at(&self, path: &FieldPath) -> Vec<&Violation> {
        self.violations.iter().filter(|violation| &violation.path == path).collect()
    }

    /// Returns every violation of `kind`.
    #[must_use]
    pub fn of_kind(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.violations.iter().filter(|violation| violation.kind == kind).collect()
    }

    /// Returns per-kind violation counts.
    #[must_use]
    pub fn kind_counts(&self) -> BTreeMap<ViolationKind, usize> {
        let mut counts = BTreeMap::new();
        for violation in &self.violations {
            *counts.entry(violation.kind).or_insert(0) += 1;
        }
        counts
    }
}

impl IntoIterator for Diagnostics {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl FromIterator<Violation> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        let mut diagnostics = Self::new();
        diagnostics.extend(iter);
        diagnostics
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

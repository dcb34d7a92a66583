// crates/resource-gate-core/src/immutability.rs
// ============================================================================
// Module: Immutability Guard
// Description: Detects changes to fields that are fixed after creation.
// Purpose: Compare an update against the stored prior state.
// Dependencies: crate::{diagnostics, error, path, value}
// ============================================================================

//! ## Overview
//! A field declared immutable may not change across an update. Omission in
//! the new configuration means "keep the prior value" and a field missing
//! from the prior state was never fixed, so both are accepted. Only a
//! non-null value on each side that differs is reported. Because omission
//! keeps the prior value, [`carry_forward`] writes those prior values back
//! into the tree an update normalizes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::diagnostics::Diagnostics;
use crate::diagnostics::Violation;
use crate::diagnostics::ViolationKind;
use crate::error::RegistryError;
use crate::error::parse_path;
use crate::path::FieldPath;
use crate::value::ConfigNode;

/// Message attached to every immutability violation.
pub const IMMUTABLE_MESSAGE: &str = "field is immutable after resource creation";

// ============================================================================
// SECTION: Specs
// ============================================================================

/// A path that may not change after resource creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmutableFieldSpec {
    /// Guarded path (may contain wildcards).
    pub path: FieldPath,
}

impl ImmutableFieldSpec {
    /// Declares `path` immutable.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPath`] when the path does not parse.
    pub fn new(path: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            path: parse_path(path)?,
        })
    }
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Checks `new_config` against `prior` for every spec.
///
/// Wildcard specs expand over the new configuration and compare element by
/// element at the same index.
#[must_use]
pub fn check_immutable(new_config: &ConfigNode, prior: &ConfigNode, specs: &[ImmutableFieldSpec]) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    for spec in specs {
        for path in new_config.expand(&spec.path) {
            let Some(next) = new_config.get(&path).filter(|node| !node.is_null()) else {
                continue;
            };
            let Some(previous) = prior.get(&path).filter(|node| !node.is_null()) else {
                continue;
            };
            if !next.same_value(previous) {
                diagnostics.push(Violation::new(path, ViolationKind::ImmutableFieldChanged, IMMUTABLE_MESSAGE));
            }
        }
    }
    diagnostics
}

/// Returns a copy of `new_config` in which every immutable field the update
/// omitted (absent or null) holds its value from `prior`.
///
/// Wildcard specs expand over the prior state. An element the update dropped
/// from a list is not recreated.
#[must_use]
pub fn carry_forward(new_config: &ConfigNode, prior: &ConfigNode, specs: &[ImmutableFieldSpec]) -> ConfigNode {
    let mut carried = new_config.clone();
    for spec in specs {
        for path in prior.expand(&spec.path) {
            if let Some(previous) = prior.get(&path).filter(|node| !node.is_null()) {
                restore(&mut carried, &path, previous);
            }
        }
    }
    carried
}

/// Writes `previous` at `path` when the update left it unset. Returns true
/// when the value was written.
fn restore(config: &mut ConfigNode, path: &FieldPath, previous: &ConfigNode) -> bool {
    !config.has_value(path) && config.set(path, previous.clone()).is_ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use serde_json::json;

    use super::ImmutableFieldSpec;
    use super::carry_forward;
    use super::check_immutable;
    use crate::diagnostics::ViolationKind;
    use crate::value::ConfigNode;

    fn specs(paths: &[&str]) -> Vec<ImmutableFieldSpec> {
        paths.iter().map(|path| ImmutableFieldSpec::new(path).unwrap()).collect()
    }

    #[test]
    fn omission_is_not_a_change() {
        let prior = ConfigNode::from(json!({"a": "x"}));
        assert!(check_immutable(&ConfigNode::empty_object(), &prior, &specs(&["a"])).is_empty());
        assert!(check_immutable(&ConfigNode::from(json!({"a": null})), &prior, &specs(&["a"])).is_empty());
    }

    #[test]
    fn field_missing_from_prior_is_accepted() {
        let next = ConfigNode::from(json!({"a": "y"}));
        assert!(check_immutable(&next, &ConfigNode::empty_object(), &specs(&["a"])).is_empty());
    }

    #[test]
    fn changed_value_is_reported_once() {
        let prior = ConfigNode::from(json!({"a": "x"}));
        let next = ConfigNode::from(json!({"a": "y"}));
        let diagnostics = check_immutable(&next, &prior, &specs(&["a"]));
        assert_eq!(diagnostics.len(), 1);
        let violation = &diagnostics.as_slice()[0];
        assert_eq!(violation.kind, ViolationKind::ImmutableFieldChanged);
        assert_eq!(violation.path.to_string(), "a");
        assert_eq!(violation.message, "field is immutable after resource creation");
    }

    #[test]
    fn wildcard_specs_compare_per_element() {
        let prior = ConfigNode::from(json!({"inputs": [{"id": "a"}, {"id": "b"}]}));
        let next = ConfigNode::from(json!({"inputs": [{"id": "a"}, {"id": "c"}, {"id": "d"}]}));
        let diagnostics = check_immutable(&next, &prior, &specs(&["inputs[*].id"]));
        let paths: Vec<String> = diagnostics.iter().map(|violation| violation.path.to_string()).collect();
        assert_eq!(paths, vec!["inputs[1].id"]);
    }

    #[test]
    fn omitted_fields_keep_prior_values() {
        let prior = ConfigNode::from(json!({"a": "x", "b": 1, "inputs": [{"id": "p"}, {"id": "q"}]}));
        let next = ConfigNode::from(json!({"b": 2, "c": null, "inputs": [{}]}));
        let carried = carry_forward(&next, &prior, &specs(&["a", "b", "c", "inputs[*].id"]));
        assert_eq!(
            serde_json::Value::from(&carried),
            json!({"a": "x", "b": 2, "c": null, "inputs": [{"id": "p"}]})
        );
    }

    #[test]
    fn integral_float_matches_integer() {
        let prior = ConfigNode::from(json!({"port": 9092}));
        let next = ConfigNode::from(json!({"port": 9092.0}));
        assert!(check_immutable(&next, &prior, &specs(&["port"])).is_empty());
        let moved = ConfigNode::from(json!({"port": 9092.5}));
        assert_eq!(check_immutable(&moved, &prior, &specs(&["port"])).len(), 1);
    }
}

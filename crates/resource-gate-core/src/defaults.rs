// crates/resource-gate-core/src/defaults.rs
// ============================================================================
// Module: Default Injector
// Description: Fills unset optional fields with variant-specific defaults.
// Purpose: Produce the normalized configuration returned to callers.
// Dependencies: crate::{path, registry, value}
// ============================================================================

//! ## Overview
//! Defaults come from the schema base, every active variant, and the
//! discriminators themselves. The injector writes a default only where the
//! parent container already exists and the field is absent. An explicit
//! `null` is kept unless an active descriptor requires the field. The input
//! is never mutated, so diagnostics keep describing the caller's tree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::path::FieldPath;
use crate::registry::ActiveVariants;
use crate::registry::VariantDescriptor;
use crate::registry::VariantRegistry;
use crate::value::ConfigNode;
use crate::value::Scalar;

// ============================================================================
// SECTION: Injector
// ============================================================================

/// Applies one schema's defaults.
#[derive(Debug, Clone, Copy)]
pub struct DefaultInjector<'a> {
    /// Descriptor that is always active.
    base: &'a VariantDescriptor,
    /// Discriminators and their variants.
    registry: &'a VariantRegistry,
}

impl<'a> DefaultInjector<'a> {
    /// Creates an injector over one schema's descriptors.
    #[must_use]
    pub const fn new(base: &'a VariantDescriptor, registry: &'a VariantRegistry) -> Self {
        Self {
            base,
            registry,
        }
    }

    /// Returns a copy of `config` with defaults applied.
    #[must_use]
    pub fn apply(&self, config: &ConfigNode, active: &ActiveVariants) -> ConfigNode {
        let mut normalized = config.clone();
        let descriptors: Vec<&VariantDescriptor> = std::iter::once(self.base)
            .chain(self.registry.active_descriptors(active).into_iter().map(|(_, descriptor)| descriptor))
            .collect();
        let is_required = |pattern: &FieldPath| descriptors.iter().any(|descriptor| descriptor.requires(pattern));

        for discriminator in self.registry.discriminators() {
            if let Some(value) = discriminator.default_value() {
                let path = discriminator.path();
                fill(&mut normalized, path, value, discriminator.is_required());
            }
        }
        for descriptor in &descriptors {
            for default in descriptor.defaults() {
                let replace_null = is_required(&default.path);
                for path in normalized.expand(&default.path) {
                    fill(&mut normalized, &path, &default.value, replace_null);
                }
            }
        }
        normalized
    }
}

/// Writes `value` at a concrete `path` when it is absent (or null and
/// `replace_null` is set) and its parent object exists. Returns true when
/// the value was written.
fn fill(config: &mut ConfigNode, path: &FieldPath, value: &Scalar, replace_null: bool) -> bool {
    if !parent_is_object(config, path) {
        return false;
    }
    let vacant = match config.get(path) {
        None => true,
        Some(ConfigNode::Null) => replace_null,
        Some(_) => false,
    };
    vacant && config.set(path, ConfigNode::Scalar(value.clone())).is_ok()
}

/// Returns true when the parent of `path` is an object, which is the only
/// place a default can be written.
pub(crate) fn parent_is_object(config: &ConfigNode, path: &FieldPath) -> bool {
    path.parent().is_some_and(|parent| config.get(&parent).and_then(ConfigNode::as_object).is_some())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

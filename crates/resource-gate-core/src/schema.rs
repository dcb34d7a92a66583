// crates/resource-gate-core/src/schema.rs
// ============================================================================
// Module: Resource Schemas
// Description: Registration bundle for one resource type or sub-object.
// Purpose: Tie descriptors, discriminators, rules, immutables, and nested
//          schemas together and evaluate them as one unit.
// Dependencies: crate::{constraints, defaults, diagnostics, error,
//               immutability, path, registry, rules, value}
// ============================================================================

//! ## Overview
//! A [`ResourceSchema`] is static data built once at startup. Evaluation is
//! recursive: a nested schema mounted at `alert_payload.service` resolves its
//! own discriminators against that sub-tree, and its violations are rebased
//! onto the mount path. A mount may be governed by variant keys of the parent
//! (for example `auth` only under `name=webhook`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::constraints::ConstraintEvaluator;
use crate::defaults::DefaultInjector;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Violation;
use crate::diagnostics::ViolationKind;
use crate::error::RegistryError;
use crate::error::parse_path;
use crate::immutability::ImmutableFieldSpec;
use crate::immutability::carry_forward;
use crate::immutability::check_immutable;
use crate::path::FieldPath;
use crate::registry::ActiveVariants;
use crate::registry::Discriminator;
use crate::registry::VariantDescriptor;
use crate::registry::VariantKey;
use crate::registry::VariantRegistry;
use crate::rules::Rule;
use crate::rules::RuleSet;
use crate::value::ConfigNode;
use crate::value::Scalar;

// ============================================================================
// SECTION: Nested Mounts
// ============================================================================

/// A sub-schema evaluated against the sub-tree at `path`.
#[derive(Debug, Clone)]
pub struct NestedSchema {
    /// Mount path (wildcards mount once per list element).
    path: FieldPath,
    /// Parent variant keys that must all be active.
    governing: Vec<VariantKey>,
    /// Schema applied to the sub-tree.
    schema: Arc<ResourceSchema>,
}

impl NestedSchema {
    /// Returns the mount path.
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns the governing parent variant keys.
    #[must_use]
    pub fn governing(&self) -> &[VariantKey] {
        &self.governing
    }

    /// Returns the mounted schema.
    #[must_use]
    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }
}

// ============================================================================
// SECTION: Resource Schema
// ============================================================================

/// Everything registered for one resource type.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    /// Resource type name.
    name: String,
    /// One-line description for reference output.
    description: String,
    /// Descriptor that is always active.
    base: VariantDescriptor,
    /// Discriminators and their variants.
    registry: VariantRegistry,
    /// Cross-field rules.
    rules: RuleSet,
    /// Fields fixed after creation.
    immutables: Vec<ImmutableFieldSpec>,
    /// Sub-schemas.
    nested: Vec<NestedSchema>,
}

impl ResourceSchema {
    /// Starts a schema builder.
    #[must_use]
    pub fn builder(name: &str) -> ResourceSchemaBuilder {
        ResourceSchemaBuilder {
            name: name.to_string(),
            description: String::new(),
            base: VariantDescriptor::default(),
            discriminators: Vec::new(),
            rules: Vec::new(),
            immutables: Vec::new(),
            nested: Vec::new(),
            error: None,
        }
    }

    /// Returns the resource type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the base descriptor.
    #[must_use]
    pub const fn base(&self) -> &VariantDescriptor {
        &self.base
    }

    /// Returns the variant registry.
    #[must_use]
    pub const fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Returns the rule set.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the immutable field specs.
    #[must_use]
    pub fn immutables(&self) -> &[ImmutableFieldSpec] {
        &self.immutables
    }

    /// Returns the nested mounts.
    #[must_use]
    pub fn nested(&self) -> &[NestedSchema] {
        &self.nested
    }

    /// Resolves the variants `config` selects at this level.
    #[must_use]
    pub fn resolve_active_variants(&self, config: &ConfigNode) -> ActiveVariants {
        self.registry.resolve_active_variants(config)
    }

    /// Runs constraints, rules, and nested schemas over `config`.
    #[must_use]
    pub fn evaluate(&self, config: &ConfigNode) -> Diagnostics {
        let active = self.resolve_active_variants(config);
        let mut diagnostics = ConstraintEvaluator::new(&self.base, &self.registry).evaluate(config, &active);
        diagnostics.extend(self.rules.evaluate(config, &active));
        for mount in self.mounted(&active) {
            for path in config.expand(&mount.path) {
                match config.get(&path) {
                    None | Some(ConfigNode::Null) => {}
                    Some(node @ ConfigNode::Object(_)) => diagnostics.absorb(&path, mount.schema.evaluate(node)),
                    Some(node) => {
                        diagnostics.push(Violation::new(
                            path,
                            ViolationKind::TypeMismatch,
                            format!("must be an object, found {}", node.kind().with_article()),
                        ));
                    }
                }
            }
        }
        diagnostics
    }

    /// Returns a copy of `config` with this schema's and nested defaults applied.
    #[must_use]
    pub fn apply_defaults(&self, config: &ConfigNode) -> ConfigNode {
        let active = self.resolve_active_variants(config);
        let mut normalized = DefaultInjector::new(&self.base, &self.registry).apply(config, &active);
        let active = self.resolve_active_variants(&normalized);
        for mount in self.mounted(&active) {
            for path in normalized.expand(&mount.path) {
                if let Some(sub) = normalized.get_mut(&path).filter(|node| node.as_object().is_some()) {
                    let filled = mount.schema.apply_defaults(sub);
                    *sub = filled;
                }
            }
        }
        normalized
    }

    /// Compares `new_config` with `prior` for this schema's and nested
    /// immutable fields.
    #[must_use]
    pub fn check_immutable(&self, new_config: &ConfigNode, prior: &ConfigNode) -> Diagnostics {
        let mut diagnostics = check_immutable(new_config, prior, &self.immutables);
        let active = self.resolve_active_variants(new_config);
        for mount in self.mounted(&active) {
            for path in new_config.expand(&mount.path) {
                if let (Some(next), Some(previous)) = (new_config.get(&path), prior.get(&path)) {
                    diagnostics.absorb(&path, mount.schema.check_immutable(next, previous));
                }
            }
        }
        diagnostics
    }

    /// Returns a copy of `new_config` where immutable fields the update
    /// omitted keep their prior values, in this schema and nested ones.
    #[must_use]
    pub fn carry_immutables(&self, new_config: &ConfigNode, prior: &ConfigNode) -> ConfigNode {
        let mut carried = carry_forward(new_config, prior, &self.immutables);
        let active = self.resolve_active_variants(&carried);
        for mount in self.mounted(&active) {
            for path in carried.expand(&mount.path) {
                let Some(previous) = prior.get(&path).filter(|node| node.as_object().is_some()) else {
                    continue;
                };
                if let Some(sub) = carried.get_mut(&path).filter(|node| node.as_object().is_some()) {
                    let kept = mount.schema.carry_immutables(sub, previous);
                    *sub = kept;
                }
            }
        }
        carried
    }

    /// Returns the mounts whose governing keys are all active.
    fn mounted<'a>(&'a self, active: &'a ActiveVariants) -> impl Iterator<Item = &'a NestedSchema> + 'a {
        self.nested.iter().filter(|mount| active.contains_all(&mount.governing))
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`ResourceSchema`].
#[derive(Debug, Clone)]
pub struct ResourceSchemaBuilder {
    /// Resource type name.
    name: String,
    /// Description.
    description: String,
    /// Base descriptor.
    base: VariantDescriptor,
    /// Discriminators.
    discriminators: Vec<Discriminator>,
    /// Rules.
    rules: Vec<Rule>,
    /// Immutable specs.
    immutables: Vec<ImmutableFieldSpec>,
    /// Nested mounts.
    nested: Vec<NestedSchema>,
    /// First registration error encountered.
    error: Option<RegistryError>,
}

impl ResourceSchemaBuilder {
    /// Records the first error only.
    fn fail(&mut self, error: RegistryError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the always-active base descriptor.
    #[must_use]
    pub fn base(mut self, base: VariantDescriptor) -> Self {
        self.base = base;
        self
    }

    /// Adds a discriminator.
    #[must_use]
    pub fn discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminators.push(discriminator);
        self
    }

    /// Adds a cross-field rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Declares `path` immutable after creation.
    #[must_use]
    pub fn immutable(mut self, path: &str) -> Self {
        match ImmutableFieldSpec::new(path) {
            Ok(spec) => self.immutables.push(spec),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Mounts `schema` at `path` unconditionally.
    #[must_use]
    pub fn nest(mut self, path: &str, schema: Arc<ResourceSchema>) -> Self {
        match parse_path(path) {
            Ok(path) => self.nested.push(NestedSchema {
                path,
                governing: Vec::new(),
                schema,
            }),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Mounts `schema` at `path` while `governing_path = value` is active.
    #[must_use]
    pub fn nest_for(
        mut self,
        path: &str,
        schema: Arc<ResourceSchema>,
        governing_path: &str,
        value: impl Into<Scalar>,
    ) -> Self {
        let path = match parse_path(path) {
            Ok(path) => path,
            Err(err) => {
                self.fail(err);
                return self;
            }
        };
        match VariantKey::new(governing_path, value) {
            Ok(key) => self.nested.push(NestedSchema {
                path,
                governing: vec![key],
                schema,
            }),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Validates and builds the schema.
    ///
    /// # Errors
    ///
    /// Returns the first recorded path error, or any [`RegistryError`]
    /// raised while validating discriminators, rules, and mounts.
    pub fn build(self) -> Result<ResourceSchema, RegistryError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let registry = VariantRegistry::new(self.discriminators)?;
        let rules = RuleSet::new(self.rules, &registry)?;
        for mount in &self.nested {
            if let Some(key) = mount.governing.iter().find(|key| !registry.is_registered(key)) {
                return Err(RegistryError::UnknownGoverningVariant {
                    owner: mount.path.to_string(),
                    key: key.to_string(),
                });
            }
        }
        Ok(ResourceSchema {
            name: self.name,
            description: self.description,
            base: self.base,
            registry,
            rules,
            immutables: self.immutables,
            nested: self.nested,
        })
    }
}

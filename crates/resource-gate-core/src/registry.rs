// crates/resource-gate-core/src/registry.rs
// ============================================================================
// Module: Variant Registry
// Description: Discriminators, variant keys, and variant descriptors.
// Purpose: Map discriminator values to the field shape they select.
// Dependencies: crate::{constraints, error, path, value}
// ============================================================================

//! ## Overview
//! A discriminator is a field whose value selects a variant: a set of
//! required, forbidden, defaulted, and enumerated fields. Variants are plain
//! data registered once at startup, so new shapes are added by registering a
//! descriptor rather than by new code paths. Several discriminators may be
//! active at once (`event_type=metric` together with `service.name=webhook`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::constraints::Constraint;
use crate::constraints::EnumConstraint;
use crate::constraints::FieldConstraint;
use crate::error::RegistryError;
use crate::error::parse_path;
use crate::path::FieldPath;
use crate::path::PathError;
use crate::value::ConfigNode;
use crate::value::Scalar;

// ============================================================================
// SECTION: Variant Keys
// ============================================================================

/// A discriminator path paired with one of its values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    /// Discriminator path.
    pub path: FieldPath,
    /// Discriminator value selecting the variant.
    pub value: Scalar,
}

impl VariantKey {
    /// Creates a variant key from a registered path and value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPath`] when the path does not parse.
    pub fn new(path: &str, value: impl Into<Scalar>) -> Result<Self, RegistryError> {
        Ok(Self {
            path: parse_path(path)?,
            value: value.into(),
        })
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.path, self.value)
    }
}

/// The variant keys selected by one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveVariants {
    /// Active keys in discriminator registration order.
    keys: Vec<VariantKey>,
}

impl ActiveVariants {
    /// Builds an active set from explicit keys.
    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = VariantKey>) -> Self {
        let mut active = Self::default();
        for key in keys {
            if !active.keys.contains(&key) {
                active.keys.push(key);
            }
        }
        active
    }

    /// Returns true when `key` is active.
    #[must_use]
    pub fn contains(&self, key: &VariantKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns true when every key in `keys` is active.
    #[must_use]
    pub fn contains_all(&self, keys: &[VariantKey]) -> bool {
        keys.iter().all(|key| self.contains(key))
    }

    /// Returns the active value of the discriminator at `path`.
    #[must_use]
    pub fn value_of(&self, path: &FieldPath) -> Option<&Scalar> {
        self.keys.iter().find(|key| &key.path == path).map(|key| &key.value)
    }

    /// Iterates active keys.
    pub fn iter(&self) -> std::slice::Iter<'_, VariantKey> {
        self.keys.iter()
    }

    /// Returns the number of active keys.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true when no variant is active.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ============================================================================
// SECTION: Variant Descriptors
// ============================================================================

/// A field default applied by the default injector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefault {
    /// Defaulted path (may contain wildcards).
    pub path: FieldPath,
    /// Default value.
    pub value: Scalar,
}

/// Field shape selected by one variant (or by a schema's base).
///
/// # Invariants
/// - `required` and `forbidden` are disjoint.
/// - Every enum lists at least one value; every default for an enumerated
///   path lies inside that enum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantDescriptor {
    /// Paths that must be present and non-null.
    required: Vec<FieldPath>,
    /// Paths that must be absent or null.
    forbidden: Vec<FieldPath>,
    /// Defaults for absent optional paths.
    defaults: Vec<FieldDefault>,
    /// Allowed value sets.
    enums: Vec<EnumConstraint>,
    /// Kind, length, and range constraints.
    constraints: Vec<FieldConstraint>,
}

impl VariantDescriptor {
    /// Starts a descriptor builder.
    #[must_use]
    pub fn builder() -> VariantDescriptorBuilder {
        VariantDescriptorBuilder::default()
    }

    /// Returns the required paths.
    #[must_use]
    pub fn required(&self) -> &[FieldPath] {
        &self.required
    }

    /// Returns the forbidden paths.
    #[must_use]
    pub fn forbidden(&self) -> &[FieldPath] {
        &self.forbidden
    }

    /// Returns the registered defaults.
    #[must_use]
    pub fn defaults(&self) -> &[FieldDefault] {
        &self.defaults
    }

    /// Returns the enum constraints.
    #[must_use]
    pub fn enums(&self) -> &[EnumConstraint] {
        &self.enums
    }

    /// Returns the kind/length/range constraints.
    #[must_use]
    pub fn constraints(&self) -> &[FieldConstraint] {
        &self.constraints
    }

    /// Returns true when `path` is required by this descriptor.
    #[must_use]
    pub fn requires(&self, path: &FieldPath) -> bool {
        self.required.contains(path)
    }
}

/// Builder for [`VariantDescriptor`] taking registration paths as text.
#[derive(Debug, Clone, Default)]
pub struct VariantDescriptorBuilder {
    /// Required path texts.
    required: Vec<String>,
    /// Forbidden path texts.
    forbidden: Vec<String>,
    /// Default entries.
    defaults: Vec<(String, Scalar)>,
    /// Enum entries.
    enums: Vec<(String, Vec<Scalar>)>,
    /// Constraint entries.
    constraints: Vec<(String, Constraint)>,
}

impl VariantDescriptorBuilder {
    /// Marks a path as required.
    #[must_use]
    pub fn require(mut self, path: &str) -> Self {
        self.required.push(path.to_string());
        self
    }

    /// Marks several paths as required.
    #[must_use]
    pub fn require_all<'a>(mut self, paths: impl IntoIterator<Item = &'a str>) -> Self {
        self.required.extend(paths.into_iter().map(str::to_string));
        self
    }

    /// Marks a path as forbidden.
    #[must_use]
    pub fn forbid(mut self, path: &str) -> Self {
        self.forbidden.push(path.to_string());
        self
    }

    /// Marks several paths as forbidden.
    #[must_use]
    pub fn forbid_all<'a>(mut self, paths: impl IntoIterator<Item = &'a str>) -> Self {
        self.forbidden.extend(paths.into_iter().map(str::to_string));
        self
    }

    /// Registers a default for an optional path.
    #[must_use]
    pub fn default_value(mut self, path: &str, value: impl Into<Scalar>) -> Self {
        self.defaults.push((path.to_string(), value.into()));
        self
    }

    /// Restricts a path to an allowed value set.
    #[must_use]
    pub fn one_of<V: Into<Scalar>>(mut self, path: &str, allowed: impl IntoIterator<Item = V>) -> Self {
        self.enums.push((path.to_string(), allowed.into_iter().map(Into::into).collect()));
        self
    }

    /// Attaches a kind/length/range constraint to a path.
    #[must_use]
    pub fn constrain(mut self, path: &str, constraint: Constraint) -> Self {
        self.constraints.push((path.to_string(), constraint));
        self
    }

    /// Validates the registration and builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a path is malformed, a path is both
    /// required and forbidden, an enum is empty, a default falls outside its
    /// enum, or a constraint is inconsistent.
    pub fn build(self) -> Result<VariantDescriptor, RegistryError> {
        let required = parse_unique(&self.required)?;
        let forbidden = parse_unique(&self.forbidden)?;
        if let Some(overlap) = required.iter().find(|path| forbidden.contains(path)) {
            return Err(RegistryError::RequiredForbiddenOverlap(overlap.to_string()));
        }

        let mut enums = Vec::with_capacity(self.enums.len());
        for (text, allowed) in self.enums {
            let path = parse_path(&text)?;
            enums.push(EnumConstraint::new(path, allowed)?);
        }

        let mut defaults = Vec::with_capacity(self.defaults.len());
        for (text, value) in self.defaults {
            let path = parse_path(&text)?;
            if let Some(constraint) = enums.iter().find(|constraint| constraint.path == path)
                && !constraint.allows(&value)
            {
                return Err(RegistryError::DefaultOutsideEnum {
                    path: text,
                    value: value.to_string(),
                });
            }
            defaults.push(FieldDefault {
                path,
                value,
            });
        }

        let mut constraints = Vec::with_capacity(self.constraints.len());
        for (text, constraint) in self.constraints {
            constraint.validate().map_err(|reason| RegistryError::InvalidConstraint {
                path: text.clone(),
                reason,
            })?;
            constraints.push(FieldConstraint {
                path: parse_path(&text)?,
                constraint,
            });
        }

        Ok(VariantDescriptor {
            required,
            forbidden,
            defaults,
            enums,
            constraints,
        })
    }
}

/// Parses path texts, dropping repeats while keeping first-seen order.
fn parse_unique(texts: &[String]) -> Result<Vec<FieldPath>, RegistryError> {
    let mut paths: Vec<FieldPath> = Vec::with_capacity(texts.len());
    for text in texts {
        let path = parse_path(text)?;
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    Ok(paths)
}

// ============================================================================
// SECTION: Discriminators
// ============================================================================

/// A field whose value selects one of several variants.
///
/// # Invariants
/// - The path is concrete and the variant values are unique.
/// - A default value, when present, names a registered variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    /// Discriminator path.
    path: FieldPath,
    /// Whether the discriminator must be set.
    required: bool,
    /// Value assumed when the discriminator is absent.
    default: Option<Scalar>,
    /// Registered variants in declaration order.
    variants: Vec<(Scalar, VariantDescriptor)>,
}

impl Discriminator {
    /// Starts a builder for the discriminator at `path`.
    #[must_use]
    pub fn builder(path: &str) -> DiscriminatorBuilder {
        DiscriminatorBuilder {
            path: path.to_string(),
            required: false,
            default: None,
            variants: Vec::new(),
        }
    }

    /// Returns the discriminator path.
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns true when the discriminator must be set.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the default value, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Scalar> {
        self.default.as_ref()
    }

    /// Returns the registered variants.
    #[must_use]
    pub fn variants(&self) -> &[(Scalar, VariantDescriptor)] {
        &self.variants
    }

    /// Returns the registered values in declaration order.
    #[must_use]
    pub fn allowed_values(&self) -> Vec<&Scalar> {
        self.variants.iter().map(|(value, _)| value).collect()
    }

    /// Returns the descriptor registered for `value`.
    #[must_use]
    pub fn descriptor(&self, value: &Scalar) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|(candidate, _)| candidate.same_value(value)).map(|(_, descriptor)| descriptor)
    }

    /// Returns the value that selects a variant for `config`: the explicit
    /// scalar when set, else the default when the field is absent or null.
    #[must_use]
    pub fn effective_value<'a>(&'a self, config: &'a ConfigNode) -> Option<&'a Scalar> {
        match config.get(&self.path) {
            None | Some(ConfigNode::Null) => self.default.as_ref(),
            Some(node) => node.as_scalar(),
        }
    }
}

/// Builder for [`Discriminator`].
#[derive(Debug, Clone)]
pub struct DiscriminatorBuilder {
    /// Discriminator path text.
    path: String,
    /// Whether the discriminator must be set.
    required: bool,
    /// Default value.
    default: Option<Scalar>,
    /// Variants in declaration order.
    variants: Vec<(Scalar, VariantDescriptor)>,
}

impl DiscriminatorBuilder {
    /// Marks the discriminator as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the value assumed when the discriminator is absent.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Scalar>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Registers a variant.
    #[must_use]
    pub fn variant(mut self, value: impl Into<Scalar>, descriptor: VariantDescriptor) -> Self {
        self.variants.push((value.into(), descriptor));
        self
    }

    /// Validates and builds the discriminator.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] for a malformed or wildcard path, no
    /// variants, a repeated value, or a default naming no variant.
    pub fn build(self) -> Result<Discriminator, RegistryError> {
        let path = parse_path(&self.path)?;
        if !path.is_concrete() {
            return Err(RegistryError::invalid_path(&self.path, PathError::Wildcard(self.path.clone())));
        }
        if self.variants.is_empty() {
            return Err(RegistryError::EmptyDiscriminator(self.path));
        }
        for (position, (value, _)) in self.variants.iter().enumerate() {
            if self.variants[.. position].iter().any(|(earlier, _)| earlier == value) {
                return Err(RegistryError::DuplicateVariant {
                    path: self.path,
                    value: value.to_string(),
                });
            }
        }
        if let Some(default) = &self.default
            && !self.variants.iter().any(|(value, _)| value == default)
        {
            return Err(RegistryError::UnknownDefaultVariant {
                path: self.path,
                value: default.to_string(),
            });
        }
        Ok(Discriminator {
            path,
            required: self.required,
            default: self.default,
            variants: self.variants,
        })
    }
}

// ============================================================================
// SECTION: Variant Registry
// ============================================================================

/// All discriminators of one schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantRegistry {
    /// Discriminators in registration order.
    discriminators: Vec<Discriminator>,
}

impl VariantRegistry {
    /// Builds a registry, rejecting repeated discriminator paths.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateDiscriminator`] on a repeated path.
    pub fn new(discriminators: Vec<Discriminator>) -> Result<Self, RegistryError> {
        for (position, discriminator) in discriminators.iter().enumerate() {
            if discriminators[.. position].iter().any(|earlier| earlier.path == discriminator.path) {
                return Err(RegistryError::DuplicateDiscriminator(discriminator.path.to_string()));
            }
        }
        Ok(Self {
            discriminators,
        })
    }

    /// Returns the registered discriminators.
    #[must_use]
    pub fn discriminators(&self) -> &[Discriminator] {
        &self.discriminators
    }

    /// Resolves which variants `config` selects.
    ///
    /// Discriminators holding an unregistered value select nothing, so
    /// variant-specific checks for an unknown variant never run. The unknown
    /// value itself is reported by the constraint evaluator.
    #[must_use]
    pub fn resolve_active_variants(&self, config: &ConfigNode) -> ActiveVariants {
        let keys = self.discriminators.iter().filter_map(|discriminator| {
            let value = discriminator.effective_value(config)?;
            discriminator.descriptor(value)?;
            Some(VariantKey {
                path: discriminator.path.clone(),
                value: value.clone(),
            })
        });
        ActiveVariants::from_keys(keys)
    }

    /// Returns the descriptor registered for `key`.
    #[must_use]
    pub fn descriptor(&self, key: &VariantKey) -> Option<&VariantDescriptor> {
        self.discriminators
            .iter()
            .find(|discriminator| discriminator.path == key.path)
            .and_then(|discriminator| discriminator.descriptor(&key.value))
    }

    /// Returns true when `key` names a registered variant.
    #[must_use]
    pub fn is_registered(&self, key: &VariantKey) -> bool {
        self.descriptor(key).is_some()
    }

    /// Returns the descriptors selected by `active`, paired with their keys.
    #[must_use]
    pub fn active_descriptors<'a>(
        &'a self,
        active: &'a ActiveVariants,
    ) -> Vec<(&'a VariantKey, &'a VariantDescriptor)> {
        active.iter().filter_map(|key| self.descriptor(key).map(|descriptor| (key, descriptor))).collect()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

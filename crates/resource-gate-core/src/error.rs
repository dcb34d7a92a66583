// crates/resource-gate-core/src/error.rs
// ============================================================================
// Module: Registration Errors
// Description: Failures raised while building descriptors, rules, and schemas.
// Purpose: Reject malformed registrations at startup, never during evaluation.
// Dependencies: crate::path, thiserror
// ============================================================================

//! ## Overview
//! Schemas are static data built once per process. Every structural mistake
//! in that data surfaces here as a [`RegistryError`] so evaluation itself can
//! stay infallible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::path::PathError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while registering schema data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A registered path failed to parse.
    #[error("invalid path `{text}`: {source}")]
    InvalidPath {
        /// Path text as registered.
        text: String,
        /// Underlying parse failure.
        source: PathError,
    },
    /// A path is both required and forbidden by one descriptor.
    #[error("path `{0}` is both required and forbidden")]
    RequiredForbiddenOverlap(String),
    /// An enum constraint lists no allowed values.
    #[error("enum constraint on `{0}` has no allowed values")]
    EmptyEnum(String),
    /// A default value lies outside the enum registered for the same path.
    #[error("default for `{path}` is `{value}`, which is not an allowed value")]
    DefaultOutsideEnum {
        /// Defaulted path.
        path: String,
        /// Rejected default value.
        value: String,
    },
    /// Two discriminators share a path.
    #[error("discriminator `{0}` is registered twice")]
    DuplicateDiscriminator(String),
    /// Two variants share a discriminator value.
    #[error("discriminator `{path}` registers value `{value}` twice")]
    DuplicateVariant {
        /// Discriminator path.
        path: String,
        /// Repeated value.
        value: String,
    },
    /// A discriminator has no variants.
    #[error("discriminator `{0}` has no variants")]
    EmptyDiscriminator(String),
    /// A discriminator default does not name a registered variant.
    #[error("discriminator `{path}` defaults to unregistered value `{value}`")]
    UnknownDefaultVariant {
        /// Discriminator path.
        path: String,
        /// Default value.
        value: String,
    },
    /// A rule or nested schema is governed by a variant that was never registered.
    #[error("`{owner}` is governed by unregistered variant `{key}`")]
    UnknownGoverningVariant {
        /// Rule or mount name.
        owner: String,
        /// Rendered variant key.
        key: String,
    },
    /// Two rules share a name within one schema.
    #[error("rule `{0}` is registered twice")]
    DuplicateRule(String),
    /// Two schemas share a name within one catalog.
    #[error("schema `{0}` is registered twice")]
    DuplicateSchema(String),
    /// A rule was built without any expectation.
    #[error("rule `{0}` has no expectations")]
    EmptyRule(String),
    /// A constraint is internally inconsistent (for example `min > max`).
    #[error("invalid constraint on `{path}`: {reason}")]
    InvalidConstraint {
        /// Constrained path.
        path: String,
        /// Description of the inconsistency.
        reason: String,
    },
}

impl RegistryError {
    /// Wraps a path parse failure with the registered text.
    pub(crate) fn invalid_path(text: &str, source: PathError) -> Self {
        Self::InvalidPath {
            text: text.to_string(),
            source,
        }
    }
}

/// Parses a registered path, mapping failures into [`RegistryError`].
pub(crate) fn parse_path(text: &str) -> Result<crate::path::FieldPath, RegistryError> {
    crate::path::FieldPath::parse(text).map_err(|err| RegistryError::invalid_path(text, err))
}

// crates/resource-gate-catalog/src/catalog.rs
// ============================================================================
// Module: Schema Catalog
// Description: Named collection of resource schemas.
// Purpose: Look up schemas by resource type and host the built-in catalog.
// Dependencies: resource-gate-core, crate::{alert, destination, source}
// ============================================================================

//! ## Overview
//! A [`Catalog`] maps resource type names to schemas. The built-in catalog is
//! built once per process on first use and shared read-only afterwards, so
//! concurrent validations never contend on it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::LazyLock;

use resource_gate_core::CatalogAuditEvent;
use resource_gate_core::ConfigNode;
use resource_gate_core::RegistryError;
use resource_gate_core::ResourceSchema;
use resource_gate_core::ValidationAuditSink;
use resource_gate_core::ValidationReport;
use resource_gate_core::Validator;
use thiserror::Error;

use crate::alert::AlertFamily;
use crate::alert::alert_schema;
use crate::destination::destination_schema;
use crate::source::source_schema;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog failed to build.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// No schema is registered under the requested name.
    #[error("unknown resource type `{0}`")]
    UnknownResource(String),
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Built-in catalog, built on first access.
static BUILTIN: LazyLock<Result<Catalog, RegistryError>> = LazyLock::new(Catalog::build_builtin);

/// Resource schemas keyed by resource type name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Schemas in name order.
    schemas: BTreeMap<String, Arc<ResourceSchema>>,
}

impl Catalog {
    /// Builds a catalog from `schemas`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSchema`] when two schemas share a name.
    pub fn new(schemas: impl IntoIterator<Item = ResourceSchema>) -> Result<Self, RegistryError> {
        let mut catalog = Self::default();
        for schema in schemas {
            let name = schema.name().to_string();
            if catalog.schemas.contains_key(&name) {
                return Err(RegistryError::DuplicateSchema(name));
            }
            catalog.schemas.insert(name, Arc::new(schema));
        }
        Ok(catalog)
    }

    /// Returns the process-wide built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns the registration error if the built-in schemas are inconsistent.
    pub fn builtin() -> Result<&'static Self, RegistryError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Builds a fresh copy of the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a built-in registration is inconsistent.
    pub fn build_builtin() -> Result<Self, RegistryError> {
        Self::new([
            alert_schema(AlertFamily::Threshold)?,
            alert_schema(AlertFamily::Change)?,
            destination_schema()?,
            source_schema()?,
        ])
    }

    /// Returns the schema registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceSchema> {
        self.schemas.get(name).map(AsRef::as_ref)
    }

    /// Returns a shared handle to the schema registered under `name`.
    #[must_use]
    pub fn shared(&self, name: &str) -> Option<Arc<ResourceSchema>> {
        self.schemas.get(name).cloned()
    }

    /// Returns registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Returns registered schemas in name order.
    pub fn schemas(&self) -> impl Iterator<Item = &ResourceSchema> {
        self.schemas.values().map(AsRef::as_ref)
    }

    /// Returns the number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Records a catalog event listing the registered resource types.
    pub fn announce(&self, sink: &dyn ValidationAuditSink) {
        sink.record_catalog(&CatalogAuditEvent::new(self.names().map(str::to_string).collect()));
    }

    /// Validates a new resource of type `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownResource`] when `resource` is not registered.
    pub fn validate_create(
        &self,
        validator: &Validator,
        resource: &str,
        config: &ConfigNode,
    ) -> Result<ValidationReport, CatalogError> {
        let schema = self.lookup(resource)?;
        Ok(validator.validate_create(schema, config))
    }

    /// Validates a change to an existing resource of type `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownResource`] when `resource` is not registered.
    pub fn validate_update(
        &self,
        validator: &Validator,
        resource: &str,
        config: &ConfigNode,
        prior: &ConfigNode,
    ) -> Result<ValidationReport, CatalogError> {
        let schema = self.lookup(resource)?;
        Ok(validator.validate_update(schema, config, prior))
    }

    /// Resolves a schema or reports the unknown name.
    fn lookup(&self, resource: &str) -> Result<&ResourceSchema, CatalogError> {
        self.get(resource).ok_or_else(|| CatalogError::UnknownResource(resource.to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use resource_gate_core::RegistryError;
    use resource_gate_core::ResourceSchema;

    use super::Catalog;

    #[test]
    fn duplicate_names_are_rejected() {
        let first = ResourceSchema::builder("dup").build().unwrap();
        let second = ResourceSchema::builder("dup").build().unwrap();
        let error = Catalog::new([first, second]).unwrap_err();
        assert_eq!(error, RegistryError::DuplicateSchema("dup".to_string()));
    }

    #[test]
    fn builtin_is_built_once() {
        let first = Catalog::builtin().unwrap();
        let second = Catalog::builtin().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(
            first.names().collect::<Vec<_>>(),
            vec!["change_alert", "destination", "source", "threshold_alert"]
        );
    }
}

// crates/resource-gate-catalog/src/lib.rs
// ============================================================================
// Module: Resource Gate Catalog
// Description: Built-in resource schemas and their reference documentation.
// Purpose: Register alerts, destinations, and sources with the core engine.
// Dependencies: resource-gate-core, thiserror
// ============================================================================

//! ## Overview
//! The catalog is the declarative half of Resource Gate: every built-in
//! resource type is a [`resource_gate_core::ResourceSchema`] assembled here
//! from descriptors, discriminators, and rules. [`Catalog::builtin`] exposes
//! the shared instance; [`reference_markdown`] renders it for publishing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod alert;
pub mod auth;
pub mod catalog;
pub mod destination;
pub mod docs;
mod kafka;
pub mod service;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use alert::AlertFamily;
pub use alert::alert_schema;
pub use auth::auth_schema;
pub use catalog::Catalog;
pub use catalog::CatalogError;
pub use destination::destination_schema;
pub use docs::DocsError;
pub use docs::reference_markdown;
pub use docs::verify_reference;
pub use docs::write_reference;
pub use service::service_schema;
pub use source::source_schema;

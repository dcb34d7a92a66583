// crates/resource-gate-config/src/lib.rs
// ============================================================================
// Module: Resource Gate Config Library
// Description: Engine config model and strict validation.
// Purpose: Single source of truth for resource-gate.toml semantics.
// Dependencies: resource-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `resource-gate-config` loads `resource-gate.toml`, validates it fail-closed,
//! and turns it into the parse limits and audit sink used by the engine.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;

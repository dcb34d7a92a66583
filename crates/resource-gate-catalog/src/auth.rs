// crates/resource-gate-catalog/src/auth.rs
// ============================================================================
// Module: Auth Schema
// Description: Credential block shared by webhook services and HTTP sinks.
// Purpose: Register the `strategy` variants and their credential rules.
// Dependencies: resource-gate-core
// ============================================================================

//! ## Overview
//! The auth block is keyed by `strategy`, which defaults to `none`. Each
//! strategy requires its own credential fields and forbids the others, so a
//! token left behind after switching to basic auth is reported instead of
//! silently ignored.

use resource_gate_core::Discriminator;
use resource_gate_core::RegistryError;
use resource_gate_core::ResourceSchema;
use resource_gate_core::Rule;
use resource_gate_core::VariantDescriptor;

/// Schema name of the auth block.
pub const AUTH_SCHEMA: &str = "auth";

/// Builds the auth sub-schema.
///
/// # Errors
///
/// Returns [`RegistryError`] when the registration is inconsistent.
pub fn auth_schema() -> Result<ResourceSchema, RegistryError> {
    let strategy = Discriminator::builder("strategy")
        .default_value("none")
        .variant("none", VariantDescriptor::builder().forbid_all(["user", "password", "token"]).build()?)
        .variant("basic", VariantDescriptor::builder().require_all(["user", "password"]).forbid("token").build()?)
        .variant("bearer", VariantDescriptor::builder().require("token").forbid_all(["user", "password"]).build()?)
        .build()?;

    ResourceSchema::builder(AUTH_SCHEMA)
        .description("Credentials presented to an outbound HTTP endpoint.")
        .discriminator(strategy)
        .rule(
            Rule::builder("basic_credentials_non_empty")
                .governed_by("strategy", "basic")
                .expect_non_empty("user", "basic auth requires a non-empty user")
                .expect_non_empty("password", "basic auth requires a non-empty password")
                .build()?,
        )
        .rule(
            Rule::builder("bearer_token_non_empty")
                .governed_by("strategy", "bearer")
                .expect_non_empty("token", "bearer auth requires a non-empty token")
                .build()?,
        )
        .build()
}

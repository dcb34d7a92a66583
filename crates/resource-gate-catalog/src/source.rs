// crates/resource-gate-catalog/src/source.rs
// ============================================================================
// Module: Source Schema
// Description: Pipeline sources keyed by `type`.
// Purpose: Register Kafka, HTTP, and agent source shapes and identity fields.
// Dependencies: resource-gate-core, crate::kafka
// ============================================================================

//! ## Overview
//! Sources feed events into a pipeline. `type` and `shared_source_id`
//! identify the stream and cannot change once the source exists.
//! `shared_source_id` links agent and HTTP sources to a shared collector;
//! Kafka sources consume their own topics and never share.

use resource_gate_core::Constraint;
use resource_gate_core::Discriminator;
use resource_gate_core::NodeKind;
use resource_gate_core::RegistryError;
use resource_gate_core::ResourceSchema;
use resource_gate_core::VariantDescriptor;

use crate::kafka::sasl_credentials_rule;
use crate::kafka::with_brokers;
use crate::kafka::with_sasl;

/// Resource type name of sources.
pub const SOURCE_SCHEMA: &str = "source";

/// Builds the source schema.
///
/// # Errors
///
/// Returns [`RegistryError`] when the registration is inconsistent.
pub fn source_schema() -> Result<ResourceSchema, RegistryError> {
    let kafka = with_sasl(with_brokers(VariantDescriptor::builder()))
        .require_all(["topics", "group_id"])
        .constrain("topics", Constraint::min_items(1))
        .constrain("topics[*]", Constraint::non_empty_string())
        .constrain("group_id", Constraint::non_empty_string())
        .forbid("shared_source_id")
        .build()?;
    let http = VariantDescriptor::builder()
        .one_of("decoding", ["json", "ndjson", "text", "auto"])
        .default_value("decoding", "auto")
        .forbid_all(["brokers", "topics", "group_id", "sasl"])
        .build()?;
    let agent = VariantDescriptor::builder().forbid_all(["brokers", "topics", "group_id", "sasl", "decoding"]).build()?;

    let kind = Discriminator::builder("type")
        .required()
        .variant("kafka", kafka)
        .variant("http", http)
        .variant("agent", agent)
        .build()?;

    let base = VariantDescriptor::builder()
        .default_value("capture_metadata", false)
        .constrain("capture_metadata", Constraint::Kind(NodeKind::Bool))
        .build()?;

    ResourceSchema::builder(SOURCE_SCHEMA)
        .description("Event source feeding a pipeline.")
        .base(base)
        .discriminator(kind)
        .rule(sasl_credentials_rule("type")?)
        .immutable("type")
        .immutable("shared_source_id")
        .build()
}

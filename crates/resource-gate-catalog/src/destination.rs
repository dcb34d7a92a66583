// crates/resource-gate-catalog/src/destination.rs
// ============================================================================
// Module: Destination Schema
// Description: Pipeline sinks keyed by `type`.
// Purpose: Register HTTP, log analysis, and Kafka sink shapes.
// Dependencies: resource-gate-core, crate::{auth, kafka, service}
// ============================================================================

//! ## Overview
//! A destination forwards events from its `inputs` to one sink. The sink
//! kind is fixed at creation; changing it means creating a new destination.

use std::sync::Arc;

use resource_gate_core::Constraint;
use resource_gate_core::Discriminator;
use resource_gate_core::RegistryError;
use resource_gate_core::ResourceSchema;
use resource_gate_core::VariantDescriptor;

use crate::auth::auth_schema;
use crate::kafka::sasl_credentials_rule;
use crate::kafka::with_brokers;
use crate::kafka::with_sasl;
use crate::service::LOG_ANALYSIS_HOST;

/// Resource type name of destinations.
pub const DESTINATION_SCHEMA: &str = "destination";

/// Builds the destination schema.
///
/// # Errors
///
/// Returns [`RegistryError`] when the registration is inconsistent.
pub fn destination_schema() -> Result<ResourceSchema, RegistryError> {
    let http = VariantDescriptor::builder()
        .require_all(["uri", "encoding", "compression"])
        .one_of("encoding", ["json", "ndjson", "text"])
        .default_value("encoding", "json")
        .one_of("compression", ["none", "gzip"])
        .default_value("compression", "none")
        .forbid_all(["ingestion_key", "brokers", "topic", "sasl"])
        .build()?;
    let log_analysis = VariantDescriptor::builder()
        .require("ingestion_key")
        .default_value("host", LOG_ANALYSIS_HOST)
        .forbid_all(["uri", "auth", "brokers", "topic", "sasl"])
        .build()?;
    let kafka = with_sasl(with_brokers(VariantDescriptor::builder()))
        .require("topic")
        .constrain("topic", Constraint::non_empty_string())
        .forbid_all(["uri", "auth", "ingestion_key"])
        .build()?;

    let kind = Discriminator::builder("type")
        .required()
        .variant("http", http)
        .variant("log_analysis", log_analysis)
        .variant("kafka", kafka)
        .build()?;

    let base = VariantDescriptor::builder()
        .require("inputs")
        .constrain("inputs", Constraint::min_items(1))
        .constrain("inputs[*]", Constraint::non_empty_string())
        .build()?;

    ResourceSchema::builder(DESTINATION_SCHEMA)
        .description("Sink receiving events from one or more pipeline inputs.")
        .base(base)
        .discriminator(kind)
        .rule(sasl_credentials_rule("type")?)
        .immutable("type")
        .nest_for("auth", Arc::new(auth_schema()?), "type", "http")
        .build()
}

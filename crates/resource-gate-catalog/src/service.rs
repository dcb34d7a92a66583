// crates/resource-gate-catalog/src/service.rs
// ============================================================================
// Module: Notification Service Schema
// Description: Delivery target mounted under `alert_payload.service`.
// Purpose: Register per-provider field shapes for alert notifications.
// Dependencies: resource-gate-core, crate::auth
// ============================================================================

//! ## Overview
//! A notification service is keyed by `name`. Slack posts a message to an
//! incoming hook, webhook calls an arbitrary endpoint with optional auth,
//! pager duty raises an incident by routing key, and log analysis forwards
//! the event to the ingestion API.

use std::sync::Arc;

use resource_gate_core::Constraint;
use resource_gate_core::Discriminator;
use resource_gate_core::RegistryError;
use resource_gate_core::ResourceSchema;
use resource_gate_core::Rule;
use resource_gate_core::VariantDescriptor;

use crate::auth::auth_schema;

/// Schema name of the notification service block.
pub const SERVICE_SCHEMA: &str = "notification_service";

/// Default ingestion host for log analysis targets.
pub const LOG_ANALYSIS_HOST: &str = "logs.provider.com";

/// Builds the notification service sub-schema.
///
/// # Errors
///
/// Returns [`RegistryError`] when the registration is inconsistent.
pub fn service_schema() -> Result<ResourceSchema, RegistryError> {
    let slack = VariantDescriptor::builder()
        .require_all(["uri", "message_text"])
        .forbid_all(["auth", "method", "headers", "routing_key"])
        .build()?;
    let webhook = VariantDescriptor::builder()
        .require_all(["uri", "method"])
        .one_of("method", ["post", "put", "patch", "get", "delete"])
        .default_value("method", "post")
        .forbid("routing_key")
        .build()?;
    let pager_duty = VariantDescriptor::builder()
        .require_all(["routing_key", "severity", "event_action"])
        .one_of("severity", ["critical", "error", "warning", "info"])
        .default_value("severity", "critical")
        .one_of("event_action", ["trigger", "resolve"])
        .default_value("event_action", "trigger")
        .forbid_all(["uri", "auth"])
        .build()?;
    let log_analysis = VariantDescriptor::builder()
        .require("ingestion_key")
        .default_value("host", LOG_ANALYSIS_HOST)
        .constrain("host", Constraint::non_empty_string())
        .forbid_all(["uri", "auth"])
        .build()?;

    let name = Discriminator::builder("name")
        .required()
        .variant("slack", slack)
        .variant("webhook", webhook)
        .variant("pager_duty", pager_duty)
        .variant("log_analysis", log_analysis)
        .build()?;

    ResourceSchema::builder(SERVICE_SCHEMA)
        .description("Notification target invoked when an alert fires.")
        .discriminator(name)
        .rule(
            Rule::builder("slack_message_non_empty")
                .governed_by("name", "slack")
                .expect_non_empty("message_text", "slack notifications require a non-empty message_text")
                .build()?,
        )
        .nest_for("auth", Arc::new(auth_schema()?), "name", "webhook")
        .build()
}

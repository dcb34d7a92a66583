// crates/resource-gate-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Small schemas and assertions shared by integration tests.
// Purpose: Reduce duplication across resource-gate-core test suites.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;

use resource_gate_core::Condition;
use resource_gate_core::ConfigNode;
use resource_gate_core::Constraint;
use resource_gate_core::Diagnostics;
use resource_gate_core::Discriminator;
use resource_gate_core::FieldPath;
use resource_gate_core::RegistryError;
use resource_gate_core::ResourceSchema;
use resource_gate_core::Rule;
use resource_gate_core::VariantDescriptor;
use resource_gate_core::ViolationKind;
use serde_json::Value;

/// Result type used by every integration test.
pub type TestResult = Result<(), String>;

/// Builds a tree from a JSON literal.
pub fn node(value: Value) -> ConfigNode {
    ConfigNode::from(value)
}

/// Parses a path, mapping errors to strings.
pub fn path(text: &str) -> Result<FieldPath, String> {
    FieldPath::parse(text).map_err(|err| err.to_string())
}

/// Renders diagnostics as `path: message` lines.
pub fn rendered(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.iter().map(ToString::to_string).collect()
}

/// Fails unless `diagnostics` holds exactly one violation of `kind` at `at`.
pub fn expect_single(diagnostics: &Diagnostics, at: &str, kind: ViolationKind) -> TestResult {
    if diagnostics.len() != 1 {
        return Err(format!("expected one violation, got {:?}", rendered(diagnostics)));
    }
    let violation = &diagnostics.as_slice()[0];
    if violation.path.to_string() != at || violation.kind != kind {
        return Err(format!("unexpected violation {} ({})", violation, violation.kind));
    }
    Ok(())
}

/// Fails unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into()) }
}

/// Alert-like schema: `event_type` and `operation` couplings.
pub fn alert_schema() -> Result<ResourceSchema, RegistryError> {
    let event_type = Discriminator::builder("event_type")
        .required()
        .variant("log", VariantDescriptor::builder().require("event_timestamp").build()?)
        .variant("metric", VariantDescriptor::builder().forbid("event_timestamp").build()?)
        .build()?;
    let base = VariantDescriptor::builder()
        .require("operation")
        .one_of("operation", ["sum", "average", "count", "min", "max", "custom"])
        .default_value("window_type", "tumbling")
        .default_value("window_duration_minutes", 5_i64)
        .constrain("window_duration_minutes", Constraint::range(1, 1440))
        .build()?;
    ResourceSchema::builder("alert")
        .base(base)
        .discriminator(event_type)
        .rule(
            Rule::builder("custom_requires_script")
                .when(Condition::equals("operation", "custom")?)
                .expect_non_empty("script", "custom operation requires script")
                .build()?,
        )
        .rule(
            Rule::builder("script_only_for_custom")
                .when(Condition::all([
                    Condition::present("operation")?,
                    Condition::not(Condition::equals("operation", "custom")?),
                ]))
                .expect_absent("script", "script is only allowed for custom operation")
                .build()?,
        )
        .rule(
            Rule::builder("log_requires_custom")
                .governed_by("event_type", "log")
                .expect_equals("operation", "custom", "log events require operation custom")
                .build()?,
        )
        .build()
}

/// Auth sub-schema keyed by `strategy`.
pub fn auth_schema() -> Result<ResourceSchema, RegistryError> {
    let strategy = Discriminator::builder("strategy")
        .default_value("none")
        .variant("none", VariantDescriptor::builder().forbid_all(["user", "password", "token"]).build()?)
        .variant(
            "basic",
            VariantDescriptor::builder().require_all(["user", "password"]).forbid("token").build()?,
        )
        .variant(
            "bearer",
            VariantDescriptor::builder().require("token").forbid_all(["user", "password"]).build()?,
        )
        .build()?;
    ResourceSchema::builder("auth")
        .discriminator(strategy)
        .rule(
            Rule::builder("basic_credentials")
                .governed_by("strategy", "basic")
                .expect_non_empty("user", "basic auth requires user")
                .expect_non_empty("password", "basic auth requires password")
                .build()?,
        )
        .rule(
            Rule::builder("bearer_token")
                .governed_by("strategy", "bearer")
                .expect_non_empty("token", "bearer auth requires token")
                .build()?,
        )
        .build()
}

/// Service schema keyed by `service.name` with auth mounted for webhooks.
pub fn service_schema() -> Result<ResourceSchema, RegistryError> {
    let auth = Arc::new(auth_schema()?);
    let name = Discriminator::builder("service.name")
        .required()
        .variant(
            "slack",
            VariantDescriptor::builder().forbid_all(["auth", "service.method"]).build()?,
        )
        .variant(
            "webhook",
            VariantDescriptor::builder()
                .one_of("service.method", ["post", "put"])
                .default_value("service.method", "post")
                .build()?,
        )
        .build()?;
    ResourceSchema::builder("service")
        .discriminator(name)
        .rule(
            Rule::builder("slack_text")
                .governed_by("service.name", "slack")
                .expect_non_empty("service.message_text", "slack requires message_text")
                .build()?,
        )
        .rule(
            Rule::builder("webhook_no_text")
                .governed_by("service.name", "webhook")
                .expect_absent("service.message_text", "message_text is only allowed for slack")
                .build()?,
        )
        .nest_for("auth", auth, "service.name", "webhook")
        .build()
}

/// Broker-list schema with per-element host/port checks.
pub fn kafka_schema() -> Result<ResourceSchema, RegistryError> {
    let base = VariantDescriptor::builder()
        .require("brokers")
        .constrain("brokers", Constraint::min_items(1))
        .require_all(["brokers[*].host", "brokers[*].port"])
        .constrain("brokers[*].host", Constraint::non_empty_string())
        .constrain("brokers[*].port", Constraint::range(1, 65_535))
        .build()?;
    ResourceSchema::builder("kafka").base(base).build()
}

/// Source-like schema with immutable identity fields.
pub fn source_schema() -> Result<ResourceSchema, RegistryError> {
    let kind = Discriminator::builder("type")
        .variant("agent", VariantDescriptor::default())
        .variant("kafka", VariantDescriptor::builder().forbid("shared_source_id").build()?)
        .build()?;
    ResourceSchema::builder("source")
        .discriminator(kind)
        .base(VariantDescriptor::builder().default_value("capture_metadata", false).build()?)
        .immutable("type")
        .immutable("shared_source_id")
        .immutable("capture_metadata")
        .build()
}

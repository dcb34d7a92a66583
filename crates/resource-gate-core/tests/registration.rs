// crates/resource-gate-core/tests/registration.rs
// ============================================================================
// Module: Registration Tests
// Description: Schema builder invariants and nested mount wiring.
// Purpose: Ensure malformed registrations fail at build time.
// ============================================================================

//! Registration invariant tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;

use common::TestResult;
use common::ensure;
use common::node;
use common::rendered;
use resource_gate_core::Constraint;
use resource_gate_core::Discriminator;
use resource_gate_core::RegistryError;
use resource_gate_core::ResourceSchema;
use resource_gate_core::Rule;
use resource_gate_core::Validator;
use resource_gate_core::VariantDescriptor;
use resource_gate_core::ViolationKind;
use serde_json::json;

/// Fails unless `result` is an error whose message contains `needle`.
fn assert_invalid<T>(result: Result<T, RegistryError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid registration".to_string()),
    }
}

// ============================================================================
// SECTION: Builder Invariants
// ============================================================================

#[test]
fn required_and_forbidden_overlap_is_rejected() -> TestResult {
    let result = VariantDescriptor::builder().require_all(["uri", "auth"]).forbid("auth").build();
    assert_invalid(result, "both required and forbidden")
}

#[test]
fn empty_enum_is_rejected() -> TestResult {
    let result = VariantDescriptor::builder().one_of::<&str>("method", []).build();
    assert_invalid(result, "no allowed values")
}

#[test]
fn inverted_range_is_rejected() -> TestResult {
    let result = VariantDescriptor::builder().constrain("port", Constraint::range(10, 1)).build();
    assert_invalid(result, "minimum 10 exceeds maximum 1")
}

#[test]
fn discriminator_default_must_name_a_variant() -> TestResult {
    let result = Discriminator::builder("strategy")
        .default_value("oauth")
        .variant("none", VariantDescriptor::default())
        .build();
    assert_invalid(result, "unregistered value `oauth`")
}

#[test]
fn rule_names_must_be_unique() -> TestResult {
    let rule = || Rule::builder("same").expect_absent("script", "no script").build();
    let result = ResourceSchema::builder("r")
        .rule(rule().map_err(|err| err.to_string())?)
        .rule(rule().map_err(|err| err.to_string())?)
        .build();
    assert_invalid(result, "rule `same` is registered twice")
}

#[test]
fn nested_mount_must_be_governed_by_registered_variant() -> TestResult {
    let child = Arc::new(ResourceSchema::builder("child").build().map_err(|err| err.to_string())?);
    let result = ResourceSchema::builder("parent").nest_for("auth", child, "kind", "webhook").build();
    assert_invalid(result, "governed by unregistered variant `kind=webhook`")
}

#[test]
fn malformed_paths_surface_from_build() -> TestResult {
    assert_invalid(ResourceSchema::builder("r").immutable("a[").build(), "unterminated index")?;
    let child = Arc::new(ResourceSchema::builder("child").build().map_err(|err| err.to_string())?);
    assert_invalid(ResourceSchema::builder("r").nest("..", child).build(), "empty segment")
}

// ============================================================================
// SECTION: Nested Mounts
// ============================================================================

#[test]
fn wildcard_mounts_validate_each_element() -> TestResult {
    let broker = VariantDescriptor::builder()
        .require("host")
        .constrain("port", Constraint::range(1, 65_535))
        .build()
        .map_err(|err| err.to_string())?;
    let child = Arc::new(ResourceSchema::builder("broker").base(broker).build().map_err(|err| err.to_string())?);
    let schema = ResourceSchema::builder("cluster").nest("brokers[*]", child).build().map_err(|err| err.to_string())?;
    let config = node(json!({"brokers": [{"host": "a", "port": 1}, {"port": 0}, "bad"]}));
    let report = Validator::default().validate_create(&schema, &config);
    ensure(
        rendered(&report.diagnostics)
            == vec!["brokers[1].host: required", "brokers[1].port: must be between 1 and 65535", "brokers[2]: must be an object, found a string"],
        format!("got {:?}", rendered(&report.diagnostics)),
    )?;
    ensure(report.diagnostics.as_slice()[2].kind == ViolationKind::TypeMismatch, "expected type mismatch")
}

#[test]
fn nested_immutables_use_mount_prefix() -> TestResult {
    let destination = ResourceSchema::builder("inner").immutable("type").build().map_err(|err| err.to_string())?;
    let schema = ResourceSchema::builder("outer")
        .nest("sink", Arc::new(destination))
        .build()
        .map_err(|err| err.to_string())?;
    let prior = node(json!({"sink": {"type": "http"}}));
    let next = node(json!({"sink": {"type": "kafka"}}));
    let report = Validator::default().validate_update(&schema, &next, &prior);
    common::expect_single(&report.diagnostics, "sink.type", ViolationKind::ImmutableFieldChanged)
}

#[test]
fn discriminator_holding_an_object_is_a_type_mismatch() -> TestResult {
    let schema = common::alert_schema().map_err(|err| err.to_string())?;
    let config = node(json!({"event_type": {"name": "log"}, "operation": "sum"}));
    let report = Validator::default().validate_create(&schema, &config);
    common::expect_single(&report.diagnostics, "event_type", ViolationKind::TypeMismatch)
}

#[test]
fn missing_required_discriminator_is_reported_once() -> TestResult {
    let schema = common::alert_schema().map_err(|err| err.to_string())?;
    let report = Validator::default().validate_create(&schema, &node(json!({"operation": "sum"})));
    common::expect_single(&report.diagnostics, "event_type", ViolationKind::RequiredFieldMissing)
}

// crates/resource-gate-catalog/tests/pipeline.rs
// ============================================================================
// Module: Pipeline Catalog Tests
// Description: Destination and source registrations end to end.
// Purpose: Cover sink/source variants, Kafka fields, and identity fields.
// ============================================================================

//! Destination and source catalog tests.

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

use common::TestResult;
use common::agent_source;
use common::create;
use common::ensure;
use common::expect_lines;
use common::http_destination;
use common::kafka_destination;
use common::kafka_source;
use common::rendered;
use common::update;
use resource_gate_catalog::CatalogError;
use resource_gate_core::ConfigNode;
use resource_gate_core::Validator;
use resource_gate_core::ViolationKind;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Destinations
// ============================================================================

#[test]
fn http_destination_is_accepted_with_defaults() -> TestResult {
    let report = create("destination", http_destination())?;
    ensure(report.is_valid(), format!("got {:?}", rendered(&report)))?;
    let normalized = Value::from(&report.normalized);
    ensure(normalized["encoding"] == "json", "encoding default missing")?;
    ensure(normalized["compression"] == "none", "compression default missing")
}

#[test]
fn http_destination_rejects_unknown_encoding() -> TestResult {
    let mut destination = http_destination();
    destination["encoding"] = json!("xml");
    let report = create("destination", destination)?;
    expect_lines(&report, &["encoding: value must be one of: [json, ndjson, text]"])
}

#[test]
fn http_destination_bearer_auth_requires_token() -> TestResult {
    let mut destination = http_destination();
    destination["auth"] = json!({"strategy": "bearer", "user": "ops"});
    let report = create("destination", destination)?;
    expect_lines(&report, &["auth.token: required", "auth.user: not allowed for variant strategy=bearer"])
}

#[test]
fn log_analysis_destination_defaults_host_and_forbids_uri() -> TestResult {
    let report = create(
        "destination",
        json!({"type": "log_analysis", "inputs": ["edge-logs"], "ingestion_key": "k", "uri": "https://x.test"}),
    )?;
    expect_lines(&report, &["uri: not allowed for variant type=log_analysis"])?;
    ensure(Value::from(&report.normalized)["host"] == "logs.provider.com", "host default missing")
}

#[test]
fn kafka_destination_checks_each_broker() -> TestResult {
    let mut destination = kafka_destination();
    destination["brokers"] = json!([
        {"host": "broker-1", "port": 9092},
        {"host": "", "port": 70_000},
        {"port": 9093}
    ]);
    let report = create("destination", destination)?;
    expect_lines(
        &report,
        &[
            "brokers[2].host: required",
            "brokers[1].host: length must be at least 1",
            "brokers[1].port: must be between 1 and 65535",
        ],
    )
}

#[test]
fn kafka_sasl_requires_credentials() -> TestResult {
    let mut destination = kafka_destination();
    destination["sasl"] = json!({"mechanism": "scram-sha-256", "username": "svc"});
    let report = create("destination", destination.clone())?;
    expect_lines(&report, &["sasl.password: sasl requires a non-empty password"])?;

    destination["sasl"] = json!({"mechanism": "kerberos", "username": "svc", "password": "p"});
    let report = create("destination", destination)?;
    expect_lines(&report, &["sasl.mechanism: value must be one of: [plain, scram-sha-256, scram-sha-512]"])
}

#[test]
fn destination_requires_inputs_and_a_type() -> TestResult {
    let report = create("destination", json!({"inputs": []}))?;
    expect_lines(&report, &["type: required", "inputs: item count must be at least 1"])
}

#[test]
fn unknown_destination_type_lists_sinks() -> TestResult {
    let report = create("destination", json!({"type": "s3", "inputs": ["a"]}))?;
    expect_lines(&report, &["type: value must be one of: [http, log_analysis, kafka]"])
}

#[test]
fn destination_type_is_immutable() -> TestResult {
    let prior = http_destination();
    let report = update("destination", kafka_destination(), prior)?;
    let changed = report.diagnostics.of_kind(ViolationKind::ImmutableFieldChanged);
    ensure(changed.len() == 1, format!("got {:?}", rendered(&report)))?;
    ensure(changed[0].path.to_string() == "type", "immutable violation should be at type")?;
    ensure(changed[0].message == "field is immutable after resource creation", "unexpected message")
}

// ============================================================================
// SECTION: Sources
// ============================================================================

#[test]
fn kafka_source_forbids_shared_source_id() -> TestResult {
    let report = create("source", kafka_source())?;
    ensure(report.is_valid(), format!("got {:?}", rendered(&report)))?;

    let mut source = kafka_source();
    source["shared_source_id"] = json!("collector-7");
    source["topics"] = json!([]);
    let report = create("source", source)?;
    expect_lines(
        &report,
        &["shared_source_id: not allowed for variant type=kafka", "topics: item count must be at least 1"],
    )
}

#[test]
fn http_source_defaults_decoding_and_capture_metadata() -> TestResult {
    let report = create("source", json!({"type": "http"}))?;
    ensure(report.is_valid(), format!("got {:?}", rendered(&report)))?;
    ensure(
        Value::from(&report.normalized) == json!({"type": "http", "decoding": "auto", "capture_metadata": false}),
        "defaults missing",
    )
}

#[test]
fn shared_source_id_cannot_change_but_may_be_omitted() -> TestResult {
    let mut changed = agent_source();
    changed["shared_source_id"] = json!("collector-8");
    let report = update("source", changed, agent_source())?;
    expect_lines(&report, &["shared_source_id: field is immutable after resource creation"])?;

    let report = update("source", json!({"type": "agent"}), agent_source())?;
    ensure(report.is_valid(), format!("got {:?}", rendered(&report)))
}

#[test]
fn unknown_resource_type_is_an_error() -> TestResult {
    let catalog = common::catalog()?;
    let result = catalog.validate_create(&Validator::default(), "dashboard", &ConfigNode::from(json!({})));
    ensure(
        matches!(result, Err(CatalogError::UnknownResource(ref name)) if name == "dashboard"),
        "expected unknown resource error",
    )
}

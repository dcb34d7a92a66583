// crates/resource-gate-catalog/tests/common/mod.rs
// =============================================================================
// Module: Catalog Test Helpers
// Description: Valid baseline resources and report helpers.
// Purpose: Let each test start from an accepted config and change one thing.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use resource_gate_catalog::Catalog;
use resource_gate_core::ConfigNode;
use resource_gate_core::ValidationReport;
use resource_gate_core::Validator;
use serde_json::Value;
use serde_json::json;

/// Result type used by every integration test.
pub type TestResult = Result<(), String>;

/// Returns the built-in catalog.
pub fn catalog() -> Result<&'static Catalog, String> {
    Catalog::builtin().map_err(|err| err.to_string())
}

/// Validates `config` as a new `resource`.
pub fn create(resource: &str, config: Value) -> Result<ValidationReport, String> {
    catalog()?
        .validate_create(&Validator::default(), resource, &ConfigNode::from(config))
        .map_err(|err| err.to_string())
}

/// Validates `config` as an update of `prior`.
pub fn update(resource: &str, config: Value, prior: Value) -> Result<ValidationReport, String> {
    catalog()?
        .validate_update(&Validator::default(), resource, &ConfigNode::from(config), &ConfigNode::from(prior))
        .map_err(|err| err.to_string())
}

/// Renders a report's diagnostics as `path: message` lines.
pub fn rendered(report: &ValidationReport) -> Vec<String> {
    report.diagnostics.iter().map(ToString::to_string).collect()
}

/// Fails unless the report's lines equal `expected` exactly.
pub fn expect_lines(report: &ValidationReport, expected: &[&str]) -> TestResult {
    let actual = rendered(report);
    if actual == expected { Ok(()) } else { Err(format!("expected {expected:?}, got {actual:?}")) }
}

/// Fails unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into()) }
}

/// Accepted threshold alert with a slack notification.
pub fn threshold_alert() -> Value {
    json!({
        "name": "High error rate",
        "event_type": "metric",
        "operation": "sum",
        "conditional": {
            "expressions": [{"field": "errors", "operator": "greater_than", "value": 10}]
        },
        "alert_payload": {
            "service": {
                "name": "slack",
                "uri": "https://hooks.slack.test/T000",
                "message_text": "error rate is high"
            },
            "throttling": {"window_secs": 300, "threshold": 1}
        }
    })
}

/// Accepted change alert with a slack notification.
pub fn change_alert() -> Value {
    let mut alert = threshold_alert();
    alert["name"] = json!("Error rate jump");
    alert["conditional"]["expressions"][0]["operator"] = json!("percent_change_above");
    alert
}

/// Accepted HTTP destination.
pub fn http_destination() -> Value {
    json!({
        "type": "http",
        "inputs": ["edge-logs"],
        "uri": "https://sink.example.test/ingest"
    })
}

/// Accepted Kafka destination.
pub fn kafka_destination() -> Value {
    json!({
        "type": "kafka",
        "inputs": ["edge-logs"],
        "brokers": [{"host": "broker-1", "port": 9092}],
        "topic": "events"
    })
}

/// Accepted Kafka source.
pub fn kafka_source() -> Value {
    json!({
        "type": "kafka",
        "brokers": [{"host": "broker-1", "port": 9092}],
        "topics": ["events"],
        "group_id": "pipeline-a"
    })
}

/// Accepted agent source.
pub fn agent_source() -> Value {
    json!({"type": "agent", "shared_source_id": "collector-7"})
}

// crates/resource-gate-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and operators.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical `resource-gate.toml` example. The example parses and validates
//! under [`crate::GateConfig::from_toml_str`].

/// Returns a canonical example `resource-gate.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[limits]
max_input_bytes = 1048576
max_depth = 64
max_nodes = 100000

[audit]
sink = "file"
path = "resource-gate-audit.jsonl"
"#,
    )
}

//! Config load validation tests for resource-gate-config.
// crates/resource-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, syntax).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use resource_gate_config::ConfigError;
use resource_gate_config::GateConfig;
use resource_gate_config::config_toml_example;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<GateConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(GateConfig::load(Some(Path::new(&long_path))), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(GateConfig::load(Some(Path::new(&long_component))), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(GateConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(GateConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let result = GateConfig::load(Some(&dir.path().join("absent.toml")));
    if matches!(result, Err(ConfigError::Io(_))) { Ok(()) } else { Err("expected io error".to_string()) }
}

#[test]
fn load_rejects_unknown_keys() -> TestResult {
    let file = write_config(b"[limits]\nmax_depth = 8\nmax_width = 3\n")?;
    assert_invalid(GateConfig::load(Some(file.path())), "unknown field")?;
    let file = write_config(b"[server]\nport = 1\n")?;
    assert_invalid(GateConfig::load(Some(file.path())), "unknown field")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config(b"[limits\nmax_depth = 8\n")?;
    assert_invalid(GateConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let file = write_config(b"")?;
    let config = GateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.parse_limits() != resource_gate_core::ParseLimits::default() {
        return Err("default limits should match the engine defaults".to_string());
    }
    if config.source_modified_at.is_none() {
        return Err("source metadata should be recorded".to_string());
    }
    Ok(())
}

#[test]
fn canonical_example_is_valid() -> TestResult {
    let config = GateConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    if config.audit.path.as_deref() == Some("resource-gate-audit.jsonl") {
        Ok(())
    } else {
        Err("example audit path not parsed".to_string())
    }
}

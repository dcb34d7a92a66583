// crates/resource-gate-config/src/config.rs
// ============================================================================
// Module: Resource Gate Configuration
// Description: Configuration loading and validation for the validation engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: resource-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! It selects the parse limits applied to untrusted resource documents and
//! the sink that receives validation audit events. Unknown keys, limits
//! outside their hard bounds, and inconsistent audit settings fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use resource_gate_core::FileAuditSink;
use resource_gate_core::NoopAuditSink;
use resource_gate_core::ParseLimits;
use resource_gate_core::StderrAuditSink;
use resource_gate_core::ValidationAuditSink;
use resource_gate_core::Validator;
use resource_gate_core::value::DEFAULT_MAX_DEPTH;
use resource_gate_core::value::DEFAULT_MAX_INPUT_BYTES;
use resource_gate_core::value::DEFAULT_MAX_NODES;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "resource-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "RESOURCE_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Hard ceiling for `limits.max_input_bytes`.
pub const MAX_INPUT_BYTES_CEILING: usize = 64 * 1024 * 1024;
/// Hard ceiling for `limits.max_depth`.
pub const MAX_DEPTH_CEILING: usize = 256;
/// Hard ceiling for `limits.max_nodes`.
pub const MAX_NODES_CEILING: usize = 10_000_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Resource Gate engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Parse limits for resource documents.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Optional config source metadata (not serialized).
    #[serde(skip)]
    pub source_modified_at: Option<SystemTime>,
}

impl GateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then `RESOURCE_GATE_CONFIG`, then
    /// `resource-gate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_modified_at = fs::metadata(&resolved).and_then(|meta| meta.modified()).ok();
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.audit.validate()
    }

    /// Returns the parse limits for resource documents.
    #[must_use]
    pub const fn parse_limits(&self) -> ParseLimits {
        self.limits.to_parse_limits()
    }

    /// Opens the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn build_audit_sink(&self) -> Result<Arc<dyn ValidationAuditSink>, ConfigError> {
        self.audit.build_sink()
    }

    /// Builds a validator reporting to the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn validator(&self) -> Result<Validator, ConfigError> {
        Ok(Validator::new(self.build_audit_sink()?))
    }
}

/// Parse limits for resource documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum document size in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Maximum nesting depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of nodes.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_depth: default_max_depth(),
            max_nodes: default_max_nodes(),
        }
    }
}

impl LimitsConfig {
    /// Validates limits against their hard bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_bound("limits.max_input_bytes", self.max_input_bytes, MAX_INPUT_BYTES_CEILING)?;
        validate_bound("limits.max_depth", self.max_depth, MAX_DEPTH_CEILING)?;
        validate_bound("limits.max_nodes", self.max_nodes, MAX_NODES_CEILING)
    }

    /// Converts to the core parse limits.
    #[must_use]
    pub const fn to_parse_limits(&self) -> ParseLimits {
        ParseLimits {
            max_input_bytes: self.max_input_bytes,
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
        }
    }
}

/// Audit sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines), required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required when audit.sink is file".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only allowed when audit.sink is file".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Opens the selected sink.
    fn build_sink(&self) -> Result<Arc<dyn ValidationAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim())).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required when audit.sink is file".to_string()))
            }
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening the audit log.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a limit lies in `1..=ceiling`.
fn validate_bound(field: &str, value: usize, ceiling: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    if value > ceiling {
        return Err(ConfigError::Invalid(format!("{field} must be at most {ceiling}")));
    }
    Ok(())
}

/// Default document size limit.
const fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

/// Default nesting depth limit.
const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Default node count limit.
const fn default_max_nodes() -> usize {
    DEFAULT_MAX_NODES
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use std::path::Path;

    use super::MAX_PATH_COMPONENT_LENGTH;
    use super::MAX_TOTAL_PATH_LENGTH;
    use super::resolve_path;
    use super::validate_bound;
    use super::validate_path_string;

    #[test]
    fn explicit_path_wins_resolution() {
        let resolved = resolve_path(Some(Path::new("/etc/gate.toml"))).unwrap();
        assert_eq!(resolved, Path::new("/etc/gate.toml"));
    }

    #[test]
    fn path_strings_are_length_checked() {
        let long = "a".repeat(MAX_TOTAL_PATH_LENGTH + 1);
        assert!(validate_path_string("audit.path", &long).unwrap_err().to_string().contains("max length"));
        let component = format!("./{}", "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1));
        assert!(validate_path_string("audit.path", &component).unwrap_err().to_string().contains("component"));
        assert!(validate_path_string("audit.path", "   ").unwrap_err().to_string().contains("non-empty"));
    }

    #[test]
    fn bounds_reject_zero_and_excess() {
        assert!(validate_bound("limits.max_depth", 0, 8).is_err());
        assert!(validate_bound("limits.max_depth", 9, 8).is_err());
        assert!(validate_bound("limits.max_depth", 8, 8).is_ok());
    }
}

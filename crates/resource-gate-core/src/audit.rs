// crates/resource-gate-core/src/audit.rs
// ============================================================================
// Module: Validation Audit Logging
// Description: Structured audit events for validation calls.
// Purpose: Emit one JSON line per validation without logging config values.
// Dependencies: crate::{diagnostics, engine}, serde, serde_json
// ============================================================================

//! ## Overview
//! Every validation call produces one [`ValidationAuditEvent`]. Events carry
//! counts and attribute paths only: configuration values are never copied
//! into an event because they routinely hold credentials such as
//! `auth.password`. Sinks are pluggable so embedders can route events to
//! their own pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::diagnostics::ViolationKind;
use crate::engine::Operation;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Validation outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// No violations were reported.
    Accepted,
    /// At least one violation was reported.
    Rejected,
}

/// Audit payload for one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Resource type name.
    pub resource: String,
    /// Create or update.
    pub operation: Operation,
    /// Accepted or rejected.
    pub outcome: ValidationOutcome,
    /// Total violations reported.
    pub violation_count: usize,
    /// Violations per kind.
    pub kinds: BTreeMap<ViolationKind, usize>,
    /// Attribute paths of every violation, in report order.
    pub paths: Vec<String>,
}

impl ValidationAuditEvent {
    /// Builds an event from a finished validation.
    #[must_use]
    pub fn new(resource: &str, operation: Operation, diagnostics: &Diagnostics) -> Self {
        let outcome =
            if diagnostics.is_empty() { ValidationOutcome::Accepted } else { ValidationOutcome::Rejected };
        Self {
            event: "resource_validation",
            timestamp_ms: now_ms(),
            resource: resource.to_string(),
            operation,
            outcome,
            violation_count: diagnostics.len(),
            kinds: diagnostics.kind_counts(),
            paths: diagnostics.iter().map(|violation| violation.path.to_string()).collect(),
        }
    }
}

/// Audit payload emitted once a schema catalog has been built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Registered resource type names.
    pub resources: Vec<String>,
}

impl CatalogAuditEvent {
    /// Builds a catalog event.
    #[must_use]
    pub fn new(resources: Vec<String>) -> Self {
        Self {
            event: "catalog_loaded",
            timestamp_ms: now_ms(),
            resources,
        }
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for validation events.
pub trait ValidationAuditSink: Send + Sync {
    /// Record a validation event.
    fn record(&self, event: &ValidationAuditEvent);

    /// Record a catalog event.
    fn record_catalog(&self, _event: &CatalogAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ValidationAuditSink for StderrAuditSink {
    fn record(&self, event: &ValidationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_catalog(&self, event: &CatalogAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Writes one serialized line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl ValidationAuditSink for FileAuditSink {
    fn record(&self, event: &ValidationAuditEvent) {
        self.append(event);
    }

    fn record_catalog(&self, event: &CatalogAuditEvent) {
        self.append(event);
    }
}

/// Audit sink that keeps validation events in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<ValidationAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ValidationAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl ValidationAuditSink for MemoryAuditSink {
    fn record(&self, event: &ValidationAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ValidationAuditSink for NoopAuditSink {
    fn record(&self, _event: &ValidationAuditEvent) {}
}

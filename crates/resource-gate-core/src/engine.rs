// crates/resource-gate-core/src/engine.rs
// ============================================================================
// Module: Validation Engine
// Description: Create/update validation over one resource schema.
// Purpose: Run every pass, normalize, and report in a single call.
// Dependencies: crate::{audit, diagnostics, schema, value}, serde
// ============================================================================

//! ## Overview
//! [`Validator`] is the in-process boundary of the engine. A create call runs
//! the constraint evaluator, the rule engine, and nested schemas over the
//! caller's tree, then injects defaults into a copy. An update call also
//! compares the raw new tree against the stored prior state for immutable
//! fields, and an immutable field the update omits keeps its prior value in
//! the normalized tree. Calls share no mutable state; the only side effect
//! is one audit event per call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::audit::NoopAuditSink;
use crate::audit::ValidationAuditEvent;
use crate::audit::ValidationAuditSink;
use crate::diagnostics::Diagnostics;
use crate::schema::ResourceSchema;
use crate::value::ConfigNode;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Lifecycle operation being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// First submission of a resource.
    Create,
    /// Change to an existing resource.
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
        })
    }
}

/// Result of one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Resource type name.
    pub resource: String,
    /// Operation validated.
    pub operation: Operation,
    /// Input with defaults applied.
    pub normalized: ConfigNode,
    /// Every violation found, in evaluation order.
    pub diagnostics: Diagnostics,
}

impl ValidationReport {
    /// Returns true when no violations were found.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Runs validations and records one audit event per call.
#[derive(Clone)]
pub struct Validator {
    /// Destination for audit events.
    audit: Arc<dyn ValidationAuditSink>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Arc::new(NoopAuditSink))
    }
}

impl Validator {
    /// Creates a validator reporting to `audit`.
    #[must_use]
    pub fn new(audit: Arc<dyn ValidationAuditSink>) -> Self {
        Self {
            audit,
        }
    }

    /// Validates a new resource.
    #[must_use]
    pub fn validate_create(&self, schema: &ResourceSchema, config: &ConfigNode) -> ValidationReport {
        let diagnostics = schema.evaluate(config);
        self.finish(schema, Operation::Create, config, diagnostics)
    }

    /// Validates a change to an existing resource against its prior state.
    #[must_use]
    pub fn validate_update(&self, schema: &ResourceSchema, config: &ConfigNode, prior: &ConfigNode) -> ValidationReport {
        let mut diagnostics = schema.evaluate(config);
        diagnostics.extend(schema.check_immutable(config, prior));
        let kept = schema.carry_immutables(config, prior);
        self.finish(schema, Operation::Update, &kept, diagnostics)
    }

    /// Normalizes `config`, emits the audit event, and builds the report.
    fn finish(
        &self,
        schema: &ResourceSchema,
        operation: Operation,
        config: &ConfigNode,
        diagnostics: Diagnostics,
    ) -> ValidationReport {
        self.audit.record(&ValidationAuditEvent::new(schema.name(), operation, &diagnostics));
        ValidationReport {
            resource: schema.name().to_string(),
            operation,
            normalized: schema.apply_defaults(config),
            diagnostics,
        }
    }
}

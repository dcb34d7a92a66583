// crates/resource-gate-catalog/src/alert.rs
// ============================================================================
// Module: Alert Schemas
// Description: Threshold and change alert registrations.
// Purpose: Couple event type, aggregation, conditions, and notification
//          payload for both alert families.
// Dependencies: resource-gate-core, crate::service
// ============================================================================

//! ## Overview
//! Both alert families share one shape and differ only in the comparison
//! operators allowed inside `conditional.expressions`. A change alert
//! compares a window against its predecessor, so it accepts the
//! `*_change_*` operators; a threshold alert compares against a fixed value.
//!
//! Couplings registered here:
//! - `event_type = log` requires `event_timestamp` and `operation = custom`.
//! - `event_type = metric` forbids `event_timestamp`.
//! - `operation = custom` requires a non-empty `script`; any other operation
//!   forbids it.

use std::fmt;
use std::sync::Arc;

use resource_gate_core::Condition;
use resource_gate_core::Constraint;
use resource_gate_core::Discriminator;
use resource_gate_core::NodeKind;
use resource_gate_core::RegistryError;
use resource_gate_core::ResourceSchema;
use resource_gate_core::Rule;
use resource_gate_core::VariantDescriptor;

use crate::service::service_schema;

// ============================================================================
// SECTION: Families
// ============================================================================

/// Aggregations accepted by every alert family.
pub const OPERATIONS: [&str; 6] = ["sum", "average", "count", "min", "max", "custom"];

/// Operators accepted by threshold alerts.
pub const THRESHOLD_OPERATORS: [&str; 6] =
    ["greater_than", "greater_than_or_equal", "less_than", "less_than_or_equal", "equal", "not_equal"];

/// Operators accepted by change alerts.
pub const CHANGE_OPERATORS: [&str; 4] =
    ["percent_change_above", "percent_change_below", "absolute_change_above", "absolute_change_below"];

/// Alert family, which selects the operator allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertFamily {
    /// Fires when an aggregate crosses a fixed value.
    Threshold,
    /// Fires when an aggregate moves relative to the previous window.
    Change,
}

impl AlertFamily {
    /// Returns the resource type name registered for the family.
    #[must_use]
    pub const fn resource_name(self) -> &'static str {
        match self {
            Self::Threshold => "threshold_alert",
            Self::Change => "change_alert",
        }
    }

    /// Returns the operators allowed in condition expressions.
    #[must_use]
    pub const fn operators(self) -> &'static [&'static str] {
        match self {
            Self::Threshold => &THRESHOLD_OPERATORS,
            Self::Change => &CHANGE_OPERATORS,
        }
    }
}

impl fmt::Display for AlertFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Builds the schema for one alert family.
///
/// # Errors
///
/// Returns [`RegistryError`] when the registration is inconsistent.
pub fn alert_schema(family: AlertFamily) -> Result<ResourceSchema, RegistryError> {
    let event_type = Discriminator::builder("event_type")
        .required()
        .variant("log", VariantDescriptor::builder().require("event_timestamp").build()?)
        .variant("metric", VariantDescriptor::builder().forbid("event_timestamp").build()?)
        .build()?;

    let base = VariantDescriptor::builder()
        .require_all(["name", "operation", "conditional.expressions", "alert_payload.service"])
        .constrain("name", Constraint::string_length(1, 255))
        .one_of("operation", OPERATIONS)
        .require_all([
            "conditional.expressions[*].field",
            "conditional.expressions[*].operator",
            "conditional.expressions[*].value",
        ])
        .constrain("conditional.expressions", Constraint::min_items(1))
        .one_of("conditional.expressions[*].operator", family.operators().iter().copied())
        .one_of("conditional.logical_operation", ["AND", "OR"])
        .default_value("conditional.logical_operation", "AND")
        .one_of("window_type", ["tumbling", "sliding"])
        .default_value("window_type", "tumbling")
        .default_value("window_duration_minutes", 5_i64)
        .constrain("window_duration_minutes", Constraint::range(1, 1440))
        .default_value("active", true)
        .constrain("active", Constraint::Kind(NodeKind::Bool))
        .constrain("alert_payload.throttling.window_secs", Constraint::range(1, 86_400))
        .constrain("alert_payload.throttling.threshold", Constraint::at_least(1))
        .build()?;

    ResourceSchema::builder(family.resource_name())
        .description(match family {
            AlertFamily::Threshold => "Alert raised when an aggregate crosses a fixed value.",
            AlertFamily::Change => "Alert raised when an aggregate changes between windows.",
        })
        .base(base)
        .discriminator(event_type)
        .rule(
            Rule::builder("custom_operation_requires_script")
                .when(Condition::equals("operation", "custom")?)
                .expect_non_empty("script", "custom operation requires a non-empty script")
                .build()?,
        )
        .rule(
            Rule::builder("script_only_for_custom_operation")
                .when(Condition::all([
                    Condition::present("operation")?,
                    Condition::not(Condition::equals("operation", "custom")?),
                ]))
                .expect_absent("script", "script is only allowed when operation is custom")
                .build()?,
        )
        .rule(
            Rule::builder("log_events_require_custom_operation")
                .governed_by("event_type", "log")
                .expect_equals("operation", "custom", "log events require operation custom")
                .build()?,
        )
        .nest("alert_payload.service", Arc::new(service_schema()?))
        .build()
}

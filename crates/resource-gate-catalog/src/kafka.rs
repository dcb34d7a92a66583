// crates/resource-gate-catalog/src/kafka.rs
// ============================================================================
// Module: Kafka Connection Fields
// Description: Broker list and SASL fields shared by Kafka sources and sinks.
// ============================================================================

//! Kafka connection fields reused by the source and destination schemas.

use resource_gate_core::Condition;
use resource_gate_core::Constraint;
use resource_gate_core::RegistryError;
use resource_gate_core::Rule;
use resource_gate_core::VariantDescriptorBuilder;

/// Adds the broker list requirements to a Kafka variant.
pub(crate) fn with_brokers(builder: VariantDescriptorBuilder) -> VariantDescriptorBuilder {
    builder
        .require("brokers")
        .constrain("brokers", Constraint::min_items(1))
        .require_all(["brokers[*].host", "brokers[*].port"])
        .constrain("brokers[*].host", Constraint::non_empty_string())
        .constrain("brokers[*].port", Constraint::range(1, 65_535))
}

/// Adds the SASL mechanism enum to a Kafka variant.
pub(crate) fn with_sasl(builder: VariantDescriptorBuilder) -> VariantDescriptorBuilder {
    builder.one_of("sasl.mechanism", ["plain", "scram-sha-256", "scram-sha-512"])
}

/// Requires SASL credentials once a `sasl` block is present.
pub(crate) fn sasl_credentials_rule(discriminator: &str) -> Result<Rule, RegistryError> {
    Rule::builder("sasl_credentials_non_empty")
        .governed_by(discriminator, "kafka")
        .when(Condition::present("sasl")?)
        .expect_non_empty("sasl.mechanism", "sasl requires a mechanism")
        .expect_non_empty("sasl.username", "sasl requires a non-empty username")
        .expect_non_empty("sasl.password", "sasl requires a non-empty password")
        .build()
}

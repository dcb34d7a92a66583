// crates/resource-gate-core/src/lib.rs
// ============================================================================
// Module: Resource Gate Core
// Description: Validation engine for discriminated resource configurations.
// Purpose: Wire the value model, registries, evaluators, and diagnostics.
// Dependencies: crate::{audit, constraints, defaults, diagnostics, engine,
//               error, immutability, path, registry, rules, schema, value}
// ============================================================================

//! ## Overview
//! Resource Gate accepts or rejects resource configurations whose valid shape
//! depends on discriminator fields elsewhere in the same tree. A
//! [`ResourceSchema`] registers the variants, rules, and immutable fields of
//! one resource type; a [`Validator`] runs every pass over a [`ConfigNode`]
//! and returns all violations at once together with the normalized tree.
//!
//! Registration is fallible and happens once at startup. Evaluation is
//! infallible, synchronous, and free of shared mutable state.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod audit;
pub mod constraints;
pub mod defaults;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod immutability;
pub mod path;
pub mod registry;
pub mod rules;
pub mod schema;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::CatalogAuditEvent;
pub use audit::FileAuditSink;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::ValidationAuditEvent;
pub use audit::ValidationAuditSink;
pub use audit::ValidationOutcome;
pub use constraints::Constraint;
pub use constraints::ConstraintEvaluator;
pub use constraints::EnumConstraint;
pub use constraints::FieldConstraint;
pub use defaults::DefaultInjector;
pub use diagnostics::Diagnostics;
pub use diagnostics::Violation;
pub use diagnostics::ViolationKind;
pub use engine::Operation;
pub use engine::ValidationReport;
pub use engine::Validator;
pub use error::RegistryError;
pub use immutability::IMMUTABLE_MESSAGE;
pub use immutability::ImmutableFieldSpec;
pub use immutability::check_immutable;
pub use path::FieldPath;
pub use path::PathError;
pub use path::PathSegment;
pub use registry::ActiveVariants;
pub use registry::Discriminator;
pub use registry::DiscriminatorBuilder;
pub use registry::FieldDefault;
pub use registry::VariantDescriptor;
pub use registry::VariantDescriptorBuilder;
pub use registry::VariantKey;
pub use registry::VariantRegistry;
pub use rules::Condition;
pub use rules::CustomCheck;
pub use rules::Expectation;
pub use rules::FieldPredicate;
pub use rules::Rule;
pub use rules::RuleBuilder;
pub use rules::RuleCheck;
pub use rules::RuleSet;
pub use schema::NestedSchema;
pub use schema::ResourceSchema;
pub use schema::ResourceSchemaBuilder;
pub use value::ConfigNode;
pub use value::NodeKind;
pub use value::ParseError;
pub use value::ParseLimits;
pub use value::Scalar;

// crates/resource-gate-catalog/src/docs.rs
// ============================================================================
// Module: Reference Documentation
// Description: Deterministic Markdown reference for a schema catalog.
// Purpose: Keep published field documentation in lockstep with registrations.
// Dependencies: resource-gate-core, crate::catalog, thiserror
// ============================================================================

//! ## Overview
//! [`reference_markdown`] renders every schema in a catalog: discriminators
//! and their variants, field tables for each descriptor, immutable fields,
//! rules, and nested schemas. Output depends only on the registrations, so a
//! checked-in copy can be verified with [`verify_reference`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use resource_gate_core::ResourceSchema;
use resource_gate_core::VariantDescriptor;
use thiserror::Error;

use crate::catalog::Catalog;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when writing or verifying the reference.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while reading or writing the reference.
    #[error("io error: {0}")]
    Io(String),
    /// The on-disk reference differs from the generated one.
    #[error("reference is out of date: {}", .0.display())]
    Stale(PathBuf),
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the Markdown reference for `catalog`.
#[must_use]
pub fn reference_markdown(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str("# Resource Reference\n\n");
    out.push_str("Field requirements for every registered resource type. ");
    out.push_str("Paths use dots for object keys and `[*]` for every list element.\n\n");
    out.push_str("| Resource | Description |\n");
    out.push_str("| --- | --- |\n");
    for schema in catalog.schemas() {
        out.push_str("| `");
        out.push_str(schema.name());
        out.push_str("` | ");
        out.push_str(schema.description());
        out.push_str(" |\n");
    }
    out.push('\n');
    for schema in catalog.schemas() {
        render_schema(&mut out, schema, 2);
    }
    out
}

/// Renders one schema with headings starting at `level`.
fn render_schema(out: &mut String, schema: &ResourceSchema, level: usize) {
    let heading = "#".repeat(level);
    let sub = "#".repeat(level + 1);
    out.push_str(&heading);
    out.push_str(" `");
    out.push_str(schema.name());
    out.push_str("`\n\n");
    if !schema.description().is_empty() {
        out.push_str(schema.description());
        out.push_str("\n\n");
    }

    out.push_str(&sub);
    out.push_str(" Fields\n\n");
    render_descriptor(out, schema.base());

    for discriminator in schema.registry().discriminators() {
        out.push_str(&sub);
        out.push_str(" Discriminator `");
        out.push_str(&discriminator.path().to_string());
        out.push_str("`\n\n");
        let values: Vec<String> = discriminator.allowed_values().iter().map(|value| format!("`{value}`")).collect();
        out.push_str("- values: ");
        out.push_str(&values.join(", "));
        out.push('\n');
        out.push_str("- required: ");
        out.push_str(if discriminator.is_required() { "yes" } else { "no" });
        out.push('\n');
        if let Some(default) = discriminator.default_value() {
            out.push_str("- default: `");
            out.push_str(&default.to_string());
            out.push_str("`\n");
        }
        out.push('\n');
        for (value, descriptor) in discriminator.variants() {
            out.push_str("**`");
            out.push_str(&discriminator.path().to_string());
            out.push('=');
            out.push_str(&value.to_string());
            out.push_str("`**\n\n");
            render_descriptor(out, descriptor);
        }
    }

    if !schema.immutables().is_empty() {
        out.push_str(&sub);
        out.push_str(" Immutable fields\n\n");
        for spec in schema.immutables() {
            out.push_str("- `");
            out.push_str(&spec.path.to_string());
            out.push_str("`\n");
        }
        out.push('\n');
    }

    if !schema.rules().rules().is_empty() {
        out.push_str(&sub);
        out.push_str(" Rules\n\n");
        for rule in schema.rules().rules() {
            out.push_str("- `");
            out.push_str(rule.name());
            out.push_str("`: ");
            out.push_str(&rule.describe());
            out.push('\n');
        }
        out.push('\n');
    }

    for mount in schema.nested() {
        out.push_str(&sub);
        out.push_str(" Nested at `");
        out.push_str(&mount.path().to_string());
        out.push('`');
        if !mount.governing().is_empty() {
            let keys: Vec<String> = mount.governing().iter().map(|key| format!("`{key}`")).collect();
            out.push_str(" when ");
            out.push_str(&keys.join(" and "));
        }
        out.push_str("\n\n");
        render_schema(out, mount.schema(), level + 2);
    }
}

/// Renders a descriptor as a field table.
fn render_descriptor(out: &mut String, descriptor: &VariantDescriptor) {
    let mut rows: Vec<(String, String)> = Vec::new();
    for path in descriptor.required() {
        rows.push((path.to_string(), String::from("required")));
    }
    for path in descriptor.forbidden() {
        rows.push((path.to_string(), String::from("forbidden")));
    }
    for default in descriptor.defaults() {
        rows.push((default.path.to_string(), format!("default `{}`", default.value)));
    }
    for constraint in descriptor.enums() {
        let allowed: Vec<String> = constraint.allowed().iter().map(ToString::to_string).collect();
        rows.push((constraint.path.to_string(), format!("one of [{}]", allowed.join(", "))));
    }
    for field in descriptor.constraints() {
        rows.push((field.path.to_string(), field.constraint.describe()));
    }
    if rows.is_empty() {
        out.push_str("_No field requirements._\n\n");
        return;
    }
    out.push_str("| Field | Requirement |\n");
    out.push_str("| --- | --- |\n");
    for (path, requirement) in rows {
        out.push_str("| `");
        out.push_str(&path);
        out.push_str("` | ");
        out.push_str(&requirement);
        out.push_str(" |\n");
    }
    out.push('\n');
}

// ============================================================================
// SECTION: Files
// ============================================================================

/// Writes the reference for `catalog` to `path`.
///
/// # Errors
///
/// Returns [`DocsError::Io`] when the file cannot be written.
pub fn write_reference(catalog: &Catalog, path: &Path) -> Result<(), DocsError> {
    fs::write(path, reference_markdown(catalog)).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies that the reference at `path` matches the generated reference.
///
/// # Errors
///
/// Returns [`DocsError::Stale`] when the contents differ and
/// [`DocsError::Io`] when the file cannot be read.
pub fn verify_reference(catalog: &Catalog, path: &Path) -> Result<(), DocsError> {
    let actual = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if actual == reference_markdown(catalog) { Ok(()) } else { Err(DocsError::Stale(path.to_path_buf())) }
}

// crates/resource-gate-core/src/path.rs
// ============================================================================
// Module: Field Paths
// Description: Dotted/indexed addresses into configuration trees.
// Purpose: Parse, render, and compose attribute paths such as `brokers[0].port`.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`FieldPath`] addresses one node of a [`crate::ConfigNode`] tree. Paths
//! used in registrations may contain wildcard list segments (`brokers[*].port`)
//! which expand to one concrete path per existing list element; paths carried
//! by violations are always concrete.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing or applying a field path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path text was empty.
    #[error("field path is empty")]
    Empty,
    /// A key segment between separators was empty.
    #[error("field path `{0}` has an empty segment")]
    EmptySegment(String),
    /// A bracketed index was not a number or wildcard.
    #[error("field path `{path}` has invalid index `{index}`")]
    InvalidIndex {
        /// Full path text.
        path: String,
        /// Offending index text.
        index: String,
    },
    /// A bracket was opened but never closed.
    #[error("field path `{0}` has an unterminated index")]
    Unterminated(String),
    /// A concrete path was required but the path contains a wildcard.
    #[error("field path `{0}` contains a wildcard")]
    Wildcard(String),
    /// Traversal hit a node that cannot hold the next segment.
    #[error("cannot set `{0}`: parent is not a container")]
    NotContainer(String),
    /// A list index was beyond the end of the list.
    #[error("cannot set `{0}`: index out of range")]
    IndexOutOfRange(String),
}

// ============================================================================
// SECTION: Segments
// ============================================================================

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object member lookup.
    Key(String),
    /// List element lookup.
    Index(usize),
    /// Every element of a list (registration paths only).
    Wildcard,
}

// ============================================================================
// SECTION: Field Path
// ============================================================================

/// Address of a node inside a configuration tree.
///
/// # Invariants
/// - The root path has no segments and renders as an empty string.
/// - Key segments are non-empty and contain no `.`, `[` or `]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    /// Ordered path segments from the root.
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Returns the root path.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a path such as `auth.strategy`, `brokers[0].port`, or
    /// `conditional.expressions[*].operator`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the text is empty or malformed.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = Vec::new();
        let mut rest = text;
        let mut expect_key = true;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let close = after.find(']').ok_or_else(|| PathError::Unterminated(text.to_string()))?;
                let index = &after[.. close];
                segments.push(parse_index(text, index)?);
                rest = &after[close + 1 ..];
                expect_key = false;
                continue;
            }
            if let Some(after) = rest.strip_prefix('.') {
                if expect_key {
                    return Err(PathError::EmptySegment(text.to_string()));
                }
                rest = after;
                expect_key = true;
                if rest.is_empty() {
                    return Err(PathError::EmptySegment(text.to_string()));
                }
                continue;
            }
            if !expect_key {
                return Err(PathError::EmptySegment(text.to_string()));
            }
            let end = rest.find(['.', '[', ']']).unwrap_or(rest.len());
            if end == 0 {
                return Err(PathError::EmptySegment(text.to_string()));
            }
            segments.push(PathSegment::Key(rest[.. end].to_string()));
            rest = &rest[end ..];
            expect_key = false;
        }
        Ok(Self {
            segments,
        })
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns true for the root path.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true when the path contains no wildcard segments.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        !self.segments.iter().any(|segment| matches!(segment, PathSegment::Wildcard))
    }

    /// Returns a new path with a key segment appended.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self {
            segments,
        }
    }

    /// Returns a new path with an index segment appended.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self {
            segments,
        }
    }

    /// Returns `self` followed by every segment of `suffix`.
    #[must_use]
    pub fn join(&self, suffix: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        Self {
            segments,
        }
    }

    /// Returns the parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.segments.split_last()?;
        Some(Self {
            segments: head.to_vec(),
        })
    }

    /// Returns the final segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns true when `prefix` is a leading portion of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

/// Parses the text between brackets.
fn parse_index(path: &str, index: &str) -> Result<PathSegment, PathError> {
    if index.is_empty() || index == "*" {
        return Ok(PathSegment::Wildcard);
    }
    index.parse::<usize>().map(PathSegment::Index).map_err(|_| PathError::InvalidIndex {
        path: path.to_string(),
        index: index.to_string(),
    })
}

// ============================================================================
// SECTION: Formatting and Conversion
// ============================================================================

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Wildcard => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = PathError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::parse(text)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

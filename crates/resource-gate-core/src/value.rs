// crates/resource-gate-core/src/value.rs
// ============================================================================
// Module: Configuration Value Model
// Description: Generic tagged tree for parsed resource configurations.
// Purpose: Represent configs independent of source syntax with path access.
// Dependencies: crate::path, serde, serde_json, serde_yaml, toml
// ============================================================================

//! ## Overview
//! [`ConfigNode`] is the syntax-independent tree every evaluator walks. It
//! distinguishes an absent field (`get` returns `None`) from a field that is
//! present but `null`, which drives the difference between "required" and
//! "invalid value" diagnostics. Trees can be built from JSON, TOML, or YAML
//! text, or from any serde data format through [`Deserialize`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

use crate::path::FieldPath;
use crate::path::PathError;
use crate::path::PathSegment;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum accepted input size in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;
/// Default maximum nesting depth of a parsed tree.
pub const DEFAULT_MAX_DEPTH: usize = 64;
/// Default maximum number of nodes in a parsed tree.
pub const DEFAULT_MAX_NODES: usize = 100_000;

// ============================================================================
// SECTION: Scalars
// ============================================================================

/// Leaf value of a configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// UTF-8 string.
    String(String),
    /// Integer or finite floating point number.
    Number(Number),
    /// Boolean flag.
    Bool(bool),
}

impl Scalar {
    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            Self::Number(_) | Self::Bool(_) => None,
        }
    }

    /// Returns the value as a signed integer when it is an integral number.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(number) => number.as_i64(),
            Self::String(_) | Self::Bool(_) => None,
        }
    }

    /// Returns the value as a float when it is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.as_f64(),
            Self::String(_) | Self::Bool(_) => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::String(_) | Self::Number(_) => None,
        }
    }

    /// Compares by value. Numbers compare numerically, so `1` and `1.0`
    /// are the same value even though their representations differ.
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) if left.is_f64() || right.is_f64() => left
                .as_f64()
                .zip(right.as_f64())
                .is_some_and(|(left, right)| left.partial_cmp(&right) == Some(Ordering::Equal)),
            _ => self == other,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Number(value) => fmt::Display::fmt(value, f),
            Self::Bool(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ============================================================================
// SECTION: Node Kinds
// ============================================================================

/// Shape classification of a [`ConfigNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Object with named members.
    Object,
    /// Ordered list.
    List,
    /// String scalar.
    String,
    /// Numeric scalar.
    Number,
    /// Integral numeric scalar (a refinement of [`NodeKind::Number`]).
    Integer,
    /// Boolean scalar.
    Bool,
    /// Explicit null.
    Null,
}

impl NodeKind {
    /// Returns a stable label for messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::List => "list",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Null => "null",
        }
    }

    /// Returns the article-prefixed label used in "must be ..." messages.
    #[must_use]
    pub const fn with_article(self) -> &'static str {
        match self {
            Self::Object => "an object",
            Self::List => "a list",
            Self::String => "a string",
            Self::Number => "a number",
            Self::Integer => "an integer",
            Self::Bool => "a bool",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Config Node
// ============================================================================

/// One parsed resource configuration (or a sub-tree of one).
///
/// # Invariants
/// - Object members are kept in key order, so traversal is deterministic.
/// - Evaluators never mutate a tree they validate; defaulting returns a copy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigNode {
    /// Object with named members.
    Object(BTreeMap<String, ConfigNode>),
    /// Ordered list of nodes.
    List(Vec<ConfigNode>),
    /// Leaf value.
    Scalar(Scalar),
    /// Explicit null.
    #[default]
    Null,
}

impl ConfigNode {
    /// Returns an empty object node.
    #[must_use]
    pub const fn empty_object() -> Self {
        Self::Object(BTreeMap::new())
    }

    /// Builds a string scalar node.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    /// Returns the node kind. Integral numbers report [`NodeKind::Integer`].
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Object(_) => NodeKind::Object,
            Self::List(_) => NodeKind::List,
            Self::Scalar(Scalar::String(_)) => NodeKind::String,
            Self::Scalar(Scalar::Number(number)) => {
                if number.is_i64() || number.is_u64() {
                    NodeKind::Integer
                } else {
                    NodeKind::Number
                }
            }
            Self::Scalar(Scalar::Bool(_)) => NodeKind::Bool,
            Self::Null => NodeKind::Null,
        }
    }

    /// Structural equality using [`Scalar::same_value`] at the leaves.
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(left), Self::Scalar(right)) => left.same_value(right),
            (Self::List(left), Self::List(right)) => {
                left.len() == right.len() && left.iter().zip(right).all(|(left, right)| left.same_value(right))
            }
            (Self::Object(left), Self::Object(right)) => {
                left.len() == right.len()
                    && left.iter().zip(right).all(|((left_key, left), (right_key, right))| {
                        left_key == right_key && left.same_value(right)
                    })
            }
            _ => self == other,
        }
    }

    /// Returns true for an explicit null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for `null`, `""`, `[]`, and `{}`.
    #[must_use]
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Scalar(Scalar::String(value)) => value.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Object(members) => members.is_empty(),
            Self::Scalar(Scalar::Number(_) | Scalar::Bool(_)) => false,
        }
    }

    /// Returns the scalar payload, if this is a leaf.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            Self::Object(_) | Self::List(_) | Self::Null => None,
        }
    }

    /// Returns the string payload, if this is a string leaf.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Returns the object members, if this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Object(members) => Some(members),
            Self::List(_) | Self::Scalar(_) | Self::Null => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            Self::Object(_) | Self::Scalar(_) | Self::Null => None,
        }
    }

    /// Looks up the node at a concrete path.
    ///
    /// Returns `None` when any segment is absent. A present `null` returns
    /// `Some(&ConfigNode::Null)`. Wildcard segments never match; use
    /// [`ConfigNode::expand`] for registration patterns.
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&Self> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, current) {
                (PathSegment::Key(key), Self::Object(members)) => members.get(key)?,
                (PathSegment::Index(index), Self::List(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Mutable counterpart of [`ConfigNode::get`].
    #[must_use]
    pub fn get_mut(&mut self, path: &FieldPath) -> Option<&mut Self> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, current) {
                (PathSegment::Key(key), Self::Object(members)) => members.get_mut(key)?,
                (PathSegment::Index(index), Self::List(items)) => items.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns true when the path resolves to a non-null node.
    #[must_use]
    pub fn has_value(&self, path: &FieldPath) -> bool {
        self.get(path).is_some_and(|node| !node.is_null())
    }

    /// Writes `node` at a concrete path, creating intermediate objects.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the path contains a wildcard, crosses a
    /// scalar, or indexes beyond the end of a list.
    pub fn set(&mut self, path: &FieldPath, node: Self) -> Result<(), PathError> {
        if !path.is_concrete() {
            return Err(PathError::Wildcard(path.to_string()));
        }
        let Some((last, parents)) = path.segments().split_last() else {
            *self = node;
            return Ok(());
        };
        let mut current = self;
        for segment in parents {
            current = match segment {
                PathSegment::Key(key) => {
                    if current.is_null() {
                        *current = Self::empty_object();
                    }
                    match current {
                        Self::Object(members) => {
                            members.entry(key.clone()).or_insert_with(Self::empty_object)
                        }
                        _ => return Err(PathError::NotContainer(path.to_string())),
                    }
                }
                PathSegment::Index(index) => match current {
                    Self::List(items) => items
                        .get_mut(*index)
                        .ok_or_else(|| PathError::IndexOutOfRange(path.to_string()))?,
                    _ => return Err(PathError::NotContainer(path.to_string())),
                },
                PathSegment::Wildcard => return Err(PathError::Wildcard(path.to_string())),
            };
        }
        match last {
            PathSegment::Key(key) => {
                if current.is_null() {
                    *current = Self::empty_object();
                }
                match current {
                    Self::Object(members) => {
                        members.insert(key.clone(), node);
                        Ok(())
                    }
                    _ => Err(PathError::NotContainer(path.to_string())),
                }
            }
            PathSegment::Index(index) => match current {
                Self::List(items) => {
                    let slot = items
                        .get_mut(*index)
                        .ok_or_else(|| PathError::IndexOutOfRange(path.to_string()))?;
                    *slot = node;
                    Ok(())
                }
                _ => Err(PathError::NotContainer(path.to_string())),
            },
            PathSegment::Wildcard => Err(PathError::Wildcard(path.to_string())),
        }
    }

    /// Expands a registration pattern into concrete paths.
    ///
    /// Key and index segments are appended whether or not they exist, so the
    /// result can address missing fields. A wildcard fans out over the
    /// elements of an existing list; a wildcard over anything else yields no
    /// paths for that branch.
    #[must_use]
    pub fn expand(&self, pattern: &FieldPath) -> Vec<FieldPath> {
        let mut branches: Vec<(FieldPath, Option<&Self>)> = vec![(FieldPath::root(), Some(self))];
        for segment in pattern.segments() {
            let mut next = Vec::with_capacity(branches.len());
            for (prefix, node) in branches {
                match segment {
                    PathSegment::Key(key) => {
                        let child = node.and_then(Self::as_object).and_then(|m| m.get(key));
                        next.push((prefix.child(key.clone()), child));
                    }
                    PathSegment::Index(index) => {
                        let child = node.and_then(Self::as_list).and_then(|items| items.get(*index));
                        next.push((prefix.index(*index), child));
                    }
                    PathSegment::Wildcard => {
                        if let Some(items) = node.and_then(Self::as_list) {
                            for (index, item) in items.iter().enumerate() {
                                next.push((prefix.index(index), Some(item)));
                            }
                        }
                    }
                }
            }
            branches = next;
        }
        branches.into_iter().map(|(path, _)| path).collect()
    }

    /// Returns the maximum nesting depth (a scalar has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Object(members) => 1 + members.values().map(Self::depth).max().unwrap_or(0),
            Self::List(items) => 1 + items.iter().map(Self::depth).max().unwrap_or(0),
            Self::Scalar(_) | Self::Null => 1,
        }
    }

    /// Returns the total number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Object(members) => 1 + members.values().map(Self::node_count).sum::<usize>(),
            Self::List(items) => 1 + items.iter().map(Self::node_count).sum::<usize>(),
            Self::Scalar(_) | Self::Null => 1,
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Hard limits applied when building a tree from untrusted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum input size in bytes.
    pub max_input_bytes: usize,
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Maximum number of nodes.
    pub max_nodes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl ParseLimits {
    /// Checks a parsed tree against the depth and node limits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LimitExceeded`] when a limit is exceeded.
    pub fn check(&self, node: &ConfigNode) -> Result<(), ParseError> {
        let depth = node.depth();
        if depth > self.max_depth {
            return Err(ParseError::LimitExceeded(format!(
                "depth {depth} exceeds max {}",
                self.max_depth
            )));
        }
        let nodes = node.node_count();
        if nodes > self.max_nodes {
            return Err(ParseError::LimitExceeded(format!(
                "node count {nodes} exceeds max {}",
                self.max_nodes
            )));
        }
        Ok(())
    }

    /// Checks raw input size before parsing.
    fn check_input(&self, text: &str) -> Result<(), ParseError> {
        if text.len() > self.max_input_bytes {
            return Err(ParseError::LimitExceeded(format!(
                "input size {} exceeds max {}",
                text.len(),
                self.max_input_bytes
            )));
        }
        Ok(())
    }
}

/// Errors raised while building a [`ConfigNode`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// JSON syntax error.
    #[error("json parse error: {0}")]
    Json(String),
    /// TOML syntax error.
    #[error("toml parse error: {0}")]
    Toml(String),
    /// YAML syntax error.
    #[error("yaml parse error: {0}")]
    Yaml(String),
    /// Input exceeded a configured limit.
    #[error("input limit exceeded: {0}")]
    LimitExceeded(String),
}

impl ConfigNode {
    /// Parses JSON text with default limits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on syntax errors or limit violations.
    pub fn from_json_str(text: &str) -> Result<Self, ParseError> {
        Self::from_json_str_with_limits(text, &ParseLimits::default())
    }

    /// Parses JSON text with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on syntax errors or limit violations.
    pub fn from_json_str_with_limits(text: &str, limits: &ParseLimits) -> Result<Self, ParseError> {
        limits.check_input(text)?;
        let value: Value =
            serde_json::from_str(text).map_err(|err| ParseError::Json(err.to_string()))?;
        let node = Self::from(value);
        limits.check(&node)?;
        Ok(node)
    }

    /// Parses TOML text with default limits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on syntax errors or limit violations.
    pub fn from_toml_str(text: &str) -> Result<Self, ParseError> {
        Self::from_toml_str_with_limits(text, &ParseLimits::default())
    }

    /// Parses TOML text with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on syntax errors or limit violations.
    pub fn from_toml_str_with_limits(text: &str, limits: &ParseLimits) -> Result<Self, ParseError> {
        limits.check_input(text)?;
        let node: Self = toml::from_str(text).map_err(|err| ParseError::Toml(err.to_string()))?;
        limits.check(&node)?;
        Ok(node)
    }

    /// Parses YAML text with default limits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on syntax errors or limit violations.
    pub fn from_yaml_str(text: &str) -> Result<Self, ParseError> {
        Self::from_yaml_str_with_limits(text, &ParseLimits::default())
    }

    /// Parses YAML text with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on syntax errors or limit violations.
    pub fn from_yaml_str_with_limits(text: &str, limits: &ParseLimits) -> Result<Self, ParseError> {
        limits.check_input(text)?;
        let node: Self =
            serde_yaml::from_str(text).map_err(|err| ParseError::Yaml(err.to_string()))?;
        limits.check(&node)?;
        Ok(node)
    }
}

// ============================================================================
// SECTION: JSON Interop
// ============================================================================

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Scalar(Scalar::Bool(flag)),
            Value::Number(number) => Self::Scalar(Scalar::Number(number)),
            Value::String(text) => Self::Scalar(Scalar::String(text)),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(members) => {
                Self::Object(members.into_iter().map(|(key, value)| (key, Self::from(value))).collect())
            }
        }
    }
}

impl From<&ConfigNode> for Value {
    fn from(node: &ConfigNode) -> Self {
        match node {
            ConfigNode::Null => Self::Null,
            ConfigNode::Scalar(Scalar::Bool(flag)) => Self::Bool(*flag),
            ConfigNode::Scalar(Scalar::Number(number)) => Self::Number(number.clone()),
            ConfigNode::Scalar(Scalar::String(text)) => Self::String(text.clone()),
            ConfigNode::List(items) => Self::Array(items.iter().map(Self::from).collect()),
            ConfigNode::Object(members) => Self::Object(
                members.iter().map(|(key, value)| (key.clone(), Self::from(value))).collect(),
            ),
        }
    }
}

impl From<Scalar> for ConfigNode {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(value) => serializer.serialize_str(value),
            Self::Number(value) => value.serialize(serializer),
            Self::Bool(value) => serializer.serialize_bool(*value),
        }
    }
}

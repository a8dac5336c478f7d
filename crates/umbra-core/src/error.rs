//! Error types for the node and attribute graph.

use thiserror::Error;

/// Errors raised by structural graph operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    /// A child index was outside the valid range.
    #[error("index {index} is out of range for a node with {len} children")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The number of children at the time of the call.
        len: usize,
    },
    /// Attaching the node would make it its own ancestor.
    #[error("cannot attach a node below itself or one of its descendants")]
    Cycle,
    /// An attribute name collides with a reserved node field.
    #[error("'{0}' is a reserved node field and cannot be used as an attribute name")]
    NameConflict(String),
    /// The node id is stale or belongs to another graph.
    #[error("unknown or deleted node")]
    UnknownNode,
    /// The node already has a parent and must be detached first.
    #[error("node is already attached to a parent")]
    AlreadyAttached,
    /// A search pattern failed to compile.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors raised by attribute writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// The incoming value cannot be converted to the stored type.
    #[error("attribute '{attribute}' expects a {expected} value, got {got}")]
    TypeMismatch {
        /// The attribute name.
        attribute: String,
        /// Type name of the stored value.
        expected: &'static str,
        /// Type name of the rejected value.
        got: &'static str,
    },
    /// The attribute (or node name) is not editable.
    #[error("attribute '{0}' is read only")]
    ReadOnly(String),
    /// The node has no attribute with that name.
    #[error("unknown attribute '{0}'")]
    Unknown(String),
    /// The owning node id is stale.
    #[error("unknown or deleted node")]
    UnknownNode,
}

/// Result type for structural graph operations.
pub type NodeResult<T> = std::result::Result<T, NodeError>;

/// Result type for attribute operations.
pub type AttributeResult<T> = std::result::Result<T, AttributeError>;

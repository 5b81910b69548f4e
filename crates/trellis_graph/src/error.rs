//! Error types for graph operations.

use crate::element::ElementKind;
use crate::id::ElementId;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, GraphError>;

/// Errors that can occur while mutating, querying or restoring a graph.
///
/// Every variant is reported before any state is touched: a failed operation
/// leaves the graph exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An `add_*` call used an id that is already present.
    #[error("an element with id '{0}' already exists")]
    DuplicateId(ElementId),

    /// A referenced id does not exist.
    #[error("no element with id '{0}' could be found")]
    NotFound(ElementId),

    /// A referenced id exists but is not of the kind the operation requires.
    #[error("element '{id}' is a {found}, expected a {expected}")]
    WrongKind {
        /// The offending id.
        id: ElementId,
        /// The kind the operation requires.
        expected: ElementKind,
        /// The kind actually stored under `id`.
        found: ElementKind,
    },

    /// A typed delete found an element of a different kind.
    #[error("attempted to delete {found} '{id}' as a {requested}")]
    KindMismatch {
        /// The offending id.
        id: ElementId,
        /// The kind named by the delete operation.
        requested: ElementKind,
        /// The kind actually stored under `id`.
        found: ElementKind,
    },

    /// An operation would break an element invariant.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// An interchange document cannot be turned back into a graph.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// JSON text conversion failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Creates an [`InvariantViolation`](Self::InvariantViolation).
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Creates a [`MalformedDocument`](Self::MalformedDocument).
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }
}

//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::{NodeId, NodeKind};

/// Domain errors represent violated tree invariants or operation preconditions.
/// Raised before any mutation reaches the repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid node type for node {id:?}: expected {expected}, found {found}")]
    InvalidNodeType {
        id: Option<NodeId>,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("the root list cannot be deleted")]
    RootDeletionForbidden,

    #[error("nodes {a} and {b} do not share a parent list")]
    CrossListMismatch { a: NodeId, b: NodeId },

    #[error("list {0} cannot be pasted into itself or its descendants")]
    SelfParenting(NodeId),

    #[error("node has not been persisted yet: {0}")]
    NotPersisted(String),

    #[error("invalid location: {0}")]
    InvalidLocation(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

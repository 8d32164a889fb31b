//! Infrastructure-level errors (store failures and wrapped application errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::NodeId;

/// Repository failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store snapshot is unreadable: {path}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no node with id {0} in store")]
    MissingNode(NodeId),

    #[error("node {0} is not a list")]
    NotAList(NodeId),

    #[error("node {node} is not a child of list {parent}")]
    MissingEdge { node: NodeId, parent: NodeId },

    #[error("attaching node {node} to list {parent} would create a cycle")]
    CycleRejected { node: NodeId, parent: NodeId },

    #[error("the root list is immutable")]
    RootImmutable,

    #[error("node has no id: {0}")]
    Unidentified(String),

    #[error("node {0} cannot change its type")]
    KindMismatch(NodeId),

    #[error("list {0} has no order value left after its last child")]
    OrderOverflow(NodeId),

    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<StoreError> for InfraError {
    fn from(e: StoreError) -> Self {
        InfraError::Application(ApplicationError::Store(e))
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;

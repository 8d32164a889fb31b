//! Error conversion helpers for node lookups
//!
//! Turns repository lookups into domain errors with the offending id.

use crate::application::ApplicationResult;
use crate::domain::{DomainError, Node, NodeId};
use crate::infrastructure::StoreResult;

/// Extension trait for `StoreResult<Option<Node>>` lookups.
pub trait NodeLookupExt {
    /// Resolve a lookup or fail with `NotFound(id)`.
    ///
    /// # Example
    /// ```ignore
    /// let node = repo.find_node(id).or_not_found(id)?;
    /// ```
    fn or_not_found(self, id: NodeId) -> ApplicationResult<Node>;
}

impl NodeLookupExt for StoreResult<Option<Node>> {
    fn or_not_found(self, id: NodeId) -> ApplicationResult<Node> {
        self?.ok_or_else(|| DomainError::NotFound(id).into())
    }
}

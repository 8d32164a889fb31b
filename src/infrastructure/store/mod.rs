//! Node repository implementations
//!
//! `TreeStore` keeps the whole tree in memory behind a lock. Every mutation
//! runs against a copy of the state and only replaces it on success, which
//! makes batches atomic. When opened on a file, the copy is also written to
//! disk before it becomes visible.

mod snapshot;
mod state;

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use tracing::{debug, instrument};

use crate::domain::{List, Location, Node, NodeId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::{NodeRepository, TreeChange};

pub use snapshot::SnapshotFile;
pub use state::{StoreState, ROOT_LIST_NAME};

/// Default name of the lazily created active list.
pub const DEFAULT_LIST_NAME: &str = "Default";

/// Lock-guarded tree store, optionally backed by a JSON snapshot.
#[derive(Debug)]
pub struct TreeStore {
    state: RwLock<StoreState>,
    snapshot: Option<SnapshotFile>,
    default_list_name: String,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl TreeStore {
    /// Volatile store holding only the root list.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(StoreState::new()),
            snapshot: None,
            default_list_name: DEFAULT_LIST_NAME.to_string(),
        }
    }

    /// Store persisted at `path`; the file is created on first mutation.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let snapshot = SnapshotFile::new(path);
        let state = snapshot.load()?;
        debug!("open: {}", snapshot.path().display());
        Ok(Self {
            state: RwLock::new(state),
            snapshot: Some(snapshot),
            default_list_name: DEFAULT_LIST_NAME.to_string(),
        })
    }

    pub fn with_default_list_name(mut self, name: impl Into<String>) -> Self {
        self.default_list_name = name.into();
        self
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(SnapshotFile::path)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn mutate<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreState) -> StoreResult<T>,
    {
        let mut guard = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        if let Some(snapshot) = &self.snapshot {
            snapshot.save(&next)?;
        }
        *guard = next;
        Ok(out)
    }
}

impl NodeRepository for TreeStore {
    fn find_node(&self, id: NodeId) -> StoreResult<Option<Node>> {
        Ok(self.read()?.get(id).cloned())
    }

    #[instrument(level = "debug", skip(self, node))]
    fn insert_node(&self, node: Node, parent_list_id: NodeId) -> StoreResult<NodeId> {
        self.mutate(|s| s.insert(node, parent_list_id, None))
    }

    #[instrument(level = "debug", skip(self, node))]
    fn insert_node_at_position(
        &self,
        node: Node,
        parent_list_id: NodeId,
        position: i64,
    ) -> StoreResult<NodeId> {
        self.mutate(|s| s.insert(node, parent_list_id, Some(position)))
    }

    fn update_node(&self, node: Node) -> StoreResult<Node> {
        self.mutate(|s| s.update(node))
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_node(&self, id: NodeId) -> StoreResult<()> {
        self.mutate(|s| s.delete(id))
    }

    fn find_bookmark_by_location(&self, location: &Location) -> StoreResult<Option<Node>> {
        Ok(self.read()?.find_by_location(location))
    }

    fn get_parent_id(&self, node_id: NodeId) -> StoreResult<Option<NodeId>> {
        Ok(self.read()?.parent_of(node_id))
    }

    fn add_to_list(&self, node_id: NodeId, parent_list_id: NodeId) -> StoreResult<()> {
        self.mutate(|s| s.attach(node_id, parent_list_id, None))
    }

    fn remove_from_list(&self, node_id: NodeId, parent_list_id: NodeId) -> StoreResult<()> {
        self.mutate(|s| s.detach(node_id, parent_list_id))
    }

    fn ensure_and_get_active_list(&self) -> StoreResult<List> {
        let current = self.read()?.active();
        if let Some(list) = current {
            return Ok(list);
        }
        let name = self.default_list_name.as_str();
        self.mutate(|s| s.ensure_active(name))
    }

    fn set_active_list(&self, id: NodeId) -> StoreResult<()> {
        self.mutate(|s| s.set_active(id))
    }

    fn all_lists(&self) -> StoreResult<Vec<List>> {
        Ok(self.read()?.lists())
    }

    #[instrument(level = "debug", skip(self, changes), fields(count = changes.len()))]
    fn apply_changes(&self, changes: Vec<TreeChange>) -> StoreResult<()> {
        self.mutate(|s| changes.into_iter().try_for_each(|c| s.apply(c)))
    }
}

//! Boundary traits for testability
//!
//! The bookmark service only talks to storage, the editor cursor and the
//! user through these traits, so it can run against in-memory fakes.

use tracing::{debug, warn};

use crate::application::hash;
use crate::domain::{List, Location, NavigationNotice, Node, NodeId};
use crate::infrastructure::error::StoreResult;

/// One step of an atomic batch applied through [`NodeRepository::apply_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    /// Overwrite the node's fields (edges are not taken from the node).
    Update(Node),
    /// Make `node` a child of `parent`, detaching it from any previous parent.
    /// `order: None` appends after the last sibling.
    Attach {
        node: NodeId,
        parent: NodeId,
        order: Option<i64>,
    },
    /// Remove the edge `parent -> node` without deleting the node.
    Detach { node: NodeId, parent: NodeId },
}

/// Node storage.
///
/// Implementations must be durable-on-return: a successful mutation is
/// visible to every subsequent `find_*` call. Node id 0 is the root list
/// and always exists.
pub trait NodeRepository: Send + Sync {
    /// Look up a node by id.
    fn find_node(&self, id: NodeId) -> StoreResult<Option<Node>>;

    /// Insert `node` as the last child of `parent_list_id`; returns the new id.
    fn insert_node(&self, node: Node, parent_list_id: NodeId) -> StoreResult<NodeId>;

    /// Insert `node` under `parent_list_id` with `order = position`.
    /// Existing siblings keep their order values.
    fn insert_node_at_position(
        &self,
        node: Node,
        parent_list_id: NodeId,
        position: i64,
    ) -> StoreResult<NodeId>;

    /// Persist field changes of an existing node; returns the stored form.
    fn update_node(&self, node: Node) -> StoreResult<Node>;

    /// Delete a node, its subtree and every edge touching them.
    fn delete_node(&self, id: NodeId) -> StoreResult<()>;

    /// First attached bookmark at exactly `location` (lowest id wins).
    fn find_bookmark_by_location(&self, location: &Location) -> StoreResult<Option<Node>>;

    fn get_parent_id(&self, node_id: NodeId) -> StoreResult<Option<NodeId>>;

    fn add_to_list(&self, node_id: NodeId, parent_list_id: NodeId) -> StoreResult<()>;

    fn remove_from_list(&self, node_id: NodeId, parent_list_id: NodeId) -> StoreResult<()>;

    /// Active list, creating and selecting a default one if none is usable.
    fn ensure_and_get_active_list(&self) -> StoreResult<List>;

    fn set_active_list(&self, id: NodeId) -> StoreResult<()>;

    /// All list nodes, root included, by ascending id.
    fn all_lists(&self) -> StoreResult<Vec<List>>;

    /// Apply every change or none of them.
    fn apply_changes(&self, changes: Vec<TreeChange>) -> StoreResult<()>;

    /// Persist several nodes atomically; returns their stored forms.
    fn update_nodes(&self, nodes: Vec<Node>) -> StoreResult<Vec<Node>> {
        let ids = nodes.iter().filter_map(Node::id).collect::<Vec<_>>();
        self.apply_changes(nodes.into_iter().map(TreeChange::Update).collect())?;
        ids.into_iter()
            .filter_map(|id| self.find_node(id).transpose())
            .collect()
    }
}

/// Source of the caller's current cursor position.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> Option<Location>;

    /// Revision fingerprint of the source at `location`, if known.
    fn current_revision(&self, _location: &Location) -> Option<String> {
        None
    }
}

/// Sink for non-fatal navigation notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &NavigationNotice);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Location handed over by the caller (e.g. from command line arguments).
///
/// The revision of a marked file is its content hash.
#[derive(Debug, Clone, Default)]
pub struct FixedLocationProvider {
    location: Option<Location>,
}

impl FixedLocationProvider {
    pub fn new(location: Option<Location>) -> Self {
        Self { location }
    }
}

impl LocationProvider for FixedLocationProvider {
    fn current_location(&self) -> Option<Location> {
        self.location.clone()
    }

    fn current_revision(&self, location: &Location) -> Option<String> {
        match hash::file_hash(&location.path) {
            Ok(h) => Some(h),
            Err(e) => {
                debug!("no revision for {}: {}", location, e);
                None
            }
        }
    }
}

/// Notifier that reports through `tracing`.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &NavigationNotice) {
        warn!("{}", notice);
    }
}

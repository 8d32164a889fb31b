//! Bookmark service: tree mutations
//!
//! Every operation validates its preconditions before the first repository
//! write. Multi-node changes (swap, cut-paste) are sent to the repository as
//! one atomic batch.
//!
//! ```text
//! paste --cut N into P at position 1
//!
//! before:  P: [a:0, b:1, c:2]        after:  P: [a:0, N:1, b:2, c:3]
//! ```

use std::sync::Arc;

use chrono::Utc;
use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, NodeLookupExt};
use crate::config::Settings;
use crate::domain::tree::{descendant_ids, to_display_tree};
use crate::domain::{
    get_all_bookmarks, new_bookmark, Bookmark, DomainError, List, Location, NavigationSession,
    Node, NodeId, ROOT_LIST_ID,
};
use crate::infrastructure::traits::{LocationProvider, NodeRepository, Notifier, TreeChange};
use crate::infrastructure::StoreError;

/// Outcome of [`BookmarkService::toggle_mark`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkToggle {
    Created(Bookmark),
    Renamed(Bookmark),
    /// Snapshot taken before deletion
    Removed(Bookmark),
}

impl MarkToggle {
    pub fn bookmark(&self) -> &Bookmark {
        match self {
            MarkToggle::Created(b) | MarkToggle::Renamed(b) | MarkToggle::Removed(b) => b,
        }
    }
}

/// How [`BookmarkService::paste_node`] relocates a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOperation {
    /// Move the node, shifting later siblings down by one
    Cut,
    /// Insert a fresh duplicate (subtree included) without shifting siblings
    Copy,
}

/// Bookmark and list management over a [`NodeRepository`].
pub struct BookmarkService {
    pub(super) repo: Arc<dyn NodeRepository>,
    pub(super) locations: Arc<dyn LocationProvider>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) settings: Arc<Settings>,
}

impl BookmarkService {
    /// Create a new bookmark service.
    pub fn new(
        repo: Arc<dyn NodeRepository>,
        locations: Arc<dyn LocationProvider>,
        notifier: Arc<dyn Notifier>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            repo,
            locations,
            notifier,
            settings,
        }
    }

    // ============================================================
    // Lookups
    // ============================================================

    pub fn find_node(&self, id: NodeId) -> ApplicationResult<Node> {
        self.repo.find_node(id).or_not_found(id)
    }

    pub fn find_list(&self, id: NodeId) -> ApplicationResult<List> {
        Ok(self.find_node(id)?.into_list()?)
    }

    pub fn find_bookmark(&self, id: NodeId) -> ApplicationResult<Bookmark> {
        Ok(self.find_node(id)?.into_bookmark()?)
    }

    /// Bookmark placed at exactly `location`, if any.
    pub fn bookmark_at(&self, location: &Location) -> ApplicationResult<Option<Bookmark>> {
        match self.repo.find_bookmark_by_location(location)? {
            Some(node) => Ok(Some(node.into_bookmark()?)),
            None => Ok(None),
        }
    }

    /// Active list, created on first access.
    pub fn active_list(&self) -> ApplicationResult<List> {
        Ok(self.repo.ensure_and_get_active_list()?)
    }

    pub fn lists(&self) -> ApplicationResult<Vec<List>> {
        Ok(self.repo.all_lists()?)
    }

    /// All bookmarks below `list_id` (default: active list), unordered.
    pub fn all_bookmarks(&self, list_id: Option<NodeId>) -> ApplicationResult<Vec<Bookmark>> {
        let list = self.list_or_active(list_id)?;
        Ok(get_all_bookmarks(&list, |id| self.repo.find_node(id))?)
    }

    /// Terminal rendering of `list_id` (default: root) and its subtree.
    pub fn render_tree(&self, list_id: Option<NodeId>) -> ApplicationResult<Tree<String>> {
        let list = self.find_list(list_id.unwrap_or(ROOT_LIST_ID))?;
        Ok(to_display_tree(&list, |id| self.repo.find_node(id))?)
    }

    fn list_or_active(&self, list_id: Option<NodeId>) -> ApplicationResult<List> {
        match list_id {
            Some(id) => self.find_list(id),
            None => self.active_list(),
        }
    }

    /// Validate an explicit parent or fall back to the active list.
    fn resolve_parent(&self, parent_list_id: Option<NodeId>) -> ApplicationResult<NodeId> {
        let list = self.list_or_active(parent_list_id)?;
        Ok(list.require_id()?)
    }

    // ============================================================
    // Creation
    // ============================================================

    /// Insert a bookmark under `parent_list_id` (default: active list).
    ///
    /// Returns the stored node, including repository-assigned id and order.
    #[instrument(level = "debug", skip(self, node), fields(name = node.name()))]
    pub fn new_bookmark(
        &self,
        node: Node,
        parent_list_id: Option<NodeId>,
    ) -> ApplicationResult<Bookmark> {
        let bookmark = node.into_bookmark()?;
        let parent = self.resolve_parent(parent_list_id)?;
        let id = self.repo.insert_node(bookmark.into(), parent)?;
        debug!("new_bookmark: id={} parent={}", id, parent);
        self.find_bookmark(id)
    }

    /// Insert a list under `parent_list_id` (default: active list).
    #[instrument(level = "debug", skip(self, node), fields(name = node.name()))]
    pub fn new_list(&self, node: Node, parent_list_id: Option<NodeId>) -> ApplicationResult<List> {
        let list = node.into_list()?;
        let parent = self.resolve_parent(parent_list_id)?;
        let id = self.repo.insert_node(list.into(), parent)?;
        debug!("new_list: id={} parent={}", id, parent);
        self.find_list(id)
    }

    /// Create, rename or remove the bookmark at a location.
    ///
    /// - existing bookmark, empty `name`: removed
    /// - existing bookmark, other `name`: renamed
    /// - no bookmark: created under `parent_list_id` (default: active list)
    ///
    /// `location` defaults to the location provider's current position.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_mark(
        &self,
        name: &str,
        location: Option<Location>,
        parent_list_id: Option<NodeId>,
    ) -> ApplicationResult<MarkToggle> {
        let location = match location {
            Some(loc) => loc,
            None => self
                .locations
                .current_location()
                .ok_or(ApplicationError::MissingLocation)?,
        };

        if let Some(existing) = self.repo.find_bookmark_by_location(&location)? {
            let mut bookmark = existing.into_bookmark()?;
            let id = bookmark.require_id()?;
            if name.is_empty() {
                self.repo.delete_node(id)?;
                info!("removed bookmark {} at {}", id, location);
                return Ok(MarkToggle::Removed(bookmark));
            }
            bookmark.name = name.to_string();
            let stored = self.repo.update_node(bookmark.into())?.into_bookmark()?;
            info!("renamed bookmark {} to {:?}", id, name);
            return Ok(MarkToggle::Renamed(stored));
        }

        let parent = self.resolve_parent(parent_list_id)?;
        let revision = self.locations.current_revision(&location);
        let bookmark = new_bookmark(name)
            .at(location)
            .with_content_hash(revision);
        let created = self.new_bookmark(bookmark.into(), Some(parent))?;
        info!("created bookmark {:?} in list {}", created.id, parent);
        Ok(MarkToggle::Created(created))
    }

    // ============================================================
    // Update & delete
    // ============================================================

    #[instrument(level = "debug", skip(self))]
    pub fn rename_node(&self, id: NodeId, new_name: &str) -> ApplicationResult<Node> {
        let mut node = self.find_node(id)?;
        node.set_name(new_name);
        Ok(self.repo.update_node(node)?)
    }

    /// Stamp `visited_at` after the caller jumped to the bookmark.
    #[instrument(level = "debug", skip(self))]
    pub fn visit(&self, id: NodeId) -> ApplicationResult<Bookmark> {
        let mut bookmark = self.find_bookmark(id)?;
        bookmark.visited_at = Utc::now();
        Ok(self.repo.update_node(bookmark.into())?.into_bookmark()?)
    }

    /// Delete a bookmark; fails with `InvalidNodeType` for lists.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_bookmark(&self, id: NodeId) -> ApplicationResult<Bookmark> {
        let bookmark = self.find_bookmark(id)?;
        self.repo.delete_node(id)?;
        Ok(bookmark)
    }

    /// Delete any node; lists take their subtree with them.
    ///
    /// Returns the node as it was before deletion.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&self, id: NodeId) -> ApplicationResult<Node> {
        if id == ROOT_LIST_ID {
            return Err(DomainError::RootDeletionForbidden.into());
        }
        let node = self.find_node(id)?;
        self.repo.delete_node(id)?;
        info!("deleted {}", node);
        Ok(node)
    }

    /// Make `id` the active list and reset the session's navigation cursor.
    #[instrument(level = "debug", skip(self, session))]
    pub fn set_active_list(
        &self,
        session: &mut NavigationSession,
        id: NodeId,
    ) -> ApplicationResult<List> {
        let list = self.find_list(id)?;
        self.repo.set_active_list(id)?;
        session.focus(id);
        session.reset();
        Ok(list)
    }

    // ============================================================
    // Reordering & relocation
    // ============================================================

    /// Swap the `order` of two siblings.
    #[instrument(level = "debug", skip(self))]
    pub fn switch_position(&self, a: NodeId, b: NodeId) -> ApplicationResult<(Node, Node)> {
        let mut first = self.find_node(a)?;
        let mut second = self.find_node(b)?;
        let parent_a = self.repo.get_parent_id(a)?;
        let parent_b = self.repo.get_parent_id(b)?;
        if parent_a.is_none() || parent_a != parent_b {
            return Err(DomainError::CrossListMismatch { a, b }.into());
        }

        let order_a = first.order();
        first.set_order(second.order());
        second.set_order(order_a);

        let stored = self.repo.update_nodes(vec![first, second])?;
        let take = |id: NodeId| {
            stored
                .iter()
                .find(|n| n.id() == Some(id))
                .cloned()
                .ok_or(StoreError::MissingNode(id))
        };
        Ok((take(a)?, take(b)?))
    }

    /// Relocate or duplicate `node_id` into `parent_id` at `position`.
    ///
    /// Lists cannot be pasted into themselves or their descendants.
    #[instrument(level = "debug", skip(self))]
    pub fn paste_node(
        &self,
        node_id: NodeId,
        parent_id: NodeId,
        position: i64,
        operation: PasteOperation,
    ) -> ApplicationResult<Node> {
        let node = self.find_node(node_id)?;
        if let Node::List(list) = &node {
            if parent_id == node_id {
                return Err(DomainError::SelfParenting(node_id).into());
            }
            let below = descendant_ids(list, |id| self.repo.find_node(id))?;
            if below.contains(&parent_id) {
                return Err(DomainError::SelfParenting(node_id).into());
            }
        }
        let parent = self.find_list(parent_id)?;

        match operation {
            PasteOperation::Cut => self.cut_into(node_id, &parent, position),
            PasteOperation::Copy => self.copy_into(&node, parent_id, Some(position)),
        }
    }

    fn cut_into(&self, node_id: NodeId, parent: &List, position: i64) -> ApplicationResult<Node> {
        let parent_id = parent.require_id()?;
        let mut changes = Vec::new();
        for &child_id in parent.children.iter().filter(|&&c| c != node_id) {
            let mut child = self.find_node(child_id)?;
            if child.order() >= position {
                let shifted = child
                    .order()
                    .checked_add(1)
                    .ok_or(StoreError::OrderOverflow(parent_id))?;
                child.set_order(shifted);
                changes.push(TreeChange::Update(child));
            }
        }
        debug!(
            "cut_into: node={} parent={} position={} shifted={}",
            node_id,
            parent_id,
            position,
            changes.len()
        );
        changes.push(TreeChange::Attach {
            node: node_id,
            parent: parent_id,
            order: Some(position),
        });

        self.repo.apply_changes(changes)?;
        self.find_node(node_id)
    }

    /// Insert a duplicate of `node` (and its subtree) under `parent_id`.
    ///
    /// `position: None` appends.
    fn copy_into(
        &self,
        node: &Node,
        parent_id: NodeId,
        position: Option<i64>,
    ) -> ApplicationResult<Node> {
        let duplicate = node.duplicate();
        let id = match position {
            Some(p) => self.repo.insert_node_at_position(duplicate, parent_id, p)?,
            None => self.repo.insert_node(duplicate, parent_id)?,
        };
        if let Node::List(list) = node {
            for &child_id in &list.children {
                if let Some(child) = self.repo.find_node(child_id)? {
                    self.copy_into(&child, id, None)?;
                }
            }
        }
        self.find_node(id)
    }

    /// Detach `node_id` from `parent_id` without deleting it.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_from_list(&self, node_id: NodeId, parent_id: NodeId) -> ApplicationResult<()> {
        self.find_node(node_id)?;
        self.find_list(parent_id)?;
        self.repo.remove_from_list(node_id, parent_id)?;
        Ok(())
    }

    /// Attach a detached (or relocated) node to the end of `parent_id`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_to_list(&self, node_id: NodeId, parent_id: NodeId) -> ApplicationResult<Node> {
        self.find_node(node_id)?;
        self.find_list(parent_id)?;
        self.repo.add_to_list(node_id, parent_id)?;
        self.find_node(node_id)
    }
}

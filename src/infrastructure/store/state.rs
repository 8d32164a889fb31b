//! Tree state engine shared by the in-memory and file-backed stores.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{new_list, List, Location, Node, NodeId, ROOT_LIST_ID};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::TreeChange;

/// Name given to the root list.
pub const ROOT_LIST_NAME: &str = "root";

/// Complete store contents.
///
/// `parents` is derived from the lists' children and rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreState {
    nodes: BTreeMap<NodeId, Node>,
    next_id: NodeId,
    active_list: Option<NodeId>,
    #[serde(skip)]
    parents: HashMap<NodeId, NodeId>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreState {
    /// Fresh state holding only the root list.
    pub fn new() -> Self {
        let mut root = new_list(ROOT_LIST_NAME);
        root.id = Some(ROOT_LIST_ID);
        Self {
            nodes: BTreeMap::from([(ROOT_LIST_ID, Node::List(root))]),
            next_id: ROOT_LIST_ID + 1,
            active_list: None,
            parents: HashMap::new(),
        }
    }

    /// Rebuild the parent index and check the root invariant.
    pub fn reindex(&mut self) -> StoreResult<()> {
        if !matches!(self.nodes.get(&ROOT_LIST_ID), Some(Node::List(_))) {
            return Err(StoreError::NotAList(ROOT_LIST_ID));
        }
        self.parents.clear();
        for (&id, node) in &self.nodes {
            if let Node::List(l) = node {
                for &child in &l.children {
                    self.parents.insert(child, id);
                }
            }
        }
        let max_id = self.nodes.keys().next_back().copied().unwrap_or(ROOT_LIST_ID);
        self.next_id = self.next_id.max(max_id + 1);
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    fn existing(&self, id: NodeId) -> StoreResult<&Node> {
        self.nodes.get(&id).ok_or(StoreError::MissingNode(id))
    }

    fn list_mut(&mut self, id: NodeId) -> StoreResult<&mut List> {
        match self.nodes.get_mut(&id) {
            Some(Node::List(l)) => Ok(l),
            Some(Node::Bookmark(_)) => Err(StoreError::NotAList(id)),
            None => Err(StoreError::MissingNode(id)),
        }
    }

    fn ensure_list(&self, id: NodeId) -> StoreResult<&List> {
        match self.existing(id)? {
            Node::List(l) => Ok(l),
            Node::Bookmark(_) => Err(StoreError::NotAList(id)),
        }
    }

    /// One past the highest sibling order, 0 for an empty list.
    fn next_order(&self, parent: NodeId) -> StoreResult<i64> {
        let list = self.ensure_list(parent)?;
        let max = list
            .children
            .iter()
            .filter_map(|c| self.nodes.get(c))
            .map(Node::order)
            .max();
        match max {
            None => Ok(0),
            Some(max) => max.checked_add(1).ok_or(StoreError::OrderOverflow(parent)),
        }
    }

    fn sort_children(&mut self, parent: NodeId) -> StoreResult<()> {
        let mut keyed = self
            .ensure_list(parent)?
            .children
            .iter()
            .map(|&c| (self.nodes.get(&c).map_or(i64::MAX, Node::order), c))
            .collect::<Vec<_>>();
        keyed.sort();
        self.list_mut(parent)?.children = keyed.into_iter().map(|(_, c)| c).collect();
        Ok(())
    }

    /// Ids of `id` and everything below it.
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        let mut out = Vec::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            if let Some(Node::List(l)) = self.nodes.get(&current) {
                stack.extend(l.children.iter().copied());
            }
        }
        out
    }

    #[instrument(level = "trace", skip(self, node))]
    pub fn insert(
        &mut self,
        mut node: Node,
        parent: NodeId,
        order: Option<i64>,
    ) -> StoreResult<NodeId> {
        let order = match order {
            Some(o) => o,
            None => self.next_order(parent)?,
        };
        self.ensure_list(parent)?;

        let id = self.next_id;
        self.next_id += 1;
        node.set_id(Some(id));
        node.set_order(order);
        if let Node::List(l) = &mut node {
            l.children.clear();
        }

        self.nodes.insert(id, node);
        self.list_mut(parent)?.children.push(id);
        self.parents.insert(id, parent);
        self.sort_children(parent)?;
        debug!("insert: id={} parent={} order={}", id, parent, order);
        Ok(id)
    }

    #[instrument(level = "trace", skip(self, node))]
    pub fn update(&mut self, mut node: Node) -> StoreResult<Node> {
        let id = node
            .id()
            .ok_or_else(|| StoreError::Unidentified(node.name().to_string()))?;
        if id == ROOT_LIST_ID {
            return Err(StoreError::RootImmutable);
        }
        let stored = self.existing(id)?;
        if stored.kind() != node.kind() {
            return Err(StoreError::KindMismatch(id));
        }
        let order_changed = stored.order() != node.order();

        // Edges belong to the store, not to the caller's copy
        if let (Node::List(new), Node::List(old)) = (&mut node, stored) {
            new.children = old.children.clone();
        }

        self.nodes.insert(id, node.clone());
        if order_changed {
            if let Some(parent) = self.parent_of(id) {
                self.sort_children(parent)?;
            }
        }
        Ok(node)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn delete(&mut self, id: NodeId) -> StoreResult<()> {
        if id == ROOT_LIST_ID {
            return Err(StoreError::RootImmutable);
        }
        self.existing(id)?;

        if let Some(parent) = self.parent_of(id) {
            self.list_mut(parent)?.children.retain(|&c| c != id);
        }
        let removed = self.subtree(id);
        for gone in &removed {
            self.nodes.remove(gone);
            self.parents.remove(gone);
        }
        if self.active_list.is_some_and(|a| removed.contains(&a)) {
            self.active_list = None;
        }
        debug!("delete: id={} removed={}", id, removed.len());
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn attach(
        &mut self,
        node: NodeId,
        parent: NodeId,
        order: Option<i64>,
    ) -> StoreResult<()> {
        if node == ROOT_LIST_ID {
            return Err(StoreError::RootImmutable);
        }
        self.existing(node)?;
        self.ensure_list(parent)?;
        if self.subtree(node).contains(&parent) {
            return Err(StoreError::CycleRejected { node, parent });
        }

        if let Some(old) = self.parent_of(node) {
            self.detach(node, old)?;
        }
        let order = match order {
            Some(o) => o,
            None => self.next_order(parent)?,
        };
        if let Some(n) = self.nodes.get_mut(&node) {
            n.set_order(order);
        }
        self.list_mut(parent)?.children.push(node);
        self.parents.insert(node, parent);
        self.sort_children(parent)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, node: NodeId, parent: NodeId) -> StoreResult<()> {
        let list = self.list_mut(parent)?;
        let before = list.children.len();
        list.children.retain(|&c| c != node);
        if list.children.len() == before {
            return Err(StoreError::MissingEdge { node, parent });
        }
        self.parents.remove(&node);
        Ok(())
    }

    pub fn apply(&mut self, change: TreeChange) -> StoreResult<()> {
        match change {
            TreeChange::Update(node) => self.update(node).map(|_| ()),
            TreeChange::Attach {
                node,
                parent,
                order,
            } => self.attach(node, parent, order),
            TreeChange::Detach { node, parent } => self.detach(node, parent),
        }
    }

    /// True when the parent chain of `id` ends at the root list.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut seen = HashSet::new();
        let mut current = id;
        while current != ROOT_LIST_ID {
            if !seen.insert(current) {
                return false;
            }
            match self.parents.get(&current) {
                Some(&parent) => current = parent,
                None => return false,
            }
        }
        true
    }

    /// Attached bookmark at `location` with the lowest id.
    pub fn find_by_location(&self, location: &Location) -> Option<Node> {
        self.nodes
            .iter()
            .filter(|(id, _)| self.is_attached(**id))
            .map(|(_, node)| node)
            .find(|node| {
                node.as_bookmark()
                    .and_then(|b| b.location.as_ref())
                    .is_some_and(|loc| loc == location)
            })
            .cloned()
    }

    /// Active list if the pointer is set and still names a list.
    pub fn active(&self) -> Option<List> {
        match self.active_list.and_then(|id| self.nodes.get(&id)) {
            Some(Node::List(l)) => Some(l.clone()),
            _ => None,
        }
    }

    /// Current active list, or a default list under root selected on demand.
    pub fn ensure_active(&mut self, default_name: &str) -> StoreResult<List> {
        if let Some(list) = self.active() {
            return Ok(list);
        }

        let existing = self
            .ensure_list(ROOT_LIST_ID)?
            .children
            .iter()
            .filter_map(|c| self.nodes.get(c))
            .filter_map(Node::as_list)
            .find(|l| l.name == default_name)
            .and_then(|l| l.id);

        let id = match existing {
            Some(id) => id,
            None => self.insert(Node::List(new_list(default_name)), ROOT_LIST_ID, None)?,
        };
        debug!("ensure_active: selecting default list {}", id);
        self.active_list = Some(id);
        self.ensure_list(id).cloned()
    }

    pub fn set_active(&mut self, id: NodeId) -> StoreResult<()> {
        self.ensure_list(id)?;
        self.active_list = Some(id);
        Ok(())
    }

    pub fn lists(&self) -> Vec<List> {
        self.nodes
            .values()
            .filter_map(Node::as_list)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::new_bookmark;

    fn mark(state: &mut StoreState, parent: NodeId, line: u32) -> NodeId {
        let b = new_bookmark(format!("line{line}")).at(Location::new("a.rs", line, 0));
        state.insert(Node::Bookmark(b), parent, None).unwrap()
    }

    #[test]
    fn given_new_state_when_created_then_only_root_exists() {
        let state = StoreState::new();
        assert_eq!(state.lists().len(), 1);
        assert!(state.get(ROOT_LIST_ID).unwrap().is_list());
    }

    #[test]
    fn given_appends_when_inserting_then_orders_are_dense() {
        let mut state = StoreState::new();
        let ids: Vec<_> = (1..=3).map(|l| mark(&mut state, ROOT_LIST_ID, l)).collect();
        let orders: Vec<_> = ids.iter().map(|id| state.get(*id).unwrap().order()).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn given_list_with_children_when_deleting_then_cascades() {
        let mut state = StoreState::new();
        let list = state
            .insert(Node::List(new_list("l")), ROOT_LIST_ID, None)
            .unwrap();
        let child = mark(&mut state, list, 1);

        state.delete(list).unwrap();

        assert!(state.get(list).is_none());
        assert!(state.get(child).is_none());
        assert!(state
            .get(ROOT_LIST_ID)
            .and_then(Node::as_list)
            .unwrap()
            .children
            .is_empty());
    }

    #[test]
    fn given_list_when_attaching_into_own_child_then_cycle_rejected() {
        let mut state = StoreState::new();
        let outer = state
            .insert(Node::List(new_list("outer")), ROOT_LIST_ID, None)
            .unwrap();
        let inner = state.insert(Node::List(new_list("inner")), outer, None).unwrap();

        let err = state.attach(outer, inner, None).unwrap_err();
        assert!(matches!(err, StoreError::CycleRejected { .. }));
        assert_eq!(state.parent_of(outer), Some(ROOT_LIST_ID));
    }

    #[test]
    fn given_detached_bookmark_when_finding_by_location_then_not_found() {
        let mut state = StoreState::new();
        let id = mark(&mut state, ROOT_LIST_ID, 9);
        state.detach(id, ROOT_LIST_ID).unwrap();

        assert!(state.find_by_location(&Location::new("a.rs", 9, 0)).is_none());
        assert!(state.get(id).is_some());
    }

    #[test]
    fn given_bookmark_in_detached_list_when_finding_by_location_then_not_found() {
        let mut state = StoreState::new();
        let list = state
            .insert(Node::List(new_list("inner")), ROOT_LIST_ID, None)
            .unwrap();
        let id = mark(&mut state, list, 3);
        state.detach(list, ROOT_LIST_ID).unwrap();

        assert_eq!(state.parent_of(id), Some(list));
        assert!(!state.is_attached(id));
        assert!(state.find_by_location(&Location::new("a.rs", 3, 0)).is_none());
    }

    #[test]
    fn given_sibling_at_max_order_when_appending_then_order_overflow() {
        let mut state = StoreState::new();
        state
            .insert(Node::List(new_list("last")), ROOT_LIST_ID, Some(i64::MAX))
            .unwrap();

        let err = state
            .insert(Node::List(new_list("next")), ROOT_LIST_ID, None)
            .unwrap_err();

        assert!(matches!(err, StoreError::OrderOverflow(ROOT_LIST_ID)));
    }

    #[test]
    fn given_active_list_deleted_when_ensuring_then_default_is_recreated() {
        let mut state = StoreState::new();
        let first = state.ensure_active("Default").unwrap();
        state.delete(first.id.unwrap()).unwrap();

        let second = state.ensure_active("Default").unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.name, "Default");
    }

    #[test]
    fn given_serialized_state_when_reindexed_then_parents_are_restored() {
        let mut state = StoreState::new();
        let id = mark(&mut state, ROOT_LIST_ID, 1);
        let json = serde_json::to_string(&state).unwrap();

        let mut loaded: StoreState = serde_json::from_str(&json).unwrap();
        loaded.reindex().unwrap();

        assert_eq!(loaded.parent_of(id), Some(ROOT_LIST_ID));
        assert_eq!(loaded.next_id, id + 1);
    }
}

//! Subtree traversal over lists whose children are stored by identifier.
//!
//! Lists only hold child ids, so every traversal takes a lookup that resolves
//! an id to a node (normally backed by the repository). Traversals are
//! iterative and visit each node at most once, so a corrupted store with a
//! repeated edge cannot produce duplicates or loop forever.

use std::collections::HashSet;

use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::{Bookmark, List, Node, NodeId};

/// Collect every bookmark reachable from `list` through child edges.
///
/// The result is unordered; callers sort by whatever key they need.
/// Children that do not resolve are skipped.
#[instrument(level = "trace", skip(list, lookup), fields(list = ?list.id))]
pub fn get_all_bookmarks<F, E>(list: &List, lookup: F) -> Result<Vec<Bookmark>, E>
where
    F: FnMut(NodeId) -> Result<Option<Node>, E>,
{
    let mut bookmarks = Vec::new();
    walk_subtree(list, lookup, |node| {
        if let Node::Bookmark(b) = node {
            bookmarks.push(b);
        }
    })?;
    Ok(bookmarks)
}

/// Identifiers of all nodes below `list` (excluding `list` itself).
pub fn descendant_ids<F, E>(list: &List, lookup: F) -> Result<Vec<NodeId>, E>
where
    F: FnMut(NodeId) -> Result<Option<Node>, E>,
{
    let mut ids = Vec::new();
    walk_subtree(list, lookup, |node| {
        if let Some(id) = node.id() {
            ids.push(id);
        }
    })?;
    Ok(ids)
}

fn walk_subtree<F, E, V>(list: &List, mut lookup: F, mut visit: V) -> Result<(), E>
where
    F: FnMut(NodeId) -> Result<Option<Node>, E>,
    V: FnMut(Node),
{
    let mut seen: HashSet<NodeId> = list.id.into_iter().collect();
    // Reverse push keeps left-to-right visiting order
    let mut stack: Vec<NodeId> = list.children.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let Some(node) = lookup(id)? else {
            continue;
        };
        if let Node::List(l) = &node {
            stack.extend(l.children.iter().rev().copied());
        }
        visit(node);
    }
    Ok(())
}

/// Render `list` and its subtree for terminal display.
pub fn to_display_tree<F, E>(list: &List, mut lookup: F) -> Result<Tree<String>, E>
where
    F: FnMut(NodeId) -> Result<Option<Node>, E>,
{
    let mut seen = HashSet::new();
    build_display_tree(&Node::List(list.clone()), &mut lookup, &mut seen)
}

fn build_display_tree<F, E>(
    node: &Node,
    lookup: &mut F,
    seen: &mut HashSet<NodeId>,
) -> Result<Tree<String>, E>
where
    F: FnMut(NodeId) -> Result<Option<Node>, E>,
{
    let mut tree = Tree::new(node.to_string());
    if let Some(id) = node.id() {
        seen.insert(id);
    }
    if let Node::List(l) = node {
        for &child_id in &l.children {
            if seen.contains(&child_id) {
                continue;
            }
            if let Some(child) = lookup(child_id)? {
                tree.push(build_display_tree(&child, lookup, seen)?);
            }
        }
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;

    use super::*;
    use crate::domain::entities::{new_bookmark, new_list};

    fn list(id: NodeId, children: Vec<NodeId>) -> Node {
        let mut l = new_list(format!("list{id}"));
        l.id = Some(id);
        l.children = children;
        Node::List(l)
    }

    fn bookmark(id: NodeId) -> Node {
        let mut b = new_bookmark(format!("mark{id}"));
        b.id = Some(id);
        Node::Bookmark(b)
    }

    // root(0)
    // ├── mark1
    // ├── list2
    // │   ├── mark3
    // │   └── list4
    // │       └── mark5
    // └── mark6
    fn store() -> HashMap<NodeId, Node> {
        [
            list(0, vec![1, 2, 6]),
            bookmark(1),
            list(2, vec![3, 4]),
            bookmark(3),
            list(4, vec![5]),
            bookmark(5),
            bookmark(6),
            bookmark(7), // outside the tree
        ]
        .into_iter()
        .map(|n| (n.id().unwrap(), n))
        .collect()
    }

    #[test]
    fn given_nested_lists_when_collecting_then_returns_all_reachable_bookmarks() {
        let store = store();
        let root = store[&0].as_list().unwrap().clone();

        let found = get_all_bookmarks(&root, |id| Ok::<_, Infallible>(store.get(&id).cloned()))
            .unwrap();

        let mut ids: Vec<_> = found.iter().filter_map(|b| b.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 3, 5, 6]);
    }

    #[test]
    fn given_inner_list_when_collecting_then_excludes_outside_bookmarks() {
        let store = store();
        let inner = store[&2].as_list().unwrap().clone();

        let found = get_all_bookmarks(&inner, |id| Ok::<_, Infallible>(store.get(&id).cloned()))
            .unwrap();

        let mut ids: Vec<_> = found.iter().filter_map(|b| b.id).collect();
        ids.sort();
        assert_eq!(ids, vec![3, 5]);
    }

    #[test]
    fn given_repeated_edge_when_collecting_then_no_duplicates() {
        let mut store = store();
        store.insert(4, list(4, vec![5, 2, 5]));
        let root = store[&0].as_list().unwrap().clone();

        let found = get_all_bookmarks(&root, |id| Ok::<_, Infallible>(store.get(&id).cloned()))
            .unwrap();

        assert_eq!(found.len(), 4);
    }

    #[test]
    fn given_subtree_when_collecting_descendants_then_includes_lists() {
        let store = store();
        let inner = store[&2].as_list().unwrap().clone();

        let ids =
            descendant_ids(&inner, |id| Ok::<_, Infallible>(store.get(&id).cloned())).unwrap();

        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn given_tree_when_rendering_then_contains_every_node() {
        let store = store();
        let root = store[&0].as_list().unwrap().clone();

        let rendered = to_display_tree(&root, |id| Ok::<_, Infallible>(store.get(&id).cloned()))
            .unwrap()
            .to_string();

        for name in ["list0/", "mark1", "list2/", "mark3", "list4/", "mark5", "mark6"] {
            assert!(rendered.contains(name), "missing {name} in\n{rendered}");
        }
        assert!(!rendered.contains("mark7"));
    }
}

//! Domain entities: bookmarks, lists and the node sum type

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::location::Location;

/// Repository-assigned node identifier.
pub type NodeId = u64;

/// Identifier of the immutable root list.
pub const ROOT_LIST_ID: NodeId = 0;

/// Variant tag, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Bookmark,
    List,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Bookmark => write!(f, "bookmark"),
            NodeKind::List => write!(f, "list"),
        }
    }
}

/// A named location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// None until the repository assigns one on insert
    pub id: Option<NodeId>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Sibling position; assigned by the repository on insert
    pub order: i64,
    pub is_expanded: bool,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub visited_at: DateTime<Utc>,
    /// Fingerprint of the marked source revision
    pub content_hash: Option<String>,
}

/// A container of bookmarks and nested lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: Option<NodeId>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub order: i64,
    pub is_expanded: bool,
    pub description: Option<String>,
    /// Child identifiers, kept sorted by `(order, id)` by the repository
    pub children: Vec<NodeId>,
}

/// A node of the bookmark tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Bookmark(Bookmark),
    List(List),
}

/// Construct a bookmark without a location.
///
/// Both timestamps are set to now; `order` is left for the repository.
pub fn new_bookmark(name: impl Into<String>) -> Bookmark {
    let now = Utc::now();
    Bookmark {
        id: None,
        name: name.into(),
        created_at: now,
        order: 0,
        is_expanded: false,
        description: None,
        location: None,
        visited_at: now,
        content_hash: None,
    }
}

/// Construct an empty list.
pub fn new_list(name: impl Into<String>) -> List {
    List {
        id: None,
        name: name.into(),
        created_at: Utc::now(),
        order: 0,
        is_expanded: true,
        description: None,
        children: Vec::new(),
    }
}

impl Bookmark {
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_content_hash(mut self, hash: Option<String>) -> Self {
        self.content_hash = hash;
        self
    }

    /// Persisted identifier or `NotPersisted`.
    pub fn require_id(&self) -> DomainResult<NodeId> {
        self.id
            .ok_or_else(|| DomainError::NotPersisted(self.name.clone()))
    }
}

impl List {
    pub fn require_id(&self) -> DomainResult<NodeId> {
        self.id
            .ok_or_else(|| DomainError::NotPersisted(self.name.clone()))
    }

    pub fn is_root(&self) -> bool {
        self.id == Some(ROOT_LIST_ID)
    }
}

impl From<Bookmark> for Node {
    fn from(b: Bookmark) -> Self {
        Node::Bookmark(b)
    }
}

impl From<List> for Node {
    fn from(l: List) -> Self {
        Node::List(l)
    }
}

impl Node {
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Node::Bookmark(b) => b.id,
            Node::List(l) => l.id,
        }
    }

    pub fn set_id(&mut self, id: Option<NodeId>) {
        match self {
            Node::Bookmark(b) => b.id = id,
            Node::List(l) => l.id = id,
        }
    }

    pub fn require_id(&self) -> DomainResult<NodeId> {
        match self {
            Node::Bookmark(b) => b.require_id(),
            Node::List(l) => l.require_id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Bookmark(b) => &b.name,
            Node::List(l) => &l.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Node::Bookmark(b) => b.name = name.into(),
            Node::List(l) => l.name = name.into(),
        }
    }

    pub fn order(&self) -> i64 {
        match self {
            Node::Bookmark(b) => b.order,
            Node::List(l) => l.order,
        }
    }

    pub fn set_order(&mut self, order: i64) {
        match self {
            Node::Bookmark(b) => b.order = order,
            Node::List(l) => l.order = order,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Bookmark(_) => NodeKind::Bookmark,
            Node::List(_) => NodeKind::List,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List(_))
    }

    pub fn as_bookmark(&self) -> Option<&Bookmark> {
        match self {
            Node::Bookmark(b) => Some(b),
            Node::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Node::List(l) => Some(l),
            Node::Bookmark(_) => None,
        }
    }

    /// Unwrap the bookmark variant or fail with `InvalidNodeType`.
    pub fn into_bookmark(self) -> DomainResult<Bookmark> {
        match self {
            Node::Bookmark(b) => Ok(b),
            Node::List(l) => Err(DomainError::InvalidNodeType {
                id: l.id,
                expected: NodeKind::Bookmark,
                found: NodeKind::List,
            }),
        }
    }

    /// Unwrap the list variant or fail with `InvalidNodeType`.
    pub fn into_list(self) -> DomainResult<List> {
        match self {
            Node::List(l) => Ok(l),
            Node::Bookmark(b) => Err(DomainError::InvalidNodeType {
                id: b.id,
                expected: NodeKind::List,
                found: NodeKind::Bookmark,
            }),
        }
    }

    /// Duplicate with fresh timestamps and no identifier.
    ///
    /// List children are dropped; the caller re-creates the subtree.
    pub fn duplicate(&self) -> Node {
        let now = Utc::now();
        match self {
            Node::Bookmark(b) => Node::Bookmark(Bookmark {
                id: None,
                created_at: now,
                visited_at: now,
                ..b.clone()
            }),
            Node::List(l) => Node::List(List {
                id: None,
                created_at: now,
                children: Vec::new(),
                ..l.clone()
            }),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        match self {
            Node::Bookmark(b) => match &b.location {
                Some(loc) => write!(f, "[{}] {} ({})", id, b.name, loc),
                None => write!(f, "[{}] {}", id, b.name),
            },
            Node::List(l) => write!(f, "[{}] {}/", id, l.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_name_when_creating_bookmark_then_has_no_location_and_equal_timestamps() {
        let b = new_bookmark("todo");
        assert_eq!(b.name, "todo");
        assert!(b.id.is_none());
        assert!(b.location.is_none());
        assert_eq!(b.created_at, b.visited_at);
    }

    #[test]
    fn given_blank_name_when_creating_nodes_then_permitted() {
        assert_eq!(new_bookmark("   ").name, "   ");
        assert_eq!(new_list("").name, "");
    }

    #[test]
    fn given_list_node_when_into_bookmark_then_invalid_node_type() {
        let node: Node = new_list("l").into();
        let err = node.into_bookmark().unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidNodeType {
                id: None,
                expected: NodeKind::Bookmark,
                found: NodeKind::List,
            }
        );
    }

    #[test]
    fn given_persisted_list_when_duplicating_then_drops_id_and_children() {
        let mut list = new_list("work");
        list.id = Some(4);
        list.children = vec![5, 6];
        list.order = 3;

        let copy = Node::List(list).duplicate();

        let copy = copy.into_list().unwrap();
        assert_eq!(copy.id, None);
        assert!(copy.children.is_empty());
        assert_eq!(copy.order, 3);
        assert_eq!(copy.name, "work");
    }

    #[test]
    fn given_unpersisted_node_when_require_id_then_not_persisted() {
        let node: Node = new_bookmark("x").into();
        assert!(matches!(
            node.require_id(),
            Err(DomainError::NotPersisted(_))
        ));
    }
}

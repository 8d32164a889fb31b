//! Bookmark navigation: id order (circular, stateful) and line order (per file).
//!
//! Selection functions are pure; the only state is the `NavigationSession`
//! owned by the caller.

use std::fmt;
use std::path::PathBuf;

use itertools::Itertools;

use crate::domain::entities::{Bookmark, NodeId};
use crate::domain::location::Location;

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => write!(f, "next"),
            Direction::Prev => write!(f, "previous"),
        }
    }
}

/// Non-fatal "nothing to jump to" outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationNotice {
    /// The active list has no bookmarks at all
    NoBookmarksAvailable,
    /// No bookmark of the active list lives in the current file
    NoBookmarksInFile(PathBuf),
    /// Bookmarks exist but none lies in the requested direction
    NoMatchInDirection(Direction),
}

impl fmt::Display for NavigationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationNotice::NoBookmarksAvailable => write!(f, "no bookmarks available"),
            NavigationNotice::NoBookmarksInFile(path) => {
                write!(f, "no bookmarks in {}", path.display())
            }
            NavigationNotice::NoMatchInDirection(dir) => write!(f, "no {} bookmark", dir),
        }
    }
}

/// Per-caller navigation state.
///
/// Holds the last bookmark selected by id-order navigation, scoped to the
/// list that was active when it was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationSession {
    list_id: Option<NodeId>,
    last_visited: Option<NodeId>,
}

impl NavigationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose cursor starts at `last_visited` within `list_id`.
    pub fn resume(list_id: NodeId, last_visited: NodeId) -> Self {
        Self {
            list_id: Some(list_id),
            last_visited: Some(last_visited),
        }
    }

    pub fn last_visited(&self) -> Option<NodeId> {
        self.last_visited
    }

    pub fn list_id(&self) -> Option<NodeId> {
        self.list_id
    }

    /// Bind the session to `list_id`, dropping the cursor if the list changed.
    pub fn focus(&mut self, list_id: NodeId) {
        if self.list_id != Some(list_id) {
            self.list_id = Some(list_id);
            self.last_visited = None;
        }
    }

    pub fn reset(&mut self) {
        self.last_visited = None;
    }

    pub fn record(&mut self, bookmark_id: NodeId) {
        self.last_visited = Some(bookmark_id);
    }
}

/// Pick the neighbour of `last_visited` in `order` sequence, circularly.
///
/// An unknown or unset cursor selects the first bookmark regardless of
/// direction. Equal orders fall back to id.
pub fn select_by_order(
    bookmarks: &[Bookmark],
    last_visited: Option<NodeId>,
    direction: Direction,
) -> Result<Bookmark, NavigationNotice> {
    if bookmarks.is_empty() {
        return Err(NavigationNotice::NoBookmarksAvailable);
    }

    let sorted = bookmarks
        .iter()
        .sorted_by_key(|b| (b.order, b.id))
        .collect::<Vec<_>>();
    let len = sorted.len();

    let current = last_visited.and_then(|id| sorted.iter().position(|b| b.id == Some(id)));
    let index = match (current, direction) {
        (None, _) => 0,
        (Some(i), Direction::Next) => (i + 1) % len,
        (Some(i), Direction::Prev) => (i + len - 1) % len,
    };

    Ok(sorted[index].clone())
}

/// Pick the closest bookmark in `current.path` strictly above or below
/// `current.line`.
///
/// Bookmarks in other files are ignored. With `wraparound` the search
/// continues from the opposite end of the file.
pub fn select_by_line(
    bookmarks: &[Bookmark],
    current: &Location,
    direction: Direction,
    wraparound: bool,
) -> Result<Bookmark, NavigationNotice> {
    let in_file = bookmarks
        .iter()
        .filter_map(|b| b.location.as_ref().map(|loc| (loc, b)))
        .filter(|(loc, _)| loc.is_in(&current.path))
        .sorted_by_key(|(loc, b)| (loc.line, loc.col, b.id))
        .collect::<Vec<_>>();

    if in_file.is_empty() {
        return Err(NavigationNotice::NoBookmarksInFile(current.path.clone()));
    }

    let found = match direction {
        Direction::Next => in_file
            .iter()
            .find(|(loc, _)| loc.line > current.line)
            .or_else(|| wraparound.then(|| in_file.first()).flatten()),
        Direction::Prev => in_file
            .iter()
            .rev()
            .find(|(loc, _)| loc.line < current.line)
            .or_else(|| wraparound.then(|| in_file.last()).flatten()),
    };

    found
        .map(|(_, b)| (*b).clone())
        .ok_or(NavigationNotice::NoMatchInDirection(direction))
}

//! Hierarchical bookmarks for source locations.
//!
//! Bookmarks live in a tree of lists rooted at list `0`. The
//! [`application::services::BookmarkService`] mutates the tree through the
//! [`infrastructure::traits::NodeRepository`] port and navigates the
//! active list by bookmark order or by line.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

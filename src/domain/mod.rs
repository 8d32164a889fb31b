//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod location;
pub mod navigation;
pub mod tree;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use location::Location;
pub use navigation::{Direction, NavigationNotice, NavigationSession};
pub use tree::get_all_bookmarks;

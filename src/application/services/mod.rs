//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on boundary traits (NodeRepository, LocationProvider, Notifier)
//! but are themselves concrete structs, not traits.

mod bookmark;
mod navigation;

pub use bookmark::{BookmarkService, MarkToggle, PasteOperation};
pub use navigation::Navigation;

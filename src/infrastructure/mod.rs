//! Infrastructure layer: repository implementations, I/O adapters and DI container
//!
//! This layer implements the boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod store;
pub mod traits;

pub use error::{InfraError, InfraResult, StoreError, StoreResult};

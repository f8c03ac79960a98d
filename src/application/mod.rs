//! Application layer.
//!
//! Workflows that combine the pure domain planner with a store.

pub mod reorder;

pub use reorder::{ReorderService, ServiceError};

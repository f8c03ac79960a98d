//! Infrastructure module for external services.
//!
//! This module contains the client store implementations, the store factory
//! and configuration loading.

pub mod config;
pub mod factory;
pub mod in_memory;
pub mod sqlite;
pub mod store;

pub use config::{AppConfig, ConfigurationError, LogFormat, StoreMode};
pub use factory::{FactoryError, StoreFactory, load_seed};
pub use in_memory::InMemoryClientStore;
pub use sqlite::SqliteClientStore;
pub use store::{ClientStore, StoreError, StoreFuture, validate_seed};

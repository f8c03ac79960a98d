//! # client-lanes
//!
//! Keeps clients ordered inside three lanes (`backlog`, `in-progress` and
//! `complete`). Every lane holds the ranks `1..=N` exactly once; moving a
//! client shifts its neighbours so that stays true.
//!
//! ## Layers
//!
//! - [`domain`]: client types and the pure reorder planner
//! - [`infrastructure`]: client stores (in-memory, `SQLite`), configuration
//! - [`application`]: the serialised reorder workflow
//! - [`api`]: the axum HTTP surface
//!
//! ## Example
//!
//! ```rust
//! use client_lanes::domain::{plan_reorder, Client, ClientId, Lane, Priority, ReorderRequest};
//!
//! let a = ClientId::new(1).unwrap();
//! let b = ClientId::new(2).unwrap();
//! let clients = vec![
//!     Client::new(a, "A", Lane::Backlog, Priority::new(1).unwrap()),
//!     Client::new(b, "B", Lane::Backlog, Priority::new(2).unwrap()),
//! ];
//!
//! let plan = plan_reorder(&clients, &ReorderRequest::new(b).with_priority(Priority::TOP)).unwrap();
//! let after = plan.applied(&clients);
//! assert_eq!(after[0].priority.get(), 2);
//! assert_eq!(after[1].priority.get(), 1);
//! ```

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

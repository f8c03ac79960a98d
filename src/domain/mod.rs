//! Domain module for client lanes.
//!
//! This module contains the client model, lane audits and the pure reorder
//! planner.

pub mod client;
pub mod lanes;
pub mod reorder;

pub use client::{Client, ClientId, InvalidClientId, InvalidPriority, Lane, Priority, UnknownLane};
pub use lanes::{LaneViolation, audit_lanes, bottom_of, lane_len};
pub use reorder::{
    ChangeKind, RankAdjustment, ReorderError, ReorderPlan, ReorderRequest, classify, plan_reorder,
};

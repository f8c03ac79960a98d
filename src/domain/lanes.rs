//! Lane-level views over a client snapshot.
//!
//! Every lane must hold the priorities `1..=N` exactly once, where `N` is the
//! number of clients filed under it. [`audit_lanes`] reports the lanes that
//! do not.

use std::collections::BTreeMap;

use super::client::{Client, Lane, Priority};

/// A lane whose priorities are not the dense sequence `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneViolation {
    /// The offending lane.
    pub lane: Lane,
    /// Priorities found in the lane, ascending.
    pub priorities: Vec<u32>,
}

impl std::fmt::Display for LaneViolation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "lane {} holds priorities {:?}, expected 1..={}",
            self.lane,
            self.priorities,
            self.priorities.len()
        )
    }
}

/// Number of clients filed under `lane`.
pub fn lane_len(clients: &[Client], lane: Lane) -> usize {
    clients.iter().filter(|client| client.status == lane).count()
}

/// Lowest-ranked priority in `lane`, or `None` when the lane is empty.
pub fn bottom_of(clients: &[Client], lane: Lane) -> Option<Priority> {
    clients
        .iter()
        .filter(|client| client.status == lane)
        .map(|client| client.priority)
        .max()
}

/// Checks every lane for density and uniqueness.
///
/// Empty lanes are always valid. Violations come back in lane order.
pub fn audit_lanes(clients: &[Client]) -> Vec<LaneViolation> {
    let mut by_lane: BTreeMap<Lane, Vec<u32>> = BTreeMap::new();
    for client in clients {
        by_lane
            .entry(client.status)
            .or_default()
            .push(client.priority.get());
    }

    by_lane
        .into_iter()
        .filter_map(|(lane, mut priorities)| {
            priorities.sort_unstable();
            let dense = priorities
                .iter()
                .zip(1_u32..)
                .all(|(priority, expected)| *priority == expected);
            (!dense).then_some(LaneViolation { lane, priorities })
        })
        .collect()
}

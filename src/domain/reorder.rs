//! Reorder planning.
//!
//! Turns a client snapshot and a requested move into the ordered list of
//! single-client updates that keeps every lane dense (`1..=N`, no gaps, no
//! duplicates) with priority `1` at the top.
//!
//! Planning is pure: nothing here touches a store. The
//! [`ReorderService`](crate::application::ReorderService) applies the plan.
//!
//! # Moves
//!
//! | Request | Destination lane | Source lane |
//! |---|---|---|
//! | same lane, `P < O` | clients in `[P, O-1]` drop one slot | - |
//! | same lane, `P > O` | clients in `[O+1, P]` rise one slot | - |
//! | new lane, no priority | target appended at the bottom | clients below `O` rise one slot |
//! | new lane, priority `P` | clients at `P` and below drop one slot | clients below `O` rise one slot |

use std::num::NonZeroU32;

use thiserror::Error;

use super::client::{Client, ClientId, Lane, Priority};
use super::lanes::{bottom_of, lane_len};

// =============================================================================
// Request / Plan Types
// =============================================================================

/// A requested change to one client's lane and/or rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderRequest {
    /// The client being moved.
    pub target: ClientId,
    /// Destination lane; `None` keeps the current one.
    pub status: Option<Lane>,
    /// Destination rank; `None` means "bottom of the new lane" on a lane
    /// change and "unchanged" otherwise.
    pub priority: Option<Priority>,
}

impl ReorderRequest {
    /// Creates a request that changes nothing yet.
    #[must_use]
    pub const fn new(target: ClientId) -> Self {
        Self {
            target,
            status: None,
            priority: None,
        }
    }

    /// Sets the destination lane.
    #[must_use]
    pub const fn with_status(mut self, status: Lane) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the destination rank.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// The classified shape of a request, after clamping to the lane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Nothing to do.
    NoOp,
    /// Rotation inside one lane.
    PriorityOnly {
        /// The lane both positions belong to.
        lane: Lane,
        /// Current rank.
        from: Priority,
        /// Requested rank.
        to: Priority,
    },
    /// Lane change to the bottom of the destination.
    StatusOnly {
        /// Current lane.
        from_lane: Lane,
        /// Current rank.
        from: Priority,
        /// Destination lane.
        to_lane: Lane,
        /// Bottom slot of the destination.
        to: Priority,
    },
    /// Lane change to an explicit rank.
    StatusAndPriority {
        /// Current lane.
        from_lane: Lane,
        /// Current rank.
        from: Priority,
        /// Destination lane.
        to_lane: Lane,
        /// Requested rank in the destination.
        to: Priority,
    },
}

impl ChangeKind {
    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NoOp => "no_op",
            Self::PriorityOnly { .. } => "priority_only",
            Self::StatusOnly { .. } => "status_only",
            Self::StatusAndPriority { .. } => "status_and_priority",
        }
    }
}

/// One single-client update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankAdjustment {
    /// Client to update.
    pub id: ClientId,
    /// New lane, or `None` to keep it.
    pub status: Option<Lane>,
    /// New rank.
    pub priority: Priority,
}

impl RankAdjustment {
    /// Applies this adjustment to `client` in place.
    pub fn apply(&self, client: &mut Client) {
        if let Some(status) = self.status {
            client.status = status;
        }
        client.priority = self.priority;
    }
}

/// A classified change and the updates that realise it, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    /// What kind of move this is.
    pub kind: ChangeKind,
    /// Updates to issue, one per affected client.
    pub adjustments: Vec<RankAdjustment>,
}

impl ReorderPlan {
    /// Returns true when the plan issues no updates.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.adjustments.is_empty()
    }

    /// Returns `clients` with every adjustment applied, in order.
    ///
    /// Adjustments naming an id that is not in `clients` are ignored.
    #[must_use]
    pub fn applied(&self, clients: &[Client]) -> Vec<Client> {
        let mut result = clients.to_vec();
        for adjustment in &self.adjustments {
            if let Some(client) = result.iter_mut().find(|client| client.id == adjustment.id) {
                adjustment.apply(client);
            }
        }
        result
    }
}

/// Errors raised while planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// The target is not part of the snapshot.
    #[error("client {0} not found")]
    ClientNotFound(ClientId),
}

// =============================================================================
// Planning
// =============================================================================

/// Classifies `request` against the target's current position.
///
/// A requested rank past the end of the destination lane is clamped to the
/// last valid slot; a clamp that lands on the current slot is a no-op.
pub fn classify(clients: &[Client], target: &Client, request: &ReorderRequest) -> ChangeKind {
    let new_lane = request.status.filter(|lane| *lane != target.status);

    match (new_lane, request.priority) {
        (None, None) => ChangeKind::NoOp,
        (None, Some(requested)) => {
            let to = requested.min(last_slot(lane_len(clients, target.status)));
            if to == target.priority {
                ChangeKind::NoOp
            } else {
                ChangeKind::PriorityOnly {
                    lane: target.status,
                    from: target.priority,
                    to,
                }
            }
        }
        (Some(to_lane), None) => ChangeKind::StatusOnly {
            from_lane: target.status,
            from: target.priority,
            to_lane,
            to: bottom_of(clients, to_lane).map_or(Priority::TOP, Priority::lowered),
        },
        (Some(to_lane), Some(requested)) => ChangeKind::StatusAndPriority {
            from_lane: target.status,
            from: target.priority,
            to_lane,
            to: requested.min(last_slot(lane_len(clients, to_lane) + 1)),
        },
    }
}

/// Plans the updates for `request` against `clients`.
///
/// # Errors
///
/// Returns [`ReorderError::ClientNotFound`] if the target is not in `clients`.
pub fn plan_reorder(
    clients: &[Client],
    request: &ReorderRequest,
) -> Result<ReorderPlan, ReorderError> {
    let target = clients
        .iter()
        .find(|client| client.id == request.target)
        .ok_or(ReorderError::ClientNotFound(request.target))?;

    let kind = classify(clients, target, request);
    let mut adjustments = Vec::new();

    match kind {
        ChangeKind::NoOp => {}
        ChangeKind::PriorityOnly { lane, from, to } => {
            rotate(clients, target.id, lane, from, to, &mut adjustments);
            adjustments.push(RankAdjustment {
                id: target.id,
                status: None,
                priority: to,
            });
        }
        ChangeKind::StatusOnly {
            from_lane,
            from,
            to_lane,
            to,
        } => {
            adjustments.push(RankAdjustment {
                id: target.id,
                status: Some(to_lane),
                priority: to,
            });
            close_gap(clients, target.id, from_lane, from, &mut adjustments);
        }
        ChangeKind::StatusAndPriority {
            from_lane,
            from,
            to_lane,
            to,
        } => {
            make_room(clients, target.id, to_lane, to, &mut adjustments);
            adjustments.push(RankAdjustment {
                id: target.id,
                status: Some(to_lane),
                priority: to,
            });
            close_gap(clients, target.id, from_lane, from, &mut adjustments);
        }
    }

    Ok(ReorderPlan { kind, adjustments })
}

/// Shifts the clients between `from` and `to` one step towards `from`.
///
/// Walks the range one slot at a time. An empty slot issues nothing and the
/// walk carries on; a slot held by several clients shifts all of them.
fn rotate(
    clients: &[Client],
    target: ClientId,
    lane: Lane,
    from: Priority,
    to: Priority,
    adjustments: &mut Vec<RankAdjustment>,
) {
    if to < from {
        for slot in (to.get()..from.get()).rev() {
            for client in occupants(clients, target, lane, slot) {
                adjustments.push(RankAdjustment {
                    id: client.id,
                    status: None,
                    priority: client.priority.lowered(),
                });
            }
        }
    } else {
        for slot in from.get() + 1..=to.get() {
            for client in occupants(clients, target, lane, slot) {
                adjustments.push(RankAdjustment {
                    id: client.id,
                    status: None,
                    priority: client.priority.raised(),
                });
            }
        }
    }
}

/// Lowers every client of `lane` at or below `at`, bottom first.
fn make_room(
    clients: &[Client],
    target: ClientId,
    lane: Lane,
    at: Priority,
    adjustments: &mut Vec<RankAdjustment>,
) {
    let mut displaced: Vec<&Client> = clients
        .iter()
        .filter(|client| client.id != target && client.status == lane && client.priority >= at)
        .collect();
    displaced.sort_by_key(|client| (std::cmp::Reverse(client.priority), client.id));

    adjustments.extend(displaced.into_iter().map(|client| RankAdjustment {
        id: client.id,
        status: None,
        priority: client.priority.lowered(),
    }));
}

/// Raises every client of `lane` ranked below `vacated`, top first.
fn close_gap(
    clients: &[Client],
    target: ClientId,
    lane: Lane,
    vacated: Priority,
    adjustments: &mut Vec<RankAdjustment>,
) {
    let mut below: Vec<&Client> = clients
        .iter()
        .filter(|client| {
            client.id != target && client.status == lane && client.priority > vacated
        })
        .collect();
    below.sort_by_key(|client| (client.priority, client.id));

    adjustments.extend(below.into_iter().map(|client| RankAdjustment {
        id: client.id,
        status: None,
        priority: client.priority.raised(),
    }));
}

fn occupants(
    clients: &[Client],
    target: ClientId,
    lane: Lane,
    slot: u32,
) -> impl Iterator<Item = &Client> {
    clients.iter().filter(move |client| {
        client.id != target && client.status == lane && client.priority.get() == slot
    })
}

/// The `count`-th slot of a lane, never below [`Priority::TOP`].
fn last_slot(count: usize) -> Priority {
    NonZeroU32::new(u32::try_from(count).unwrap_or(u32::MAX))
        .map_or(Priority::TOP, Priority::from_slot)
}

// =============================================================================
// Tests
// =============================================================================

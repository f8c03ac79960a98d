//! Client domain model.
//!
//! A client sits in exactly one [`Lane`] and carries a [`Priority`] that is
//! only meaningful relative to the other clients of the same lane.

use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a client.
///
/// Identifiers are positive and never change once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ClientId(i64);

impl ClientId {
    /// Creates a `ClientId`, rejecting zero and negative values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidClientId`] if `value` is not positive.
    pub const fn new(value: i64) -> Result<Self, InvalidClientId> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(InvalidClientId(value))
        }
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ClientId {
    type Error = InvalidClientId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for i64 {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Rank of a client within its lane.
///
/// `1` is the top of the lane; larger values rank lower. Zero cannot be
/// represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(NonZeroU32);

impl Priority {
    /// The top slot of every lane.
    pub const TOP: Self = Self(NonZeroU32::MIN);

    /// Creates a `Priority` from an integer.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPriority`] for zero, negative values and values that
    /// do not fit in a `u32`.
    pub fn new(value: i64) -> Result<Self, InvalidPriority> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(InvalidPriority(value))
    }

    /// Creates a `Priority` for the given one-based slot.
    #[must_use]
    pub const fn from_slot(slot: NonZeroU32) -> Self {
        Self(slot)
    }

    /// Returns the numeric rank.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns the rank one step towards the top of the lane.
    ///
    /// Saturates at [`Priority::TOP`].
    #[must_use]
    pub fn raised(self) -> Self {
        NonZeroU32::new(self.0.get() - 1).map_or(Self::TOP, Self)
    }

    /// Returns the rank one step towards the bottom of the lane.
    #[must_use]
    pub const fn lowered(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<i64> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        Self::from(priority.get())
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// The status lane a client is filed under.
///
/// The set of lanes is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lane {
    /// Not started.
    Backlog,
    /// Being worked on.
    InProgress,
    /// Done.
    Complete,
}

impl Lane {
    /// Every lane, in board order.
    pub const ALL: [Self; 3] = [Self::Backlog, Self::InProgress, Self::Complete];

    /// Returns the wire / storage name of the lane.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
        }
    }
}

impl FromStr for Lane {
    type Err = UnknownLane;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "backlog" => Ok(Self::Backlog),
            "in-progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            _ => Err(UnknownLane(value.to_string())),
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A lane name outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lane: {0:?}")]
pub struct UnknownLane(pub String);

/// A priority that is not a positive 32-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("priority must be a positive integer, got {0}")]
pub struct InvalidPriority(pub i64);

/// A client identifier that is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("client id must be a positive integer, got {0}")]
pub struct InvalidClientId(pub i64);

// =============================================================================
// Client Entity
// =============================================================================

/// A client record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Immutable identifier.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: Option<String>,
    /// Current lane.
    pub status: Lane,
    /// Rank within `status`.
    pub priority: Priority,
}

impl Client {
    /// Creates a client without a description.
    #[must_use]
    pub fn new(id: ClientId, name: impl Into<String>, status: Lane, priority: Priority) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            status,
            priority,
        }
    }

    /// Returns a copy with the given description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

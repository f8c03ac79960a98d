//! Client store trait.
//!
//! The reorder service only talks to persisted clients through
//! [`ClientStore`]. Every method returns a boxed `'static` future so the
//! trait stays object-safe and stores can be shared as
//! `Arc<dyn ClientStore>`.

use std::collections::HashSet;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Client, ClientId, Lane, Priority, RankAdjustment, audit_lanes};

// =============================================================================
// Store Error
// =============================================================================

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No client with this id exists.
    #[error("client not found: {0}")]
    NotFound(ClientId),

    /// A client with this id already exists.
    #[error("duplicate client id: {0}")]
    DuplicateId(ClientId),

    /// A seed batch would leave a lane out of order.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// A stored row could not be turned back into a client.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// Database connection or query error.
    #[error("database error: {0}")]
    DatabaseError(String),
}

/// Future returned by every [`ClientStore`] method.
pub type StoreFuture<T> = BoxFuture<'static, Result<T, StoreError>>;

// =============================================================================
// Client Store
// =============================================================================

/// Persistence for client records.
pub trait ClientStore: Send + Sync {
    /// Returns every client, in ascending id order.
    fn fetch_all(&self) -> StoreFuture<Vec<Client>>;

    /// Returns one client, or `None` if the id is unknown.
    fn fetch_by_id(&self, id: ClientId) -> StoreFuture<Option<Client>>;

    /// Updates one client's lane and/or rank; `None` leaves a field as is.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id is unknown.
    fn update_status_and_priority(
        &self,
        id: ClientId,
        status: Option<Lane>,
        priority: Option<Priority>,
    ) -> StoreFuture<()>;

    /// Applies `adjustments` in order as one atomic unit.
    ///
    /// Each adjustment is its own single-client update. If any of them fails
    /// none of them is kept.
    fn apply_adjustments(&self, adjustments: Vec<RankAdjustment>) -> StoreFuture<()>;

    /// Inserts `clients`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if an id is repeated or already
    /// stored, and [`StoreError::InvalidSeed`] if the stored set plus
    /// `clients` would break lane density.
    fn seed(&self, clients: Vec<Client>) -> StoreFuture<()>;

    /// Releases the store's resources. Later calls may fail.
    fn close(&self) -> BoxFuture<'static, ()>;
}

/// Checks a seed batch against the clients already stored.
///
/// # Errors
///
/// See [`ClientStore::seed`].
pub fn validate_seed(existing: &[Client], incoming: &[Client]) -> Result<(), StoreError> {
    let mut seen: HashSet<ClientId> = existing.iter().map(|client| client.id).collect();
    for client in incoming {
        if !seen.insert(client.id) {
            return Err(StoreError::DuplicateId(client.id));
        }
    }

    let combined: Vec<Client> = existing.iter().chain(incoming).cloned().collect();
    match audit_lanes(&combined).first() {
        Some(violation) => Err(StoreError::InvalidSeed(violation.to_string())),
        None => Ok(()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client(id: i64, lane: Lane, priority: i64) -> Client {
        Client::new(
            ClientId::new(id).unwrap(),
            format!("client-{id}"),
            lane,
            Priority::new(priority).unwrap(),
        )
    }

    #[rstest]
    fn test_store_error_display() {
        let error = StoreError::NotFound(ClientId::new(12).unwrap());
        assert_eq!(format!("{error}"), "client not found: 12");

        let error = StoreError::DatabaseError("connection refused".to_string());
        assert_eq!(format!("{error}"), "database error: connection refused");
    }

    #[rstest]
    fn test_validate_seed_accepts_extension_of_lane() {
        let existing = vec![client(1, Lane::Backlog, 1)];
        let incoming = vec![client(2, Lane::Backlog, 2), client(3, Lane::Complete, 1)];
        assert_eq!(validate_seed(&existing, &incoming), Ok(()));
    }

    #[rstest]
    fn test_validate_seed_rejects_duplicate_against_existing() {
        let existing = vec![client(1, Lane::Backlog, 1)];
        let incoming = vec![client(1, Lane::Complete, 1)];
        assert_eq!(
            validate_seed(&existing, &incoming),
            Err(StoreError::DuplicateId(ClientId::new(1).unwrap()))
        );
    }

    #[rstest]
    fn test_validate_seed_rejects_duplicate_within_batch() {
        let incoming = vec![client(5, Lane::Backlog, 1), client(5, Lane::Backlog, 2)];
        assert!(matches!(
            validate_seed(&[], &incoming),
            Err(StoreError::DuplicateId(_))
        ));
    }

    #[rstest]
    fn test_validate_seed_rejects_gap() {
        let incoming = vec![client(1, Lane::Backlog, 2)];
        assert!(matches!(
            validate_seed(&[], &incoming),
            Err(StoreError::InvalidSeed(_))
        ));
    }
}

//! Reorder workflow.
//!
//! [`ReorderService`] is the only writer of lane positions. Each call holds a
//! service-wide lock across the whole read, plan, apply, read sequence, and
//! the store applies the planned adjustments in one transaction. Two calls
//! touching the same lanes therefore never interleave.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{Client, ReorderError, ReorderRequest, audit_lanes, plan_reorder};
use crate::infrastructure::{ClientStore, StoreError};

/// Errors returned by [`ReorderService::reorder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request could not be planned.
    #[error(transparent)]
    Reorder(#[from] ReorderError),

    /// The store failed; nothing was changed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Serialised access to lane reordering.
pub struct ReorderService {
    store: Arc<dyn ClientStore>,
    gate: Mutex<()>,
}

impl std::fmt::Debug for ReorderService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("ReorderService").finish_non_exhaustive()
    }
}

impl ReorderService {
    /// Creates a service writing through `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }

    /// Moves `request.target` and returns the full snapshot afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Reorder`] if the target does not exist and
    /// [`ServiceError::Store`] if any store call fails. A store failure while
    /// applying leaves every lane as it was before the call.
    #[tracing::instrument(
        skip(self),
        fields(
            client_id = %request.target,
            status = ?request.status,
            priority = ?request.priority.map(|priority| priority.get()),
        )
    )]
    pub async fn reorder(&self, request: ReorderRequest) -> Result<Vec<Client>, ServiceError> {
        let _guard = self.gate.lock().await;

        let snapshot = self.store.fetch_all().await?;
        for violation in audit_lanes(&snapshot) {
            tracing::warn!(%violation, "Lane out of order before reorder");
        }

        let plan = plan_reorder(&snapshot, &request)?;
        tracing::info!(
            kind = plan.kind.label(),
            adjustments = plan.adjustments.len(),
            "Planned reorder"
        );

        if plan.is_noop() {
            return Ok(snapshot);
        }

        self.store.apply_adjustments(plan.adjustments).await?;
        Ok(self.store.fetch_all().await?)
    }
}

// =============================================================================
// Tests
// =============================================================================

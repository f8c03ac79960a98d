//! In-memory client store.
//!
//! Suitable for tests and local development. Clients live in a `BTreeMap`
//! behind `Arc<RwLock<...>>`, so clones of the store share state and
//! `fetch_all` comes back in id order.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Client, ClientId, Lane, Priority, RankAdjustment};
use crate::infrastructure::{ClientStore, StoreError, StoreFuture, validate_seed};

type ClientMap = BTreeMap<ClientId, Client>;

/// In-memory implementation of [`ClientStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryClientStore {
    clients: Arc<RwLock<ClientMap>>,
}

impl InMemoryClientStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `clients` without validating them.
    ///
    /// Later entries win on repeated ids. Use [`ClientStore::seed`] when the
    /// lanes must be checked.
    #[must_use]
    pub fn with_clients(clients: impl IntoIterator<Item = Client>) -> Self {
        let map = clients.into_iter().map(|client| (client.id, client)).collect();
        Self {
            clients: Arc::new(RwLock::new(map)),
        }
    }
}

fn update_in(
    map: &mut ClientMap,
    id: ClientId,
    status: Option<Lane>,
    priority: Option<Priority>,
) -> Result<(), StoreError> {
    let client = map.get_mut(&id).ok_or(StoreError::NotFound(id))?;
    if let Some(status) = status {
        client.status = status;
    }
    if let Some(priority) = priority {
        client.priority = priority;
    }
    Ok(())
}

#[allow(clippy::significant_drop_tightening)]
impl ClientStore for InMemoryClientStore {
    fn fetch_all(&self) -> StoreFuture<Vec<Client>> {
        let clients = Arc::clone(&self.clients);
        async move {
            let guard = clients.read().await;
            Ok(guard.values().cloned().collect())
        }
        .boxed()
    }

    fn fetch_by_id(&self, id: ClientId) -> StoreFuture<Option<Client>> {
        let clients = Arc::clone(&self.clients);
        async move {
            let guard = clients.read().await;
            Ok(guard.get(&id).cloned())
        }
        .boxed()
    }

    fn update_status_and_priority(
        &self,
        id: ClientId,
        status: Option<Lane>,
        priority: Option<Priority>,
    ) -> StoreFuture<()> {
        let clients = Arc::clone(&self.clients);
        async move {
            let mut guard = clients.write().await;
            update_in(&mut guard, id, status, priority)
        }
        .boxed()
    }

    fn apply_adjustments(&self, adjustments: Vec<RankAdjustment>) -> StoreFuture<()> {
        let clients = Arc::clone(&self.clients);
        async move {
            let mut guard = clients.write().await;
            // Work on a copy and swap it in only once every update succeeded.
            let mut working = guard.clone();
            for adjustment in &adjustments {
                update_in(
                    &mut working,
                    adjustment.id,
                    adjustment.status,
                    Some(adjustment.priority),
                )?;
            }
            *guard = working;
            tracing::debug!(count = adjustments.len(), "Applied rank adjustments");
            Ok(())
        }
        .boxed()
    }

    fn seed(&self, incoming: Vec<Client>) -> StoreFuture<()> {
        let clients = Arc::clone(&self.clients);
        async move {
            let mut guard = clients.write().await;
            let existing: Vec<Client> = guard.values().cloned().collect();
            validate_seed(&existing, &incoming)?;
            for client in incoming {
                guard.insert(client.id, client);
            }
            Ok(())
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'static, ()> {
        async {}.boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn id(value: i64) -> ClientId {
        ClientId::new(value).unwrap()
    }

    fn client(client_id: i64, lane: Lane, priority: i64) -> Client {
        Client::new(
            id(client_id),
            format!("client-{client_id}"),
            lane,
            Priority::new(priority).unwrap(),
        )
    }

    fn store() -> InMemoryClientStore {
        InMemoryClientStore::with_clients([
            client(2, Lane::Backlog, 2),
            client(1, Lane::Backlog, 1),
            client(3, Lane::InProgress, 1),
        ])
    }

    #[rstest]
    #[tokio::test]
    async fn test_fetch_all_is_id_ordered() {
        let clients = store().fetch_all().await.unwrap();
        let ids: Vec<i64> = clients.iter().map(|client| client.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_fetch_by_id_not_found() {
        let result = store().fetch_by_id(id(9)).await;
        assert_eq!(result, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_leaves_omitted_fields() {
        let store = store();
        store
            .update_status_and_priority(id(1), None, Some(Priority::new(5).unwrap()))
            .await
            .unwrap();

        let client = store.fetch_by_id(id(1)).await.unwrap().unwrap();
        assert_eq!(client.status, Lane::Backlog);
        assert_eq!(client.priority.get(), 5);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_unknown_client() {
        let result = store()
            .update_status_and_priority(id(42), Some(Lane::Complete), None)
            .await;
        assert_eq!(result, Err(StoreError::NotFound(id(42))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_apply_adjustments_is_all_or_nothing() {
        let store = store();
        let before = store.fetch_all().await.unwrap();

        let adjustments = vec![
            RankAdjustment {
                id: id(1),
                status: Some(Lane::Complete),
                priority: Priority::TOP,
            },
            RankAdjustment {
                id: id(77),
                status: None,
                priority: Priority::TOP,
            },
        ];
        let result = store.apply_adjustments(adjustments).await;

        assert_eq!(result, Err(StoreError::NotFound(id(77))));
        assert_eq!(store.fetch_all().await.unwrap(), before);
    }

    #[rstest]
    #[tokio::test]
    async fn test_apply_adjustments_in_order() {
        let store = store();
        let adjustments = vec![
            RankAdjustment {
                id: id(2),
                status: None,
                priority: Priority::TOP,
            },
            RankAdjustment {
                id: id(1),
                status: None,
                priority: Priority::new(2).unwrap(),
            },
        ];
        store.apply_adjustments(adjustments).await.unwrap();

        let clients = store.fetch_all().await.unwrap();
        assert_eq!(clients[0].priority.get(), 2);
        assert_eq!(clients[1].priority.get(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_seed_validates_lanes() {
        let store = InMemoryClientStore::new();
        store
            .seed(vec![client(1, Lane::Backlog, 1), client(2, Lane::Backlog, 2)])
            .await
            .unwrap();

        let result = store.seed(vec![client(3, Lane::Backlog, 4)]).await;

        assert!(matches!(result, Err(StoreError::InvalidSeed(_))));
        assert_eq!(store.fetch_all().await.unwrap().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_clones_share_state() {
        let store = store();
        let other = store.clone();
        other
            .update_status_and_priority(id(3), Some(Lane::Complete), None)
            .await
            .unwrap();

        let client = store.fetch_by_id(id(3)).await.unwrap().unwrap();
        assert_eq!(client.status, Lane::Complete);
    }
}

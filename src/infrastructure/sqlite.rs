//! `SQLite` client store.
//!
//! Backed by an `sqlx::SqlitePool`. Adjustment sequences run inside one
//! transaction, so a failed update leaves every lane as it was.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS clients (
//!     id INTEGER PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     description TEXT,
//!     status TEXT NOT NULL,
//!     priority INTEGER NOT NULL CHECK (priority > 0)
//! );
//! CREATE INDEX IF NOT EXISTS idx_clients_status_priority ON clients(status, priority);
//! ```

use std::str::FromStr;

use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Sqlite};

use crate::domain::{Client, ClientId, Lane, Priority, RankAdjustment};
use crate::infrastructure::{ClientStore, StoreError, StoreFuture, validate_seed};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS clients (\
     id INTEGER PRIMARY KEY, \
     name TEXT NOT NULL, \
     description TEXT, \
     status TEXT NOT NULL, \
     priority INTEGER NOT NULL CHECK (priority > 0))";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_clients_status_priority ON clients(status, priority)";

const SELECT_ALL: &str =
    "SELECT id, name, description, status, priority FROM clients ORDER BY id";

const SELECT_BY_ID: &str =
    "SELECT id, name, description, status, priority FROM clients WHERE id = ?";

const UPDATE_STATUS_AND_PRIORITY: &str = "UPDATE clients \
     SET status = COALESCE(?, status), priority = COALESCE(?, priority) \
     WHERE id = ?";

const INSERT: &str =
    "INSERT INTO clients (id, name, description, status, priority) VALUES (?, ?, ?, ?, ?)";

type ClientRow = (i64, String, Option<String>, String, i64);

#[allow(clippy::needless_pass_by_value)]
fn database_error(error: sqlx::Error) -> StoreError {
    StoreError::DatabaseError(error.to_string())
}

fn client_from_row(row: ClientRow) -> Result<Client, StoreError> {
    let (id, name, description, status, priority) = row;
    let id = ClientId::new(id).map_err(|error| StoreError::CorruptRecord(error.to_string()))?;
    let status = Lane::from_str(&status)
        .map_err(|error| StoreError::CorruptRecord(format!("client {id}: {error}")))?;
    let priority = Priority::new(priority)
        .map_err(|error| StoreError::CorruptRecord(format!("client {id}: {error}")))?;

    Ok(Client {
        id,
        name,
        description,
        status,
        priority,
    })
}

async fn execute_update<'c, E>(
    executor: E,
    id: ClientId,
    status: Option<Lane>,
    priority: Option<Priority>,
) -> Result<(), StoreError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let result = sqlx::query(UPDATE_STATUS_AND_PRIORITY)
        .bind(status.map(Lane::as_str))
        .bind(priority.map(i64::from))
        .bind(id.get())
        .execute(executor)
        .await
        .map_err(database_error)?;

    if result.rows_affected() == 0 {
        Err(StoreError::NotFound(id))
    } else {
        Ok(())
    }
}

// =============================================================================
// SQLite Client Store
// =============================================================================

/// `SQLite` implementation of [`ClientStore`].
///
/// # Example
///
/// ```ignore
/// let store = SqliteClientStore::connect("sqlite://clients.db", 5).await?;
/// let clients = store.fetch_all().await?;
/// store.close().await;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteClientStore {
    pool: SqlitePool,
}

impl SqliteClientStore {
    /// Wraps an existing pool. The schema is not touched.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the URL is invalid or the
    /// database cannot be opened.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(database_error)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(database_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Opens a private in-memory database on a single connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the database cannot be opened.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(database_error)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(database_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

impl ClientStore for SqliteClientStore {
    fn fetch_all(&self) -> StoreFuture<Vec<Client>> {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<ClientRow> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(database_error)?;
            rows.into_iter().map(client_from_row).collect()
        }
        .boxed()
    }

    fn fetch_by_id(&self, id: ClientId) -> StoreFuture<Option<Client>> {
        let pool = self.pool.clone();
        async move {
            let row: Option<ClientRow> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(database_error)?;
            row.map(client_from_row).transpose()
        }
        .boxed()
    }

    fn update_status_and_priority(
        &self,
        id: ClientId,
        status: Option<Lane>,
        priority: Option<Priority>,
    ) -> StoreFuture<()> {
        let pool = self.pool.clone();
        async move { execute_update(&pool, id, status, priority).await }.boxed()
    }

    fn apply_adjustments(&self, adjustments: Vec<RankAdjustment>) -> StoreFuture<()> {
        let pool = self.pool.clone();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;

            for adjustment in &adjustments {
                if let Err(error) = execute_update(
                    &mut *transaction,
                    adjustment.id,
                    adjustment.status,
                    Some(adjustment.priority),
                )
                .await
                {
                    tracing::warn!(
                        %error,
                        client_id = %adjustment.id,
                        "Rolling back rank adjustments"
                    );
                    transaction.rollback().await.map_err(database_error)?;
                    return Err(error);
                }
            }

            transaction.commit().await.map_err(database_error)?;
            tracing::debug!(count = adjustments.len(), "Committed rank adjustments");
            Ok(())
        }
        .boxed()
    }

    fn seed(&self, clients: Vec<Client>) -> StoreFuture<()> {
        let pool = self.pool.clone();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;

            let rows: Vec<ClientRow> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&mut *transaction)
                .await
                .map_err(database_error)?;
            let existing = rows
                .into_iter()
                .map(client_from_row)
                .collect::<Result<Vec<_>, _>>()?;
            validate_seed(&existing, &clients)?;

            for client in &clients {
                sqlx::query(INSERT)
                    .bind(client.id.get())
                    .bind(&client.name)
                    .bind(client.description.as_deref())
                    .bind(client.status.as_str())
                    .bind(i64::from(client.priority))
                    .execute(&mut *transaction)
                    .await
                    .map_err(database_error)?;
            }

            transaction.commit().await.map_err(database_error)?;
            tracing::info!(count = clients.len(), "Seeded clients");
            Ok(())
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'static, ()> {
        let pool = self.pool.clone();
        async move { pool.close().await }.boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Store factory for runtime backend selection.
//!
//! Opens the store named by [`AppConfig::store_mode`] and, when
//! `CLIENTS_SEED_PATH` is set, loads the seed file into it if it is empty.
//!
//! # Example
//!
//! ```ignore
//! let config = AppConfig::from_env()?;
//! let store = StoreFactory::new(config).create().await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::{AppConfig, ClientStore, InMemoryClientStore, SqliteClientStore, StoreError, StoreMode};
use crate::domain::Client;

/// Errors raised while opening or seeding a store.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The store could not be opened or seeded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The seed file could not be read or parsed.
    #[error("failed to load seed file {path}: {message}")]
    Seed {
        /// Seed file path.
        path: PathBuf,
        /// Underlying I/O or JSON error.
        message: String,
    },
}

/// Creates the configured [`ClientStore`].
#[derive(Debug, Clone)]
pub struct StoreFactory {
    config: AppConfig,
}

impl StoreFactory {
    /// Creates a factory for `config`.
    #[must_use]
    pub const fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Opens the store and applies the seed file, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] if the store cannot be opened, the seed file
    /// cannot be read, or the seed is rejected by the store.
    pub async fn create(&self) -> Result<Arc<dyn ClientStore>, FactoryError> {
        let store: Arc<dyn ClientStore> = match self.config.store_mode {
            StoreMode::InMemory => {
                tracing::info!("Using in-memory client store");
                Arc::new(InMemoryClientStore::new())
            }
            StoreMode::Sqlite => {
                let url = self.config.database_url.as_deref().ok_or_else(|| {
                    StoreError::DatabaseError("DATABASE_URL is not set".to_string())
                })?;
                tracing::info!(
                    max_connections = self.config.max_connections,
                    "Opening SQLite client store"
                );
                Arc::new(SqliteClientStore::connect(url, self.config.max_connections).await?)
            }
        };

        if let Some(path) = &self.config.seed_path {
            seed_if_empty(store.as_ref(), path).await?;
        }

        Ok(store)
    }
}

/// Loads clients from a JSON array file.
///
/// # Errors
///
/// Returns [`FactoryError::Seed`] if the file cannot be read or parsed.
pub async fn load_seed(path: &Path) -> Result<Vec<Client>, FactoryError> {
    let seed_error = |message: String| FactoryError::Seed {
        path: path.to_path_buf(),
        message,
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|error| seed_error(error.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|error| seed_error(error.to_string()))
}

async fn seed_if_empty(store: &dyn ClientStore, path: &Path) -> Result<(), FactoryError> {
    let existing = store.fetch_all().await?;
    if !existing.is_empty() {
        tracing::info!(
            path = %path.display(),
            existing = existing.len(),
            "Store already populated, skipping seed"
        );
        return Ok(());
    }

    let clients = load_seed(path).await?;
    tracing::info!(path = %path.display(), count = clients.len(), "Seeding client store");
    store.seed(clients).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn seed_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const SEED: &str = r#"[
        {"id": 1, "name": "Acme", "status": "backlog", "priority": 1},
        {"id": 2, "name": "Globex", "description": "renewal", "status": "backlog", "priority": 2},
        {"id": 3, "name": "Initech", "status": "complete", "priority": 1}
    ]"#;

    #[rstest]
    #[tokio::test]
    async fn test_in_memory_store_is_seeded() {
        let file = seed_file(SEED);
        let config = AppConfig {
            seed_path: Some(file.path().to_path_buf()),
            ..AppConfig::default()
        };

        let store = StoreFactory::new(config).create().await.unwrap();
        let clients = store.fetch_all().await.unwrap();

        assert_eq!(clients.len(), 3);
        assert_eq!(clients[1].description.as_deref(), Some("renewal"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_sqlite_store_keeps_data_across_reopen() {
        let directory = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", directory.path().join("clients.db").display());
        let file = seed_file(SEED);
        let config = AppConfig {
            store_mode: StoreMode::Sqlite,
            database_url: Some(url),
            seed_path: Some(file.path().to_path_buf()),
            ..AppConfig::default()
        };

        let store = StoreFactory::new(config.clone()).create().await.unwrap();
        store
            .update_status_and_priority(
                crate::domain::ClientId::new(3).unwrap(),
                Some(crate::domain::Lane::InProgress),
                None,
            )
            .await
            .unwrap();
        store.close().await;

        // A populated store is not re-seeded.
        let reopened = StoreFactory::new(config).create().await.unwrap();
        let clients = reopened.fetch_all().await.unwrap();
        reopened.close().await;

        assert_eq!(clients.len(), 3);
        assert_eq!(clients[2].status, crate::domain::Lane::InProgress);
    }

    #[rstest]
    #[tokio::test]
    async fn test_malformed_seed_file() {
        let file = seed_file(r#"[{"id": 1, "name": "Acme", "status": "archived", "priority": 1}]"#);
        let result = load_seed(file.path()).await;
        assert!(matches!(result, Err(FactoryError::Seed { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn test_seed_with_gap_is_rejected() {
        let file = seed_file(r#"[{"id": 1, "name": "Acme", "status": "backlog", "priority": 2}]"#);
        let config = AppConfig {
            seed_path: Some(file.path().to_path_buf()),
            ..AppConfig::default()
        };

        let result = StoreFactory::new(config).create().await;
        assert!(matches!(
            result,
            Err(FactoryError::Store(StoreError::InvalidSeed(_)))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn test_missing_seed_file() {
        let result = load_seed(Path::new("/nonexistent/clients.json")).await;
        assert!(matches!(result, Err(FactoryError::Seed { .. })));
    }
}

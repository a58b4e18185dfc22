//! Document store abstraction and backend selection

pub mod document_store;
pub mod memory;

pub use document_store::DocumentStore;
pub use memory::InMemoryDocumentStore;

use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use crate::storage::SqliteDocumentStore;

/// Open the configured store backend
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::Sqlite => {
            if let Some(parent) = config.sqlite_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Arc::new(SqliteDocumentStore::new(&config.sqlite_path)?)
        }
        StoreBackend::Memory => Arc::new(InMemoryDocumentStore::new()),
    };

    tracing::info!("Document store: {}", store.name());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_sqlite_creates_parent_folder() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: StoreBackend::Sqlite,
            sqlite_path: dir.path().join("nested").join("docs.db"),
        };

        let store = open_store(&config).unwrap();
        assert_eq!(store.name(), "sqlite");
        assert!(store.health_check().await.unwrap());
        assert!(config.sqlite_path.exists());
    }

    #[tokio::test]
    async fn test_open_memory() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.name(), "in-memory");
        assert_eq!(store.count().await.unwrap(), 0);
    }
}

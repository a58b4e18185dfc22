//! Document store provider trait

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{DocumentRecord, DocumentUpdate, NewDocument};

/// Trait for document metadata persistence
///
/// Implementations are shared by every worker at once and must synchronize
/// internally.
///
/// Implementations:
/// - `SqliteDocumentStore`: SQLite file
/// - `InMemoryDocumentStore`: process-local map
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, returning the identifier assigned to it
    async fn insert(&self, document: &NewDocument) -> Result<Uuid>;

    /// Overwrite summary and keywords of an inserted document
    async fn update(&self, id: &Uuid, update: &DocumentUpdate) -> Result<()>;

    /// Fetch a document by id
    async fn get(&self, id: &Uuid) -> Result<Option<DocumentRecord>>;

    /// List all documents, oldest first
    async fn list(&self) -> Result<Vec<DocumentRecord>>;

    /// Number of stored documents
    async fn count(&self) -> Result<usize>;

    /// Check if the store is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Store name for logging
    fn name(&self) -> &str;
}

//! In-memory document store

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{DocumentRecord, DocumentUpdate, NewDocument};

use super::document_store::DocumentStore;

/// Document store kept in a concurrent map; nothing survives the process
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: DashMap<Uuid, DocumentRecord>,
    inserts: AtomicUsize,
    updates: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful inserts so far
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Successful updates so far
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, document: &NewDocument) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.documents
            .insert(id, DocumentRecord::from_new(id, document));
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn update(&self, id: &Uuid, update: &DocumentUpdate) -> Result<()> {
        let mut record = self
            .documents
            .get_mut(id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
        record.apply(update);
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<DocumentRecord>> {
        Ok(self.documents.get(id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<DocumentRecord>> {
        let mut docs: Vec<DocumentRecord> = self
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.path.cmp(&b.path)));
        Ok(docs)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    fn doc(name: &str) -> NewDocument {
        NewDocument::for_path(Path::new(name), 10, "s".to_string(), vec!["k".to_string()])
    }

    #[tokio::test]
    async fn test_insert_then_update() {
        let store = InMemoryDocumentStore::new();
        let id = store.insert(&doc("a.pdf")).await.unwrap();

        store
            .update(
                &id,
                &DocumentUpdate {
                    summary: "Cats sleep.".to_string(),
                    keywords: vec!["cats".to_string()],
                },
            )
            .await
            .unwrap();

        let record = store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.summary, "Cats sleep.");
        assert_eq!(record.keywords, vec!["cats"]);
        assert_eq!(store.insert_count(), 1);
        assert_eq!(store.update_count(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .update(
                &Uuid::new_v4(),
                &DocumentUpdate {
                    summary: String::new(),
                    keywords: Vec::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(_)));
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_distinct_ids() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&doc(&format!("{i}.pdf"))).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.count().await.unwrap(), 32);
        assert_eq!(store.list().await.unwrap().len(), 32);
    }
}

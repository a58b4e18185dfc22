//! SQLite document store
//!
//! One `documents` table keyed by a UUID generated on insert. The connection is
//! guarded by a mutex and every call runs on the blocking pool, so the store can
//! be shared by all pipeline workers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result, StoreOperation};
use crate::providers::DocumentStore;
use crate::types::{DocumentRecord, DocumentUpdate, NewDocument};

/// SQLite-backed document store
#[derive(Clone)]
pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to open database {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                path TEXT NOT NULL,
                size INTEGER NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                keywords TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_path ON documents(path);
            "#,
        )?;

        tracing::debug!("Database migrations complete");
        Ok(())
    }

    /// Insert a document row with a fresh id
    pub fn insert_document(&self, document: &NewDocument) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let keywords = serde_json::to_string(&document.keywords)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO documents (id, file_name, path, size, summary, keywords, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                id.to_string(),
                document.file_name,
                document.path,
                document.size as i64,
                document.summary,
                keywords,
                now,
            ],
        )
        .map_err(|e| Error::store_write(StoreOperation::Insert, e.to_string()))?;

        Ok(id)
    }

    /// Set summary and keywords on an existing row
    pub fn update_document(&self, id: &Uuid, update: &DocumentUpdate) -> Result<()> {
        let keywords = serde_json::to_string(&update.keywords)?;

        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE documents SET summary = ?1, keywords = ?2, updated_at = ?3 WHERE id = ?4",
                params![
                    update.summary,
                    keywords,
                    Utc::now().to_rfc3339(),
                    id.to_string(),
                ],
            )
            .map_err(|e| Error::store_write(StoreOperation::Update, e.to_string()))?;

        if changed == 0 {
            return Err(Error::DocumentNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Get a document by id
    pub fn get_document(&self, id: &Uuid) -> Result<Option<DocumentRecord>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, file_name, path, size, summary, keywords, created_at, updated_at
             FROM documents WHERE id = ?1",
        )?;

        let record = stmt
            .query_row(params![id.to_string()], row_to_record)
            .optional()?;

        Ok(record)
    }

    /// List all documents
    pub fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, file_name, path, size, summary, keywords, created_at, updated_at
             FROM documents ORDER BY created_at ASC, path ASC",
        )?;

        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Count documents
    pub fn count_documents(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Run a store call on the blocking pool
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(SqliteDocumentStore) -> Result<T> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(db))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert(&self, document: &NewDocument) -> Result<Uuid> {
        let document = document.clone();
        self.blocking(move |db| db.insert_document(&document)).await
    }

    async fn update(&self, id: &Uuid, update: &DocumentUpdate) -> Result<()> {
        let id = *id;
        let update = update.clone();
        self.blocking(move |db| db.update_document(&id, &update)).await
    }

    async fn get(&self, id: &Uuid) -> Result<Option<DocumentRecord>> {
        let id = *id;
        self.blocking(move |db| db.get_document(&id)).await
    }

    async fn list(&self) -> Result<Vec<DocumentRecord>> {
        self.blocking(|db| db.list_documents()).await
    }

    async fn count(&self) -> Result<usize> {
        self.blocking(|db| db.count_documents()).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.blocking(|db| {
            let conn = db.conn.lock();
            let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
            Ok(one == 1)
        })
        .await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<DocumentRecord> {
    let id_str: String = row.get(0)?;
    let file_name: String = row.get(1)?;
    let path: String = row.get(2)?;
    let size: i64 = row.get(3)?;
    let summary: String = row.get(4)?;
    let keywords_json: String = row.get(5)?;
    let created_at_str: String = row.get(6)?;
    let updated_at_str: String = row.get(7)?;

    Ok(DocumentRecord {
        id: Uuid::parse_str(&id_str).map_err(|e| conversion_error(0, e))?,
        file_name,
        path,
        size: size as u64,
        summary,
        keywords: serde_json::from_str(&keywords_json).map_err(|e| conversion_error(5, e))?,
        created_at: parse_timestamp(6, &created_at_str)?,
        updated_at: parse_timestamp(7, &updated_at_str)?,
    })
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

/// A stored TEXT value that does not decode
fn conversion_error<E>(column: usize, error: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn new_doc(name: &str) -> NewDocument {
        NewDocument::for_path(
            Path::new(name),
            1234,
            "Cats sleep a lot.".to_string(),
            vec!["cats".to_string(), "sleep".to_string()],
        )
    }

    #[test]
    fn test_insert_and_get() {
        let db = SqliteDocumentStore::in_memory().unwrap();
        let id = db.insert_document(&new_doc("/in/report.pdf")).unwrap();

        let record = db.get_document(&id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.file_name, "report.pdf");
        assert_eq!(record.path, "/in/report.pdf");
        assert_eq!(record.size, 1234);
        assert_eq!(record.keywords, vec!["cats", "sleep"]);
    }

    #[test]
    fn test_update_overwrites_analysis() {
        let db = SqliteDocumentStore::in_memory().unwrap();
        let id = db.insert_document(&new_doc("a.pdf")).unwrap();

        db.update_document(
            &id,
            &DocumentUpdate {
                summary: "Dogs run.".to_string(),
                keywords: vec!["dogs".to_string()],
            },
        )
        .unwrap();

        let record = db.get_document(&id).unwrap().unwrap();
        assert_eq!(record.summary, "Dogs run.");
        assert_eq!(record.keywords, vec!["dogs"]);
        assert_eq!(db.count_documents().unwrap(), 1);
    }

    #[test]
    fn test_update_missing_row() {
        let db = SqliteDocumentStore::in_memory().unwrap();
        let err = db
            .update_document(
                &Uuid::new_v4(),
                &DocumentUpdate {
                    summary: String::new(),
                    keywords: Vec::new(),
                },
            )
            .unwrap_err();
        assert!(err.is_store_error());
    }

    #[tokio::test]
    async fn test_trait_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.db");

        let id = {
            let store = SqliteDocumentStore::new(&path).unwrap();
            let id = store.insert(&new_doc("b.pdf")).await.unwrap();
            store.update(&id, &new_doc("b.pdf").analysis()).await.unwrap();
            id
        };

        let reopened = SqliteDocumentStore::new(&path).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
        let listed = reopened.list().await.unwrap();
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].summary, "Cats sleep a lot.");
        assert!(reopened.get(&Uuid::new_v4()).await.unwrap().is_none());
    }

    fn insert_raw(db: &SqliteDocumentStore, id: &str, keywords: &str, created_at: &str) {
        db.conn
            .lock()
            .execute(
                "INSERT INTO documents (id, file_name, path, size, summary, keywords, created_at, updated_at)
                 VALUES (?1, 'x.pdf', '/in/x.pdf', 1, '', ?2, ?3, ?3)",
                params![id, keywords, created_at],
            )
            .unwrap();
    }

    #[test]
    fn test_corrupt_rows_surface_as_errors() {
        let now = Utc::now().to_rfc3339();

        let db = SqliteDocumentStore::in_memory().unwrap();
        insert_raw(&db, "not-a-uuid", "[]", &now);
        assert!(matches!(db.list_documents(), Err(Error::Database(_))));

        let db = SqliteDocumentStore::in_memory().unwrap();
        let id = Uuid::new_v4();
        insert_raw(&db, &id.to_string(), "not json", &now);
        assert!(matches!(db.get_document(&id), Err(Error::Database(_))));

        let db = SqliteDocumentStore::in_memory().unwrap();
        let id = Uuid::new_v4();
        insert_raw(&db, &id.to_string(), "[\"k\"]", "yesterday");
        assert!(matches!(db.get_document(&id), Err(Error::Database(_))));
        assert_eq!(db.count_documents().unwrap(), 1);
    }
}

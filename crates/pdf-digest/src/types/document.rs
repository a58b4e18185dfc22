//! Document record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Fields submitted to the store on insert, before an id exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Base name of the source file
    pub file_name: String,
    /// Full input path
    pub path: String,
    /// Byte length of the source file when the record was built
    pub size: u64,
    /// Extractive summary
    pub summary: String,
    /// Most frequent words, most frequent first
    pub keywords: Vec<String>,
}

impl NewDocument {
    /// Build a record for a file on disk
    pub fn for_path(path: &Path, size: u64, summary: String, keywords: Vec<String>) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            file_name,
            path: path.to_string_lossy().to_string(),
            size,
            summary,
            keywords,
        }
    }

    /// Fields written by the second phase
    pub fn analysis(&self) -> DocumentUpdate {
        DocumentUpdate {
            summary: self.summary.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

/// Fields written by the update that completes a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub summary: String,
    pub keywords: Vec<String>,
}

/// A document as persisted in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Identifier assigned by the store on insert
    pub id: Uuid,
    pub file_name: String,
    pub path: String,
    pub size: u64,
    pub summary: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Materialize an inserted document
    pub fn from_new(id: Uuid, doc: &NewDocument) -> Self {
        let now = Utc::now();
        Self {
            id,
            file_name: doc.file_name.clone(),
            path: doc.path.clone(),
            size: doc.size,
            summary: doc.summary.clone(),
            keywords: doc.keywords.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the second-phase update
    pub fn apply(&mut self, update: &DocumentUpdate) {
        self.summary = update.summary.clone();
        self.keywords = update.keywords.clone();
        self.updated_at = Utc::now();
    }
}

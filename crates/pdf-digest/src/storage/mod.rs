//! Storage module for persistent document metadata
//!
//! Provides SQLite-based persistence for document records.

mod database;

pub use database::SqliteDocumentStore;

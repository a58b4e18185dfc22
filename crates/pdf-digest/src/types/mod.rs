//! Core types for the digest pipeline

pub mod document;

pub use document::{DocumentRecord, DocumentUpdate, NewDocument};

//! pdf-digest: concurrent summarization and keyword extraction for folders of PDFs
//!
//! Every PDF in the input folder is turned into text, summarized with a
//! frequency-based extractive summarizer, tagged with its most frequent words
//! and written to a document store in two steps (insert, then update). Files are
//! processed on a bounded worker pool and a failure in one file never affects
//! the others.

pub mod analysis;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod storage;
pub mod types;

pub use analysis::{extract_keywords, summarize, TextAnalyzer};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use ingestion::{PdfTextExtractor, TextExtractor};
pub use processing::{FileOutcome, PipelineOrchestrator, RunReport};
pub use providers::{DocumentStore, InMemoryDocumentStore};
pub use storage::SqliteDocumentStore;
pub use types::{DocumentRecord, DocumentUpdate, NewDocument};

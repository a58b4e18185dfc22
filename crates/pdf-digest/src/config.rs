//! Configuration for the digest pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input folder configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Summary and keyword configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Worker pool configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Document store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check values that would otherwise fail late, before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.input.extension.is_empty() {
            return Err(Error::config("input.extension must not be empty"));
        }
        if self.processing.parallel_files == Some(0) {
            return Err(Error::config("processing.parallel_files must be at least 1"));
        }
        if self.processing.extract_timeout_secs == Some(0) {
            return Err(Error::config(
                "processing.extract_timeout_secs must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

/// Input folder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Folder scanned for documents
    pub folder: PathBuf,
    /// Case-sensitive file name suffix to match (default: ".pdf")
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Descend into sub-folders (default: false)
    #[serde(default)]
    pub recursive: bool,
}

fn default_extension() -> String {
    ".pdf".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("test_documents"),
            extension: default_extension(),
            recursive: false,
        }
    }
}

/// Summary and keyword configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Sentences kept in each summary
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,
    /// Keywords kept per document
    #[serde(default = "default_num_keywords")]
    pub num_keywords: usize,
    /// Words ignored for scoring and keyword selection (empty = pure frequency)
    #[serde(default)]
    pub stop_words: Vec<String>,
}

fn default_summary_sentences() -> usize { 3 }
fn default_num_keywords() -> usize { 5 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            summary_sentences: default_summary_sentences(),
            num_keywords: default_num_keywords(),
            stop_words: Vec::new(),
        }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Number of files processed concurrently (default: CPU count, max 8)
    pub parallel_files: Option<usize>,
    /// Upper bound on text extraction per file (default: unbounded)
    pub extract_timeout_secs: Option<u64>,
}

impl ProcessingConfig {
    /// Resolved worker pool size
    pub fn worker_count(&self) -> usize {
        self.parallel_files
            .unwrap_or_else(|| num_cpus::get().min(8))
            .max(1)
    }

    /// Resolved extraction timeout
    pub fn extract_timeout(&self) -> Option<Duration> {
        self.extract_timeout_secs.map(Duration::from_secs)
    }
}

/// Document store backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// SQLite file on disk
    #[default]
    Sqlite,
    /// Process-local map, nothing persisted
    Memory,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Database file for the sqlite backend
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
}

fn default_sqlite_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdf-digest")
        .join("documents.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

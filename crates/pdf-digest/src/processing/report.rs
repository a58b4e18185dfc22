//! Per-file states and run reports

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Lifecycle of one file through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    Discovered,
    Extracting,
    Extracted,
    ExtractionFailed,
    Analyzing,
    RecordBuilt,
    Inserted,
    Updated,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStage::Discovered => "discovered",
            FileStage::Extracting => "extracting",
            FileStage::Extracted => "extracted",
            FileStage::ExtractionFailed => "extraction_failed",
            FileStage::Analyzing => "analyzing",
            FileStage::RecordBuilt => "record_built",
            FileStage::Inserted => "inserted",
            FileStage::Updated => "updated",
        };
        f.write_str(name)
    }
}

/// How processing of one file ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Inserted and updated
    Completed { document_id: Uuid },
    /// Text extraction failed; nothing was written
    Skipped { reason: String },
    /// A later step failed. `stage` is the last state reached; `document_id`
    /// is set when the insert went through but the update did not.
    Failed {
        stage: FileStage,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        document_id: Option<Uuid>,
    },
    /// Cancellation observed before the store was touched
    Cancelled { stage: FileStage },
    /// The worker task panicked
    Crashed { error: String },
}

impl FileOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, FileOutcome::Completed { .. })
    }
}

/// Result for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    pub duration_ms: u64,
}

/// Result of a whole run, in dispatch order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. } | FileOutcome::Crashed { .. }))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Cancelled { .. }))
    }

    /// Files inserted but never updated
    pub fn partially_written(&self) -> Vec<&FileReport> {
        self.files
            .iter()
            .filter(|f| {
                matches!(
                    f.outcome,
                    FileOutcome::Failed {
                        document_id: Some(_),
                        ..
                    }
                )
            })
            .collect()
    }

    /// Report entry for a path
    pub fn get(&self, path: &std::path::Path) -> Option<&FileReport> {
        self.files.iter().find(|f| f.path == path)
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    /// Emit the run summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total(),
            completed = self.completed(),
            skipped = self.skipped(),
            failed = self.failed(),
            cancelled = self.cancelled(),
            "Run finished in {:.2}s",
            self.elapsed_ms as f64 / 1000.0
        );
        for file in self.partially_written() {
            tracing::warn!(
                "{} was inserted but not updated; its record lacks the final analysis",
                file.path.display()
            );
        }
    }
}

//! Folder-level pipeline: discover, extract, analyze, store

use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::analysis::{Analysis, TextAnalyzer};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::ingestion::{discover_files, PdfTextExtractor, TextExtractor};
use crate::providers::{open_store, DocumentStore};
use crate::types::NewDocument;

use super::report::{FileOutcome, FileReport, FileStage, RunReport};
use super::resources::ResourceProbe;

/// Runs every discovered file through the pipeline on a bounded worker pool
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    worker: FileWorker,
    parallel_files: usize,
}

/// Everything a per-file task needs, cheap to clone into each task
#[derive(Clone)]
struct FileWorker {
    extractor: Arc<dyn TextExtractor>,
    store: Arc<dyn DocumentStore>,
    analyzer: Arc<TextAnalyzer>,
    probe: Arc<ResourceProbe>,
    cancel: CancellationToken,
}

impl PipelineOrchestrator {
    pub fn new(
        config: PipelineConfig,
        extractor: Arc<dyn TextExtractor>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let parallel_files = config.processing.worker_count();
        let analyzer = Arc::new(TextAnalyzer::new(&config.analysis));

        tracing::info!(
            "Pipeline configured: {} parallel files, extractor {}, store {}",
            parallel_files,
            extractor.name(),
            store.name()
        );

        Self {
            worker: FileWorker {
                extractor,
                store,
                analyzer,
                probe: Arc::new(ResourceProbe::new()),
                cancel: CancellationToken::new(),
            },
            config,
            parallel_files,
        }
    }

    /// Build the PDF extractor and open the configured store
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let extractor = Arc::new(
            PdfTextExtractor::new()
                .with_timeout(config.processing.extract_timeout())
                .with_parser_limit(config.processing.worker_count()),
        );
        let store = open_store(&config.store)?;
        Ok(Self::new(config, extractor, store))
    }

    /// Replace the cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.worker.cancel = token;
        self
    }

    /// Token that stops the run at the next checkpoint of every file
    pub fn cancellation_token(&self) -> CancellationToken {
        self.worker.cancel.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.worker.store.clone()
    }

    pub fn parallel_files(&self) -> usize {
        self.parallel_files
    }

    /// Files the next run would process
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        discover_files(&self.config.input)
    }

    /// Process the whole input folder.
    ///
    /// Fails only on configuration problems, before any file is read. Per-file
    /// failures end up in the returned report.
    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        let files = self.discover()?;
        Ok(self.process_files(files).await)
    }

    /// Process the given files, at most `parallel_files` at a time
    pub async fn process_files(&self, files: Vec<PathBuf>) -> RunReport {
        let start = Instant::now();
        tracing::info!(
            "Processing {} files with {} workers",
            files.len(),
            self.parallel_files
        );

        let semaphore = Arc::new(Semaphore::new(self.parallel_files));

        let tasks: Vec<_> = files
            .into_iter()
            .map(|path| {
                let worker = self.worker.clone();
                let sem = semaphore.clone();
                let task_path = path.clone();

                let handle = tokio::spawn(async move {
                    let _permit = match sem.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            return FileReport {
                                path: task_path,
                                outcome: FileOutcome::Failed {
                                    stage: FileStage::Discovered,
                                    error: e.to_string(),
                                    document_id: None,
                                },
                                duration_ms: 0,
                            };
                        }
                    };
                    worker.process(task_path).await
                });

                async move { (path, handle.await) }
            })
            .collect();

        let results = join_all(tasks).await;

        let files = results
            .into_iter()
            .map(|(path, joined)| match joined {
                Ok(report) => report,
                Err(e) => {
                    let error = if e.is_panic() {
                        "worker panicked".to_string()
                    } else {
                        e.to_string()
                    };
                    tracing::error!("Failed to process {}: {}", path.display(), error);
                    FileReport {
                        path,
                        outcome: FileOutcome::Crashed { error },
                        duration_ms: 0,
                    }
                }
            })
            .collect();

        RunReport {
            files,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl FileWorker {
    async fn process(&self, path: PathBuf) -> FileReport {
        let start = Instant::now();
        let outcome = self.run_stages(&path).await;
        let elapsed = start.elapsed();

        match &outcome {
            FileOutcome::Completed { .. } => match self.probe.resident_memory_mb() {
                Some(memory_mb) => tracing::info!(
                    "Processed {} in {:.3}s. Memory usage: {:.2} MB",
                    path.display(),
                    elapsed.as_secs_f64(),
                    memory_mb
                ),
                None => tracing::info!(
                    "Processed {} in {:.3}s",
                    path.display(),
                    elapsed.as_secs_f64()
                ),
            },
            FileOutcome::Cancelled { stage } => {
                tracing::info!("Cancelled {} after {}", path.display(), stage);
            }
            _ => {}
        }

        FileReport {
            path,
            outcome,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    async fn run_stages(&self, path: &Path) -> FileOutcome {
        trace_stage(path, FileStage::Discovered);
        if self.cancel.is_cancelled() {
            return FileOutcome::Cancelled {
                stage: FileStage::Discovered,
            };
        }

        trace_stage(path, FileStage::Extracting);
        let text = match self.extractor.read(path).await {
            Ok(text) => text,
            Err(e) => {
                trace_stage(path, FileStage::ExtractionFailed);
                tracing::error!("Error reading {}: {}", path.display(), e);
                return FileOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };
        trace_stage(path, FileStage::Extracted);

        if self.cancel.is_cancelled() {
            return FileOutcome::Cancelled {
                stage: FileStage::Extracted,
            };
        }

        trace_stage(path, FileStage::Analyzing);
        let analysis = match self.analyze(text).await {
            Ok(analysis) => analysis,
            Err(e) => return self.failed(path, FileStage::Analyzing, e, None),
        };

        let size = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.len(),
            Err(e) => return self.failed(path, FileStage::Analyzing, e.into(), None),
        };
        let document = NewDocument::for_path(path, size, analysis.summary, analysis.keywords);
        trace_stage(path, FileStage::RecordBuilt);

        if self.cancel.is_cancelled() {
            return FileOutcome::Cancelled {
                stage: FileStage::RecordBuilt,
            };
        }

        // No cancellation checks past this point: an issued insert is always
        // followed by its update.
        let id = match self.store.insert(&document).await {
            Ok(id) => id,
            Err(e) => return self.failed(path, FileStage::RecordBuilt, e, None),
        };
        trace_stage(path, FileStage::Inserted);

        if let Err(e) = self.store.update(&id, &document.analysis()).await {
            return self.failed(path, FileStage::Inserted, e, Some(id));
        }
        trace_stage(path, FileStage::Updated);

        FileOutcome::Completed { document_id: id }
    }

    /// Analysis is CPU bound, keep it off the async workers
    async fn analyze(&self, text: String) -> Result<Analysis> {
        let analyzer = self.analyzer.clone();
        tokio::task::spawn_blocking(move || analyzer.analyze(&text))
            .await
            .map_err(|e| Error::internal(format!("Analysis task failed: {}", e)))
    }

    fn failed(
        &self,
        path: &Path,
        stage: FileStage,
        error: Error,
        document_id: Option<uuid::Uuid>,
    ) -> FileOutcome {
        tracing::error!(
            "Failed to process {} after {}: {}",
            path.display(),
            stage,
            error
        );
        FileOutcome::Failed {
            stage,
            error: error.to_string(),
            document_id,
        }
    }
}

fn trace_stage(path: &Path, stage: FileStage) {
    tracing::debug!("[{}] {}", path.display(), stage);
}

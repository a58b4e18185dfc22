//! Worker pool orchestration and run reporting

mod orchestrator;
mod report;
mod resources;

pub use orchestrator::PipelineOrchestrator;
pub use report::{FileOutcome, FileReport, FileStage, RunReport};
pub use resources::ResourceProbe;

pub mod confidence;
pub mod extraction;
pub mod orchestrator;
pub mod prompt;
pub mod transcription;
pub mod worker;

pub use confidence::*;
pub use extraction::*;
pub use orchestrator::*;
pub use transcription::*;
pub use worker::*;

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source file not found: {0}")]
    SourceMissing(String),

    #[error("extraction failed: {0}")]
    Extraction(#[from] LlmError),
}

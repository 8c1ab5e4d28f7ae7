//! Document record and lifecycle enums.
//!
//! One `Document` exists per uploaded video. Status and stage only move
//! forward through the pipeline; `failed` is the single terminal sink
//! reachable from any in-progress stage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::brd::BrdContent;

/// Coarse document lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fine-grained pipeline position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Upload,
    AudioExtraction,
    Transcription,
    NlpAnalysis,
    BrdGeneration,
    Completed,
    Failed,
}

impl ProcessingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::AudioExtraction => "audio_extraction",
            Self::Transcription => "transcription",
            Self::NlpAnalysis => "nlp_analysis",
            Self::BrdGeneration => "brd_generation",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Position in the forward-only stage sequence. `failed` sits outside
    /// the sequence and is reachable from anywhere.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Upload => 0,
            Self::AudioExtraction => 1,
            Self::Transcription => 2,
            Self::NlpAnalysis => 3,
            Self::BrdGeneration => 4,
            Self::Completed => 5,
            Self::Failed => u8::MAX,
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record per uploaded video. Wire shape (camelCase) matches the
/// existing web client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub file_size: u64,
    pub status: DocumentStatus,
    pub processing_stage: ProcessingStage,
    /// Estimated media duration in seconds.
    pub duration: Option<u64>,
    pub transcript: Option<String>,
    pub brd_content: Option<BrdContent>,
    pub word_count: Option<usize>,
    /// Extraction quality estimate, 0–100.
    pub confidence_score: Option<u8>,
    /// Wall-clock pipeline time in seconds.
    pub processing_time: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields the caller supplies when creating a document. Everything else is
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub filename: String,
    pub file_size: u64,
    pub status: DocumentStatus,
    pub processing_stage: ProcessingStage,
}

/// Partial update merged into a stored document. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub status: Option<DocumentStatus>,
    pub processing_stage: Option<ProcessingStage>,
    pub duration: Option<u64>,
    pub transcript: Option<String>,
    pub brd_content: Option<BrdContent>,
    pub word_count: Option<usize>,
    pub confidence_score: Option<u8>,
    pub processing_time: Option<u64>,
}

/// Per-stage state within a stage audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Observational audit entry written as the pipeline enters and leaves each
/// stage. Not required for the pipeline to function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    pub id: String,
    pub document_id: String,
    pub stage: ProcessingStage,
    pub status: StageStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

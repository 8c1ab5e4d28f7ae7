//! Document repository behind an injectable trait.
//!
//! The pipeline and the HTTP layer only see `DocumentStore`, so a persistent
//! backend can be substituted without touching either. The shipped
//! implementation is in-memory: everything is lost on process restart, by
//! design.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Document, DocumentPatch, NewDocument, ProcessingStage, StageRecord, StageStatus,
};

/// Repository capability for documents and their stage audit records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Assign a fresh id and timestamps and store the record.
    async fn create(&self, new: NewDocument) -> Document;

    async fn get(&self, id: &str) -> Option<Document>;

    /// Merge a partial update and refresh `updated_at`. Unknown ids return
    /// `None`, never an error.
    async fn update(&self, id: &str, patch: DocumentPatch) -> Option<Document>;

    /// Most recent documents first (by `created_at`), truncated to `limit`.
    async fn recent(&self, limit: usize) -> Vec<Document>;

    /// Open a stage audit record (status `processing`, `started_at` now).
    async fn create_stage(&self, document_id: &str, stage: ProcessingStage) -> StageRecord;

    /// Close a stage audit record with a terminal status.
    async fn finish_stage(
        &self,
        stage_id: &str,
        status: StageStatus,
        error_message: Option<String>,
    ) -> Option<StageRecord>;

    /// All stage records for one document, oldest first.
    async fn stages(&self, document_id: &str) -> Vec<StageRecord>;
}

/// Process-memory store. Updates are whole-record merges keyed by id; one
/// pipeline per document id means concurrent pipelines never contend on the
/// same key.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Document>>,
    stage_records: RwLock<HashMap<String, StageRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, new: NewDocument) -> Document {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            filename: new.filename,
            file_size: new.file_size,
            status: new.status,
            processing_stage: new.processing_stage,
            duration: None,
            transcript: None,
            brd_content: None,
            word_count: None,
            confidence_score: None,
            processing_time: None,
            created_at: now,
            updated_at: now,
        };
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document.clone());
        document
    }

    async fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().await.get(id).cloned()
    }

    async fn update(&self, id: &str, patch: DocumentPatch) -> Option<Document> {
        let mut documents = self.documents.write().await;
        let document = documents.get_mut(id)?;

        if let Some(status) = patch.status {
            document.status = status;
        }
        if let Some(stage) = patch.processing_stage {
            document.processing_stage = stage;
        }
        if let Some(duration) = patch.duration {
            document.duration = Some(duration);
        }
        if let Some(transcript) = patch.transcript {
            document.transcript = Some(transcript);
        }
        if let Some(brd) = patch.brd_content {
            document.brd_content = Some(brd);
        }
        if let Some(word_count) = patch.word_count {
            document.word_count = Some(word_count);
        }
        if let Some(score) = patch.confidence_score {
            document.confidence_score = Some(score);
        }
        if let Some(elapsed) = patch.processing_time {
            document.processing_time = Some(elapsed);
        }
        document.updated_at = Utc::now();

        Some(document.clone())
    }

    async fn recent(&self, limit: usize) -> Vec<Document> {
        let mut documents: Vec<Document> =
            self.documents.read().await.values().cloned().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        documents.truncate(limit);
        documents
    }

    async fn create_stage(&self, document_id: &str, stage: ProcessingStage) -> StageRecord {
        let record = StageRecord {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            stage,
            status: StageStatus::Processing,
            started_at: Some(Utc::now()),
            completed_at: None,
            error_message: None,
        };
        self.stage_records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        record
    }

    async fn finish_stage(
        &self,
        stage_id: &str,
        status: StageStatus,
        error_message: Option<String>,
    ) -> Option<StageRecord> {
        let mut records = self.stage_records.write().await;
        let record = records.get_mut(stage_id)?;
        record.status = status;
        record.completed_at = Some(Utc::now());
        record.error_message = error_message;
        Some(record.clone())
    }

    async fn stages(&self, document_id: &str) -> Vec<StageRecord> {
        let mut records: Vec<StageRecord> = self
            .stage_records
            .read()
            .await
            .values()
            .filter(|r| r.document_id == document_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        records
    }
}

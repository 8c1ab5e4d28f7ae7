//! Pipeline orchestrator — drives one document through the four stages.
//!
//! Linear state machine with a single failure sink:
//! `upload → audio_extraction → transcription → nlp_analysis →
//! brd_generation → completed`, any in-progress state → `failed`.
//!
//! Each stage is followed by a store update; stage audit records are written
//! around every stage. No retry, no rollback of already-stored fields.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::models::{DocumentPatch, DocumentStatus, ProcessingStage, StageStatus};
use crate::render;
use crate::store::DocumentStore;

use super::confidence::ConfidenceScorer;
use super::extraction::{FallbackOnError, ModelExtractor, RequirementExtractor};
use super::transcription::TranscriptionService;
use super::PipelineError;
use crate::llm::GenerativeModel;

pub struct Pipeline {
    store: Arc<dyn DocumentStore>,
    transcriber: TranscriptionService,
    extractor: Box<dyn RequirementExtractor>,
    scorer: ConfidenceScorer,
}

impl Pipeline {
    pub fn new(store: Arc<dyn DocumentStore>, model: Arc<dyn GenerativeModel>) -> Self {
        let extractor = Box::new(FallbackOnError::new(ModelExtractor::new(model.clone())));
        Self::with_extractor(store, model, extractor)
    }

    /// Build a pipeline around a caller-supplied extractor. `new` wraps the
    /// model extractor in the deterministic fallback; this constructor does
    /// not, so an extractor error fails the document.
    pub fn with_extractor(
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn GenerativeModel>,
        extractor: Box<dyn RequirementExtractor>,
    ) -> Self {
        Self {
            store,
            transcriber: TranscriptionService::new(model.clone()),
            extractor,
            scorer: ConfidenceScorer::new(model),
        }
    }

    /// Process one uploaded document. Invoked exactly once per upload and
    /// never awaited by the triggering request. The source file is removed
    /// on both the success and the failure path.
    pub async fn run(&self, document_id: &str, source: &Path) {
        let started = Instant::now();
        tracing::info!(document_id, source = %source.display(), "pipeline started");

        match self.process(document_id, source, started).await {
            Ok(()) => {
                tracing::info!(
                    document_id,
                    elapsed_secs = started.elapsed().as_secs(),
                    "pipeline completed"
                );
            }
            Err(e) => {
                tracing::error!(document_id, error = %e, "pipeline failed");
                self.fail_open_stages(document_id, &e.to_string()).await;
                self.store
                    .update(
                        document_id,
                        DocumentPatch {
                            status: Some(DocumentStatus::Failed),
                            processing_stage: Some(ProcessingStage::Failed),
                            ..Default::default()
                        },
                    )
                    .await;
            }
        }

        if let Err(e) = tokio::fs::remove_file(source).await {
            tracing::warn!(source = %source.display(), error = %e, "failed to remove source file");
        }
    }

    async fn process(
        &self,
        document_id: &str,
        source: &Path,
        started: Instant,
    ) -> Result<(), PipelineError> {
        if !source.exists() {
            return Err(PipelineError::SourceMissing(
                source.display().to_string(),
            ));
        }

        // Stage 1: audio extraction. The uploaded video stands in for its
        // own audio track; the stage exists for the state machine and audit
        // trail.
        let stage = self
            .store
            .create_stage(document_id, ProcessingStage::AudioExtraction)
            .await;
        self.store
            .update(
                document_id,
                DocumentPatch {
                    status: Some(DocumentStatus::Processing),
                    processing_stage: Some(ProcessingStage::AudioExtraction),
                    ..Default::default()
                },
            )
            .await;
        self.store
            .finish_stage(&stage.id, StageStatus::Completed, None)
            .await;

        // Stage 2: transcription.
        self.store
            .update(
                document_id,
                DocumentPatch {
                    processing_stage: Some(ProcessingStage::Transcription),
                    ..Default::default()
                },
            )
            .await;
        let stage = self
            .store
            .create_stage(document_id, ProcessingStage::Transcription)
            .await;
        let transcription = self.transcriber.transcribe(source).await;
        self.store
            .finish_stage(&stage.id, StageStatus::Completed, None)
            .await;
        tracing::info!(
            document_id,
            transcript_chars = transcription.text.len(),
            "transcription done"
        );

        // Stage 3: NLP analysis — transcript lands on the record, then the
        // extractor turns it into a structured BRD.
        self.store
            .update(
                document_id,
                DocumentPatch {
                    processing_stage: Some(ProcessingStage::NlpAnalysis),
                    transcript: Some(transcription.text.clone()),
                    duration: Some(transcription.duration_secs),
                    ..Default::default()
                },
            )
            .await;
        let stage = self
            .store
            .create_stage(document_id, ProcessingStage::NlpAnalysis)
            .await;
        let brd = self.extractor.extract(&transcription.text).await?;
        self.store
            .finish_stage(&stage.id, StageStatus::Completed, None)
            .await;

        // Stage 4: BRD generation — metrics and the final record.
        self.store
            .update(
                document_id,
                DocumentPatch {
                    processing_stage: Some(ProcessingStage::BrdGeneration),
                    ..Default::default()
                },
            )
            .await;
        let stage = self
            .store
            .create_stage(document_id, ProcessingStage::BrdGeneration)
            .await;
        let word_count = render::count_words(&transcription.text);
        let confidence_score = self.scorer.score(&transcription.text, &brd).await;
        let processing_time = started.elapsed().as_secs();
        self.store
            .finish_stage(&stage.id, StageStatus::Completed, None)
            .await;

        self.store
            .update(
                document_id,
                DocumentPatch {
                    status: Some(DocumentStatus::Completed),
                    processing_stage: Some(ProcessingStage::Completed),
                    brd_content: Some(brd),
                    word_count: Some(word_count),
                    confidence_score: Some(confidence_score),
                    processing_time: Some(processing_time),
                    ..Default::default()
                },
            )
            .await;

        Ok(())
    }

    /// Mark any stage record left open by an aborted run as failed.
    async fn fail_open_stages(&self, document_id: &str, error: &str) {
        for record in self.store.stages(document_id).await {
            if record.status == StageStatus::Processing {
                self.store
                    .finish_stage(
                        &record.id,
                        StageStatus::Failed,
                        Some(error.to_string()),
                    )
                    .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockModel};
    use crate::models::{BrdContent, NewDocument};
    use crate::pipeline::transcription::DEMO_TRANSCRIPT;
    use crate::store::MemoryStore;
    use std::io::Write;

    async fn create_doc(store: &MemoryStore) -> String {
        store
            .create(NewDocument {
                title: "Kickoff".into(),
                filename: "kickoff.mp4".into(),
                file_size: 1024,
                status: DocumentStatus::Processing,
                processing_stage: ProcessingStage::AudioExtraction,
            })
            .await
            .id
    }

    fn write_small_video(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("kickoff.mp4");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&vec![0u8; 2048]).unwrap();
        path
    }

    #[tokio::test]
    async fn small_file_completes_entirely_offline() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(store.clone(), Arc::new(MockModel::failing()));
        let id = create_doc(&store).await;
        let dir = tempfile::tempdir().unwrap();
        let source = write_small_video(&dir);

        pipeline.run(&id, &source).await;

        let doc = store.get(&id).await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Completed);
        assert_eq!(doc.processing_stage, ProcessingStage::Completed);
        assert_eq!(doc.transcript.as_deref(), Some(DEMO_TRANSCRIPT));
        assert_eq!(
            doc.word_count,
            Some(render::count_words(DEMO_TRANSCRIPT))
        );
        assert_eq!(doc.duration, Some(180));
        // Extraction fell back (model offline); the demo transcript mentions
        // "customer", which picks the customer title.
        let brd = doc.brd_content.unwrap();
        assert_eq!(brd.title, "Customer Management System");
        assert_eq!(brd.functional_requirements.len(), 4);
        // Scoring fell back too.
        assert_eq!(doc.confidence_score, Some(75));
        assert!(doc.processing_time.is_some());
    }

    #[tokio::test]
    async fn source_file_removed_after_success() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(store.clone(), Arc::new(MockModel::failing()));
        let id = create_doc(&store).await;
        let dir = tempfile::tempdir().unwrap();
        let source = write_small_video(&dir);

        pipeline.run(&id, &source).await;

        assert!(!source.exists());
    }

    #[tokio::test]
    async fn missing_source_fails_the_document() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(store.clone(), Arc::new(MockModel::failing()));
        let id = create_doc(&store).await;

        pipeline
            .run(&id, Path::new("/nonexistent/upload.mp4"))
            .await;

        let doc = store.get(&id).await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
        assert_eq!(doc.processing_stage, ProcessingStage::Failed);
        assert!(doc.transcript.is_none());
    }

    #[tokio::test]
    async fn stage_records_cover_all_four_stages() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(store.clone(), Arc::new(MockModel::failing()));
        let id = create_doc(&store).await;
        let dir = tempfile::tempdir().unwrap();
        let source = write_small_video(&dir);

        pipeline.run(&id, &source).await;

        let stages = store.stages(&id).await;
        let names: Vec<ProcessingStage> = stages.iter().map(|s| s.stage).collect();
        assert_eq!(
            names,
            vec![
                ProcessingStage::AudioExtraction,
                ProcessingStage::Transcription,
                ProcessingStage::NlpAnalysis,
                ProcessingStage::BrdGeneration,
            ]
        );
        assert!(stages.iter().all(|s| s.status == StageStatus::Completed));
        // Forward-only: audit order matches the stage sequence
        for pair in names.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[tokio::test]
    async fn extractor_error_fails_document_and_closes_open_stage() {
        struct BrokenExtractor;

        #[async_trait::async_trait]
        impl RequirementExtractor for BrokenExtractor {
            async fn extract(&self, _transcript: &str) -> Result<BrdContent, LlmError> {
                Err(LlmError::EmptyResponse)
            }
        }

        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::with_extractor(
            store.clone(),
            Arc::new(MockModel::failing()),
            Box::new(BrokenExtractor),
        );
        let id = create_doc(&store).await;
        let dir = tempfile::tempdir().unwrap();
        let source = write_small_video(&dir);

        pipeline.run(&id, &source).await;

        let doc = store.get(&id).await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
        assert_eq!(doc.processing_stage, ProcessingStage::Failed);
        // Transcript landed before extraction broke; no rollback.
        assert_eq!(doc.transcript.as_deref(), Some(DEMO_TRANSCRIPT));
        assert!(doc.brd_content.is_none());

        // The stage record open at the time of failure is closed as failed
        // with the error recorded; earlier stages keep their completion.
        let stages = store.stages(&id).await;
        let nlp = stages
            .iter()
            .find(|s| s.stage == ProcessingStage::NlpAnalysis)
            .unwrap();
        assert_eq!(nlp.status, StageStatus::Failed);
        assert!(nlp.error_message.is_some());
        assert!(stages
            .iter()
            .filter(|s| s.stage != ProcessingStage::NlpAnalysis)
            .all(|s| s.status == StageStatus::Completed));

        assert!(!source.exists());
    }

    #[tokio::test]
    async fn completed_document_survives_model_success_path_too() {
        let store = Arc::new(MemoryStore::new());
        // Model replies "88" to every prompt — garbage for extraction
        // (falls back) but a clean parse for scoring.
        let pipeline = Pipeline::new(store.clone(), Arc::new(MockModel::replying("88")));
        let id = create_doc(&store).await;
        let dir = tempfile::tempdir().unwrap();
        let source = write_small_video(&dir);

        pipeline.run(&id, &source).await;

        let doc = store.get(&id).await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Completed);
        assert_eq!(doc.confidence_score, Some(88));
    }
}

//! Bounded worker pool for pipeline runs.
//!
//! Uploads submit jobs and return immediately; a semaphore caps how many
//! pipelines run at once, so a burst of uploads queues instead of opening an
//! unbounded number of file handles and model calls. The returned handle can
//! be awaited or aborted by embedders and tests; the HTTP layer ignores it.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::orchestrator::Pipeline;

pub struct PipelineWorkers {
    pipeline: Arc<Pipeline>,
    permits: Arc<Semaphore>,
}

/// Handle to one submitted pipeline job.
pub struct PipelineHandle {
    inner: JoinHandle<()>,
}

impl PipelineHandle {
    /// Wait for the job to finish (including time spent queued).
    pub async fn join(self) {
        let _ = self.inner.await;
    }

    /// Abort the job. The document is left in whatever state it reached;
    /// there is no rollback.
    pub fn abort(&self) {
        self.inner.abort();
    }
}

impl PipelineWorkers {
    pub fn new(pipeline: Arc<Pipeline>, max_concurrent: usize) -> Self {
        Self {
            pipeline,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Queue one pipeline run. Exactly one submission per document id is the
    /// caller's contract (upload creates one document and submits once).
    pub fn submit(&self, document_id: String, source: PathBuf) -> PipelineHandle {
        let pipeline = self.pipeline.clone();
        let permits = self.permits.clone();

        let inner = tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                // Semaphore closed — shutting down.
                return;
            };
            pipeline.run(&document_id, &source).await;
        });

        PipelineHandle { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockModel;
    use crate::models::{DocumentStatus, NewDocument, ProcessingStage};
    use crate::store::{DocumentStore, MemoryStore};
    use std::io::Write;

    async fn setup() -> (Arc<MemoryStore>, PipelineWorkers, tempfile::TempDir) {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(Pipeline::new(store.clone(), Arc::new(MockModel::failing())));
        let workers = PipelineWorkers::new(pipeline, 1);
        (store, workers, tempfile::tempdir().unwrap())
    }

    async fn submit_doc(
        store: &MemoryStore,
        workers: &PipelineWorkers,
        dir: &tempfile::TempDir,
        name: &str,
    ) -> (String, PipelineHandle) {
        let doc = store
            .create(NewDocument {
                title: name.into(),
                filename: format!("{name}.mp4"),
                file_size: 2048,
                status: DocumentStatus::Processing,
                processing_stage: ProcessingStage::AudioExtraction,
            })
            .await;
        let source = dir.path().join(format!("{name}.mp4"));
        let mut f = std::fs::File::create(&source).unwrap();
        f.write_all(&vec![0u8; 2048]).unwrap();
        drop(f);
        let handle = workers.submit(doc.id.clone(), source);
        (doc.id, handle)
    }

    #[tokio::test]
    async fn jobs_beyond_capacity_still_all_complete() {
        let (store, workers, dir) = setup().await;

        let mut submitted = Vec::new();
        for i in 0..3 {
            submitted.push(submit_doc(&store, &workers, &dir, &format!("doc-{i}")).await);
        }

        for (id, handle) in submitted {
            handle.join().await;
            let doc = store.get(&id).await.unwrap();
            assert_eq!(doc.status, DocumentStatus::Completed);
        }
    }

    #[tokio::test]
    async fn handle_join_waits_for_the_result() {
        let (store, workers, dir) = setup().await;
        let (id, handle) = submit_doc(&store, &workers, &dir, "solo").await;

        handle.join().await;

        assert_eq!(
            store.get(&id).await.unwrap().processing_stage,
            ProcessingStage::Completed
        );
    }
}

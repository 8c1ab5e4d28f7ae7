//! Shared state handed to every endpoint handler.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::GenerativeModel;
use crate::pipeline::{Pipeline, PipelineWorkers};
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn DocumentStore>,
    pub workers: Arc<PipelineWorkers>,
    pub config: Arc<AppConfig>,
}

impl ApiContext {
    /// Wire the store and model into a pipeline plus bounded worker pool.
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        let pipeline = Arc::new(Pipeline::new(store.clone(), model));
        let workers = Arc::new(PipelineWorkers::new(
            pipeline,
            config.max_concurrent_pipelines,
        ));
        Self {
            store,
            workers,
            config,
        }
    }
}

//! Generative model abstraction.
//!
//! The pipeline treats the external model as a black box: text (optionally
//! with inline media) in, text out. Every service that calls it carries a
//! deterministic fallback, so a model outage degrades output quality but
//! never wedges a document.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model endpoint unreachable: {0}")]
    Connection(String),

    #[error("model returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("empty response from model")]
    EmptyResponse,

    #[error("response parsing error: {0}")]
    ResponseParsing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text-generation capability (allows mocking).
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Plain text prompt → generated text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Inline media plus an instruction → generated text. Used for
    /// transcription.
    async fn generate_with_media(
        &self,
        mime_type: &str,
        data: &[u8],
        prompt: &str,
    ) -> Result<String, LlmError>;
}

/// Mock model for tests — canned reply or unconditional failure.
pub struct MockModel {
    reply: Option<String>,
}

impl MockModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
        }
    }

    /// Every call fails, as if the endpoint were unreachable.
    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(LlmError::Connection("mock model offline".into())),
        }
    }

    async fn generate_with_media(
        &self,
        _mime_type: &str,
        _data: &[u8],
        prompt: &str,
    ) -> Result<String, LlmError> {
        self.generate(prompt).await
    }
}

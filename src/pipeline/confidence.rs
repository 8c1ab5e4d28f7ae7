//! Confidence scorer — asks the model to rate extraction quality 0–100.
//!
//! Parse failures and call failures both yield a fixed default rather than
//! failing the pipeline.

use std::sync::Arc;

use crate::llm::GenerativeModel;
use crate::models::BrdContent;

use super::prompt;

/// Score used whenever the model cannot produce one.
pub const DEFAULT_CONFIDENCE: u8 = 75;

pub struct ConfidenceScorer {
    model: Arc<dyn GenerativeModel>,
}

impl ConfidenceScorer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Always returns an integer in [0, 100].
    pub async fn score(&self, transcript: &str, brd: &BrdContent) -> u8 {
        let prompt = prompt::confidence_prompt(
            transcript.len(),
            brd.functional_requirements.len(),
            brd.non_functional_requirements.len(),
        );

        match self.model.generate(&prompt).await {
            Ok(text) => parse_score(&text).unwrap_or_else(|| {
                tracing::warn!(reply = %text, "unparseable confidence reply, using default");
                DEFAULT_CONFIDENCE
            }),
            Err(e) => {
                tracing::warn!(error = %e, "confidence scoring failed, using default");
                DEFAULT_CONFIDENCE
            }
        }
    }
}

/// First integer in the reply, clamped into [0, 100].
pub fn parse_score(text: &str) -> Option<u8> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let value: u64 = digits.parse().ok()?;
    Some(value.min(100) as u8)
}

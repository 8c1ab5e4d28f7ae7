//! Gemini HTTP client for the generative model capability.
//!
//! Talks to the `generateContent` REST endpoint. Media is sent inline as
//! base64, which caps practical input size well below the upload limit but
//! keeps the client to a single round trip.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{GenerativeModel, LlmError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Override the endpoint and timeout (tests point this at a local stub).
    pub fn with_base_url(api_key: &str, base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    async fn post_generate(&self, parts: Vec<Part>) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                LlmError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                LlmError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        let text = parsed.first_text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.post_generate(vec![Part::text(prompt)]).await
    }

    async fn generate_with_media(
        &self,
        mime_type: &str,
        data: &[u8],
        prompt: &str,
    ) -> Result<String, LlmError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        self.post_generate(vec![Part::inline(mime_type, encoded), Part::text(prompt)])
            .await
    }
}

// ── Wire types ──────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    fn text(text: &str) -> Self {
        Self::Text {
            text: text.to_string(),
        }
    }

    fn inline(mime_type: &str, data: String) -> Self {
        Self::Inline {
            inline_data: InlineData {
                mime_type: mime_type.to_string(),
                data,
            },
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn first_text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = GeminiClient::with_base_url("key", "http://localhost:9999/", 60);
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn default_model_is_pro() {
        let client = GeminiClient::new("key");
        assert_eq!(client.model, DEFAULT_MODEL);
        let client = client.with_model("gemini-2.5-flash");
        assert_eq!(client.model, "gemini-2.5-flash");
    }

    #[test]
    fn text_part_serializes_flat() {
        let json = serde_json::to_value(Part::text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hello"}));
    }

    #[test]
    fn inline_part_uses_camel_case_keys() {
        let json = serde_json::to_value(Part::inline("video/mp4", "AAAA".into())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"inlineData": {"mimeType": "video/mp4", "data": "AAAA"}})
        );
    }

    #[test]
    fn response_text_concatenates_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text(), "Hello world");
    }

    #[test]
    fn response_without_candidates_is_empty() {
        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.first_text(), "");
    }
}

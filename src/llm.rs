// src/llm.rs
//! Generative-AI backend seam. The predictor only sees the [`Provider`]
//! trait; production wires in [`GeminiProvider`], tests inject a mock.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PredictError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";

/// Low-level provider: one prompt in, one text completion out. No retry,
/// no streaming; any timeout belongs to the underlying HTTP client.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, PredictError>;
    fn name(&self) -> &'static str;
}

/// Gemini `generateContent` provider. Requires `GEMINI_API_KEY`.
#[derive(Debug)]
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// Fails fast with `ClientInitFailed` when the key is absent, so the
    /// predictor can stop before touching the backend.
    pub fn new(model: &str) -> Result<Self, PredictError> {
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(PredictError::ClientInitFailed(format!(
                "missing {ENV_API_KEY} environment variable"
            )));
        }
        let http = reqwest::Client::builder()
            .user_agent("index-sentiment-predictor/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PredictError::ClientInitFailed(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, PredictError> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig<'a> {
            response_mime_type: &'a str,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig<'a>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }
        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }

        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            // Constrain the reply to JSON content; schema checking still
            // happens on our side after the parse.
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| PredictError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictError::AuthRejected(format!("HTTP {status}: {body}")));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictError::BackendStatus {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| PredictError::MalformedResponse(e.to_string()))?;
        let text: String = body
            .candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(PredictError::MalformedResponse(
                "response contained no candidate text".to_string(),
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Deterministic provider for tests and local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, PredictError> {
        Ok(self.fixed.clone())
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_api_key_is_client_init_failed() {
        let prev = std::env::var(ENV_API_KEY).ok();
        std::env::remove_var(ENV_API_KEY);

        let err = GeminiProvider::new("gemini-2.5-flash").unwrap_err();
        assert_eq!(err.category(), "ClientInitFailed");

        if let Some(v) = prev {
            std::env::set_var(ENV_API_KEY, v);
        }
    }

    #[tokio::test]
    async fn mock_provider_echoes_fixed_payload() {
        let mock = MockProvider {
            fixed: r#"{"predicted_close": 1.0}"#.to_string(),
        };
        let out = mock.generate("ignored").await.unwrap();
        assert!(out.contains("predicted_close"));
        assert_eq!(mock.name(), "mock");
    }
}

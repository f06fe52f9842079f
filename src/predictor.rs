// src/predictor.rs
//! Index prediction: read the shared store, embed it into a prompt, ask the
//! model for a strict-JSON sentiment prediction, validate the reply.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AppConfig;
use crate::error::PredictError;
use crate::llm::{GeminiProvider, Provider};
use crate::store::{self, NewsCollection};

/// Sentiment labels the model must choose from. Serde enforces membership;
/// anything else downgrades to a `SchemaViolation` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketSentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// The model's parsed and schema-checked analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmAnalysis {
    pub predicted_close: f64,
    pub market_sentiment: MarketSentiment,
    /// Intended <= 50 words; not enforced.
    pub analysis_basis: String,
}

/// A successful prediction for one target index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub target_index: String,
    pub analysis: LlmAnalysis,
}

pub struct IndexPredictor {
    provider: Box<dyn Provider>,
    store_path: PathBuf,
}

impl IndexPredictor {
    /// Build against the real Gemini backend. `ClientInitFailed` when the
    /// API key is not configured.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, PredictError> {
        let provider = GeminiProvider::new(&cfg.model)?;
        Ok(Self {
            provider: Box::new(provider),
            store_path: cfg.store_path.clone(),
        })
    }

    /// Inject an arbitrary provider (tests, alternate backends).
    pub fn with_provider(provider: Box<dyn Provider>, store_path: PathBuf) -> Self {
        Self {
            provider,
            store_path,
        }
    }

    /// Full operation: read the intermediate store left by the collector,
    /// then predict. Missing/corrupt store short-circuits before any model
    /// traffic.
    pub async fn predict(&self, target_index: &str) -> Result<Prediction, PredictError> {
        let collection = store::load(&self.store_path)
            .map_err(|e| PredictError::DataUnavailable(format!("{e:#}")))?;
        self.predict_with_collection(target_index, &collection).await
    }

    /// In-memory handoff variant: same steps, no shared-file read, immune
    /// to a concurrent collector overwriting the store mid-request.
    pub async fn predict_with_collection(
        &self,
        target_index: &str,
        collection: &NewsCollection,
    ) -> Result<Prediction, PredictError> {
        let prompt = build_prompt(target_index, collection)?;
        info!(
            target_index,
            articles = collection.len(),
            provider = self.provider.name(),
            "requesting index prediction"
        );

        let raw = self.provider.generate(&prompt).await?;
        let analysis = parse_analysis(&raw)?;
        Ok(Prediction {
            target_index: target_index.to_string(),
            analysis,
        })
    }
}

/// Prompt template: the entire collection verbatim, the target index, an
/// instruction to answer only from the embedded data, and the exact JSON
/// schema the reply must follow.
fn build_prompt(target_index: &str, collection: &NewsCollection) -> Result<String, PredictError> {
    let articles_json = serde_json::to_string_pretty(collection)
        .map_err(|e| PredictError::DataUnavailable(e.to_string()))?;
    Ok(format!(
        r#"Based *only* on the provided news articles below, analyze the sentiment and predict the closing direction for the **{target_index}** index.
Output the result strictly in the required JSON format.

News articles:
{articles_json}

Required JSON Format:
{{
  "predicted_close": <float or current index value>,
  "market_sentiment": "<Bullish|Bearish|Neutral>",
  "analysis_basis": "<Concise summary of the market drivers, max 50 words>"
}}"#
    ))
}

/// Parse the model reply. Non-JSON replies are `MalformedResponse`; valid
/// JSON with the wrong shape is `SchemaViolation`.
fn parse_analysis(raw: &str) -> Result<LlmAnalysis, PredictError> {
    let cleaned = strip_code_fences(raw);
    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| PredictError::MalformedResponse(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| PredictError::SchemaViolation(e.to_string()))
}

/// Models occasionally wrap JSON in a markdown fence despite the JSON mime
/// type constraint.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{article_key, NewsRecord};

    fn sample_collection() -> NewsCollection {
        let mut c = NewsCollection::new();
        for (i, summary) in ["Chips rally", "Yen slides", "BOJ holds rates"]
            .iter()
            .enumerate()
        {
            c.insert(
                article_key(i + 1),
                NewsRecord {
                    title: Some(format!("headline {}", i + 1)),
                    summary: Some(summary.to_string()),
                    ..Default::default()
                },
            );
        }
        c
    }

    #[test]
    fn prompt_embeds_every_article_and_the_target() {
        let prompt = build_prompt("N225", &sample_collection()).unwrap();
        assert!(prompt.contains("**N225**"));
        assert!(prompt.contains("Chips rally"));
        assert!(prompt.contains("Yen slides"));
        assert!(prompt.contains("BOJ holds rates"));
        assert!(prompt.contains("\"predicted_close\""));
        assert!(prompt.contains("<Bullish|Bearish|Neutral>"));
        assert!(prompt.contains("Based *only* on the provided news articles"));
    }

    #[test]
    fn valid_reply_parses_into_typed_analysis() {
        let raw = r#"{"predicted_close": 42810.5, "market_sentiment": "Bullish", "analysis_basis": "Chip strength and a softer yen."}"#;
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.predicted_close, 42810.5);
        assert_eq!(analysis.market_sentiment, MarketSentiment::Bullish);
    }

    #[test]
    fn fenced_reply_still_parses() {
        let raw = "```json\n{\"predicted_close\": 100.0, \"market_sentiment\": \"Neutral\", \"analysis_basis\": \"Mixed signals.\"}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.market_sentiment, MarketSentiment::Neutral);
    }

    #[test]
    fn non_json_reply_is_malformed() {
        let err = parse_analysis("the market will go up").unwrap_err();
        assert_eq!(err.category(), "MalformedResponse");
    }

    #[test]
    fn unknown_sentiment_label_is_a_schema_violation() {
        let raw = r#"{"predicted_close": 1.0, "market_sentiment": "Sideways", "analysis_basis": "x"}"#;
        let err = parse_analysis(raw).unwrap_err();
        assert_eq!(err.category(), "SchemaViolation");
    }

    #[test]
    fn non_numeric_close_is_a_schema_violation() {
        let raw = r#"{"predicted_close": "high", "market_sentiment": "Bullish", "analysis_basis": "x"}"#;
        let err = parse_analysis(raw).unwrap_err();
        assert_eq!(err.category(), "SchemaViolation");
    }

    #[test]
    fn missing_field_is_a_schema_violation() {
        let raw = r#"{"predicted_close": 1.0, "market_sentiment": "Bullish"}"#;
        let err = parse_analysis(raw).unwrap_err();
        assert_eq!(err.category(), "SchemaViolation");
    }
}

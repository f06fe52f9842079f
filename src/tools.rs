// src/tools.rs
//! Orchestrator-facing tool contract. These are the two entry points an
//! external agent runtime calls, and the one place where the tagged errors
//! become wire payloads. No error escapes either function.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collector::{CollectionOutcome, NewsCollector};
use crate::config::AppConfig;
use crate::error::PredictError;
use crate::predictor::{IndexPredictor, LlmAnalysis, Prediction};
use crate::store::{self, NewsRecord};

/// Reply of `fetch_stock_news_from_google_news`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchNewsResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<NewsRecord>>,
}

/// Reply of `predict_index`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictIndexResponse {
    pub prediction_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_output: Option<LlmAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl PredictIndexResponse {
    fn success(p: Prediction) -> Self {
        Self {
            prediction_status: "success".to_string(),
            target_index: Some(p.target_index),
            llm_output: Some(p.analysis),
            message: None,
            error_type: None,
        }
    }

    fn failure(e: &PredictError) -> Self {
        Self {
            prediction_status: "error".to_string(),
            target_index: None,
            llm_output: None,
            message: Some(e.to_string()),
            error_type: Some(e.category().to_string()),
        }
    }
}

/// Search Google News for `query`, persist the collection, signal the
/// result. Success carries the count and records for callers that prefer
/// the in-memory handoff; the store write always happens first.
pub async fn fetch_stock_news_from_google_news(cfg: &AppConfig, query: &str) -> FetchNewsResponse {
    let collector = NewsCollector::new(cfg);
    match collector.collect(query).await {
        Ok(CollectionOutcome::Collected { count, articles }) => FetchNewsResponse {
            status: "OK".to_string(),
            count: Some(count),
            message: None,
            articles: Some(articles.into_values().collect()),
        },
        Ok(CollectionOutcome::NotFound) => FetchNewsResponse {
            status: "failed".to_string(),
            count: Some(0),
            message: Some("No news articles found for the query.".to_string()),
            articles: Some(Vec::new()),
        },
        Err(e) => {
            warn!(error = %e, category = e.category(), "news collection failed");
            FetchNewsResponse {
                status: "error".to_string(),
                count: None,
                message: Some(e.to_string()),
                articles: None,
            }
        }
    }
}

/// Predict the close of `target_index` from the last collected news. The
/// store precondition is checked before client acquisition, so an absent
/// store reports `DataUnavailable` even when credentials are also missing.
pub async fn predict_index(cfg: &AppConfig, target_index: &str) -> PredictIndexResponse {
    let collection = match store::load(&cfg.store_path) {
        Ok(c) => c,
        Err(e) => {
            return PredictIndexResponse::failure(&PredictError::DataUnavailable(format!("{e:#}")))
        }
    };

    let predictor = match IndexPredictor::from_config(cfg) {
        Ok(p) => p,
        Err(e) => return PredictIndexResponse::failure(&e),
    };

    match predictor
        .predict_with_collection(target_index, &collection)
        .await
    {
        Ok(p) => PredictIndexResponse::success(p),
        Err(e) => {
            warn!(error = %e, category = e.category(), "index prediction failed");
            PredictIndexResponse::failure(&e)
        }
    }
}

/// Same boundary conversion, but against an already-built predictor. Used
/// by tests and by callers wiring their own provider.
pub async fn predict_index_with(
    predictor: &IndexPredictor,
    target_index: &str,
) -> PredictIndexResponse {
    match predictor.predict(target_index).await {
        Ok(p) => PredictIndexResponse::success(p),
        Err(e) => PredictIndexResponse::failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::MarketSentiment;

    #[test]
    fn success_payload_has_wire_field_names() {
        let resp = PredictIndexResponse::success(Prediction {
            target_index: "DOW".to_string(),
            analysis: LlmAnalysis {
                predicted_close: 45120.0,
                market_sentiment: MarketSentiment::Bearish,
                analysis_basis: "Rate worries.".to_string(),
            },
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["prediction_status"], "success");
        assert_eq!(json["target_index"], "DOW");
        assert_eq!(json["llm_output"]["market_sentiment"], "Bearish");
        assert_eq!(json["llm_output"]["predicted_close"], 45120.0);
        assert!(json.get("message").is_none());
        assert!(json.get("error_type").is_none());
    }

    #[test]
    fn failure_payload_carries_category_and_message() {
        let resp = PredictIndexResponse::failure(&PredictError::AuthRejected("HTTP 403".into()));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["prediction_status"], "error");
        assert_eq!(json["error_type"], "AuthRejected");
        assert!(json["message"].as_str().unwrap().contains("403"));
        assert!(json.get("llm_output").is_none());
    }
}

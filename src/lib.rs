// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod collector;
pub mod config;
pub mod error;
pub mod llm;
pub mod predictor;
pub mod store;
pub mod tools;

// ---- Re-exports for stable public API ----
pub use crate::collector::{CollectionOutcome, NewsCollector};
pub use crate::config::AppConfig;
pub use crate::error::{CollectError, PredictError};
pub use crate::predictor::{IndexPredictor, LlmAnalysis, MarketSentiment, Prediction};
pub use crate::store::{NewsCollection, NewsRecord};
pub use crate::tools::{fetch_stock_news_from_google_news, predict_index};

// src/error.rs
//! Tagged error taxonomy for both operations. Every failure is caught at the
//! tool boundary and converted into a structured payload; the `category`
//! names below are what the wire `error_type` field carries.

use thiserror::Error;

/// Failures of the news collection operation. A zero-result search is not an
/// error; it is the `NotFound` outcome on [`crate::collector::CollectionOutcome`].
#[derive(Debug, Error)]
pub enum CollectError {
    /// The search call itself failed (connect, TLS, non-2xx status).
    #[error("news backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered but the feed could not be parsed as RSS.
    #[error("news feed malformed: {0}")]
    MalformedFeed(String),

    /// The collection could not be written to the intermediate store.
    #[error("news store write failed: {0}")]
    StoreWrite(String),
}

impl CollectError {
    pub fn category(&self) -> &'static str {
        match self {
            CollectError::BackendUnavailable(_) => "BackendUnavailable",
            CollectError::MalformedFeed(_) => "MalformedFeed",
            CollectError::StoreWrite(_) => "StoreWrite",
        }
    }
}

/// Failures of the prediction operation, split by cause instead of the
/// single runtime_error catch-all the contract grew out of.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Intermediate store missing or corrupt; the model is never called.
    #[error("news data unavailable: {0}")]
    DataUnavailable(String),

    /// The model client handle could not be built (missing credentials).
    #[error("model client init failed: {0}")]
    ClientInitFailed(String),

    /// The request never completed (connect, TLS, transfer).
    #[error("model request failed: {0}")]
    Network(String),

    /// The backend rejected our credentials (HTTP 401/403).
    #[error("model backend rejected credentials: {0}")]
    AuthRejected(String),

    /// Any other non-success HTTP status from the backend.
    #[error("model backend returned HTTP {status}: {message}")]
    BackendStatus { status: u16, message: String },

    /// The model's reply was not valid JSON at all.
    #[error("model response is not valid JSON: {0}")]
    MalformedResponse(String),

    /// Valid JSON, but not the required {predicted_close, market_sentiment,
    /// analysis_basis} shape. Downgraded here instead of forwarded.
    #[error("model response violates required schema: {0}")]
    SchemaViolation(String),
}

impl PredictError {
    pub fn category(&self) -> &'static str {
        match self {
            PredictError::DataUnavailable(_) => "DataUnavailable",
            PredictError::ClientInitFailed(_) => "ClientInitFailed",
            PredictError::Network(_) => "Network",
            PredictError::AuthRejected(_) => "AuthRejected",
            PredictError::BackendStatus { .. } => "BackendStatus",
            PredictError::MalformedResponse(_) => "MalformedResponse",
            PredictError::SchemaViolation(_) => "SchemaViolation",
        }
    }
}

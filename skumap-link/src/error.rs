//! HTTP error mapping for skumap-link
//!
//! Every failure is reported once, to the request that caused it, as
//! `{ "error": { "code", "message", "retryable" } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// skumap-common error, mapped per variant
    #[error(transparent)]
    Common(#[from] skumap_common::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        use skumap_common::Error as E;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Common(err) => match err {
                E::SchemaMismatch { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "COLUMN_MISMATCH"),
                E::EmptyBarcode | E::EmptySearchTerms => (StatusCode::BAD_REQUEST, "EMPTY_SEARCH"),
                E::TooManySearchTerms { .. } | E::InvalidInput(_) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST")
                }
                E::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                E::EmptyPairing => (StatusCode::CONFLICT, "EMPTY_PAIRING"),
                E::NothingStaged => (StatusCode::CONFLICT, "NOTHING_STAGED"),
                E::StalePreview => (StatusCode::CONFLICT, "STALE_PREVIEW"),
                E::Persistence(_) => (StatusCode::SERVICE_UNAVAILABLE, "PERSISTENCE_ERROR"),
                E::Feed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "FEED_ERROR"),
                E::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
                E::Config(_) | E::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, ApiError::Common(err) if err.is_retryable())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", self);
        } else {
            tracing::debug!(code = error_code, "{}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "retryable": self.retryable(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! API error type and the JSON error envelope.
//!
//! Every failure a handler can produce becomes the same four-field body:
//! `{ error, details, timestamp, endpoint }`. `endpoint` is the route
//! template the handler passes in, never the concrete URL, so dashboards
//! can group failures without parsing ids out of paths.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use thiserror::Error;

use crate::classify;
use crate::store::StoreError;

/// What went wrong, independent of where.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Client input failed validation, or a write hit a row already in the
    /// requested state. HTTP 400.
    #[error("{error}: {details}")]
    BadRequest { error: &'static str, details: String },

    /// No row with the requested id. HTTP 404.
    #[error("todo {id} not found")]
    NotFound { id: i64 },

    /// Storage failure; the message is classified for the envelope. HTTP 500.
    #[error("{0}")]
    Storage(#[from] StoreError),

    /// The storage handle is absent from the application state. HTTP 500.
    #[error("storage binding unavailable")]
    Unavailable,
}

/// A failure bound to the endpoint that produced it.
#[derive(Debug)]
pub struct ApiError {
    endpoint: &'static str,
    kind: ErrorKind,
}

impl ApiError {
    pub fn new(endpoint: &'static str, kind: ErrorKind) -> Self {
        Self { endpoint, kind }
    }

    pub fn bad_request(
        endpoint: &'static str,
        error: &'static str,
        details: impl Into<String>,
    ) -> Self {
        Self::new(
            endpoint,
            ErrorKind::BadRequest {
                error,
                details: details.into(),
            },
        )
    }

    pub fn not_found(endpoint: &'static str, id: i64) -> Self {
        Self::new(endpoint, ErrorKind::NotFound { id })
    }

    pub fn storage(endpoint: &'static str, err: StoreError) -> Self {
        Self::new(endpoint, ErrorKind::Storage(err))
    }

    pub fn unavailable(endpoint: &'static str) -> Self {
        Self::new(endpoint, ErrorKind::Unavailable)
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound { .. } => StatusCode::NOT_FOUND,
            ErrorKind::Storage(_) | ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `error`/`details` pair for the envelope.
    fn message_pair(&self) -> (String, String) {
        match &self.kind {
            ErrorKind::BadRequest { error, details } => ((*error).to_string(), details.clone()),
            ErrorKind::NotFound { id } => (
                "Todo not found".to_string(),
                format!("Todo with ID {id} does not exist"),
            ),
            ErrorKind::Storage(err) => classify::storage_error(self.endpoint, &err.to_string()),
            ErrorKind::Unavailable => (
                "Database connection failed".to_string(),
                "DB binding is not available".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(endpoint = self.endpoint, "request failed: {}", self.kind);
        }
        let (error, details) = self.message_pair();
        let body = serde_json::json!({
            "error": error,
            "details": details,
            "timestamp": Utc::now(),
            "endpoint": self.endpoint,
        });
        (status, axum::Json(body)).into_response()
    }
}

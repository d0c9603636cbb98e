//! Error types for the todo API client.
//!
//! # Design
//! The server answers most failures with a structured envelope; when that
//! parses, `Api` carries its `error`/`details` pair so the UI can show the
//! headline alone as the inline message. `NotFound` covers the envelope-less
//! 404 of unknown routes (the create path, among others). Everything else
//! non-2xx lands in `HttpError` with the raw status and body for debugging.

use std::fmt;

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned its structured error envelope.
    Api {
        status: u16,
        error: String,
        details: String,
    },

    /// The server returned 404 without an envelope — no such route.
    NotFound,

    /// A non-2xx status with no parseable envelope.
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Api {
                status,
                error,
                details,
            } => {
                write!(f, "HTTP {status}: {error}: {details}")
            }
            ApiError::NotFound => write!(f, "no such route"),
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

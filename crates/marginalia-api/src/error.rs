//! Marginalia — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marginalia_core::error::{DomainError, ValidationIssue};
use serde::Serialize;
use thiserror::Error;

/// Message returned for unexpected failures when a handler does not
/// configure its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong, please try again later.";

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Field-level problems, for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

/// Response extension marking a 500 produced from an unexpected failure, so
/// the handler policy can substitute its own message.
#[derive(Debug, Clone, Copy)]
pub struct UnexpectedFailure;

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Renders the error, using `fallback` as the caller-facing message for
    /// unexpected failures. The original error is only logged.
    #[must_use]
    pub fn into_response_with_message(self, fallback: &str) -> Response {
        match self.0 {
            DomainError::Validation(issues) => {
                tracing::info!(?issues, "request failed validation");
                let body = ErrorBody {
                    error: "validation_failed",
                    message: format!("validation failed with {} issue(s)", issues.len()),
                    issues,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            DomainError::Rejected { status, message } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let body = ErrorBody {
                    error: "request_rejected",
                    message,
                    issues: Vec::new(),
                };
                (status, Json(body)).into_response()
            }
            DomainError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "unexpected failure while handling request");
                unexpected_response(fallback)
            }
        }
    }
}

/// Builds the 500 response for an unexpected failure.
#[must_use]
pub fn unexpected_response(message: &str) -> Response {
    let body = ErrorBody {
        error: "unexpected_error",
        message: message.to_owned(),
        issues: Vec::new(),
    };
    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    response.extensions_mut().insert(UnexpectedFailure);
    response
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_with_message(DEFAULT_ERROR_MESSAGE)
    }
}

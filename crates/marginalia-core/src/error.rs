//! Domain error types.

use serde::Serialize;
use thiserror::Error;

/// Machine-readable reason a single input field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// The value is missing or has the wrong JSON type.
    InvalidType,
    /// The value is shorter (or smaller) than allowed.
    TooSmall,
    /// The value is longer (or larger) than allowed.
    TooBig,
}

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path to the offending field; empty when the whole input is rejected.
    pub path: Vec<String>,
    /// Machine-readable reason.
    pub code: IssueCode,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue for a single top-level field.
    #[must_use]
    pub fn field(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_owned()],
            code,
            message: message.into(),
        }
    }

    /// Creates an issue about the input as a whole.
    #[must_use]
    pub fn root(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            code,
            message: message.into(),
        }
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Untrusted input failed shape or constraint checks.
    #[error("validation failed with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),

    /// The request was refused for a reason that carries its own HTTP status,
    /// e.g. a disabled feature (403) or an exhausted rate limit (429).
    #[error("{message}")]
    Rejected {
        /// HTTP status code to report.
        status: u16,
        /// Message safe to show to the caller.
        message: String,
    },

    /// An infrastructure/persistence error. Never shown to callers verbatim.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for a 403 rejection.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: 403,
            message: message.into(),
        }
    }

    /// Shorthand for a 429 rejection.
    #[must_use]
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: 429,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_counts_issues() {
        let err = DomainError::Validation(vec![
            ValidationIssue::field("author", IssueCode::TooSmall, "required"),
            ValidationIssue::field("comment", IssueCode::TooBig, "too long"),
        ]);

        assert_eq!(err.to_string(), "validation failed with 2 issue(s)");
    }

    #[test]
    fn test_issue_serializes_with_snake_case_code() {
        let issue = ValidationIssue::field("blogId", IssueCode::InvalidType, "expected string");

        let json = serde_json::to_value(&issue).unwrap();

        assert_eq!(json["path"], serde_json::json!(["blogId"]));
        assert_eq!(json["code"], "invalid_type");
        assert_eq!(json["message"], "expected string");
    }

    #[test]
    fn test_rejection_helpers_carry_status() {
        match DomainError::too_many_requests("slow down") {
            DomainError::Rejected { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}

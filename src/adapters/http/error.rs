//! HTTP error mapping.
//!
//! One structured problem body for every failure, plus the status mapping
//! from the domain error taxonomy (including 499 Client Closed Request for
//! cancelled callers).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Structured problem body returned on every error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code (e.g. "DUPLICATE_EMAIL")
    pub error: String,

    /// Human-readable description
    pub message: String,

    /// Optional field-level details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
}

impl ErrorResponse {
    /// Builds the body for a domain error.
    pub fn from_domain(err: &DomainError) -> Self {
        Self {
            error: err.code.to_string(),
            message: err.message.clone(),
            details: if err.details.is_empty() {
                None
            } else {
                Some(err.details.clone())
            },
        }
    }

    /// Shorthand for a 400 body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: ErrorCode::ValidationFailed.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Shorthand for a 404 body.
    pub fn not_found(kind: &str, id: &str) -> Self {
        Self {
            error: format!("{}_NOT_FOUND", kind.to_uppercase()),
            message: format!("{} not found: {}", kind, id),
            details: None,
        }
    }
}

/// Maps a domain error code to its HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::InvalidStatus | ErrorCode::InvalidUser => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::DuplicateEmail => StatusCode::CONFLICT,
        ErrorCode::UserNotFound | ErrorCode::OrderNotFound | ErrorCode::OutboxRowNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::Cancelled => client_closed_request(),
        ErrorCode::PeerUnavailable | ErrorCode::BusError => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Renders a domain error as its HTTP response.
pub fn error_response(err: &DomainError) -> Response {
    (status_for(err.code), Json(ErrorResponse::from_domain(err))).into_response()
}

/// 499 Client Closed Request (nginx convention; not in the http crate's
/// canonical list).
fn client_closed_request() -> StatusCode {
    StatusCode::from_u16(499).expect("499 is a valid status code")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(status_for(ErrorCode::ValidationFailed), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::InvalidStatus), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::InvalidUser), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_maps_to_409() {
        assert_eq!(status_for(ErrorCode::DuplicateEmail), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(status_for(ErrorCode::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::OrderNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::OutboxRowNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn cancelled_maps_to_499() {
        assert_eq!(status_for(ErrorCode::Cancelled).as_u16(), 499);
    }

    #[test]
    fn transient_maps_to_503_and_internal_to_500() {
        assert_eq!(status_for(ErrorCode::PeerUnavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(ErrorCode::BusError), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(ErrorCode::DatabaseError), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorCode::InternalError), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn body_carries_code_message_and_details() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "Bad input")
            .with_detail("field", "email");
        let body = ErrorResponse::from_domain(&err);

        assert_eq!(body.error, "VALIDATION_FAILED");
        assert_eq!(body.message, "Bad input");
        assert_eq!(body.details.unwrap().get("field"), Some(&"email".to_string()));
    }

    #[test]
    fn empty_details_are_omitted() {
        let err = DomainError::new(ErrorCode::UserNotFound, "nope");
        let body = ErrorResponse::from_domain(&err);
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("details"));
    }
}

//! API error taxonomy and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failures surfaced at the HTTP boundary.
///
/// The stores themselves signal absence through `Option`; handlers convert
/// that into the appropriate variant here. Every variant renders as a JSON
/// body of the form `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session with the requested id.
    #[error("Session not found")]
    SessionNotFound,

    /// The session has no chat log entry.
    #[error("Chat not found")]
    ChatNotFound,

    /// Role supplied on write is outside the writable set.
    #[error("Invalid message role")]
    InvalidRole,

    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound | Self::ChatNotFound => StatusCode::NOT_FOUND,
            Self::InvalidRole => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(
            name: "request.rejected",
            status = %status,
            detail = %self,
            "Request rejected"
        );
        let body = json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::SessionNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::ChatNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidRole.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_detail_messages() {
        assert_eq!(ApiError::SessionNotFound.to_string(), "Session not found");
        assert_eq!(ApiError::InvalidRole.to_string(), "Invalid message role");
    }
}

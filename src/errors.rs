use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// Error types for the MMM analytics service.
/// Assembly is deterministic, so no failure is transient and nothing is retried:
/// - Client mistakes (unknown tier, bad arguments) map to 400
/// - Everything else surfaces as a generic 500 with the underlying message
#[derive(Debug, thiserror::Error)]
pub enum MmmError {
    #[error("Invalid scenario: {requested}. Must be one of: {}", .valid.join(", "))]
    InvalidScenario {
        requested: String,
        valid: Vec<&'static str>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("processing failure: {0}")]
    ProcessingFailure(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

impl MmmError {
    /// True for errors the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, MmmError::InvalidScenario { .. } | MmmError::InvalidInput(_))
    }

    pub fn status(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<std::io::Error> for MmmError {
    fn from(e: std::io::Error) -> Self {
        MmmError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for MmmError {
    fn from(e: serde_json::Error) -> Self {
        MmmError::ProcessingFailure(e.to_string())
    }
}

impl IntoResponse for MmmError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, MmmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_scenario_lists_valid_tiers() {
        let err = MmmError::InvalidScenario {
            requested: "ultra".into(),
            valid: vec!["high", "mid", "low"],
        };
        let msg = err.to_string();
        assert!(msg.contains("ultra"), "message should echo the request: {msg}");
        assert!(msg.contains("high, mid, low"), "message should enumerate tiers: {msg}");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_processing_failure_is_server_error() {
        let err = MmmError::ProcessingFailure("malformed upload".into());
        assert!(!err.is_client_error());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MmmError = io.into();
        assert!(matches!(err, MmmError::Io(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

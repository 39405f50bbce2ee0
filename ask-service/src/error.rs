use crate::models::ErrorResponse;
use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub const MISSING_INPUT_MESSAGE: &str = "❌ Missing input: question or pageContent.";
pub const BODY_TOO_LARGE_MESSAGE: &str = "❌ Request body too large.";
pub const MODEL_NOT_READY_MESSAGE: &str = "❌ Gemini model is not initialized.";
pub const GENERATION_FAILED_MESSAGE: &str = "❌ Gemini AI failed to respond.";
pub const NOT_FOUND_MESSAGE: &str = "Not found";

/// Request-level failures of the relay.
///
/// Every variant renders a fixed `{ "error": ... }` body. Provider detail is
/// kept for logging and never reaches the caller.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("question or pageContent missing")]
    MissingInput,

    #[error("request body exceeds the configured limit")]
    BodyTooLarge,

    #[error("model is not initialized")]
    ModelNotReady,

    #[error("content generation failed: {0}")]
    Generation(#[from] ProviderError),

    #[error("route not found")]
    NotFound,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingInput => StatusCode::BAD_REQUEST,
            RelayError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::ModelNotReady | RelayError::Generation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            RelayError::MissingInput => MISSING_INPUT_MESSAGE,
            RelayError::BodyTooLarge => BODY_TOO_LARGE_MESSAGE,
            RelayError::ModelNotReady => MODEL_NOT_READY_MESSAGE,
            RelayError::Generation(_) => GENERATION_FAILED_MESSAGE,
            RelayError::NotFound => NOT_FOUND_MESSAGE,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.public_message().to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_hides_provider_detail() {
        let err = RelayError::from(ProviderError::ApiError("quota exceeded for key abc".into()));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), GENERATION_FAILED_MESSAGE);
        // Detail stays available for logs.
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(RelayError::MissingInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::BodyTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            RelayError::ModelNotReady.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(RelayError::NotFound.status(), StatusCode::NOT_FOUND);
    }
}

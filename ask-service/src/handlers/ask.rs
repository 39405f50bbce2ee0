use crate::error::RelayError;
use crate::models::{AskRequest, AskResponse};
use crate::services::compose_prompt;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

/// Reply used when the model answers without any text.
pub const NO_RESPONSE_PLACEHOLDER: &str = "⚠️ No response from Gemini.";

/// `POST /ask`: validate, check the model, compose the prompt, relay once.
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, RelayError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected /ask body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::BodyTooLarge
        } else {
            // Unparsable or non-JSON bodies carry no usable fields.
            RelayError::MissingInput
        }
    })?;

    if payload.validate().is_err() {
        return Err(RelayError::MissingInput);
    }
    let Some((question, page_content)) = payload.prompt_fields() else {
        return Err(RelayError::MissingInput);
    };

    let Some(model) = state.model.provider() else {
        tracing::error!(state = state.model.state().label(), "Request received before model was ready");
        return Err(RelayError::ModelNotReady);
    };

    let prompt = compose_prompt(&page_content, &question);

    let response = model.generate(&prompt).await.map_err(|e| {
        tracing::error!(error = %e, model = %model.model(), "Error during content generation");
        RelayError::Generation(e)
    })?;

    let reply = response.text.unwrap_or_else(|| {
        tracing::warn!(model = %model.model(), "Model returned no text; sending placeholder");
        NO_RESPONSE_PLACEHOLDER.to_string()
    });

    Ok(Json(AskResponse { reply }))
}

pub async fn not_found() -> RelayError {
    RelayError::NotFound
}

//! Conversational endpoint

use axum::{Extension, Json, extract::State, response::IntoResponse};
use clin_core::ApiClient;
use serde::{Deserialize, Serialize};

use crate::ai::{self, ClaudeClient};
use crate::error::AppError;

/// Request body for chat
#[derive(Deserialize)]
pub struct ChatRequest {
    message: String,
}

/// Response body for chat
#[derive(Serialize)]
pub struct ChatResponse {
    response: String,
}

/// POST /chat — Ask the assistant a natural-language question
///
/// Runs the tool-calling loop: the model may look up patients, conditions,
/// encounters, and observations through the clinical API before composing
/// its answer.
pub async fn post(
    State(api): State<ApiClient>,
    Extension(claude): Extension<Option<ClaudeClient>>,
    Json(body): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let claude = claude
        .ok_or_else(|| AppError::Internal("ANTHROPIC_API_KEY not configured".to_string()))?;

    tracing::info!(message = message, "Chat request");

    let response = ai::chatbot::chat(&claude, &api, message)
        .await
        .map_err(|e| AppError::Internal(format!("Chat failed: {e}")))?;

    Ok(Json(ChatResponse { response }))
}

//! Direct tool invocation endpoint
//!
//! Lets non-LLM front ends (and tests) call a named tool with a JSON
//! argument object and get back the rendered text, bypassing the model.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use clin_core::ApiClient;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Response body for a tool invocation
#[derive(Serialize)]
pub struct ToolResponse {
    response: String,
}

/// POST /tools/{name} — Invoke one named tool directly
///
/// Mirrors the tool-result contract of the chat loop: failures come back
/// as text in the response body, never as an error status.
pub async fn invoke(
    State(api): State<ApiClient>,
    Path(name): Path<String>,
    Json(input): Json<JsonValue>,
) -> impl IntoResponse {
    let response = clin_core::tools::dispatch(&api, &name, &input).await;
    Json(ToolResponse { response })
}

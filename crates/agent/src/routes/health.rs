//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use clin_core::ApiClient;
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Check clinical API connectivity and report service health
pub async fn check(State(api): State<ApiClient>) -> impl IntoResponse {
    match api.get("/patients", &[("limit", "1".to_string())]).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                reason: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check upstream call failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    reason: Some(format!("Clinical API unreachable: {e}")),
                }),
            )
        }
    }
}

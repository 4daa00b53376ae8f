//! clin-agent library crate
//!
//! Exposes `build_app` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

mod ai;
pub mod config;
mod error;
mod routes;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use clin_core::ApiClient;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Build the full application router.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(api: ApiClient, config: &Config) -> Router {
    // Create Claude client (None if ANTHROPIC_API_KEY not set)
    let claude: Option<ai::ClaudeClient> = config.anthropic_api_key.as_ref().map(|key| {
        let client = ai::ClaudeClient::new(key.clone());
        match &config.anthropic_model {
            Some(model) => client.with_model(model.clone()),
            None => client,
        }
    });

    // Build CORS layer
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/chat", post(routes::chat::post))
        .route("/tools/{name}", post(routes::tools::invoke))
        .with_state(api)
        .layer(Extension(claude))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

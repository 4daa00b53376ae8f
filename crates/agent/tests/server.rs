//! Integration tests for the assistant HTTP service.
//!
//! A small mock clinical API runs in-process on an ephemeral port; the
//! router under test is exercised through `tower::ServiceExt::oneshot`
//! without binding its own port.

use axum::{
    Json, Router,
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    routing::get,
};
use http_body_util::BodyExt;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

use clin_agent::config::Config;
use clin_core::ApiClient;

async fn mock_patients() -> Json<JsonValue> {
    Json(json!([{"id": 2, "first_name": "Robert854", "last_name": "Botsford977"}]))
}

async fn mock_patient_by_id(Path(id): Path<i64>) -> (StatusCode, Json<JsonValue>) {
    if id == 2 {
        (
            StatusCode::OK,
            Json(json!({
                "id": 2,
                "first_name": "Robert854",
                "last_name": "Botsford977",
                "birth_date": "1985-03-10",
                "gender": "male"
            })),
        )
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"})))
    }
}

/// Start the mock clinical API and return its base URL.
async fn start_upstream() -> String {
    let app = Router::new()
        .route("/patients", get(mock_patients))
        .route("/patients/{id}", get(mock_patient_by_id));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve upstream");
    });

    format!("http://{addr}")
}

fn test_app(api_base_url: &str) -> Router {
    let config = Config {
        api_base_url: api_base_url.to_string(),
        bind_address: "0.0.0.0:0".to_string(),
        anthropic_api_key: None,
        anthropic_model: None,
        cors_origins: vec!["*".to_string()],
    };
    clin_agent::build_app(ApiClient::new(api_base_url), &config)
}

async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };

    (status, body)
}

fn post(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_upstream_reachability() {
    let upstream = start_upstream().await;
    let app = test_app(&upstream);

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = request(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn health_degrades_when_upstream_is_down() {
    // Nothing listens on this port.
    let app = test_app("http://127.0.0.1:1");

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = request(&app, req).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn tools_endpoint_invokes_a_named_tool() {
    let upstream = start_upstream().await;
    let app = test_app(&upstream);

    let (status, body) = request(
        &app,
        post("/tools/get_patient_info", json!({"patient_identifier": "2"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let text = body["response"].as_str().expect("text response");
    assert!(text.contains("Robert854"), "unexpected output:\n{text}");
}

#[tokio::test]
async fn tools_endpoint_embeds_failures_in_the_text() {
    let upstream = start_upstream().await;
    let app = test_app(&upstream);

    let (status, body) = request(&app, post("/tools/make_coffee", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Unknown tool: make_coffee");

    let (status, body) = request(&app, post("/tools/get_patient_info", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"],
        "Missing required parameter: patient_identifier"
    );
}

#[tokio::test]
async fn chat_rejects_a_blank_message() {
    let upstream = start_upstream().await;
    let app = test_app(&upstream);

    let (status, body) = request(&app, post("/chat", json!({"message": "   "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message must not be empty");
}

#[tokio::test]
async fn chat_requires_an_api_key() {
    let upstream = start_upstream().await;
    let app = test_app(&upstream);

    let (status, body) = request(&app, post("/chat", json!({"message": "hi"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "ANTHROPIC_API_KEY not configured");
}

//! HTTP client for the clinical data API.

use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::error::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the clinical data REST API.
///
/// Holds one reqwest client (and therefore one connection pool) for the
/// lifetime of the process. Construct a single instance and share it by
/// clone; this is the only mutable shared state in the core, and it is
/// injected rather than global so tests can point it at a fake server.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API at `base_url` (e.g. `http://localhost:8000/api/v2`).
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET a resource, with query parameters.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<JsonValue, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        self.execute(self.http.get(&url).query(params), &url).await
    }

    /// POST a JSON body.
    pub async fn post(&self, path: &str, body: &JsonValue) -> Result<JsonValue, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        self.execute(self.http.post(&url).json(body), &url).await
    }

    /// PUT a JSON body.
    pub async fn put(&self, path: &str, body: &JsonValue) -> Result<JsonValue, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        self.execute(self.http.put(&url).json(body), &url).await
    }

    /// DELETE a resource. Returns a small success marker since many DELETE
    /// endpoints respond with an empty body.
    pub async fn delete(&self, path: &str) -> Result<JsonValue, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(&url, status, response).await);
        }

        Ok(serde_json::json!({
            "success": true,
            "status_code": status.as_u16(),
        }))
    }

    /// Send a request and normalize every failure mode into [`ApiError`].
    /// No retries; retry policy, if any, belongs to the caller.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<JsonValue, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(url, status, response).await);
        }

        response.json::<JsonValue>().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to decode API response");
            ApiError::Decode(e.to_string())
        })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> ApiError {
        tracing::error!(url = %url, error = %err, "API request failed");
        ApiError::Transport(err.to_string())
    }

    async fn status_error(
        &self,
        url: &str,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(url = %url, status = status.as_u16(), "API returned error status");
        ApiError::Status {
            status: status.as_u16(),
            message: if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body
            },
        }
    }
}

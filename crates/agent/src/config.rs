//! Agent service configuration

/// Configuration loaded from environment variables
pub struct Config {
    /// Base URL of the clinical data API, e.g. `http://localhost:8000/api/v2`
    pub api_base_url: String,
    pub bind_address: String,
    /// Chat is disabled when unset; direct tool invocation still works
    pub anthropic_api_key: Option<String>,
    /// Overrides the default Claude model when set
    pub anthropic_model: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("CLINICAL_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/v2".into()),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8090".into()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            anthropic_model: std::env::var("ANTHROPIC_MODEL").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
        }
    }
}

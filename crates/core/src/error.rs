use thiserror::Error;

/// Transport-level failure from the clinical data API.
///
/// Every network error, timeout, and non-2xx status the [`crate::ApiClient`]
/// encounters is converted into one of these. Callers never see a raw
/// reqwest error.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// The HTTP status code, when the failure carried one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => ApiError::Transport(err.to_string()),
        }
    }
}

/// Failure to map a patient reference to an internal id.
///
/// Terminal for the current request (no dependent fetches are attempted)
/// but reported to the end user as plain text, never as a process fault.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No patient found with identifier: {0}")]
    NotFound(String),

    /// External identifiers are expected unique; multiple hits signal a
    /// data problem the caller must resolve with a more specific reference.
    #[error("Identifier {0} matches {1} patients; provide a more specific reference")]
    Ambiguous(String, usize),

    /// The single match carried no internal id field.
    #[error("Patient record for {0} has no internal id")]
    MissingId(String),

    #[error("Error looking up patient {reference}: {source}")]
    Lookup {
        reference: String,
        source: ApiError,
    },
}

//! Mapping of patient references to internal ids.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::client::ApiClient;
use crate::error::ResolutionError;

/// A patient reference as supplied by the caller: either the internal
/// numeric id, or an opaque external identifier (MRN, UUID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientReference {
    Numeric(i64),
    External(String),
}

impl PatientReference {
    /// Classify a raw reference string.
    ///
    /// Purely numeric text is taken as the internal id directly; anything
    /// else (including numeric strings too long for an i64, which are
    /// plausibly record numbers) is treated as an external identifier.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<i64>() {
                return PatientReference::Numeric(id);
            }
        }
        PatientReference::External(trimmed.to_string())
    }
}

impl fmt::Display for PatientReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientReference::Numeric(id) => write!(f, "{id}"),
            PatientReference::External(identifier) => f.write_str(identifier),
        }
    }
}

/// Resolve a reference to the internal patient id.
///
/// The numeric fast path involves no network call. An external identifier
/// is looked up and must match exactly one patient; zero matches is
/// [`ResolutionError::NotFound`] and two or more is
/// [`ResolutionError::Ambiguous`] — multiple hits mean the identifier data
/// is suspect, so we surface that rather than guess.
pub async fn resolve(
    client: &ApiClient,
    reference: &PatientReference,
) -> Result<i64, ResolutionError> {
    let identifier = match reference {
        PatientReference::Numeric(id) => return Ok(*id),
        PatientReference::External(identifier) => identifier,
    };

    let payload = client
        .get("/patients", &[("identifier", identifier.clone())])
        .await
        .map_err(|source| ResolutionError::Lookup {
            reference: identifier.clone(),
            source,
        })?;

    let matches = match payload.as_array() {
        Some(items) => items,
        None => return Err(ResolutionError::NotFound(identifier.clone())),
    };

    match matches.as_slice() {
        [] => Err(ResolutionError::NotFound(identifier.clone())),
        [single] => single
            .get("id")
            .and_then(JsonValue::as_i64)
            .ok_or_else(|| ResolutionError::MissingId(identifier.clone())),
        many => {
            tracing::warn!(
                identifier = %identifier,
                count = many.len(),
                "External identifier matched multiple patients"
            );
            Err(ResolutionError::Ambiguous(identifier.clone(), many.len()))
        }
    }
}

//! Typed views over the clinical data API's flat JSON records.
//!
//! The API is loosely typed; every field here is optional and a record
//! that fails to match a shape simply decodes to its `Default` (all
//! `None`), which the formatter renders with explicit placeholders.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A patient row from `GET /patients`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Patient {
    pub id: Option<i64>,
    pub identifier: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub marital_status: Option<String>,
    pub language: Option<String>,
    pub race: Option<String>,
    pub ethnicity: Option<String>,
    pub deceased_date: Option<String>,
    pub active: Option<bool>,
    pub managing_organization_identifier: Option<String>,
}

/// A condition row from `GET /conditions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Condition {
    pub id: Option<i64>,
    pub patient_id: Option<i64>,
    pub code: Option<String>,
    pub display: Option<String>,
    pub clinical_status: Option<String>,
    pub verification_status: Option<String>,
    pub onset_time: Option<String>,
    pub recorded_date: Option<String>,
}

/// An encounter row from `GET /encounters`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Encounter {
    pub id: Option<i64>,
    pub patient_id: Option<i64>,
    pub practitioner_id: Option<i64>,
    pub organization_id: Option<i64>,
    pub status: Option<String>,
    pub class_code: Option<String>,
    pub class_display: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason_display: Option<String>,
}

/// An observation row from `GET /observations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Observation {
    pub id: Option<i64>,
    pub patient_id: Option<i64>,
    pub status: Option<String>,
    pub code: Option<String>,
    pub code_display: Option<String>,
    pub value_quantity: Option<f64>,
    pub value_unit: Option<String>,
    pub value_string: Option<String>,
    pub effective_time: Option<String>,
}

/// Decode a payload into a record shape, falling back to the all-`None`
/// default when the payload does not match.
pub fn decode<T: Default + serde::de::DeserializeOwned>(value: &JsonValue) -> T {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

/// An error message embedded inside a record payload, if any.
///
/// The upstream API (and intermediate tooling) may hand back
/// `{"error": "...", "status_code": ...}` in place of a record.
pub fn embedded_error(value: &JsonValue) -> Option<&str> {
    value.get("error").and_then(JsonValue::as_str)
}

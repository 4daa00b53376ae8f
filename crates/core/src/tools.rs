//! The named operations exposed to the conversational front end.
//!
//! Every operation returns a `String` with any failure embedded in the
//! text. The consumer is a text-generation loop that cannot catch errors
//! across its tool-invocation boundary, so nothing here returns `Err`
//! or panics.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::args;
use crate::client::ApiClient;
use crate::format;
use crate::records::{self, Encounter};
use crate::resolve::{self, PatientReference};
use crate::summary;

/// Parameter names accepted by [`search_patients`].
pub const SEARCH_PATIENT_PARAMS: [&str; 5] =
    ["first_name", "last_name", "birth_date", "gender", "limit"];

/// Parameter names accepted by [`search_encounters`].
pub const SEARCH_ENCOUNTER_PARAMS: [&str; 8] = [
    "patient_id",
    "practitioner_id",
    "organization_id",
    "status",
    "start_from",
    "start_to",
    "class_code",
    "limit",
];

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// Detailed information about one patient, by id or external identifier.
pub async fn get_patient_info(client: &ApiClient, patient_identifier: &str) -> String {
    let cleaned = args::normalize("patient_identifier", patient_identifier);
    let reference = PatientReference::parse(&cleaned);

    let patient_id = match resolve::resolve(client, &reference).await {
        Ok(id) => id,
        Err(err) => return err.to_string(),
    };

    match client.get(&format!("/patients/{patient_id}"), &[]).await {
        Ok(payload) => format::format_patient(&payload),
        Err(err) => format!("Error retrieving patient {reference}: {err}"),
    }
}

/// Search patients by name, birth date, and gender.
pub async fn search_patients(client: &ApiClient, raw_args: &BTreeMap<String, String>) -> String {
    let cleaned = clean_args(raw_args, &SEARCH_PATIENT_PARAMS);

    // A lone two-token name is not silently split into first/last — which
    // half is which would be a guess. Fail closed and ask instead.
    if let Some(first_name) = cleaned.get("first_name") {
        if first_name.split_whitespace().count() > 1 && !cleaned.contains_key("last_name") {
            return format!(
                "The name \"{first_name}\" is ambiguous: pass first_name and last_name \
                 separately, or search on a single field."
            );
        }
    }

    let mut params: Vec<(&str, String)> = Vec::new();
    for key in ["first_name", "last_name", "birth_date", "gender"] {
        if let Some(value) = cleaned.get(key) {
            params.push((key, value.clone()));
        }
    }
    params.push(("limit", effective_limit(&cleaned).to_string()));

    match client.get("/patients", &params).await {
        Ok(payload) => {
            let patients = payload.as_array().cloned().unwrap_or_default();
            if patients.is_empty() {
                "No patients found matching the search criteria.".to_string()
            } else {
                format!(
                    "Found {} patient(s):\n\n{}",
                    patients.len(),
                    format::format_list(&patients, "patients", format::format_patient),
                )
            }
        }
        Err(err) => format!("Error searching patients: {err}"),
    }
}

/// All conditions recorded for one patient.
pub async fn get_patient_conditions(client: &ApiClient, patient_identifier: &str) -> String {
    patient_listing(client, patient_identifier, "/conditions", "condition", format::format_condition)
        .await
}

/// All encounters recorded for one patient.
pub async fn get_patient_encounters(client: &ApiClient, patient_identifier: &str) -> String {
    patient_listing(client, patient_identifier, "/encounters", "encounter", format::format_encounter)
        .await
}

/// All observations recorded for one patient.
pub async fn get_patient_observations(client: &ApiClient, patient_identifier: &str) -> String {
    patient_listing(
        client,
        patient_identifier,
        "/observations",
        "observation",
        format::format_observation,
    )
    .await
}

/// Combined report: basic info, conditions, encounters, observations.
pub async fn get_patient_summary(client: &ApiClient, patient_identifier: &str) -> String {
    let cleaned = args::normalize("patient_identifier", patient_identifier);
    let reference = PatientReference::parse(&cleaned);
    summary::build_patient_summary(client, &reference)
        .await
        .to_string()
}

/// Detailed information about one encounter.
pub async fn get_encounter_details(client: &ApiClient, encounter_id: &str) -> String {
    let cleaned = args::normalize("encounter_id", encounter_id);
    let Ok(id) = cleaned.parse::<i64>() else {
        return format!("Invalid encounter id: {cleaned}");
    };

    match client.get(&format!("/encounters/{id}"), &[]).await {
        Ok(payload) => format::format_encounter_details(&payload),
        Err(err) => format!("Error retrieving encounter {id}: {err}"),
    }
}

/// Search encounters by patient, practitioner, organization, status,
/// date range, and class code.
pub async fn search_encounters(client: &ApiClient, raw_args: &BTreeMap<String, String>) -> String {
    let cleaned = clean_args(raw_args, &SEARCH_ENCOUNTER_PARAMS);

    let mut params: Vec<(&str, String)> = Vec::new();
    for key in [
        "patient_id",
        "practitioner_id",
        "organization_id",
        "status",
        "start_from",
        "start_to",
        "class_code",
    ] {
        if let Some(value) = cleaned.get(key) {
            params.push((key, value.clone()));
        }
    }
    params.push(("limit", effective_limit(&cleaned).to_string()));

    match client.get("/encounters", &params).await {
        Ok(payload) => {
            let encounters = payload.as_array().cloned().unwrap_or_default();
            if encounters.is_empty() {
                "No encounters found matching the search criteria.".to_string()
            } else {
                format!(
                    "Found {} encounter(s):\n\n{}",
                    encounters.len(),
                    format::format_list(&encounters, "encounters", format::format_encounter),
                )
            }
        }
        Err(err) => format!("Error searching encounters: {err}"),
    }
}

/// Summary statistics over all encounters: total count plus status and
/// class-code breakdowns.
pub async fn encounter_statistics(client: &ApiClient) -> String {
    let result = client
        .get("/encounters", &[("limit", "1000".to_string())])
        .await;

    let encounters = match result {
        Ok(payload) => payload.as_array().cloned().unwrap_or_default(),
        Err(err) => return format!("Error retrieving encounter statistics: {err}"),
    };

    if encounters.is_empty() {
        return "No encounters found in the system.".to_string();
    }

    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut class_counts: BTreeMap<String, usize> = BTreeMap::new();
    for encounter in &encounters {
        let e: Encounter = records::decode(encounter);
        *status_counts
            .entry(e.status.unwrap_or_else(|| "unknown".to_string()))
            .or_default() += 1;
        *class_counts
            .entry(e.class_code.unwrap_or_else(|| "unknown".to_string()))
            .or_default() += 1;
    }

    let mut out = String::from("=== ENCOUNTER STATISTICS ===\n");
    out.push_str(&format!("Total Encounters: {}\n\n", encounters.len()));
    out.push_str("Status Breakdown:\n");
    for (status, count) in &status_counts {
        out.push_str(&format!("  {status}: {count}\n"));
    }
    out.push_str("\nClass Code Breakdown:\n");
    for (class_code, count) in &class_counts {
        out.push_str(&format!("  {class_code}: {count}\n"));
    }
    out
}

/// Execute a named tool with loosely typed JSON input.
///
/// This is the seam the chat loop calls through: tool names and argument
/// payloads come straight from the language model, so unknown names and
/// missing arguments produce explanatory text rather than errors.
pub async fn dispatch(client: &ApiClient, name: &str, input: &JsonValue) -> String {
    tracing::info!(tool = %name, "Executing tool");

    match name {
        "get_patient_info" => match string_arg(input, "patient_identifier") {
            Some(identifier) => get_patient_info(client, &identifier).await,
            None => missing("patient_identifier"),
        },
        "search_patients" => search_patients(client, &args_map(input)).await,
        "get_patient_conditions" => match string_arg(input, "patient_identifier") {
            Some(identifier) => get_patient_conditions(client, &identifier).await,
            None => missing("patient_identifier"),
        },
        "get_patient_encounters" => match string_arg(input, "patient_identifier") {
            Some(identifier) => get_patient_encounters(client, &identifier).await,
            None => missing("patient_identifier"),
        },
        "get_patient_observations" => match string_arg(input, "patient_identifier") {
            Some(identifier) => get_patient_observations(client, &identifier).await,
            None => missing("patient_identifier"),
        },
        "get_patient_summary" => match string_arg(input, "patient_identifier") {
            Some(identifier) => get_patient_summary(client, &identifier).await,
            None => missing("patient_identifier"),
        },
        "get_encounter_details" => match string_arg(input, "encounter_id") {
            Some(id) => get_encounter_details(client, &id).await,
            None => missing("encounter_id"),
        },
        "search_encounters" => search_encounters(client, &args_map(input)).await,
        "encounter_statistics" => encounter_statistics(client).await,
        _ => format!("Unknown tool: {name}"),
    }
}

/// Reroute comma-joined parameters, then normalize each known one.
fn clean_args(raw: &BTreeMap<String, String>, known: &[&str]) -> BTreeMap<String, String> {
    let mut working = raw.clone();
    args::reroute(&mut working, known);

    working
        .into_iter()
        .filter(|(key, _)| known.contains(&key.as_str()))
        .map(|(key, value)| {
            let cleaned = args::normalize(&key, &value);
            (key, cleaned)
        })
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

fn effective_limit(cleaned: &BTreeMap<String, String>) -> u32 {
    cleaned
        .get("limit")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT)
}

async fn patient_listing<F>(
    client: &ApiClient,
    patient_identifier: &str,
    path: &str,
    label: &str,
    render: F,
) -> String
where
    F: Fn(&JsonValue) -> String,
{
    let cleaned = args::normalize("patient_identifier", patient_identifier);
    let reference = PatientReference::parse(&cleaned);

    let patient_id = match resolve::resolve(client, &reference).await {
        Ok(id) => id,
        Err(err) => return err.to_string(),
    };

    let result = client
        .get(path, &[("patient_id", patient_id.to_string())])
        .await;

    match result {
        Ok(payload) => {
            let items = payload.as_array().cloned().unwrap_or_default();
            if items.is_empty() {
                format!("No {label}s found for patient {reference}.")
            } else {
                format!(
                    "Patient {reference} has {} {label}(s):\n\n{}",
                    items.len(),
                    format::format_list(&items, &format!("{label}s"), render),
                )
            }
        }
        Err(err) => format!("Error retrieving {label}s for patient {reference}: {err}"),
    }
}

fn string_arg(input: &JsonValue, key: &str) -> Option<String> {
    match input.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        other => {
            tracing::warn!(key = %key, value = %other, "Ignoring non-scalar tool argument");
            None
        }
    }
}

fn args_map(input: &JsonValue) -> BTreeMap<String, String> {
    let Some(object) = input.as_object() else {
        return BTreeMap::new();
    };

    object
        .iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                JsonValue::String(s) => s.clone(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), rendered))
        })
        .collect()
}

fn missing(param: &str) -> String {
    format!("Missing required parameter: {param}")
}

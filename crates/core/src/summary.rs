//! The patient summary orchestrator.
//!
//! Composes identifier resolution with the per-resource fetches into one
//! combined report that tolerates partial failure: a flaky conditions
//! endpoint must not blank out an otherwise-available summary.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::format;
use crate::resolve::{self, PatientReference};

/// One named part of a summary.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: &'static str,
    pub body: SectionBody,
}

/// A section either rendered from fetched data or recording why its
/// fetch failed. "Zero rows" is `Rendered` ("No conditions found ...");
/// only a failed fetch produces `Failed`.
#[derive(Debug, Clone)]
pub enum SectionBody {
    Rendered(String),
    Failed(String),
}

impl SectionBody {
    pub fn text(&self) -> &str {
        match self {
            SectionBody::Rendered(text) | SectionBody::Failed(text) => text,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SectionBody::Failed(_))
    }
}

/// An aggregated patient report: ordered sections, each independently
/// populated or failed. Always well-formed; building one never fails.
#[derive(Debug, Clone)]
pub struct PatientSummary {
    pub sections: Vec<Section>,
}

impl fmt::Display for PatientSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PATIENT SUMMARY ===")?;
        for section in &self.sections {
            writeln!(f, "\n{}:\n{}", section.title, section.body.text())?;
        }
        Ok(())
    }
}

const INFO_TITLE: &str = "BASIC INFORMATION";
const CONDITIONS_TITLE: &str = "MEDICAL CONDITIONS";
const ENCOUNTERS_TITLE: &str = "MEDICAL ENCOUNTERS";
const OBSERVATIONS_TITLE: &str = "OBSERVATIONS";

/// Build the full summary for a patient reference.
///
/// Resolution failure short-circuits: the report carries a single section
/// with the resolution message and no sub-fetches are attempted. After a
/// successful resolution the four sub-fetches run concurrently; each one
/// fails or succeeds on its own, and the section order is fixed regardless
/// of completion order.
pub async fn build_patient_summary(
    client: &ApiClient,
    reference: &PatientReference,
) -> PatientSummary {
    let patient_id = match resolve::resolve(client, reference).await {
        Ok(id) => id,
        Err(err) => {
            return PatientSummary {
                sections: vec![Section {
                    title: INFO_TITLE,
                    body: SectionBody::Failed(err.to_string()),
                }],
            };
        }
    };

    let (info, conditions, encounters, observations) = tokio::join!(
        fetch_info(client, patient_id),
        fetch_listing(client, patient_id, "/conditions", "conditions", format::format_condition),
        fetch_listing(client, patient_id, "/encounters", "encounters", format::format_encounter),
        fetch_listing(
            client,
            patient_id,
            "/observations",
            "observations",
            format::format_observation
        ),
    );

    PatientSummary {
        sections: vec![
            Section { title: INFO_TITLE, body: info },
            Section { title: CONDITIONS_TITLE, body: conditions },
            Section { title: ENCOUNTERS_TITLE, body: encounters },
            Section { title: OBSERVATIONS_TITLE, body: observations },
        ],
    }
}

async fn fetch_info(client: &ApiClient, patient_id: i64) -> SectionBody {
    match client.get(&format!("/patients/{patient_id}"), &[]).await {
        Ok(payload) => SectionBody::Rendered(format::format_patient(&payload)),
        Err(err) => SectionBody::Failed(format!("Error retrieving patient {patient_id}: {err}")),
    }
}

async fn fetch_listing<F>(
    client: &ApiClient,
    patient_id: i64,
    path: &str,
    noun: &str,
    render: F,
) -> SectionBody
where
    F: Fn(&JsonValue) -> String,
{
    let result = client
        .get(path, &[("patient_id", patient_id.to_string())])
        .await;

    match result {
        Ok(payload) => {
            let items = payload.as_array().cloned().unwrap_or_default();
            if items.is_empty() {
                SectionBody::Rendered(format!("No {noun} found for patient {patient_id}."))
            } else {
                SectionBody::Rendered(format!(
                    "Patient {patient_id} has {} {noun}:\n\n{}",
                    items.len(),
                    format::format_list(&items, noun, render),
                ))
            }
        }
        Err(err) => SectionBody::Failed(fetch_error(noun, patient_id, &err)),
    }
}

fn fetch_error(noun: &str, patient_id: i64, err: &ApiError) -> String {
    format!("Error retrieving {noun} for patient {patient_id}: {err}")
}

//! Rendering of clinical records into human-readable text.
//!
//! Pure functions, no I/O. Absent fields always render as an explicit
//! placeholder line rather than disappearing, so the assistant's answers
//! have a stable shape regardless of how sparse a record is.

use serde_json::Value as JsonValue;

use crate::records::{self, Condition, Encounter, Observation, Patient};

/// How many list items are rendered in full before collapsing to a count.
const LIST_DETAIL_CAP: usize = 10;

fn or_default<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    value.as_deref().unwrap_or(placeholder)
}

fn id_or_unknown(id: Option<i64>) -> String {
    id.map_or_else(|| "Unknown".to_string(), |v| v.to_string())
}

/// Render a full patient record.
///
/// A payload carrying an embedded `error` field renders only the error
/// line; none of its other fields are touched.
pub fn format_patient(value: &JsonValue) -> String {
    if let Some(err) = records::embedded_error(value) {
        return format!("Error retrieving patient: {err}");
    }

    let p: Patient = records::decode(value);

    let name = format!(
        "{} {}",
        or_default(&p.first_name, "Unknown"),
        or_default(&p.last_name, "Unknown"),
    );
    let birth_date = p
        .birth_date
        .map_or_else(|| "Unknown".to_string(), |d| d.to_string());
    let status = match p.active {
        Some(false) => "Inactive",
        _ => "Active",
    };

    let mut out = String::from("**PATIENT INFORMATION**\n\n");
    out.push_str(&format!("**Name:** {name}\n"));
    out.push_str(&format!("**ID:** {}\n", id_or_unknown(p.id)));
    out.push_str(&format!(
        "**Medical Record Number:** {}\n",
        or_default(&p.identifier, "Not assigned")
    ));
    out.push_str(&format!("**Birth Date:** {birth_date}\n"));
    out.push_str(&format!("**Gender:** {}\n", or_default(&p.gender, "Unknown")));
    out.push_str(&format!("**Status:** {status}\n"));
    if let Some(deceased) = &p.deceased_date {
        out.push_str(&format!("**Deceased Date:** {deceased}\n"));
    }

    out.push_str("\n**CONTACT INFORMATION**\n\n");
    out.push_str(&format!("**Phone:** {}\n", or_default(&p.phone, "Not provided")));
    out.push_str(&format!("**Email:** {}\n", or_default(&p.email, "Not provided")));

    out.push_str("\n**ADDRESS**\n\n");
    out.push_str(&format!(
        "**Address:** {}\n",
        or_default(&p.address_line, "Not provided")
    ));
    out.push_str(&format!("**City:** {}\n", or_default(&p.city, "Not provided")));
    out.push_str(&format!("**State:** {}\n", or_default(&p.state, "Not provided")));
    out.push_str(&format!(
        "**Postal Code:** {}\n",
        or_default(&p.postal_code, "Not provided")
    ));

    out.push_str("\n**DEMOGRAPHICS**\n\n");
    out.push_str(&format!(
        "**Marital Status:** {}\n",
        or_default(&p.marital_status, "Not specified")
    ));
    out.push_str(&format!(
        "**Language:** {}\n",
        or_default(&p.language, "Not specified")
    ));
    out.push_str(&format!("**Race:** {}\n", or_default(&p.race, "Not specified")));
    out.push_str(&format!(
        "**Ethnicity:** {}\n",
        or_default(&p.ethnicity, "Not specified")
    ));

    out.push_str("\n**ORGANIZATIONAL**\n\n");
    out.push_str(&format!(
        "**Managing Organization:** {}\n",
        or_default(&p.managing_organization_identifier, "Not assigned")
    ));

    out
}

/// Render a condition record.
pub fn format_condition(value: &JsonValue) -> String {
    if let Some(err) = records::embedded_error(value) {
        return format!("Error retrieving condition: {err}");
    }

    let c: Condition = records::decode(value);
    format!(
        "Condition: {} ({})\nStatus: {}\nOnset Date: {}",
        or_default(&c.display, "Unknown"),
        or_default(&c.code, "Unknown"),
        or_default(&c.clinical_status, "Unknown"),
        or_default(&c.onset_time, "Unknown"),
    )
}

/// Render an encounter record.
pub fn format_encounter(value: &JsonValue) -> String {
    if let Some(err) = records::embedded_error(value) {
        return format!("Error retrieving encounter: {err}");
    }

    let e: Encounter = records::decode(value);
    format!(
        "Encounter: {}\nStatus: {}\nStart Time: {}",
        or_default(&e.class_code, "Unknown"),
        or_default(&e.status, "Unknown"),
        or_default(&e.start_time, "Unknown"),
    )
}

/// Render an encounter record in full, one field per line.
pub fn format_encounter_details(value: &JsonValue) -> String {
    if let Some(err) = records::embedded_error(value) {
        return format!("Error retrieving encounter: {err}");
    }

    let e: Encounter = records::decode(value);
    let mut out = String::from("=== ENCOUNTER DETAILS ===\n");
    out.push_str(&format!("ID: {}\n", id_or_unknown(e.id)));
    out.push_str(&format!("Status: {}\n", or_default(&e.status, "Unknown")));
    out.push_str(&format!(
        "Class Code: {}\n",
        or_default(&e.class_code, "Unknown")
    ));
    out.push_str(&format!(
        "Start Time: {}\n",
        or_default(&e.start_time, "Unknown")
    ));
    out.push_str(&format!(
        "End Time: {}\n",
        or_default(&e.end_time, "Not specified")
    ));
    out.push_str(&format!("Patient ID: {}\n", id_or_unknown(e.patient_id)));
    out.push_str(&format!(
        "Practitioner ID: {}\n",
        e.practitioner_id
            .map_or_else(|| "Not specified".to_string(), |v| v.to_string())
    ));
    out.push_str(&format!(
        "Organization ID: {}\n",
        e.organization_id
            .map_or_else(|| "Not specified".to_string(), |v| v.to_string())
    ));
    out
}

/// Render an observation record.
pub fn format_observation(value: &JsonValue) -> String {
    if let Some(err) = records::embedded_error(value) {
        return format!("Error retrieving observation: {err}");
    }

    let o: Observation = records::decode(value);

    let rendered_value = match (o.value_quantity, &o.value_unit, &o.value_string) {
        (Some(q), Some(unit), _) => format!("{q} {unit}"),
        (Some(q), None, _) => q.to_string(),
        (None, _, Some(s)) => s.clone(),
        (None, _, None) => "Unknown".to_string(),
    };

    format!(
        "Observation: {} ({})\nStatus: {}\nValue: {}\nEffective: {}",
        or_default(&o.code_display, "Unknown"),
        or_default(&o.code, "Unknown"),
        or_default(&o.status, "Unknown"),
        rendered_value,
        or_default(&o.effective_time, "Unknown"),
    )
}

/// Render a numbered list, capping detail at the first ten items and
/// appending "... and N more <noun>." for the remainder.
pub fn format_list<F>(items: &[JsonValue], noun: &str, render: F) -> String
where
    F: Fn(&JsonValue) -> String,
{
    let mut out = String::new();
    for (i, item) in items.iter().take(LIST_DETAIL_CAP).enumerate() {
        out.push_str(&format!("{}. {}\n\n", i + 1, render(item)));
    }
    if items.len() > LIST_DETAIL_CAP {
        out.push_str(&format!(
            "... and {} more {noun}.",
            items.len() - LIST_DETAIL_CAP
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patient_round_trip_contains_every_field_value() {
        let record = json!({
            "id": 42,
            "identifier": "mrn-0042",
            "first_name": "Robert854",
            "last_name": "Botsford977",
            "birth_date": "1985-03-10",
            "gender": "male",
            "phone": "555-0142",
            "email": "robert@example.com",
            "address_line": "12 Elm Street",
            "city": "Springfield",
            "state": "MA",
            "postal_code": "01103",
            "marital_status": "married",
            "language": "en-US",
            "race": "white",
            "ethnicity": "non-hispanic",
            "deceased_date": "2024-02-01",
            "active": false,
            "managing_organization_identifier": "org-7"
        });

        let text = format_patient(&record);
        for expected in [
            "Robert854",
            "Botsford977",
            "42",
            "mrn-0042",
            "1985-03-10",
            "male",
            "555-0142",
            "robert@example.com",
            "12 Elm Street",
            "Springfield",
            "MA",
            "01103",
            "married",
            "en-US",
            "white",
            "non-hispanic",
            "2024-02-01",
            "Inactive",
            "org-7",
        ] {
            assert!(text.contains(expected), "missing {expected:?} in:\n{text}");
        }
    }

    #[test]
    fn missing_fields_render_placeholders_not_absent_lines() {
        let text = format_patient(&json!({"id": 3, "first_name": "Ana"}));

        assert!(text.contains("**Phone:** Not provided"));
        assert!(text.contains("**Medical Record Number:** Not assigned"));
        assert!(text.contains("**Marital Status:** Not specified"));
        assert!(text.contains("**Gender:** Unknown"));
        // No deceased line unless the field is present.
        assert!(!text.contains("Deceased Date"));
    }

    #[test]
    fn error_marked_record_renders_only_the_error_line() {
        let record = json!({"error": "boom", "first_name": "ShouldNotAppear"});
        let text = format_patient(&record);

        assert_eq!(text, "Error retrieving patient: boom");
    }

    #[test]
    fn list_caps_detail_at_ten() {
        let items: Vec<_> = (0..13)
            .map(|i| json!({"code": format!("C{i}"), "display": format!("Cond{i}")}))
            .collect();

        let text = format_list(&items, "conditions", format_condition);
        assert!(text.contains("Cond0"));
        assert!(text.contains("Cond9"));
        assert!(!text.contains("Cond10"));
        assert!(text.contains("... and 3 more conditions."));
    }

    #[test]
    fn observation_prefers_quantity_over_string() {
        let text = format_observation(&json!({
            "code": "8867-4",
            "code_display": "Heart rate",
            "status": "final",
            "value_quantity": 72.0,
            "value_unit": "/min"
        }));
        assert!(text.contains("Value: 72 /min"));
    }
}

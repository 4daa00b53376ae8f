//! Repair of malformed tool-call arguments.
//!
//! Language models sometimes mis-serialize keyword arguments: a value
//! arrives as `first_name="first_name=Robert854"`, wrapped in stray
//! quotes, or with several parameters comma-joined into one string.
//! The rules here are a best-effort adapter over that output — an
//! enumerable list, not open-ended parsing. A value no rule matches
//! passes through trimmed but otherwise unchanged; nothing here fails.

use std::collections::BTreeMap;

/// Clean a raw argument value for the parameter named `param`.
///
/// Repair rules are applied to a fixpoint, which makes normalization
/// idempotent: `normalize(param, normalize(param, x)) == normalize(param, x)`.
pub fn normalize(param: &str, raw: &str) -> String {
    let mut value = raw.trim().to_string();
    loop {
        let next = repair_step(param, &value);
        if next == value {
            return value;
        }
        // Each applied rule strictly shortens the string, so this terminates.
        value = next;
    }
}

/// Apply the first matching repair rule once.
///
/// Quote unwrapping runs before the marker strip: a value like
/// `"first_name=Robert854"` must shed its quotes first, otherwise the
/// marker strip would leave an unmatched trailing quote behind.
fn repair_step(param: &str, value: &str) -> String {
    // One matching layer of quoting.
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return value[1..value.len() - 1].trim().to_string();
        }
    }

    // The value embeds its own `key=` marker — strip through the `=`.
    let marker = format!("{param}=");
    if let Some(idx) = value.find(&marker) {
        return value[idx + marker.len()..].trim().to_string();
    }

    value.to_string()
}

/// Split comma-joined multi-parameter values back into their named slots.
///
/// Detects a value that carries another known parameter's `key=` marker
/// alongside a comma (e.g. `first_name="first_name=Robert854,
/// last_name=Botsford977"`), splits it on `,`, and re-routes each
/// `key=value` fragment to its matching parameter, overwriting whatever
/// was there. Fragments naming unknown keys stay in the original slot.
pub fn reroute(args: &mut BTreeMap<String, String>, known: &[&str]) {
    let keys: Vec<String> = args.keys().cloned().collect();

    for key in keys {
        let Some(value) = args.get(&key).cloned() else {
            continue;
        };

        let has_foreign_marker = known
            .iter()
            .any(|k| *k != key && value.contains(&format!("{k}=")));
        if !value.contains(',') || !has_foreign_marker {
            continue;
        }

        let mut leftover = Vec::new();
        for fragment in value.split(',') {
            let fragment = fragment.trim();
            let routed = fragment.split_once('=').and_then(|(k, v)| {
                let k = k.trim().trim_matches(|c| c == '"' || c == '\'');
                known.contains(&k).then(|| (k.to_string(), v.trim().to_string()))
            });

            match routed {
                Some((k, v)) => {
                    args.insert(k, v);
                }
                None => leftover.push(fragment),
            }
        }

        if !leftover.is_empty() {
            args.insert(key, leftover.join(","));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_for_clean_values() {
        assert_eq!(normalize("first_name", "Robert854"), "Robert854");
        assert_eq!(normalize("first_name", "  Robert854  "), "Robert854");
    }

    #[test]
    fn strips_embedded_key_marker() {
        assert_eq!(
            normalize("first_name", "first_name=Robert854"),
            "Robert854"
        );
        assert_eq!(
            normalize("patient_identifier", "patient_identifier=2"),
            "2"
        );
    }

    #[test]
    fn strips_one_quote_layer() {
        assert_eq!(normalize("last_name", "\"Koepp521\""), "Koepp521");
        assert_eq!(normalize("last_name", "'Koepp521'"), "Koepp521");
        // Mismatched quotes are left alone.
        assert_eq!(normalize("last_name", "\"Koepp521'"), "\"Koepp521'");
    }

    #[test]
    fn marker_and_quotes_combined() {
        assert_eq!(
            normalize("first_name", "first_name=\"Robert854\""),
            "Robert854"
        );
        assert_eq!(
            normalize("first_name", "\"first_name=Robert854\""),
            "Robert854"
        );
        assert_eq!(
            normalize("first_name", "'first_name=Robert854'"),
            "Robert854"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "Robert854",
            "first_name=Robert854",
            "\"Robert854\"",
            "''",
            "\"\"Robert854\"\"",
            "first_name=\"first_name=Robert854\"",
            "  spaced out  ",
            "=",
            "\"",
            "",
        ];
        for input in inputs {
            let once = normalize("first_name", input);
            let twice = normalize("first_name", &once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn reroute_splits_comma_joined_parameters() {
        let mut args = BTreeMap::from([(
            "first_name".to_string(),
            "first_name=Robert854, last_name=Botsford977".to_string(),
        )]);
        reroute(&mut args, &["first_name", "last_name"]);

        assert_eq!(args["first_name"], "Robert854");
        assert_eq!(args["last_name"], "Botsford977");
    }

    #[test]
    fn reroute_leaves_plain_commas_alone() {
        // A comma with no foreign key marker is ordinary data.
        let mut args = BTreeMap::from([(
            "first_name".to_string(),
            "Robert, Jr.".to_string(),
        )]);
        reroute(&mut args, &["first_name", "last_name"]);

        assert_eq!(args["first_name"], "Robert, Jr.");
        assert!(!args.contains_key("last_name"));
    }

    #[test]
    fn reroute_keeps_unknown_fragments_in_place() {
        let mut args = BTreeMap::from([(
            "first_name".to_string(),
            "Robert854, last_name=Botsford977, nickname=Bob".to_string(),
        )]);
        reroute(&mut args, &["first_name", "last_name"]);

        assert_eq!(args["last_name"], "Botsford977");
        assert_eq!(args["first_name"], "Robert854,nickname=Bob");
    }
}

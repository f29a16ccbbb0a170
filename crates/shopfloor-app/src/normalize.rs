// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;
use tracing::{debug, warn};

use crate::{NormalizationWarning, ResourceItem};

const ENVELOPE_KEYS: [&str; 2] = ["results", "data"];

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub items: Vec<ResourceItem>,
    pub warning: Option<NormalizationWarning>,
}

/// Flattens a collection response into records. Accepts a bare array, then
/// `{results: [...]}`, then `{data: [...]}`; anything else yields no records
/// and a warning.
pub fn normalize(raw: &Value) -> Normalized {
    let records = match raw {
        Value::Array(values) => Some(values),
        Value::Object(object) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array)),
        _ => None,
    };

    let Some(records) = records else {
        let warning = NormalizationWarning {
            shape: shape_name(raw),
        };
        warn!(%warning, "normalized response to an empty list");
        return Normalized {
            items: Vec::new(),
            warning: Some(warning),
        };
    };

    let items = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match record {
            Value::Object(item) => Some(item.clone()),
            other => {
                debug!(index, shape = shape_name(other), "dropping non-object record");
                None
            }
        })
        .collect();

    Normalized {
        items,
        warning: None,
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use serde_json::{Value, json};

    fn names(raw: &Value) -> Vec<String> {
        normalize(raw)
            .items
            .iter()
            .map(|item| item["name"].as_str().unwrap_or_default().to_owned())
            .collect()
    }

    #[test]
    fn all_supported_envelopes_yield_the_same_records() {
        let records = json!([{"id": 1, "name": "Lathe"}, {"id": 2, "name": "Mill"}]);
        let bare = normalize(&records);
        let results = normalize(&json!({"count": 2, "results": records}));
        let data = normalize(&json!({"data": records}));

        assert_eq!(bare.items.len(), 2);
        assert_eq!(bare, results);
        assert_eq!(bare, data);
        assert!(bare.warning.is_none());
    }

    #[test]
    fn results_take_precedence_over_data() {
        let raw = json!({"results": [{"name": "from results"}], "data": [{"name": "from data"}]});
        assert_eq!(names(&raw), vec!["from results"]);
    }

    #[test]
    fn non_array_envelope_fields_are_skipped() {
        let raw = json!({"results": {"name": "nope"}, "data": [{"name": "Mill"}]});
        assert_eq!(names(&raw), vec!["Mill"]);
    }

    #[test]
    fn unrecognized_shapes_warn_and_yield_nothing() {
        for raw in [json!({"foo": 1}), json!(null), json!("oops"), json!(3)] {
            let normalized = normalize(&raw);
            assert!(normalized.items.is_empty());
            assert!(normalized.warning.is_some(), "expected warning for {raw}");
        }
    }

    #[test]
    fn non_object_records_are_dropped() {
        let raw = json!([{"name": "Lathe"}, 5, "x", null, {"name": "Mill"}]);
        assert_eq!(names(&raw), vec!["Lathe", "Mill"]);
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Number, Value};

use crate::{FieldKind, FieldSpec, ListError, ResourceItem};

/// Checks every required field. `0` and `false` count as present; null,
/// missing and blank strings do not.
pub fn validate_required(fields: &[FieldSpec], candidate: &ResourceItem) -> Result<(), ListError> {
    let labels: Vec<String> = fields
        .iter()
        .filter(|field| field.required && !has_value(candidate.get(&field.key)))
        .map(|field| field.label.clone())
        .collect();
    if labels.is_empty() {
        Ok(())
    } else {
        Err(ListError::Validation { labels })
    }
}

fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(_) => true,
    }
}

/// Turns numeric strings in `Number` fields into JSON numbers. Blank or
/// unparsable text is left for the server to reject.
pub fn coerce_numbers(fields: &[FieldSpec], candidate: &mut ResourceItem) {
    for field in fields {
        if field.kind != FieldKind::Number {
            continue;
        }
        let Some(Value::String(text)) = candidate.get(&field.key) else {
            continue;
        };
        if let Some(number) = parse_number(text) {
            candidate.insert(field.key.clone(), Value::Number(number));
        }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(whole) = trimmed.parse::<i64>() {
        return Some(Number::from(whole));
    }
    let parsed: f64 = trimmed.parse().ok()?;
    Number::from_f64(parsed)
}

/// Validates then coerces a candidate into the payload that gets sent.
pub fn prepare_payload(
    fields: &[FieldSpec],
    candidate: &ResourceItem,
) -> Result<ResourceItem, ListError> {
    validate_required(fields, candidate)?;
    let mut payload = candidate.clone();
    coerce_numbers(fields, &mut payload);
    Ok(payload)
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

use crate::{ResourceItem, SearchState, SortDirection, SortState};

/// Walks `path` segment by segment through nested objects. Numeric segments
/// index into arrays.
pub fn lookup<'a>(item: &'a ResourceItem, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = item.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(object) => object.get(segment)?,
            Value::Array(values) => values.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Display text at `path`, empty when any segment is missing.
pub fn display_at(item: &ResourceItem, path: &str) -> String {
    display_value(lookup(item, path))
}

/// Keeps items where any search field contains the term, ignoring case. An
/// empty term hands back the input untouched.
pub fn search<'a>(
    items: &'a [ResourceItem],
    state: &SearchState,
    search_fields: &[String],
) -> Cow<'a, [ResourceItem]> {
    if state.is_identity() {
        return Cow::Borrowed(items);
    }
    let term = state.normalized();
    Cow::Owned(
        items
            .iter()
            .filter(|item| matches_term(item, &term, search_fields))
            .cloned()
            .collect(),
    )
}

fn matches_term(item: &ResourceItem, term: &str, search_fields: &[String]) -> bool {
    if search_fields.is_empty() {
        return item
            .values()
            .any(|value| display_value(Some(value)).to_lowercase().contains(term));
    }
    search_fields
        .iter()
        .any(|field| display_at(item, field).to_lowercase().contains(term))
}

/// Sort keys rank by kind first (empty, bool, number, text) so mixed
/// columns still form a total order. Numeric strings such as decimal
/// fields rank as numbers.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SortKey {
    fn resolve(item: &ResourceItem, path: &str) -> Self {
        match lookup(item, path) {
            None | Some(Value::Null) => Self::Empty,
            Some(Value::Number(number)) => number
                .as_f64()
                .map_or_else(|| Self::Text(number.to_string()), Self::Number),
            Some(Value::Bool(flag)) => Self::Bool(*flag),
            Some(Value::String(text)) => Self::from_text(text),
            other => Self::Text(display_value(other)),
        }
    }

    fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(text.to_owned()),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }

    fn cmp_key(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            (Self::Bool(left), Self::Bool(right)) => left.cmp(right),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Stable sort on a copy. Descending reverses the comparator, so ties keep
/// their incoming order either way.
pub fn sort(items: &[ResourceItem], state: &SortState) -> Vec<ResourceItem> {
    let mut keyed: Vec<(SortKey, &ResourceItem)> = items
        .iter()
        .map(|item| (SortKey::resolve(item, &state.key), item))
        .collect();
    keyed.sort_by(|(left, _), (right, _)| match state.direction {
        SortDirection::Asc => left.cmp_key(right),
        SortDirection::Desc => right.cmp_key(left),
    });
    keyed.into_iter().map(|(_, item)| item.clone()).collect()
}

/// Search first, then sort the surviving subset.
pub fn derive(
    items: &[ResourceItem],
    search_state: &SearchState,
    search_fields: &[String],
    sort_state: &SortState,
) -> Vec<ResourceItem> {
    let filtered = search(items, search_state, search_fields);
    sort(&filtered, sort_state)
}

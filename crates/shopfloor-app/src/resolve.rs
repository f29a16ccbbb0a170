// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{ColumnSpec, FieldKind, FieldSpec, ResourceItem, SelectOption, StaticConfig, ViewConfig};

pub const DEFAULT_ENTITY_NAME: &str = "Item";
pub const DEFAULT_PAGE_TITLE: &str = "Items";
pub const DEFAULT_SORT_KEY: &str = "id";

/// Option lists for the foreign-key-like fields of one screen. A binding is
/// registered before its options arrive; until then it resolves to an empty
/// list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSets {
    sets: BTreeMap<String, Vec<SelectOption>>,
}

impl OptionSets {
    pub fn register(&mut self, key: &str) {
        self.sets.entry(key.to_owned()).or_default();
    }

    pub fn set(&mut self, key: &str, options: Vec<SelectOption>) {
        self.sets.insert(key.to_owned(), options);
    }

    pub fn get(&self, key: &str) -> Option<&[SelectOption]> {
        self.sets.get(key).map(Vec::as_slice)
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.sets.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

/// Merges a partial config with defaults and the current option sets.
pub fn resolve(config: &StaticConfig, options: &OptionSets) -> ViewConfig {
    let default_item = config.default_item.clone().unwrap_or_default();

    let columns = config.columns.clone().unwrap_or_else(|| {
        default_item
            .keys()
            .map(|key| ColumnSpec::new(key, &capitalize(key)))
            .collect()
    });

    let dialog_fields = config
        .dialog_fields
        .clone()
        .unwrap_or_else(|| synthesize_fields(&default_item))
        .into_iter()
        .map(|field| inject_options(field, options))
        .collect();

    ViewConfig {
        entity_name: config
            .entity_name
            .clone()
            .unwrap_or_else(|| DEFAULT_ENTITY_NAME.to_owned()),
        page_title: config
            .page_title
            .clone()
            .unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_owned()),
        default_sort_key: config
            .default_sort_key
            .clone()
            .unwrap_or_else(|| DEFAULT_SORT_KEY.to_owned()),
        default_item,
        search_fields: config.search_fields.clone().unwrap_or_default(),
        dialog_fields,
        columns,
        card_view: config.card_view,
    }
}

fn synthesize_fields(default_item: &ResourceItem) -> Vec<FieldSpec> {
    default_item
        .keys()
        .map(|key| FieldSpec::text(key, &capitalize(key)))
        .collect()
}

fn inject_options(mut field: FieldSpec, options: &OptionSets) -> FieldSpec {
    if let Some(resolved) = options.get(&field.key) {
        field.kind = FieldKind::Select {
            options: resolved.to_vec(),
        };
    }
    field
}

pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

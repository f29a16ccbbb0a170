// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::ResourceId;

/// An open record as returned by the backend. Key order is preserved.
pub type ResourceItem = Map<String, Value>;

/// Pure projection of an item into a table cell.
pub type CellRenderer = fn(&ResourceItem, &ViewConfig) -> String;

/// Pure projection of an item into a card block.
pub type CardRenderer = fn(&ResourceItem, &ViewConfig) -> String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Select { options: Vec<SelectOption> },
    Multiline,
}

impl FieldKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select { .. } => "select",
            Self::Multiline => "multiline",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldSpec {
    fn with_kind(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            required: false,
            kind,
        }
    }

    pub fn text(key: &str, label: &str) -> Self {
        Self::with_kind(key, label, FieldKind::Text)
    }

    pub fn number(key: &str, label: &str) -> Self {
        Self::with_kind(key, label, FieldKind::Number)
    }

    pub fn multiline(key: &str, label: &str) -> Self {
        Self::with_kind(key, label, FieldKind::Multiline)
    }

    pub fn select(key: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Self::with_kind(key, label, FieldKind::Select { options })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn options(&self) -> Option<&[SelectOption]> {
        match &self.kind {
            FieldKind::Select { options } => Some(options),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub render: Option<CellRenderer>,
}

impl ColumnSpec {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            render: None,
        }
    }

    pub fn rendered(key: &str, label: &str, render: CellRenderer) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            render: Some(render),
        }
    }
}

/// Partial, entity-specific configuration. Anything left as `None` is filled
/// in by [`crate::resolve`].
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    pub entity_name: Option<String>,
    pub page_title: Option<String>,
    pub default_sort_key: Option<String>,
    pub default_item: Option<ResourceItem>,
    pub search_fields: Option<Vec<String>>,
    pub dialog_fields: Option<Vec<FieldSpec>>,
    pub columns: Option<Vec<ColumnSpec>>,
    pub card_view: Option<CardRenderer>,
}

/// Fully merged configuration that drives one list screen.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub entity_name: String,
    pub page_title: String,
    pub default_sort_key: String,
    pub default_item: ResourceItem,
    pub search_fields: Vec<String>,
    pub dialog_fields: Vec<FieldSpec>,
    pub columns: Vec<ColumnSpec>,
    pub card_view: Option<CardRenderer>,
}

impl ViewConfig {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.dialog_fields.iter().find(|field| field.key == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            direction: SortDirection::Asc,
        }
    }

    /// Same key flips the direction; a new key starts ascending.
    pub fn toggle(&mut self, key: &str) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key.to_owned();
            self.direction = SortDirection::Asc;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub term: String,
}

impl SearchState {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_owned(),
        }
    }

    pub fn normalized(&self) -> String {
        self.term.trim().to_lowercase()
    }

    pub fn is_identity(&self) -> bool {
        self.term.trim().is_empty()
    }
}

/// Which persistence call a dialog will make, fixed when the dialog opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create,
    Update { id: ResourceId },
}

impl Intent {
    pub fn for_item(item: &ResourceItem) -> Self {
        match ResourceId::of(item) {
            Some(id) => Self::Update { id },
            None => Self::Create,
        }
    }
}

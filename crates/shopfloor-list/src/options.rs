// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use shopfloor_app::{
    ResourceId, ResourceItem, ResourceService, SelectOption, display_at, lookup, normalize,
};
use tracing::{debug, warn};

pub const DEFAULT_VALUE_PATH: &str = "id";
pub const DEFAULT_LABEL_PATH: &str = "name";

/// Where a select field gets its choices: another collection, projected
/// through a value path and a label path.
pub struct OptionBinding {
    pub field_key: String,
    pub value_path: String,
    pub label_path: String,
    source: Box<dyn ResourceService + Send + Sync>,
}

impl OptionBinding {
    pub fn new(field_key: &str, source: impl ResourceService + Send + Sync + 'static) -> Self {
        Self {
            field_key: field_key.to_owned(),
            value_path: DEFAULT_VALUE_PATH.to_owned(),
            label_path: DEFAULT_LABEL_PATH.to_owned(),
            source: Box::new(source),
        }
    }

    pub fn with_paths(mut self, value_path: &str, label_path: &str) -> Self {
        self.value_path = value_path.to_owned();
        self.label_path = label_path.to_owned();
        self
    }

    /// Fetches and projects the source collection. A failed fetch degrades to
    /// an empty list so the owning screen still renders.
    pub fn load(&self) -> Vec<SelectOption> {
        let raw = match self.source.get_all() {
            Ok(raw) => raw,
            Err(error) => {
                warn!(field = %self.field_key, error = %error, "failed to load options");
                return Vec::new();
            }
        };
        let options = project_options(&normalize(&raw).items, &self.value_path, &self.label_path);
        debug!(field = %self.field_key, count = options.len(), "loaded options");
        options
    }
}

impl std::fmt::Debug for OptionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionBinding")
            .field("field_key", &self.field_key)
            .field("value_path", &self.value_path)
            .field("label_path", &self.label_path)
            .finish_non_exhaustive()
    }
}

/// Records without a usable value are skipped; a blank label falls back to
/// the value's display text.
pub fn project_options(
    records: &[ResourceItem],
    value_path: &str,
    label_path: &str,
) -> Vec<SelectOption> {
    records
        .iter()
        .filter_map(|record| {
            let value = lookup(record, value_path)?;
            let id = ResourceId::from_value(value)?;
            let label = display_at(record, label_path);
            let label = if label.trim().is_empty() {
                id.to_string()
            } else {
                label
            };
            Some(SelectOption::new(value.clone(), label))
        })
        .collect()
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use serde_json::Value;
use shopfloor_app::{EntityKind, FieldKind, FieldSpec, ResourceId, ResourceService, display_value};
use shopfloor_client::{Client, RestService};
use shopfloor_list::{FieldEditor, ListController, OptionBinding};
use std::collections::BTreeSet;
use std::io::Write;
use tracing::{info, warn};

/// What one invocation does to the selected list after mounting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Create(Vec<(String, String)>),
    Edit(ResourceId, Vec<(String, String)>),
    Delete(ResourceId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub search: Option<String>,
    pub sorts: Vec<String>,
    pub cards: bool,
    pub action: Action,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            search: None,
            sorts: Vec::new(),
            cards: false,
            action: Action::List,
        }
    }
}

/// Builds the REST-backed controller for `kind`, with option bindings
/// pointing at their source collections.
pub fn rest_controller(client: &Client, kind: EntityKind) -> Result<ListController<RestService>> {
    let service = client.resource(kind.endpoint())?;
    let mut controller = ListController::new(service, kind.static_config());
    for binding in kind.bindings() {
        let source = client.resource(binding.source.endpoint())?;
        controller = controller.with_binding(OptionBinding::new(binding.field_key, source));
    }
    Ok(controller)
}

/// Mounts the list, applies the plan, prints the result, and unmounts.
pub fn execute<S, W>(controller: &mut ListController<S>, plan: &Plan, out: &mut W) -> Result<()>
where
    S: ResourceService + Sync,
    W: Write,
{
    controller.mount()?;
    if let Some(term) = &plan.search {
        controller.set_search(term);
    }
    for key in &plan.sorts {
        controller.toggle_sort(key);
    }

    let entity = controller.view_config().entity_name;
    match &plan.action {
        Action::List => {}
        Action::Create(assignments) => {
            controller.open_create()?;
            fill_dialog(controller, assignments)?;
            let saved = controller.submit()?;
            writeln!(out, "Created {entity} {}", saved_id(&saved))?;
        }
        Action::Edit(id, assignments) => {
            controller.open_edit(id)?;
            fill_dialog(controller, assignments)?;
            controller.submit()?;
            writeln!(out, "Updated {entity} {id}")?;
        }
        Action::Delete(id) => {
            controller.delete(id)?;
            writeln!(out, "Deleted {entity} {id}")?;
        }
    }

    render(controller, plan.cards, out)?;
    controller.unmount();
    Ok(())
}

/// Fetches the list once to prove the API answers with this config.
pub fn check<S: ResourceService + Sync>(controller: &mut ListController<S>) -> Result<usize> {
    controller.mount()?;
    let count = controller.items().len();
    info!(count, "API check passed");
    controller.unmount();
    Ok(count)
}

fn fill_dialog<S: ResourceService>(
    controller: &mut ListController<S>,
    assignments: &[(String, String)],
) -> Result<()> {
    let mut editor = AssignmentEditor::new(assignments);
    controller.edit_with(&mut editor)?;
    let unused = editor.unused();
    if !unused.is_empty() {
        let fields: Vec<String> = controller
            .view_config()
            .dialog_fields
            .iter()
            .map(|field| field.key.clone())
            .collect();
        controller.cancel_dialog()?;
        bail!(
            "unknown field(s) {}; expected one of: {}",
            unused.join(", "),
            fields.join(", ")
        );
    }
    Ok(())
}

fn render<S: ResourceService, W: Write>(
    controller: &ListController<S>,
    cards: bool,
    out: &mut W,
) -> Result<()> {
    if cards {
        match controller.cards()? {
            Some(blocks) => {
                writeln!(out, "{}", controller.view_config().page_title)?;
                for block in blocks {
                    writeln!(out, "\n{block}")?;
                }
                return Ok(());
            }
            None => warn!("this list has no card view; printing a table"),
        }
    }
    let table = controller.table()?;
    write!(out, "{}", table.render_plain()).context("write table")?;
    Ok(())
}

fn saved_id(saved: &shopfloor_app::ResourceItem) -> String {
    match ResourceId::of(saved) {
        Some(id) => id.to_string(),
        None => "(no id returned)".to_owned(),
    }
}

/// Applies `--set key=value` pairs to the dialog. Select fields accept an
/// option label or value; everything else is passed through as text and
/// left to the submit-time coercion.
#[derive(Debug)]
pub struct AssignmentEditor<'a> {
    assignments: &'a [(String, String)],
    used: BTreeSet<&'a str>,
}

impl<'a> AssignmentEditor<'a> {
    pub fn new(assignments: &'a [(String, String)]) -> Self {
        Self {
            assignments,
            used: BTreeSet::new(),
        }
    }

    pub fn unused(&self) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|(key, _)| !self.used.contains(key.as_str()))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<'a> FieldEditor for AssignmentEditor<'a> {
    fn edit(&mut self, field: &FieldSpec, _current: Option<&Value>) -> Option<Value> {
        let assignments = self.assignments;
        let (key, raw) = assignments
            .iter()
            .rev()
            .find(|(key, _)| *key == field.key)?;
        self.used.insert(key.as_str());
        Some(match &field.kind {
            FieldKind::Select { options } => options
                .iter()
                .find(|option| {
                    option.label.eq_ignore_ascii_case(raw.as_str())
                        || display_value(Some(&option.value)) == raw.as_str()
                })
                .map(|option| option.value.clone())
                .unwrap_or_else(|| Value::String(raw.clone())),
            FieldKind::Text | FieldKind::Number | FieldKind::Multiline => {
                Value::String(raw.clone())
            }
        })
    }
}

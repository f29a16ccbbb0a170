// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod options;
pub mod projection;
pub mod reconcile;

pub use options::{OptionBinding, project_options};
pub use projection::{TableProjection, TableRow, render_cards, render_cell};

use serde_json::Value;
use shopfloor_app::{
    DialogCommand, DialogEvent, DialogState, FieldSpec, ListError, OptionSets, RejectReason,
    ResourceId, ResourceItem, ResourceService, SearchState, SelectOption, ServiceError,
    SortState, StaticConfig, ViewConfig, derive, normalize, resolve,
};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info, warn};

/// Supplies dialog input. Returning `None` leaves the field as it is.
pub trait FieldEditor {
    fn edit(&mut self, field: &FieldSpec, current: Option<&Value>) -> Option<Value>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(ListError),
}

#[derive(Debug, Clone)]
pub enum LoadPayload {
    Items(Result<Value, ServiceError>),
    Options {
        field_key: String,
        options: Vec<SelectOption>,
    },
}

/// Result of one fetch, tagged with the load generation that asked for it.
#[derive(Debug, Clone)]
pub struct LoadEvent {
    pub generation: u64,
    pub payload: LoadPayload,
}

/// Generic list screen over one entity collection: loads it, derives the
/// searched and sorted view, and drives the create/edit dialog.
#[derive(Debug)]
pub struct ListController<S> {
    service: S,
    config: StaticConfig,
    bindings: Vec<OptionBinding>,
    options: OptionSets,
    items: Vec<ResourceItem>,
    search: SearchState,
    sort: SortState,
    dialog: DialogState,
    load: LoadState,
    generation: u64,
}

impl<S: ResourceService> ListController<S> {
    pub fn new(service: S, config: StaticConfig) -> Self {
        let options = OptionSets::default();
        let sort = SortState::ascending(&resolve(&config, &options).default_sort_key);
        Self {
            service,
            config,
            bindings: Vec::new(),
            options,
            items: Vec::new(),
            search: SearchState::default(),
            sort,
            dialog: DialogState::default(),
            load: LoadState::Idle,
            generation: 0,
        }
    }

    /// Registers a select-option source. Its field resolves to an empty
    /// select until the first load delivers options.
    pub fn with_binding(mut self, binding: OptionBinding) -> Self {
        self.options.register(&binding.field_key);
        self.bindings.push(binding);
        self
    }

    pub fn view_config(&self) -> ViewConfig {
        resolve(&self.config, &self.options)
    }

    pub fn items(&self) -> &[ResourceItem] {
        &self.items
    }

    pub fn options(&self) -> &OptionSets {
        &self.options
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn dialog(&self) -> &DialogState {
        &self.dialog
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Starts a new load; events from any earlier generation become stale.
    pub fn begin_load(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.load = LoadState::Loading;
        self.generation
    }

    /// Applies a fetch result. Returns false for stale events, which are
    /// dropped without touching state.
    pub fn apply(&mut self, event: LoadEvent) -> bool {
        if event.generation != self.generation || self.load == LoadState::Idle {
            debug!(
                event_generation = event.generation,
                current = self.generation,
                "dropping stale load event"
            );
            return false;
        }
        match event.payload {
            LoadPayload::Items(Ok(raw)) => {
                let normalized = normalize(&raw);
                self.items = normalized.items;
                self.load = LoadState::Ready;
                debug!(count = self.items.len(), "list loaded");
            }
            LoadPayload::Items(Err(error)) => {
                let entity = self.view_config().entity_name;
                warn!(entity = %entity, error = %error, "failed to fetch list");
                self.items.clear();
                self.load = LoadState::Failed(ListError::Fetch {
                    entity,
                    message: error.to_string(),
                });
            }
            LoadPayload::Options { field_key, options } => {
                self.options.set(&field_key, options);
            }
        }
        true
    }

    /// Refetches the list alone; option sets are kept.
    pub fn refresh(&mut self) -> Result<(), ListError> {
        let generation = self.begin_load();
        let result = self.service.get_all();
        self.apply(LoadEvent {
            generation,
            payload: LoadPayload::Items(result),
        });
        self.load_result()
    }

    pub fn reload_options(&mut self) {
        for binding in &self.bindings {
            self.options.set(&binding.field_key, binding.load());
        }
    }

    /// Leaves the screen. Results still in flight are ignored once they land.
    pub fn unmount(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.load = LoadState::Idle;
        self.items.clear();
        self.dialog = DialogState::default();
        info!(entity = %self.view_config().entity_name, "list unmounted");
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = SearchState::new(term);
    }

    pub fn toggle_sort(&mut self, key: &str) {
        self.sort.toggle(key);
    }

    /// Searched then sorted copy of the loaded items.
    pub fn visible_items(&self) -> Vec<ResourceItem> {
        let view = self.view_config();
        derive(&self.items, &self.search, &view.search_fields, &self.sort)
    }

    pub fn table(&self) -> Result<TableProjection, ListError> {
        self.load_result()?;
        let view = self.view_config();
        let visible = derive(&self.items, &self.search, &view.search_fields, &self.sort);
        Ok(TableProjection::build(&view, &visible, &self.sort))
    }

    /// Card blocks when the view defines a card renderer.
    pub fn cards(&self) -> Result<Option<Vec<String>>, ListError> {
        self.load_result()?;
        let view = self.view_config();
        let visible = derive(&self.items, &self.search, &view.search_fields, &self.sort);
        Ok(render_cards(&view, &visible))
    }

    pub fn open_create(&mut self) -> Result<(), ListError> {
        let seed = self.view_config().default_item;
        let events = self.dialog.dispatch(DialogCommand::OpenCreate(seed));
        rejection(&events)
    }

    pub fn open_edit(&mut self, id: &ResourceId) -> Result<(), ListError> {
        let item = self
            .items
            .iter()
            .find(|item| ResourceId::of(item).as_ref() == Some(id))
            .cloned()
            .ok_or_else(|| ListError::UnknownItem(id.clone()))?;
        let events = self.dialog.dispatch(DialogCommand::OpenEdit(item));
        rejection(&events)
    }

    pub fn change_field(&mut self, key: &str, value: Value) -> Result<(), ListError> {
        let events = self.dialog.dispatch(DialogCommand::Change {
            key: key.to_owned(),
            value,
        });
        rejection(&events)
    }

    /// Walks every dialog field through `editor`; returns how many changed.
    pub fn edit_with(&mut self, editor: &mut dyn FieldEditor) -> Result<usize, ListError> {
        if !self.dialog.is_open() {
            return Err(ListError::DialogClosed);
        }
        let mut changed = 0;
        for field in self.view_config().dialog_fields {
            let current = self.dialog.candidate.get(&field.key);
            if let Some(value) = editor.edit(&field, current) {
                self.change_field(&field.key, value)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn cancel_dialog(&mut self) -> Result<(), ListError> {
        let events = self.dialog.dispatch(DialogCommand::Cancel);
        rejection(&events)
    }

    /// Saves the open dialog. On success the dialog closes and the returned
    /// record is already spliced into the list; on failure the dialog stays
    /// open with its candidate and error.
    pub fn submit(&mut self) -> Result<ResourceItem, ListError> {
        let events = self.dialog.dispatch(DialogCommand::BeginSave);
        rejection(&events)?;

        let view = self.view_config();
        let intent = self.dialog.intent.clone();
        let candidate = self.dialog.candidate.clone();
        match reconcile::save(&self.service, &view, &intent, &candidate, &mut self.items) {
            Ok(saved) => {
                self.dialog.dispatch(DialogCommand::SaveSucceeded);
                info!(entity = %view.entity_name, "record saved");
                Ok(saved)
            }
            Err(error) => {
                self.dialog
                    .dispatch(DialogCommand::SaveFailed(error.to_string()));
                Err(error)
            }
        }
    }

    pub fn delete(&mut self, id: &ResourceId) -> Result<(), ListError> {
        if !self
            .items
            .iter()
            .any(|item| ResourceId::of(item).as_ref() == Some(id))
        {
            return Err(ListError::UnknownItem(id.clone()));
        }
        let entity_name = self.view_config().entity_name;
        reconcile::delete(&self.service, &entity_name, id, &mut self.items)?;
        info!(entity = %entity_name, %id, "record deleted");
        Ok(())
    }

    fn load_result(&self) -> Result<(), ListError> {
        match &self.load {
            LoadState::Ready => Ok(()),
            LoadState::Failed(error) => Err(error.clone()),
            LoadState::Idle | LoadState::Loading => Err(ListError::NotReady),
        }
    }
}

impl<S: ResourceService + Sync> ListController<S> {
    /// Loads the list and every option source concurrently. A failed list
    /// fetch is returned; failed option sources only log.
    pub fn mount(&mut self) -> Result<(), ListError> {
        let generation = self.begin_load();
        info!(entity = %self.view_config().entity_name, generation, "mounting list");
        for event in self.fetch_all(generation) {
            self.apply(event);
        }
        self.load_result()
    }

    fn fetch_all(&self, generation: u64) -> Vec<LoadEvent> {
        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            for binding in &self.bindings {
                let tx = tx.clone();
                scope.spawn(move || {
                    let _ = tx.send(LoadEvent {
                        generation,
                        payload: LoadPayload::Options {
                            field_key: binding.field_key.clone(),
                            options: binding.load(),
                        },
                    });
                });
            }
            let service = &self.service;
            let tx = tx.clone();
            scope.spawn(move || {
                let _ = tx.send(LoadEvent {
                    generation,
                    payload: LoadPayload::Items(service.get_all()),
                });
            });
        });
        drop(tx);
        rx.into_iter().collect()
    }
}

fn rejection(events: &[DialogEvent]) -> Result<(), ListError> {
    for event in events {
        if let DialogEvent::Rejected(reason) = event {
            return Err(match reason {
                RejectReason::NotOpen => ListError::DialogClosed,
                RejectReason::SaveInProgress => ListError::SaveInProgress,
            });
        }
    }
    Ok(())
}

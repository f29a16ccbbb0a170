// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;

use crate::{Intent, ResourceItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Closed,
    Open,
    Editing,
    Saving,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogState {
    pub phase: DialogPhase,
    pub intent: Intent,
    pub candidate: ResourceItem,
    pub error: Option<String>,
}

impl Default for DialogState {
    fn default() -> Self {
        Self {
            phase: DialogPhase::Closed,
            intent: Intent::Create,
            candidate: ResourceItem::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogCommand {
    OpenCreate(ResourceItem),
    OpenEdit(ResourceItem),
    Change { key: String, value: Value },
    BeginSave,
    SaveSucceeded,
    SaveFailed(String),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotOpen,
    SaveInProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogEvent {
    Opened(Intent),
    FieldChanged(String),
    SaveStarted,
    Rejected(RejectReason),
    Saved,
    SaveFailed(String),
    Closed,
}

impl DialogState {
    pub const fn is_open(&self) -> bool {
        !matches!(self.phase, DialogPhase::Closed)
    }

    pub fn title(&self, entity_name: &str) -> String {
        match self.intent {
            Intent::Create => format!("Add {entity_name}"),
            Intent::Update { .. } => format!("Edit {entity_name}"),
        }
    }

    pub fn dispatch(&mut self, command: DialogCommand) -> Vec<DialogEvent> {
        match command {
            DialogCommand::OpenCreate(default_item) => self.open(Intent::Create, default_item),
            DialogCommand::OpenEdit(item) => self.open(Intent::for_item(&item), item),
            DialogCommand::Change { key, value } => match self.phase {
                DialogPhase::Open | DialogPhase::Editing => {
                    self.candidate.insert(key.clone(), value);
                    self.phase = DialogPhase::Editing;
                    vec![DialogEvent::FieldChanged(key)]
                }
                DialogPhase::Saving => vec![DialogEvent::Rejected(RejectReason::SaveInProgress)],
                DialogPhase::Closed => vec![DialogEvent::Rejected(RejectReason::NotOpen)],
            },
            DialogCommand::BeginSave => match self.phase {
                DialogPhase::Open | DialogPhase::Editing => {
                    self.phase = DialogPhase::Saving;
                    self.error = None;
                    vec![DialogEvent::SaveStarted]
                }
                DialogPhase::Saving => vec![DialogEvent::Rejected(RejectReason::SaveInProgress)],
                DialogPhase::Closed => vec![DialogEvent::Rejected(RejectReason::NotOpen)],
            },
            DialogCommand::SaveSucceeded => {
                if self.phase != DialogPhase::Saving {
                    return Vec::new();
                }
                *self = Self::default();
                vec![DialogEvent::Saved, DialogEvent::Closed]
            }
            DialogCommand::SaveFailed(message) => {
                if self.phase != DialogPhase::Saving {
                    return Vec::new();
                }
                self.phase = DialogPhase::Editing;
                self.error = Some(message.clone());
                vec![DialogEvent::SaveFailed(message)]
            }
            DialogCommand::Cancel => match self.phase {
                DialogPhase::Closed => Vec::new(),
                DialogPhase::Saving => vec![DialogEvent::Rejected(RejectReason::SaveInProgress)],
                DialogPhase::Open | DialogPhase::Editing => {
                    *self = Self::default();
                    vec![DialogEvent::Closed]
                }
            },
        }
    }

    fn open(&mut self, intent: Intent, candidate: ResourceItem) -> Vec<DialogEvent> {
        if self.phase == DialogPhase::Saving {
            return vec![DialogEvent::Rejected(RejectReason::SaveInProgress)];
        }
        self.phase = DialogPhase::Open;
        self.intent = intent.clone();
        self.candidate = candidate;
        self.error = None;
        vec![DialogEvent::Opened(intent)]
    }
}

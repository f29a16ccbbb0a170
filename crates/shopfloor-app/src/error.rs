// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;
use thiserror::Error;

use crate::ids::ResourceId;

/// Failure reported by a resource service implementation.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned {status}")]
    Status { status: u16, body: Value },
}

impl ServiceError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::Status { status, .. } => Some(*status),
        }
    }

    /// Best human-readable message carried by an error response body.
    pub fn body_message(&self) -> Option<String> {
        match self {
            Self::Transport(message) => Some(message.clone()),
            Self::Status { body, .. } => message_from_body(body),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("Failed to fetch {entity}: {message}")]
    Fetch { entity: String, message: String },

    #[error("required fields are missing: {}", .labels.join(", "))]
    Validation { labels: Vec<String> },

    #[error("{message}")]
    Server {
        status: Option<u16>,
        message: String,
    },

    #[error("no dialog is open -- open an item for create or edit first")]
    DialogClosed,

    #[error("a save is already in progress for this dialog")]
    SaveInProgress,

    #[error("no item with id {0} in the current list")]
    UnknownItem(ResourceId),

    #[error("list is not loaded -- mount the screen first")]
    NotReady,
}

/// The server answered with an envelope the normalizer does not recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationWarning {
    pub shape: &'static str,
}

impl std::fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unrecognized response envelope ({}); expected an array, {{results: [...]}} or {{data: [...]}}",
            self.shape
        )
    }
}

fn message_from_body(body: &Value) -> Option<String> {
    if let Value::String(text) = body {
        let trimmed = text.trim();
        if !trimmed.is_empty() && trimmed.len() < 200 && !trimmed.starts_with('<') {
            return Some(trimmed.to_owned());
        }
        return None;
    }

    let object = body.as_object()?;
    for key in ["detail", "message"] {
        if let Some(text) = object.get(key).and_then(first_text) {
            return Some(text);
        }
    }
    if let Some(text) = object.get("non_field_errors").and_then(first_text) {
        return Some(text);
    }
    object
        .iter()
        .find_map(|(field, value)| first_text(value).map(|text| format!("{field}: {text}")))
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Array(values) => values.iter().find_map(first_text),
        _ => None,
    }
}

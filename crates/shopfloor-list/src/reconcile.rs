// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;
use shopfloor_app::{
    Intent, ListError, ResourceId, ResourceItem, ResourceService, ServiceError, ViewConfig,
    prepare_payload,
};
use tracing::{debug, warn};

/// Validates and coerces `candidate`, sends it, then splices the server's
/// record into `items`. Nothing is touched locally when any step fails.
pub fn save<S: ResourceService + ?Sized>(
    service: &S,
    view: &ViewConfig,
    intent: &Intent,
    candidate: &ResourceItem,
    items: &mut Vec<ResourceItem>,
) -> Result<ResourceItem, ListError> {
    let mut payload = prepare_payload(&view.dialog_fields, candidate)?;

    let response = match intent {
        Intent::Create => {
            payload.remove("id");
            debug!(entity = %view.entity_name, "creating record");
            service.create(&payload)
        }
        Intent::Update { id } => {
            debug!(entity = %view.entity_name, %id, "updating record");
            service.update(id, &payload)
        }
    }
    .map_err(|error| server_error(&view.entity_name, "save", error))?;

    let saved = saved_record(response, payload, intent);
    splice(items, intent, saved.clone());
    Ok(saved)
}

/// Deletes `id` remotely, then drops it from `items`.
pub fn delete<S: ResourceService + ?Sized>(
    service: &S,
    entity_name: &str,
    id: &ResourceId,
    items: &mut Vec<ResourceItem>,
) -> Result<(), ListError> {
    debug!(entity = %entity_name, %id, "deleting record");
    service
        .delete(id)
        .map_err(|error| server_error(entity_name, "delete", error))?;
    items.retain(|item| ResourceId::of(item).as_ref() != Some(id));
    Ok(())
}

/// Replaces the row carrying the update's id in place, or appends.
pub fn splice(items: &mut Vec<ResourceItem>, intent: &Intent, saved: ResourceItem) {
    let Intent::Update { id } = intent else {
        items.push(saved);
        return;
    };
    match items
        .iter()
        .position(|item| ResourceId::of(item).as_ref() == Some(id))
    {
        Some(index) => items[index] = saved,
        None => {
            debug!(%id, "updated record is no longer listed; appending");
            items.push(saved);
        }
    }
}

pub fn server_error(entity_name: &str, action: &str, error: ServiceError) -> ListError {
    warn!(entity = %entity_name, action, error = %error, "server rejected request");
    ListError::Server {
        status: error.status(),
        message: error
            .body_message()
            .unwrap_or_else(|| format!("Failed to {action} {entity_name}")),
    }
}

fn saved_record(response: Value, payload: ResourceItem, intent: &Intent) -> ResourceItem {
    if let Value::Object(record) = response {
        return record;
    }
    debug!("write reply was not an object; keeping the submitted payload");
    let mut record = payload;
    if let Intent::Update { id } = intent {
        record.insert("id".to_owned(), id.to_value());
    }
    record
}

#[cfg(test)]
mod tests {
    use super::{delete, save, server_error, splice};
    use serde_json::{Value, json};
    use shopfloor_app::{
        FieldSpec, Intent, ListError, OptionSets, ResourceId, ResourceItem, ResourceService,
        ServiceError, StaticConfig, ViewConfig, resolve,
    };
    use std::cell::RefCell;

    fn item(raw: Value) -> ResourceItem {
        raw.as_object().expect("object fixture").clone()
    }

    fn view() -> ViewConfig {
        let config = StaticConfig {
            entity_name: Some("Material".to_owned()),
            dialog_fields: Some(vec![
                FieldSpec::text("name", "Name").required(),
                FieldSpec::number("quantity", "Quantity"),
            ]),
            ..StaticConfig::default()
        };
        resolve(&config, &OptionSets::default())
    }

    /// Replies with a fixed value and remembers the last payload.
    struct Echo {
        reply: Result<Value, ServiceError>,
        sent: RefCell<Option<ResourceItem>>,
    }

    impl Echo {
        fn replying(reply: Result<Value, ServiceError>) -> Self {
            Self {
                reply,
                sent: RefCell::new(None),
            }
        }
    }

    impl ResourceService for Echo {
        fn get_all(&self) -> Result<Value, ServiceError> {
            Ok(json!([]))
        }

        fn create(&self, data: &ResourceItem) -> Result<Value, ServiceError> {
            self.sent.replace(Some(data.clone()));
            self.reply.clone()
        }

        fn update(&self, _id: &ResourceId, data: &ResourceItem) -> Result<Value, ServiceError> {
            self.sent.replace(Some(data.clone()));
            self.reply.clone()
        }

        fn delete(&self, _id: &ResourceId) -> Result<(), ServiceError> {
            self.reply.clone().map(|_| ())
        }
    }

    #[test]
    fn create_strips_id_coerces_and_appends() {
        let service = Echo::replying(Ok(json!({"id": 3, "name": "Steel", "quantity": 7})));
        let mut items = vec![item(json!({"id": 1, "name": "Brass"}))];

        let saved = save(
            &service,
            &view(),
            &Intent::Create,
            &item(json!({"id": 99, "name": "Steel", "quantity": "7"})),
            &mut items,
        )
        .expect("save should succeed");

        let sent = service.sent.borrow().clone().expect("payload sent");
        assert!(!sent.contains_key("id"));
        assert_eq!(sent["quantity"], json!(7));
        assert_eq!(saved["id"], json!(3));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], saved);
    }

    #[test]
    fn update_replaces_in_place() {
        let service = Echo::replying(Ok(json!({"id": 2, "name": "Copper"})));
        let mut items = vec![
            item(json!({"id": 1, "name": "Brass"})),
            item(json!({"id": 2, "name": "Coper"})),
            item(json!({"id": 3, "name": "Zinc"})),
        ];
        let intent = Intent::Update {
            id: ResourceId::Int(2),
        };

        save(
            &service,
            &view(),
            &intent,
            &item(json!({"id": 2, "name": "Copper"})),
            &mut items,
        )
        .expect("save should succeed");

        let names: Vec<&Value> = items.iter().map(|row| &row["name"]).collect();
        assert_eq!(names, vec![&json!("Brass"), &json!("Copper"), &json!("Zinc")]);
    }

    #[test]
    fn invalid_candidate_never_reaches_the_service() {
        let service = Echo::replying(Ok(json!({})));
        let mut items = Vec::new();
        let error = save(
            &service,
            &view(),
            &Intent::Create,
            &item(json!({"name": "  "})),
            &mut items,
        )
        .expect_err("blank name should fail");

        assert_eq!(
            error,
            ListError::Validation {
                labels: vec!["Name".to_owned()]
            }
        );
        assert!(service.sent.borrow().is_none());
        assert!(items.is_empty());
    }

    #[test]
    fn server_failure_leaves_items_untouched() {
        let service = Echo::replying(Err(ServiceError::Status {
            status: 400,
            body: json!({"detail": "Name already exists"}),
        }));
        let mut items = vec![item(json!({"id": 1, "name": "Brass"}))];
        let before = items.clone();

        let error = save(
            &service,
            &view(),
            &Intent::Create,
            &item(json!({"name": "Brass"})),
            &mut items,
        )
        .expect_err("server rejected the save");

        assert_eq!(
            error,
            ListError::Server {
                status: Some(400),
                message: "Name already exists".to_owned()
            }
        );
        assert_eq!(items, before);
    }

    #[test]
    fn non_object_reply_falls_back_to_payload() {
        let service = Echo::replying(Ok(Value::Null));
        let mut items = vec![item(json!({"id": 5, "name": "Old"}))];
        let intent = Intent::Update {
            id: ResourceId::Int(5),
        };

        let saved = save(
            &service,
            &view(),
            &intent,
            &item(json!({"name": "New"})),
            &mut items,
        )
        .expect("save should succeed");

        assert_eq!(saved, item(json!({"name": "New", "id": 5})));
        assert_eq!(items, vec![saved]);
    }

    #[test]
    fn update_of_vanished_row_appends() {
        let mut items = vec![item(json!({"id": 1}))];
        splice(
            &mut items,
            &Intent::Update {
                id: ResourceId::Int(8),
            },
            item(json!({"id": 8})),
        );
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn delete_splices_locally_only_on_success() {
        let mut items = vec![item(json!({"id": 1})), item(json!({"id": 2}))];

        let failing = Echo::replying(Err(ServiceError::Transport("connection refused".into())));
        let error = delete(&failing, "Material", &ResourceId::Int(1), &mut items)
            .expect_err("transport failure");
        assert_eq!(error.to_string(), "connection refused");
        assert_eq!(items.len(), 2);

        let ok = Echo::replying(Ok(Value::Null));
        delete(&ok, "Material", &ResourceId::Int(1), &mut items).expect("delete");
        assert_eq!(items, vec![item(json!({"id": 2}))]);
    }

    #[test]
    fn messageless_errors_use_generic_fallback() {
        let error = server_error(
            "Work Order",
            "save",
            ServiceError::Status {
                status: 500,
                body: json!("<html>oops</html>"),
            },
        );
        assert_eq!(error.to_string(), "Failed to save Work Order");
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde_json::{Value, json};
use shopfloor_app::{
    DialogPhase, EntityKind, FieldKind, FieldSpec, Intent, ListError, ResourceId,
    ResourceService, SelectOption, SortDirection,
};
use shopfloor_list::{FieldEditor, ListController, LoadState, OptionBinding};
use shopfloor_testkit::{
    Call, Envelope, MemoryService, Operation, ShopFaker, bad_request, item, items,
};
use std::sync::Arc;

fn workstations() -> MemoryService {
    MemoryService::with_records(items(json!([
        {"id": 1, "name": "Lathe", "description": "Turning cell", "status": "ACTIVE"},
        {"id": 2, "name": "CNC Mill", "description": "5-axis", "status": "MAINTENANCE"},
        {"id": 3, "name": "Drill Press", "description": "Bench drill", "status": "INACTIVE"},
    ])))
}

fn names(list: &ListController<MemoryService>) -> Vec<String> {
    list.visible_items()
        .iter()
        .map(|row| row["name"].as_str().unwrap_or_default().to_owned())
        .collect()
}

#[test]
fn mount_loads_and_sorts_by_default_key() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;

    assert_eq!(list.load_state(), &LoadState::Ready);
    assert_eq!(names(&list), vec!["CNC Mill", "Drill Press", "Lathe"]);
    Ok(())
}

#[test]
fn enveloped_listings_are_unwrapped() -> Result<()> {
    for envelope in [Envelope::Results, Envelope::Data] {
        let service = workstations().with_envelope(envelope);
        let mut list = ListController::new(service, EntityKind::Workstations.static_config());
        list.mount()?;
        assert_eq!(list.items().len(), 3, "envelope {envelope:?}");
    }
    Ok(())
}

#[test]
fn unknown_envelope_loads_empty_list() -> Result<()> {
    let service = MemoryService::new().with_raw_listing(json!({"rows": [{"id": 1}]}));
    let mut list = ListController::new(service, EntityKind::Products.static_config());
    list.mount()?;

    assert!(list.items().is_empty());
    let table = list.table()?;
    assert!(table.rows.is_empty());
    assert_eq!(table.empty_message, "No products found");
    Ok(())
}

#[test]
fn fetch_failure_surfaces_entity_message() {
    let service = workstations();
    service.fail(Operation::GetAll, bad_request(json!({"detail": "nope"})));
    let mut list = ListController::new(service, EntityKind::Workstations.static_config());

    let error = list.mount().expect_err("list fetch failed");
    assert!(
        error.to_string().starts_with("Failed to fetch Workstation:"),
        "{error}"
    );
    assert_eq!(list.table().expect_err("failed load"), error);
}

#[test]
fn refresh_picks_up_remote_changes() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;
    list.service().create(&item(json!({"name": "Welder"})))?;
    assert_eq!(list.items().len(), 3);

    list.refresh()?;
    assert_eq!(list.items().len(), 4);
    Ok(())
}

#[test]
fn search_and_sort_compose() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;

    list.set_search("  DRILL ");
    assert_eq!(names(&list), vec!["Drill Press"]);

    list.set_search("");
    list.toggle_sort("name");
    assert_eq!(list.sort().direction, SortDirection::Desc);
    assert_eq!(names(&list), vec!["Lathe", "Drill Press", "CNC Mill"]);

    list.toggle_sort("status");
    assert_eq!(list.sort().direction, SortDirection::Asc);
    assert_eq!(names(&list), vec!["Lathe", "Drill Press", "CNC Mill"]);
    Ok(())
}

#[test]
fn search_never_reorders_canonical_items() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;
    let before = list.items().to_vec();

    list.set_search("a");
    list.toggle_sort("description");
    let _ = list.table()?;
    assert_eq!(list.items(), before.as_slice());
    Ok(())
}

#[test]
fn create_appends_server_record_and_closes_dialog() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;

    list.open_create()?;
    assert_eq!(list.dialog().title("Workstation"), "Add Workstation");
    assert_eq!(list.dialog().candidate["status"], json!("INACTIVE"));
    list.change_field("name", json!("Band Saw"))?;
    let saved = list.submit()?;

    assert_eq!(saved["id"], json!(4));
    assert_eq!(list.items().len(), 4);
    assert_eq!(list.items()[3], saved);
    assert_eq!(list.dialog().phase, DialogPhase::Closed);
    Ok(())
}

#[test]
fn edit_replaces_row_in_place() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;

    list.open_edit(&ResourceId::Int(2))?;
    assert_eq!(
        list.dialog().intent,
        Intent::Update {
            id: ResourceId::Int(2)
        }
    );
    list.change_field("name", json!("CNC Mill 2"))?;
    list.submit()?;

    assert_eq!(list.items()[1]["name"], json!("CNC Mill 2"));
    assert_eq!(list.items().len(), 3);
    assert!(matches!(
        list.service().calls().last(),
        Some(Call::Update(ResourceId::Int(2), _))
    ));
    Ok(())
}

#[test]
fn empty_write_replies_fall_back_to_the_sent_payload() -> Result<()> {
    let service = workstations().with_write_reply(Value::Null);
    let mut list = ListController::new(service, EntityKind::Workstations.static_config());
    list.mount()?;

    list.open_edit(&ResourceId::Int(2))?;
    list.change_field("name", json!("CNC Mill 2"))?;
    list.submit()?;
    assert_eq!(list.items()[1]["name"], json!("CNC Mill 2"));
    assert_eq!(ResourceId::of(&list.items()[1]), Some(ResourceId::Int(2)));

    list.open_create()?;
    list.change_field("name", json!("Bandsaw"))?;
    list.submit()?;
    let created = list.items().last().expect("appended row");
    assert_eq!(created["name"], json!("Bandsaw"));
    assert_eq!(created.get("id"), None);
    assert_eq!(list.items().len(), 4);
    assert_eq!(list.service().records().len(), 4);
    Ok(())
}

#[test]
fn validation_failure_keeps_dialog_open_without_a_request() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;

    list.open_create()?;
    let error = list.submit().expect_err("name is required");

    assert_eq!(
        error,
        ListError::Validation {
            labels: vec!["Name".to_owned()]
        }
    );
    assert_eq!(list.dialog().phase, DialogPhase::Editing);
    assert_eq!(
        list.dialog().error.as_deref(),
        Some("required fields are missing: Name")
    );
    assert_eq!(list.service().count(Operation::Create), 0);
    Ok(())
}

#[test]
fn server_rejection_keeps_candidate_and_list() -> Result<()> {
    let service = workstations();
    service.fail(
        Operation::Create,
        bad_request(json!({"name": ["workstation with this name already exists."]})),
    );
    let mut list = ListController::new(service, EntityKind::Workstations.static_config());
    list.mount()?;

    list.open_create()?;
    list.change_field("name", json!("Lathe"))?;
    let error = list.submit().expect_err("duplicate name");

    assert_eq!(
        error.to_string(),
        "name: workstation with this name already exists."
    );
    assert_eq!(list.items().len(), 3);
    assert_eq!(list.dialog().candidate["name"], json!("Lathe"));
    assert!(list.dialog().is_open());

    list.service().recover(Operation::Create);
    list.submit()?;
    assert_eq!(list.items().len(), 4);
    Ok(())
}

#[test]
fn submit_without_dialog_is_rejected() {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    assert_eq!(
        list.submit().expect_err("no dialog"),
        ListError::DialogClosed
    );
}

#[test]
fn cancel_discards_candidate() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;
    list.open_edit(&ResourceId::Int(1))?;
    list.change_field("name", json!("Changed"))?;
    list.cancel_dialog()?;

    assert!(!list.dialog().is_open());
    assert_eq!(list.items()[0]["name"], json!("Lathe"));
    assert_eq!(list.service().count(Operation::Update), 0);
    Ok(())
}

#[test]
fn open_edit_of_unknown_id_fails() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;
    assert_eq!(
        list.open_edit(&ResourceId::Int(42)).expect_err("unknown"),
        ListError::UnknownItem(ResourceId::Int(42))
    );
    Ok(())
}

#[test]
fn delete_removes_row_after_server_confirms() -> Result<()> {
    let mut list = ListController::new(workstations(), EntityKind::Workstations.static_config());
    list.mount()?;

    list.service()
        .fail(Operation::Delete, bad_request(json!({"detail": "in use"})));
    let error = list.delete(&ResourceId::Int(1)).expect_err("in use");
    assert_eq!(error.to_string(), "in use");
    assert_eq!(list.items().len(), 3);

    list.service().recover(Operation::Delete);
    list.delete(&ResourceId::Int(1))?;
    assert_eq!(list.items().len(), 2);
    assert_eq!(list.service().count(Operation::GetAll), 1);
    Ok(())
}

#[test]
fn bound_fields_become_selects_after_mount() -> Result<()> {
    let mut faker = ShopFaker::new(11);
    let products = vec![faker.product(), faker.product()];
    let orders = vec![faker.work_order(&products[0])];

    let product_source = Arc::new(MemoryService::with_records(products.clone()));
    let mut list = ListController::new(
        MemoryService::with_records(orders),
        EntityKind::WorkOrders.static_config(),
    )
    .with_binding(OptionBinding::new("product", Arc::clone(&product_source)));

    let before = list.view_config();
    let field = before.field("product").expect("product field");
    assert_eq!(field.kind, FieldKind::Select { options: vec![] });

    list.mount()?;
    let view = list.view_config();
    let options = view
        .field("product")
        .and_then(|field| field.options())
        .expect("product select");
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].value, products[0]["id"]);
    assert_eq!(options[0].label, products[0]["name"].as_str().unwrap_or_default());
    assert_eq!(product_source.count(Operation::GetAll), 1);

    let table = list.table()?;
    assert_eq!(table.rows[0].cells[0], options[0].label);
    Ok(())
}

#[test]
fn efficiency_records_bind_to_workstations() -> Result<()> {
    let mut faker = ShopFaker::new(5);
    let station = faker.workstation();
    let record = faker.efficiency(&station);

    let mut list = ListController::new(
        MemoryService::with_records(vec![record]),
        EntityKind::WorkstationEfficiency.static_config(),
    )
    .with_binding(OptionBinding::new(
        "workstation",
        MemoryService::with_records(vec![station.clone()]),
    ));
    list.mount()?;

    let view = list.view_config();
    let options = view
        .field("workstation")
        .and_then(|field| field.options())
        .expect("workstation select");
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, station["id"]);

    let table = list.table()?;
    assert_eq!(table.rows.len(), 1);
    assert_eq!(
        table.rows[0].cells[0],
        station["name"].as_str().unwrap_or_default()
    );
    Ok(())
}

#[test]
fn failed_option_source_still_renders_the_list() -> Result<()> {
    let source = MemoryService::new();
    source.fail(Operation::GetAll, bad_request(Value::Null));
    let mut list = ListController::new(
        workstations(),
        EntityKind::WorkstationEfficiency.static_config(),
    )
    .with_binding(OptionBinding::new("workstation", source));

    list.mount()?;
    assert_eq!(list.options().get("workstation"), Some(&[][..]));
    assert_eq!(list.items().len(), 3);
    Ok(())
}

#[test]
fn reload_options_refreshes_without_touching_items() -> Result<()> {
    let source = Arc::new(MemoryService::new());
    let mut list = ListController::new(
        MemoryService::new(),
        EntityKind::WorkOrders.static_config(),
    )
    .with_binding(OptionBinding::new("product", Arc::clone(&source)));
    list.mount()?;
    assert_eq!(list.options().get("product"), Some(&[][..]));

    source.create(&item(json!({"name": "Hinge"})))?;
    list.reload_options();
    assert_eq!(
        list.options().get("product"),
        Some(&[SelectOption::new(1, "Hinge")][..])
    );
    Ok(())
}

struct Script(Vec<(&'static str, Value)>);

impl FieldEditor for Script {
    fn edit(&mut self, field: &FieldSpec, _current: Option<&Value>) -> Option<Value> {
        self.0
            .iter()
            .find(|(key, _)| *key == field.key)
            .map(|(_, value)| value.clone())
    }
}

#[test]
fn editor_fills_dialog_and_numbers_are_coerced() -> Result<()> {
    let mut list = ListController::new(MemoryService::new(), EntityKind::Materials.static_config());
    list.mount()?;

    list.open_create()?;
    let changed = list.edit_with(&mut Script(vec![
        ("name", json!("Copper Wire")),
        ("unit", json!("m")),
        ("quantity", json!("120")),
        ("reorder_level", json!("15")),
        ("cost_per_unit", json!("4.5")),
        ("not_a_field", json!("ignored")),
    ]))?;
    assert_eq!(changed, 5);

    let saved = list.submit()?;
    assert_eq!(saved["quantity"], json!(120));
    assert_eq!(saved["cost_per_unit"], json!(4.5));
    assert!(!saved.contains_key("not_a_field"));

    let cards = list.cards()?.expect("materials render as cards");
    assert_eq!(cards.len(), 1);
    assert!(cards[0].contains("Copper Wire"), "{}", cards[0]);
    Ok(())
}

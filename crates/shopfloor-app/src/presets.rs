// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::query::{display_at, lookup};
use crate::{ColumnSpec, FieldSpec, ResourceItem, SelectOption, StaticConfig, ViewConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Workstations,
    Materials,
    Products,
    WorkOrders,
    WorkstationEfficiency,
}

/// A foreign-key-like field and the entity its options come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingSpec {
    pub field_key: &'static str,
    pub source: EntityKind,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [
        Self::Workstations,
        Self::Materials,
        Self::Products,
        Self::WorkOrders,
        Self::WorkstationEfficiency,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workstations => "workstations",
            Self::Materials => "materials",
            Self::Products => "products",
            Self::WorkOrders => "work-orders",
            Self::WorkstationEfficiency => "workstation-efficiency",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "workstations" => Some(Self::Workstations),
            "materials" => Some(Self::Materials),
            "products" => Some(Self::Products),
            "work-orders" => Some(Self::WorkOrders),
            "workstation-efficiency" => Some(Self::WorkstationEfficiency),
            _ => None,
        }
    }

    /// REST collection path segment, relative to the API base.
    pub const fn endpoint(self) -> &'static str {
        self.as_str()
    }

    pub const fn bindings(self) -> &'static [BindingSpec] {
        match self {
            Self::WorkOrders => &[BindingSpec {
                field_key: "product",
                source: Self::Products,
            }],
            Self::WorkstationEfficiency => &[BindingSpec {
                field_key: "workstation",
                source: Self::Workstations,
            }],
            Self::Workstations | Self::Materials | Self::Products => &[],
        }
    }

    pub fn static_config(self) -> StaticConfig {
        match self {
            Self::Workstations => workstations(),
            Self::Materials => materials(),
            Self::Products => products(),
            Self::WorkOrders => work_orders(),
            Self::WorkstationEfficiency => workstation_efficiency(),
        }
    }
}

fn object(value: Value) -> Option<ResourceItem> {
    match value {
        Value::Object(item) => Some(item),
        _ => None,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn options(pairs: &[(&str, &str)]) -> Vec<SelectOption> {
    pairs
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label))
        .collect()
}

fn workstations() -> StaticConfig {
    StaticConfig {
        entity_name: Some("Workstation".to_owned()),
        page_title: Some("Workstations".to_owned()),
        default_sort_key: Some("name".to_owned()),
        default_item: object(json!({
            "name": "",
            "description": "",
            "status": "INACTIVE",
        })),
        search_fields: Some(strings(&["name", "description"])),
        dialog_fields: Some(vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::multiline("description", "Description"),
            FieldSpec::select(
                "status",
                "Status",
                options(&[
                    ("ACTIVE", "Active"),
                    ("INACTIVE", "Inactive"),
                    ("MAINTENANCE", "Maintenance"),
                ]),
            )
            .required(),
        ]),
        columns: Some(vec![
            ColumnSpec::new("name", "Name"),
            ColumnSpec::new("description", "Description"),
            ColumnSpec::new("status", "Status"),
        ]),
        card_view: None,
    }
}

fn materials() -> StaticConfig {
    StaticConfig {
        entity_name: Some("Material".to_owned()),
        page_title: Some("Materials".to_owned()),
        default_sort_key: Some("name".to_owned()),
        default_item: object(json!({
            "name": "",
            "unit": "kg",
            "quantity": 0,
            "reorder_level": 0,
            "cost_per_unit": "",
            "description": "",
        })),
        search_fields: Some(strings(&["name", "unit"])),
        dialog_fields: Some(vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::select(
                "unit",
                "Unit",
                options(&[
                    ("kg", "Kilograms (kg)"),
                    ("g", "Grams (g)"),
                    ("lb", "Pounds (lb)"),
                    ("oz", "Ounces (oz)"),
                    ("m", "Meters (m)"),
                    ("cm", "Centimeters (cm)"),
                    ("mm", "Millimeters (mm)"),
                    ("pcs", "Pieces (pcs)"),
                ]),
            )
            .required(),
            FieldSpec::number("quantity", "Quantity").required(),
            FieldSpec::number("reorder_level", "Reorder Level").required(),
            FieldSpec::number("cost_per_unit", "Cost per Unit"),
            FieldSpec::text("description", "Description"),
        ]),
        columns: Some(vec![
            ColumnSpec::new("name", "Name"),
            ColumnSpec::rendered("quantity", "Quantity", render_quantity_with_unit),
            ColumnSpec::rendered("reorder_level", "Reorder Level", render_reorder_with_unit),
            ColumnSpec::rendered("cost_per_unit", "Cost per Unit", render_cost_per_unit),
            ColumnSpec::rendered("status", "Status", render_stock_status),
        ]),
        card_view: Some(render_material_card),
    }
}

fn products() -> StaticConfig {
    StaticConfig {
        entity_name: Some("Product".to_owned()),
        page_title: Some("Products".to_owned()),
        default_sort_key: Some("name".to_owned()),
        default_item: object(json!({
            "name": "",
            "status": "Active",
            "category": "",
            "price": "",
            "manufacturingTime": "",
        })),
        search_fields: Some(strings(&["name", "category", "status"])),
        dialog_fields: Some(vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::text("status", "Status"),
            FieldSpec::text("category", "Category"),
            FieldSpec::number("price", "Price"),
            FieldSpec::text("manufacturingTime", "Manufacturing Time"),
        ]),
        columns: Some(vec![
            ColumnSpec::new("name", "Name"),
            ColumnSpec::new("status", "Status"),
            ColumnSpec::new("category", "Category"),
            ColumnSpec::new("price", "Price"),
            ColumnSpec::new("manufacturingTime", "Manufacturing Time"),
        ]),
        card_view: None,
    }
}

fn work_orders() -> StaticConfig {
    StaticConfig {
        entity_name: Some("Work Order".to_owned()),
        page_title: Some("Work Orders".to_owned()),
        default_sort_key: Some("created_at".to_owned()),
        default_item: object(json!({
            "product": null,
            "quantity": 1,
            "status": "PENDING",
            "priority": "MEDIUM",
            "notes": "",
        })),
        search_fields: Some(strings(&["product.name", "notes", "status", "priority"])),
        dialog_fields: Some(vec![
            FieldSpec::text("product", "Product").required(),
            FieldSpec::number("quantity", "Quantity").required(),
            FieldSpec::select(
                "status",
                "Status",
                options(&[
                    ("PENDING", "Pending"),
                    ("QUEUED", "Queued"),
                    ("READY", "Ready to Start"),
                    ("IN_PROGRESS", "In Progress"),
                    ("PAUSED", "Paused"),
                    ("COMPLETED", "Completed"),
                    ("CANCELLED", "Cancelled"),
                    ("BLOCKED", "Blocked"),
                ]),
            ),
            FieldSpec::select(
                "priority",
                "Priority",
                options(&[
                    ("LOW", "Low Priority"),
                    ("MEDIUM", "Medium Priority"),
                    ("HIGH", "High Priority"),
                    ("CRITICAL", "Critical Priority"),
                ]),
            ),
            FieldSpec::multiline("notes", "Notes"),
        ]),
        columns: Some(vec![
            ColumnSpec::rendered("product", "Product", render_product),
            ColumnSpec::new("quantity", "Quantity"),
            ColumnSpec::new("status", "Status"),
            ColumnSpec::new("priority", "Priority"),
            ColumnSpec::rendered("created_at", "Created", render_created_at),
        ]),
        card_view: None,
    }
}

fn workstation_efficiency() -> StaticConfig {
    StaticConfig {
        entity_name: Some("Workstation Efficiency".to_owned()),
        page_title: Some("Workstation Efficiency".to_owned()),
        default_sort_key: Some("created_at".to_owned()),
        default_item: object(json!({
            "workstation": null,
            "efficiency_percentage": 0,
            "performance_category": "STANDARD",
            "total_working_time": 0,
            "total_idle_time": 0,
            "total_material_used": 0,
            "total_material_wasted": 0,
            "total_items_processed": 0,
            "total_items_with_defects": 0,
            "notes": "",
        })),
        search_fields: Some(strings(&[
            "workstation_name",
            "performance_category",
            "notes",
        ])),
        dialog_fields: Some(vec![
            FieldSpec::text("workstation", "Workstation").required(),
            FieldSpec::number("total_working_time", "Total Working Time (mins)"),
            FieldSpec::number("total_idle_time", "Total Idle Time (mins)"),
            FieldSpec::number("total_material_used", "Total Material Used"),
            FieldSpec::number("total_material_wasted", "Total Material Wasted"),
            FieldSpec::number("total_items_processed", "Total Items Processed"),
            FieldSpec::number("total_items_with_defects", "Total Defective Items"),
            FieldSpec::multiline("notes", "Notes"),
        ]),
        columns: Some(vec![
            ColumnSpec::new("workstation_name", "Workstation"),
            ColumnSpec::rendered("efficiency_percentage", "Efficiency %", render_percentage),
            ColumnSpec::new("performance_category", "Performance"),
            ColumnSpec::new("total_items_processed", "Items Processed"),
            ColumnSpec::new("total_items_with_defects", "Defective Items"),
        ]),
        card_view: None,
    }
}

/// Nested objects show their name; bare ids are looked up in the field's
/// resolved options.
fn render_product(item: &ResourceItem, config: &ViewConfig) -> String {
    render_reference(item, config, "product", "No Product")
}

fn render_reference(item: &ResourceItem, config: &ViewConfig, key: &str, empty: &str) -> String {
    match lookup(item, key) {
        Some(Value::Object(_)) => {
            let name = display_at(item, &format!("{key}.name"));
            if name.is_empty() { empty.to_owned() } else { name }
        }
        None | Some(Value::Null) => empty.to_owned(),
        Some(value) => config
            .field(key)
            .and_then(|field| field.options())
            .and_then(|options| options.iter().find(|option| &option.value == value))
            .map(|option| option.label.clone())
            .unwrap_or_else(|| display_at(item, key)),
    }
}

fn render_created_at(item: &ResourceItem, _config: &ViewConfig) -> String {
    format_timestamp(&display_at(item, "created_at"))
}

pub fn format_timestamp(raw: &str) -> String {
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|parsed| {
            parsed
                .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
                .ok()
        })
        .unwrap_or_else(|| raw.to_owned())
}

fn render_percentage(item: &ResourceItem, _config: &ViewConfig) -> String {
    let value = display_at(item, "efficiency_percentage");
    if value.is_empty() { value } else { format!("{value}%") }
}

fn with_unit(item: &ResourceItem, key: &str) -> String {
    let value = display_at(item, key);
    let unit = display_at(item, "unit");
    if value.is_empty() || unit.is_empty() {
        value
    } else {
        format!("{value} {unit}")
    }
}

fn render_quantity_with_unit(item: &ResourceItem, _config: &ViewConfig) -> String {
    with_unit(item, "quantity")
}

fn render_reorder_with_unit(item: &ResourceItem, _config: &ViewConfig) -> String {
    with_unit(item, "reorder_level")
}

fn render_cost_per_unit(item: &ResourceItem, _config: &ViewConfig) -> String {
    let cost = display_at(item, "cost_per_unit");
    if cost.is_empty() {
        "N/A".to_owned()
    } else {
        format!("₹{cost}")
    }
}

fn render_stock_status(item: &ResourceItem, _config: &ViewConfig) -> String {
    let status = display_at(item, "status");
    if status.is_empty() {
        "In Stock".to_owned()
    } else {
        status
    }
}

fn render_material_card(item: &ResourceItem, config: &ViewConfig) -> String {
    let mut out = format!(
        "{} [{}]\n  Quantity: {}\n  Reorder Level: {}\n  Cost per Unit: {}",
        display_at(item, "name"),
        render_stock_status(item, config),
        with_unit(item, "quantity"),
        with_unit(item, "reorder_level"),
        render_cost_per_unit(item, config),
    );
    let description = display_at(item, "description");
    if !description.is_empty() {
        out.push_str("\n  ");
        out.push_str(&description);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, format_timestamp};
    use crate::{FieldKind, OptionSets, ResourceItem, SelectOption, resolve};
    use serde_json::json;

    fn item(raw: serde_json::Value) -> ResourceItem {
        raw.as_object().expect("object fixture").clone()
    }

    #[test]
    fn entity_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("suppliers"), None);
    }

    #[test]
    fn every_preset_resolves_with_columns_and_fields() {
        for kind in EntityKind::ALL {
            let view = resolve(&kind.static_config(), &OptionSets::default());
            assert!(!view.columns.is_empty(), "{} has no columns", kind.as_str());
            assert!(!view.dialog_fields.is_empty(), "{} has no fields", kind.as_str());
            assert_ne!(view.entity_name, "Item");
        }
    }

    #[test]
    fn bound_preset_fields_turn_into_selects() {
        let kind = EntityKind::WorkOrders;
        let mut options = OptionSets::default();
        for binding in kind.bindings() {
            options.register(binding.field_key);
        }
        let view = resolve(&kind.static_config(), &options);
        assert_eq!(
            view.field("product").map(|field| &field.kind),
            Some(&FieldKind::Select { options: vec![] })
        );
        assert_eq!(kind.bindings()[0].source, EntityKind::Products);
    }

    #[test]
    fn product_column_prefers_nested_name_then_option_label() {
        let kind = EntityKind::WorkOrders;
        let mut options = OptionSets::default();
        options.set("product", vec![SelectOption::new(3, "Bracket")]);
        let view = resolve(&kind.static_config(), &options);
        let render = view.columns[0].render.expect("product renderer");

        assert_eq!(render(&item(json!({"product": {"name": "Hinge"}})), &view), "Hinge");
        assert_eq!(render(&item(json!({"product": 3})), &view), "Bracket");
        assert_eq!(render(&item(json!({"product": 8})), &view), "8");
        assert_eq!(render(&item(json!({"product": null})), &view), "No Product");
    }

    #[test]
    fn timestamps_render_compactly_or_verbatim() {
        assert_eq!(format_timestamp("2025-03-04T09:15:00Z"), "2025-03-04 09:15");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(format_timestamp(""), "");
    }

    #[test]
    fn material_card_includes_units_and_cost() {
        let view = resolve(&EntityKind::Materials.static_config(), &OptionSets::default());
        let card = view.card_view.expect("materials have a card view");
        let text = card(
            &item(json!({"name": "Steel", "unit": "kg", "quantity": 40, "reorder_level": 10})),
            &view,
        );
        assert!(text.starts_with("Steel [In Stock]"));
        assert!(text.contains("Quantity: 40 kg"));
        assert!(text.contains("Cost per Unit: N/A"));
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde_json::{Value, json};
use shopfloor_app::{ResourceId, ResourceItem, ResourceService, ServiceError};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const STATION_KINDS: [&str; 10] = [
    "Lathe",
    "Mill",
    "Press",
    "Welder",
    "Grinder",
    "Drill",
    "Saw",
    "Router",
    "Paint Booth",
    "Assembly Bench",
];

const STATION_STATUSES: [&str; 3] = ["ACTIVE", "INACTIVE", "MAINTENANCE"];

const MATERIALS: [(&str, &str); 10] = [
    ("Steel Sheet", "kg"),
    ("Aluminium Bar", "kg"),
    ("Copper Wire", "m"),
    ("Hex Bolt", "pcs"),
    ("Lubricant", "l"),
    ("Plywood", "pcs"),
    ("Epoxy Resin", "l"),
    ("Brass Rod", "m"),
    ("Rubber Gasket", "pcs"),
    ("Primer", "l"),
];

const PRODUCT_CATEGORIES: [&str; 6] = [
    "Fasteners",
    "Brackets",
    "Housings",
    "Fixtures",
    "Panels",
    "Couplings",
];

const ORDER_STATUSES: [&str; 4] = ["PENDING", "IN_PROGRESS", "COMPLETED", "CANCELLED"];
const PRIORITIES: [&str; 4] = ["LOW", "MEDIUM", "HIGH", "URGENT"];

const REFERENCE_YEAR: i32 = 2026;

/// Which collection operation a [`MemoryService`] call exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    GetAll,
    Create,
    Update,
    Delete,
}

/// Shape used when serving the collection from `get_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Envelope {
    #[default]
    Bare,
    Results,
    Data,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetAll,
    Create(ResourceItem),
    Update(ResourceId, ResourceItem),
    Delete(ResourceId),
}

#[derive(Debug, Default)]
struct Store {
    records: Vec<ResourceItem>,
    next_id: i64,
    envelope: Envelope,
    raw_listing: Option<Value>,
    write_reply: Option<Value>,
    failures: BTreeMap<Operation, ServiceError>,
    calls: Vec<Call>,
}

/// In-memory collection that behaves like the REST backend: assigns integer
/// ids on create, 404s on unknown ids, and records every call it serves.
#[derive(Debug, Default)]
pub struct MemoryService {
    store: Mutex<Store>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ResourceItem>) -> Self {
        let next_id = records
            .iter()
            .filter_map(|record| match ResourceId::of(record) {
                Some(ResourceId::Int(id)) => Some(id),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            store: Mutex::new(Store {
                records,
                next_id,
                ..Store::default()
            }),
        }
    }

    pub fn with_envelope(self, envelope: Envelope) -> Self {
        self.lock().envelope = envelope;
        self
    }

    /// Serve `raw` verbatim from `get_all` instead of the stored records.
    pub fn with_raw_listing(self, raw: Value) -> Self {
        self.lock().raw_listing = Some(raw);
        self
    }

    /// Answer create and update with `reply` instead of the stored record.
    pub fn with_write_reply(self, reply: Value) -> Self {
        self.lock().write_reply = Some(reply);
        self
    }

    pub fn fail(&self, operation: Operation, error: ServiceError) {
        self.lock().failures.insert(operation, error);
    }

    pub fn recover(&self, operation: Operation) {
        self.lock().failures.remove(&operation);
    }

    pub fn records(&self) -> Vec<ResourceItem> {
        self.lock().records.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Call {
    pub const fn operation(&self) -> Operation {
        match self {
            Self::GetAll => Operation::GetAll,
            Self::Create(_) => Operation::Create,
            Self::Update(..) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
        }
    }
}

impl Store {
    fn check(&mut self, call: Call) -> Result<(), ServiceError> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn position(&self, id: &ResourceId) -> Option<usize> {
        self.records
            .iter()
            .position(|record| ResourceId::of(record).as_ref() == Some(id))
    }

    fn reply(&self, stored: ResourceItem) -> Value {
        self.write_reply
            .clone()
            .unwrap_or(Value::Object(stored))
    }
}

impl ResourceService for MemoryService {
    fn get_all(&self) -> Result<Value, ServiceError> {
        let mut store = self.lock();
        store.check(Call::GetAll)?;
        if let Some(raw) = &store.raw_listing {
            return Ok(raw.clone());
        }
        let records = Value::Array(store.records.iter().cloned().map(Value::Object).collect());
        Ok(match store.envelope {
            Envelope::Bare => records,
            Envelope::Results => json!({"count": store.records.len(), "results": records}),
            Envelope::Data => json!({"data": records}),
        })
    }

    fn create(&self, data: &ResourceItem) -> Result<Value, ServiceError> {
        let mut store = self.lock();
        store.check(Call::Create(data.clone()))?;
        store.next_id += 1;
        let mut stored = ResourceItem::new();
        stored.insert("id".to_owned(), Value::from(store.next_id));
        for (key, value) in data {
            if key != "id" {
                stored.insert(key.clone(), value.clone());
            }
        }
        store.records.push(stored.clone());
        Ok(store.reply(stored))
    }

    fn update(&self, id: &ResourceId, data: &ResourceItem) -> Result<Value, ServiceError> {
        let mut store = self.lock();
        store.check(Call::Update(id.clone(), data.clone()))?;
        let Some(index) = store.position(id) else {
            return Err(not_found());
        };
        let mut stored = data.clone();
        stored.insert("id".to_owned(), id.to_value());
        store.records[index] = stored.clone();
        Ok(store.reply(stored))
    }

    fn delete(&self, id: &ResourceId) -> Result<(), ServiceError> {
        let mut store = self.lock();
        store.check(Call::Delete(id.clone()))?;
        let Some(index) = store.position(id) else {
            return Err(not_found());
        };
        store.records.remove(index);
        Ok(())
    }
}

pub fn not_found() -> ServiceError {
    ServiceError::Status {
        status: 404,
        body: json!({"detail": "Not found."}),
    }
}

pub fn bad_request(body: Value) -> ServiceError {
    ServiceError::Status { status: 400, body }
}

pub fn item(raw: Value) -> ResourceItem {
    match raw {
        Value::Object(map) => map,
        other => panic!("fixture must be a JSON object, got {other}"),
    }
}

pub fn items(raw: Value) -> Vec<ResourceItem> {
    match raw {
        Value::Array(values) => values.into_iter().map(item).collect(),
        other => panic!("fixture must be a JSON array, got {other}"),
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for shop-floor records. Each call hands out the next
/// integer id so generated rows can reference each other.
#[derive(Debug, Clone)]
pub struct ShopFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl ShopFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 0,
        }
    }

    pub fn workstation(&mut self) -> ResourceItem {
        let id = self.id();
        let kind = self.pick(&STATION_KINDS);
        item(json!({
            "id": id,
            "name": format!("{kind} {id:02}"),
            "description": format!("{kind} cell on line {}", self.int_range(1, 4)),
            "status": self.pick(&STATION_STATUSES),
        }))
    }

    pub fn material(&mut self) -> ResourceItem {
        let id = self.id();
        let (name, unit) = MATERIALS[self.rng.int_n(MATERIALS.len())];
        let quantity = self.int_range(0, 500);
        let reorder_level = self.int_range(10, 100);
        let status = if quantity <= reorder_level {
            "Low Stock"
        } else {
            "In Stock"
        };
        item(json!({
            "id": id,
            "name": name,
            "unit": unit,
            "quantity": quantity,
            "reorder_level": reorder_level,
            "cost_per_unit": format!("{}.{:02}", self.int_range(1, 900), self.int_range(0, 99)),
            "status": status,
        }))
    }

    pub fn product(&mut self) -> ResourceItem {
        let id = self.id();
        let category = self.pick(&PRODUCT_CATEGORIES);
        item(json!({
            "id": id,
            "name": format!("{} {}", category.trim_end_matches('s'), self.int_range(100, 999)),
            "status": "Active",
            "category": category,
            "price": self.int_range(5, 2_000),
            "manufacturingTime": format!("{} min", self.int_range(5, 240)),
        }))
    }

    /// Work order referencing `product` by id, the way the list endpoint
    /// returns it before the server inlines the nested record.
    pub fn work_order(&mut self, product: &ResourceItem) -> ResourceItem {
        let id = self.id();
        let created_at = self.timestamp();
        item(json!({
            "id": id,
            "product": product.get("id").cloned().unwrap_or(Value::Null),
            "quantity": self.int_range(1, 250),
            "status": self.pick(&ORDER_STATUSES),
            "priority": self.pick(&PRIORITIES),
            "notes": "",
            "created_at": created_at,
        }))
    }

    pub fn efficiency(&mut self, workstation: &ResourceItem) -> ResourceItem {
        let id = self.id();
        let processed = self.int_range(50, 1_000);
        let defects = self.int_range(0, processed / 10);
        let created_at = self.timestamp();
        item(json!({
            "id": id,
            "workstation": workstation.get("id").cloned().unwrap_or(Value::Null),
            "workstation_name": workstation.get("name").cloned().unwrap_or(Value::Null),
            "efficiency_percentage": self.int_range(40, 99),
            "performance_category": "STANDARD",
            "total_items_processed": processed,
            "total_items_with_defects": defects,
            "created_at": created_at,
        }))
    }

    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn timestamp(&mut self) -> String {
        let start = reference_now().unix_timestamp();
        let offset = self.int_range(0, 365 * 24 * 60 * 60);
        let when = OffsetDateTime::from_unix_timestamp(start + offset).expect("valid unix timestamp");
        when.format(&Rfc3339).expect("format timestamp")
    }
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

fn reference_now() -> OffsetDateTime {
    let date =
        Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1).expect("valid calendar date");
    date.with_time(Time::MIDNIGHT).assume_utc() - Duration::days(365)
}

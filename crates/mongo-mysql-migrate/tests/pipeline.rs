//! Full-pipeline tests against in-memory stores.
//!
//! The fakes implement the same store traits as the real MongoDB/MySQL
//! drivers: the target enforces primary-key uniqueness on `insert` and
//! full-row-tuple deduplication on `insert_ignore`, which is exactly the
//! behavior the destination schema provides via PRIMARY KEY and UNIQUE
//! constraints.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::{TimeZone, Utc};
use futures_util::stream::{self, StreamExt};
use mysql_async::Value;

use mongo_mysql_migrate::migrate::{run_steps, StepReport, STEP_NAMES};
use mongo_mysql_migrate::{DocumentStream, MigrateError, Result, Row, SourceStore, TargetStore};

// ===== In-memory stores =====

#[derive(Default)]
struct MemSource {
    collections: HashMap<&'static str, Vec<Document>>,
}

impl MemSource {
    fn insert(&mut self, collection: &'static str, doc: Document) {
        self.collections.entry(collection).or_default().push(doc);
    }
}

#[async_trait]
impl SourceStore for MemSource {
    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream> {
        let docs = self
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();
        Ok(stream::iter(docs.into_iter().map(Ok)).boxed())
    }

    async fn count_documents(&self, collection: &str) -> Result<u64> {
        Ok(self
            .collections
            .get(collection)
            .map_or(0, |docs| docs.len() as u64))
    }
}

#[derive(Default)]
struct MemTarget {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    fail_exists: AtomicBool,
}

impl MemTarget {
    fn count(&self, table: &str) -> u64 {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(0, |rows| rows.len() as u64)
    }

    fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn remove_first(&self, table: &str) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            if !rows.is_empty() {
                rows.remove(0);
            }
        }
    }

    fn row_id(row: &Row) -> Option<Value> {
        row.iter()
            .find(|(col, _)| *col == "id")
            .map(|(_, value)| value.clone())
    }
}

#[async_trait]
impl TargetStore for MemTarget {
    async fn insert(&self, table: &str, row: Row) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        if let Some(id) = Self::row_id(&row) {
            if rows.iter().any(|r| Self::row_id(r) == Some(id.clone())) {
                return Err(MigrateError::DuplicateKey {
                    table: table.to_string(),
                });
            }
        }
        rows.push(row);
        Ok(())
    }

    async fn insert_ignore(&self, table: &str, row: Row) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains(&row) {
            return Ok(false);
        }
        rows.push(row);
        Ok(true)
    }

    async fn exists(&self, table: &str, id: &str) -> Result<bool> {
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(MigrateError::Config("injected existence failure".into()));
        }
        let id_value = Value::from(id.to_string());
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(false, |rows| {
                rows.iter().any(|r| Self::row_id(r) == Some(id_value.clone()))
            }))
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        Ok(self.count(table))
    }
}

// ===== Fixtures =====

fn oid(n: u8) -> ObjectId {
    ObjectId::from_bytes([n; 12])
}

fn bdt(year: i32, month: u32, day: u32) -> bson::DateTime {
    bson::DateTime::from_chrono(Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap())
}

fn col(row: &Row, name: &str) -> Value {
    row.iter()
        .find(|(c, _)| *c == name)
        .map(|(_, v)| v.clone())
        .unwrap_or_else(|| panic!("no column {name}"))
}

fn find_table<'a>(reports: &'a [StepReport], table: &str) -> &'a mongo_mysql_migrate::TableReport {
    reports
        .iter()
        .flat_map(|r| r.tables.iter())
        .find(|t| t.table == table)
        .unwrap_or_else(|| panic!("no report for table {table}"))
}

/// The scenario from the acceptance checklist: 3 services, 2 organizations
/// (one with 2 demo uses), 1 package with 3 items and 1 bonus link.
fn seed_billing_dataset() -> MemSource {
    let mut source = MemSource::default();

    for (n, code) in [(1u8, "edo"), (2, "fiscal"), (3, "roaming")] {
        source.insert(
            "services",
            doc! {
                "_id": oid(n),
                "created_at": bdt(2022, 1, 1),
                "name": format!("Service {code}"),
                "code": code,
            },
        );
    }

    source.insert(
        "organizations",
        doc! {
            "_id": oid(10),
            "created_at": bdt(2022, 3, 1),
            "name": "Acme LLC",
            "inn": "301234567",
            "balance": 1500.0,
            "organization_code": "ACME",
            "offer_info": { "number": "OF-1", "date": bdt(2022, 3, 2) },
            "service_demo_uses": [
                { "_id": oid(41), "name": "Service edo", "code": "edo" },
                { "_id": oid(42), "name": "Service fiscal", "code": "fiscal" },
            ],
        },
    );
    source.insert(
        "organizations",
        doc! {
            "_id": oid(11),
            "created_at": bdt(2022, 4, 1),
            "name": "Globex",
        },
    );

    source.insert(
        "packages",
        doc! {
            "_id": oid(20),
            "created_at": bdt(2022, 2, 1),
            "name": "Starter",
            "price": 100_000.0,
            "service": { "_id": oid(1), "name": "Service edo", "code": "edo" },
            "items": [
                { "name": "Invoices", "code": 1, "limit": 100 },
                { "name": "Contracts", "code": 2, "limit": 50 },
                { "name": "Acts", "code": 3, "is_unlimited": true },
            ],
            "on_activation_bonus_packages": [ { "_id": oid(21) } ],
        },
    );

    source
}

// ===== Tests =====

#[tokio::test]
async fn test_end_to_end_counts_and_idempotent_rerun() {
    let source = seed_billing_dataset();
    let target = MemTarget::default();

    let reports = run_steps(&source, &target).await.unwrap();

    assert_eq!(target.count("services"), 3);
    assert_eq!(target.count("organizations"), 2);
    assert_eq!(target.count("organization_service_demo_uses"), 2);
    assert_eq!(target.count("packages"), 1);
    assert_eq!(target.count("package_items"), 3);
    assert_eq!(target.count("package_activation_bonus_packages"), 1);

    let services = find_table(&reports, "services");
    assert_eq!(services.source_documents, Some(3));
    assert_eq!(services.moved, 3);
    assert_eq!(services.skipped, 0);
    assert_eq!(services.rows_before, 0);
    assert_eq!(services.rows_after, 3);

    // Second run: identical destination counts, everything skipped.
    let reports = run_steps(&source, &target).await.unwrap();

    assert_eq!(target.count("services"), 3);
    assert_eq!(target.count("organizations"), 2);
    assert_eq!(target.count("organization_service_demo_uses"), 2);
    assert_eq!(target.count("packages"), 1);
    assert_eq!(target.count("package_items"), 3);
    assert_eq!(target.count("package_activation_bonus_packages"), 1);

    let services = find_table(&reports, "services");
    assert_eq!(services.moved, 0);
    assert_eq!(services.skipped, 3);
    let organizations = find_table(&reports, "organizations");
    assert_eq!(organizations.moved, 0);
    assert_eq!(organizations.skipped, 2);
    // Insert-or-ignore dropped every child as a duplicate of the full tuple.
    let demo_uses = find_table(&reports, "organization_service_demo_uses");
    assert_eq!(demo_uses.moved, 0);
    let items = find_table(&reports, "package_items");
    assert_eq!(items.moved, 0);
}

#[tokio::test]
async fn test_steps_run_in_dependency_order() {
    let source = seed_billing_dataset();
    let target = MemTarget::default();

    let reports = run_steps(&source, &target).await.unwrap();
    let names: Vec<&str> = reports.iter().map(|r| r.step.as_str()).collect();
    assert_eq!(names, STEP_NAMES);
}

#[tokio::test]
async fn test_rerun_does_not_update_existing_parent() {
    let mut source = seed_billing_dataset();
    let target = MemTarget::default();
    run_steps(&source, &target).await.unwrap();

    // The source document changes between runs; the already-migrated parent
    // row must keep its original values.
    source.collections.get_mut("organizations").unwrap()[0] = doc! {
        "_id": oid(10),
        "created_at": bdt(2022, 3, 1),
        "name": "Acme Renamed LLC",
    };
    run_steps(&source, &target).await.unwrap();

    let orgs = target.rows("organizations");
    let acme = orgs
        .iter()
        .find(|r| col(r, "id") == Value::from(oid(10).to_hex()))
        .unwrap();
    assert_eq!(col(acme, "name"), Value::from("Acme LLC".to_string()));
}

#[tokio::test]
async fn test_children_are_backfilled_for_existing_parent() {
    let source = seed_billing_dataset();
    let target = MemTarget::default();
    run_steps(&source, &target).await.unwrap();

    // Simulate a crash that lost child rows after the parent was written.
    target.remove_first("organization_service_demo_uses");
    target.remove_first("package_items");
    assert_eq!(target.count("organization_service_demo_uses"), 1);
    assert_eq!(target.count("package_items"), 2);

    let reports = run_steps(&source, &target).await.unwrap();

    assert_eq!(target.count("organization_service_demo_uses"), 2);
    assert_eq!(target.count("package_items"), 3);
    assert_eq!(find_table(&reports, "organization_service_demo_uses").moved, 1);
    assert_eq!(find_table(&reports, "package_items").moved, 1);
}

#[tokio::test]
async fn test_bought_package_items_get_fresh_ids_and_skip_with_parent() {
    let mut source = MemSource::default();
    source.insert(
        "boughtPackages",
        doc! {
            "_id": oid(30),
            "organization": { "_id": oid(10), "name": "Acme LLC", "inn": "301234567" },
            "package": {
                "_id": oid(20),
                "name": "Starter",
                "price": 100_000.0,
                "package_items": [
                    { "name": "Invoices", "code": 1, "limit": 100, "used_count": 7 },
                    { "name": "Contracts", "code": 2, "limit": 50 },
                ],
            },
            "bought_at": bdt(2023, 1, 10),
            "expires_at": bdt(2023, 2, 10),
            "is_auto_extend": true,
            "is_deleted": true,
            "price": 50_000.0,
        },
    );
    let target = MemTarget::default();

    run_steps(&source, &target).await.unwrap();
    run_steps(&source, &target).await.unwrap();

    // Parent skipped on the rerun, so items are not re-inserted.
    assert_eq!(target.count("bought_packages"), 1);
    assert_eq!(target.count("bought_package_items"), 2);

    let parents = target.rows("bought_packages");
    assert_eq!(col(&parents[0], "is_active"), Value::from(false));
    // Price snapshots the embedded package price, not the top-level amount.
    assert_eq!(col(&parents[0], "price"), Value::from(100_000.0));

    let items = target.rows("bought_package_items");
    let mut ids: Vec<Value> = items.iter().map(|r| col(r, "id")).collect();
    ids.dedup();
    assert_eq!(ids.len(), 2, "each item row gets its own minted id");
    for item in &items {
        assert_eq!(col(item, "bought_package_id"), Value::from(oid(30).to_hex()));
    }
}

#[tokio::test]
async fn test_charge_with_roaming_invoice_is_classified() {
    let mut source = MemSource::default();
    source.insert(
        "charges",
        doc! {
            "_id": oid(50),
            "created_at": bdt(2023, 5, 1),
            "organization": { "_id": oid(10) },
            "price": 1200.0,
            "package": { "_id": oid(30) },
            "service": { "code": "roaming" },
            "item": { "code": 4 },
            "roaming_invoice": {
                "_id": "inv-77",
                "number": "N-77",
                "date": bdt(2023, 4, 28),
            },
        },
    );
    // A second charge with no linked document at all.
    source.insert(
        "charges",
        doc! {
            "_id": oid(51),
            "created_at": bdt(2023, 6, 1),
            "price": 300.0,
        },
    );
    let target = MemTarget::default();

    run_steps(&source, &target).await.unwrap();

    let charges = target.rows("charges");
    let classified = charges
        .iter()
        .find(|r| col(r, "id") == Value::from(oid(50).to_hex()))
        .unwrap();
    assert_eq!(col(classified, "type"), Value::from(3));
    assert_eq!(col(classified, "object_id"), Value::from("inv-77".to_string()));
    assert_eq!(col(classified, "number"), Value::from("N-77".to_string()));
    assert_eq!(
        col(classified, "date1"),
        Value::from(bdt(2023, 4, 28).to_chrono().naive_utc())
    );
    assert_eq!(col(classified, "date2"), Value::NULL);

    let uncategorized = charges
        .iter()
        .find(|r| col(r, "id") == Value::from(oid(51).to_hex()))
        .unwrap();
    assert_eq!(col(uncategorized, "type"), Value::from(0));
    assert_eq!(col(uncategorized, "object_id"), Value::from(String::new()));
    assert_eq!(
        col(uncategorized, "date1"),
        Value::from(bdt(2023, 6, 1).to_chrono().naive_utc())
    );
}

#[tokio::test]
async fn test_payme_transaction_invalid_timestamps_fall_back_to_now() {
    let mut source = MemSource::default();
    source.insert(
        "paymeTransactions",
        doc! {
            "_id": oid(60),
            "created_at": bdt(1, 1, 1),
            "payme_transaction_id": "pm-1",
            "payme_created_at": bdt(1, 1, 1),
            "state": 2,
            "amount": 5000.0,
            "organization": { "_id": oid(10) },
        },
    );
    let target = MemTarget::default();

    run_steps(&source, &target).await.unwrap();

    let rows = target.rows("payme_transactions");
    let Value::Date(year, month, day, hour, minute, second, _) = col(&rows[0], "payme_created_at")
    else {
        panic!("payme_created_at not stored as a datetime");
    };
    let stored = Utc
        .with_ymd_and_hms(
            year as i32,
            month as u32,
            day as u32,
            hour as u32,
            minute as u32,
            second as u32,
        )
        .unwrap();
    let delta = (Utc::now() - stored).num_seconds().abs();
    assert!(delta <= 2, "expected a value within seconds of now, got {stored}");
}

#[tokio::test]
async fn test_existence_check_failure_degrades_to_duplicate_skip() {
    let source = seed_billing_dataset();
    let target = MemTarget::default();
    run_steps(&source, &target).await.unwrap();

    // Every existence check now errors; the run must still complete, with
    // the inserts themselves reporting the duplicates.
    target.fail_exists.store(true, Ordering::SeqCst);
    let reports = run_steps(&source, &target).await.unwrap();

    assert_eq!(target.count("services"), 3);
    assert_eq!(target.count("organizations"), 2);
    let services = find_table(&reports, "services");
    assert_eq!(services.moved, 0);
    assert_eq!(services.skipped, 3);
}

#[tokio::test]
async fn test_decode_failure_aborts_run_with_step_name() {
    let mut source = MemSource::default();
    source.insert("services", doc! { "name": "broken, no id" });
    let target = MemTarget::default();

    let err = run_steps(&source, &target).await.unwrap_err();
    match err {
        MigrateError::Step { step, source } => {
            assert_eq!(step, "services");
            assert!(matches!(*source, MigrateError::Decode { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_organization_nullable_fields_survive_absence() {
    let source = seed_billing_dataset();
    let target = MemTarget::default();
    run_steps(&source, &target).await.unwrap();

    let orgs = target.rows("organizations");
    let globex = orgs
        .iter()
        .find(|r| col(r, "id") == Value::from(oid(11).to_hex()))
        .unwrap();
    assert_eq!(col(globex, "inn"), Value::NULL);
    assert_eq!(col(globex, "deleted_at"), Value::NULL);
    assert_eq!(col(globex, "offer_date"), Value::NULL);
    assert_eq!(col(globex, "offer_number"), Value::from(String::new()));
}

//! Migration orchestration and the shared per-entity migrator plumbing.
//!
//! Ten migration steps run strictly sequentially in a fixed dependency
//! order: later steps insert rows referencing primary keys written by
//! earlier ones. The first failing step aborts the pipeline; its error is
//! wrapped with the step name and propagated.

mod balance_bindings;
mod bank_errors;
mod bought_packages;
mod charges;
mod credit_updates;
mod organizations;
mod packages;
mod payments;
mod payme_transactions;
mod services;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{MigrateError, Result};
use crate::source::{MongoSource, SourceStore};
use crate::target::{schema, MysqlTarget, Row, TargetStore};

/// The migration steps in execution order. The order encodes referential
/// dependency (services before packages, organizations and packages before
/// bought packages, bought packages before charges).
pub const STEP_NAMES: [&str; 10] = [
    "services",
    "organizations",
    "packages",
    "bought-packages",
    "charges",
    "payments",
    "payme-transactions",
    "organization-balance-bindings",
    "credit-updates",
    "bank-payment-auto-apply-errors",
];

/// Per-table counters reported by a migration step.
///
/// These are a diagnostic contract for the operator, not a correctness
/// contract.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    /// Destination table name.
    pub table: String,
    /// Documents counted at the source; `None` for denormalized child
    /// tables, which have no collection of their own.
    pub source_documents: Option<u64>,
    /// Rows present in the destination before the step ran.
    pub rows_before: u64,
    /// Rows written by this run.
    pub moved: u64,
    /// Documents skipped because their primary key already existed.
    pub skipped: u64,
    /// Rows present in the destination after the step ran.
    pub rows_after: u64,
}

/// Result of one named migration step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub tables: Vec<TableReport>,
}

/// Result of a full migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationSummary {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status.
    pub status: String,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Source documents seen across all steps.
    pub documents_seen: u64,

    /// Rows written across all tables.
    pub rows_moved: u64,

    /// Documents skipped as already migrated.
    pub rows_skipped: u64,

    /// Per-step reports.
    pub steps: Vec<StepReport>,
}

impl MigrationSummary {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Source-vs-destination count comparison for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct CountCheck {
    pub collection: String,
    pub table: String,
    pub source: u64,
    pub destination: u64,
    pub matches: bool,
}

/// Collection-to-parent-table pairing for count validation.
const ENTITY_COUNTS: [(&str, &str); 10] = [
    ("services", "services"),
    ("organizations", "organizations"),
    ("packages", "packages"),
    ("boughtPackages", "bought_packages"),
    ("charges", "charges"),
    ("payments", "payments"),
    ("paymeTransactions", "payme_transactions"),
    ("organizationBalanceBindings", "organization_balance_bindings"),
    ("creditUpdates", "credit_updates"),
    ("bankPaymentsAutoApplyErrors", "bank_payments_auto_apply_errors"),
];

/// Run every migration step against the given stores.
///
/// Steps run strictly sequentially; the first failure aborts the rest.
pub async fn run_steps(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(STEP_NAMES.len());
    reports.push(step("services", services::run(source, target)).await?);
    reports.push(step("organizations", organizations::run(source, target)).await?);
    reports.push(step("packages", packages::run(source, target)).await?);
    reports.push(step("bought-packages", bought_packages::run(source, target)).await?);
    reports.push(step("charges", charges::run(source, target)).await?);
    reports.push(step("payments", payments::run(source, target)).await?);
    reports.push(step("payme-transactions", payme_transactions::run(source, target)).await?);
    reports.push(
        step(
            "organization-balance-bindings",
            balance_bindings::run(source, target),
        )
        .await?,
    );
    reports.push(step("credit-updates", credit_updates::run(source, target)).await?);
    reports.push(
        step(
            "bank-payment-auto-apply-errors",
            bank_errors::run(source, target),
        )
        .await?,
    );
    Ok(reports)
}

/// Run one named step, logging its start/end markers and wrapping any
/// failure with the step name.
async fn step(
    name: &'static str,
    fut: impl Future<Output = Result<Vec<TableReport>>>,
) -> Result<StepReport> {
    info!(step = name, "Starting migration step");
    let tables = fut.await.map_err(|e| MigrateError::step(name, e))?;
    info!(step = name, "Completed migration step");
    Ok(StepReport {
        step: name.to_string(),
        tables,
    })
}

/// Compare source collection counts against destination parent tables.
pub async fn validate_counts(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<CountCheck>> {
    let mut checks = Vec::with_capacity(ENTITY_COUNTS.len());
    for (collection, table) in ENTITY_COUNTS {
        let src = source_count(source, collection).await;
        let dst = target_count(target, table).await;
        let matches = src == dst;
        if matches {
            info!(collection, table, count = src, "counts match");
        } else {
            warn!(collection, table, source = src, destination = dst, "count MISMATCH");
        }
        checks.push(CountCheck {
            collection: collection.to_string(),
            table: table.to_string(),
            source: src,
            destination: dst,
            matches,
        });
    }
    Ok(checks)
}

/// Top-level migration handle owning both store connections.
pub struct Migrator {
    source: MongoSource,
    target: MysqlTarget,
}

impl Migrator {
    /// Connect to both stores.
    pub async fn new(config: Config) -> Result<Self> {
        let source = MongoSource::connect(&config.source).await?;
        let target = MysqlTarget::connect(&config.target).await?;
        Ok(Self { source, target })
    }

    /// Prepare the destination schema. With `reset`, existing tables are
    /// dropped first; otherwise tables are only created when missing so
    /// that re-runs keep previously migrated rows.
    pub async fn prepare_schema(&self, reset: bool) -> Result<()> {
        if reset {
            schema::reset_tables(&self.target).await
        } else {
            schema::ensure_tables(&self.target).await
        }
    }

    /// Run all migration steps and build the run summary.
    pub async fn run(&self) -> Result<MigrationSummary> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!(run_id = %run_id, "Starting migration run");

        let steps = run_steps(&self.source, &self.target).await?;

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let mut documents_seen = 0;
        let mut rows_moved = 0;
        let mut rows_skipped = 0;
        for report in &steps {
            for table in &report.tables {
                documents_seen += table.source_documents.unwrap_or(0);
                rows_moved += table.moved;
                rows_skipped += table.skipped;
            }
        }

        let summary = MigrationSummary {
            run_id,
            status: "completed".to_string(),
            started_at,
            completed_at,
            duration_seconds: duration,
            documents_seen,
            rows_moved,
            rows_skipped,
            steps,
        };

        info!(
            "Migration {}: {} documents, {} rows moved, {} skipped in {:.1}s",
            summary.status,
            summary.documents_seen,
            summary.rows_moved,
            summary.rows_skipped,
            summary.duration_seconds
        );

        Ok(summary)
    }

    /// Compare per-entity counts between source and destination.
    pub async fn validate(&self) -> Result<Vec<CountCheck>> {
        validate_counts(&self.source, &self.target).await
    }

    /// Verify both store connections.
    pub async fn health_check(&self) -> Result<()> {
        self.source.ping().await?;
        self.target.test_connection().await?;
        Ok(())
    }
}

// ===== Shared per-entity plumbing =====

/// Decode a raw document into its typed representation. A failure is fatal
/// and carries the collection and record id for the operator.
pub(crate) fn decode<T: DeserializeOwned>(collection: &str, doc: bson::Document) -> Result<T> {
    let record = doc
        .get_object_id("_id")
        .map(|oid| oid.to_hex())
        .unwrap_or_else(|_| "<unknown>".to_string());
    bson::from_document(doc).map_err(|e| MigrateError::decode(collection, record, e))
}

/// Primary-key existence check. A failed check degrades to "does not
/// exist" with a warning so a transient destination read error does not
/// halt the run; a genuinely existing row then surfaces as a duplicate-key
/// skip on insert.
pub(crate) async fn row_exists(target: &dyn TargetStore, table: &str, id: &str) -> bool {
    match target.exists(table, id).await {
        Ok(exists) => exists,
        Err(e) => {
            warn!(table, record = id, error = %e, "existence check failed, assuming new");
            false
        }
    }
}

/// Source document count; failures degrade to 0 with a warning.
pub(crate) async fn source_count(source: &dyn SourceStore, collection: &str) -> u64 {
    match source.count_documents(collection).await {
        Ok(count) => count,
        Err(e) => {
            warn!(collection, error = %e, "could not count source documents");
            0
        }
    }
}

/// Destination row count; failures degrade to 0 with a warning.
pub(crate) async fn target_count(target: &dyn TargetStore, table: &str) -> u64 {
    match target.count_rows(table).await {
        Ok(count) => count,
        Err(e) => {
            warn!(table, error = %e, "could not count destination rows");
            0
        }
    }
}

/// Insert a parent row. Returns whether the row was written; a duplicate
/// key is absorbed as "already migrated" (the existence check may have
/// reported a false negative), any other failure is fatal.
pub(crate) async fn insert_parent(
    target: &dyn TargetStore,
    table: &str,
    id: &str,
    row: Row,
) -> Result<bool> {
    match target.insert(table, row).await {
        Ok(()) => Ok(true),
        Err(MigrateError::DuplicateKey { .. }) => {
            warn!(table, record = id, "row already present, counting as skipped");
            Ok(false)
        }
        Err(e) => Err(MigrateError::insert(table, id, e)),
    }
}

/// Insert a denormalized child row with insert-or-ignore semantics.
/// Returns whether a row was actually written.
pub(crate) async fn insert_child(
    target: &dyn TargetStore,
    table: &str,
    parent_id: &str,
    row: Row,
) -> Result<bool> {
    target
        .insert_ignore(table, row)
        .await
        .map_err(|e| MigrateError::insert(table, parent_id, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order_is_fixed() {
        assert_eq!(STEP_NAMES[0], "services");
        assert_eq!(STEP_NAMES[3], "bought-packages");
        assert_eq!(STEP_NAMES[4], "charges");
        assert_eq!(STEP_NAMES[9], "bank-payment-auto-apply-errors");
        // Dependency constraints encoded by the order.
        let pos = |s: &str| STEP_NAMES.iter().position(|n| *n == s).unwrap();
        assert!(pos("services") < pos("packages"));
        assert!(pos("organizations") < pos("bought-packages"));
        assert!(pos("packages") < pos("bought-packages"));
        assert!(pos("bought-packages") < pos("charges"));
    }

    #[test]
    fn test_decode_reports_record_id() {
        use bson::doc;
        let oid = bson::oid::ObjectId::new();
        // `_id` present but `name` has the wrong type for a String field.
        let doc = doc! { "_id": oid, "name": 42 };
        let err = decode::<crate::model::docs::ServiceDoc>("services", doc).unwrap_err();
        match err {
            MigrateError::Decode { collection, record, .. } => {
                assert_eq!(collection, "services");
                assert_eq!(record, oid.to_hex());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

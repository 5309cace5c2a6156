//! Organizations migration: `organizations` collection → `organizations`
//! table plus the denormalized `organization_service_demo_uses` child table.
//!
//! Demo-use children are (re-)written with insert-or-ignore even when the
//! parent organization is skipped as already migrated, so an interrupted
//! earlier run cannot leave a parent without its children.

use futures_util::TryStreamExt;
use tracing::info;

use crate::datetime::sanitize_opt;
use crate::error::Result;
use crate::migrate::{
    decode, insert_child, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::OrganizationDoc;
use crate::model::rows::{OrganizationRow, ServiceDemoUseRow};
use crate::model::{ts, ts_or_epoch};
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "organizations";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, OrganizationRow::TABLE).await;
    let demo_before = target_count(target, ServiceDemoUseRow::TABLE).await;
    info!(
        source = src_count,
        destination_before = before,
        demo_uses_before = demo_before,
        "organizations"
    );

    let mut moved = 0u64;
    let mut skipped = 0u64;
    let mut demo_moved = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let org: OrganizationDoc = decode(COLLECTION, doc)?;
        let id = org.id.to_hex();
        let created_at = ts_or_epoch(&org.created_at);

        if row_exists(target, OrganizationRow::TABLE, &id).await {
            skipped += 1;
            // Still backfill demo uses for an already-migrated organization.
            demo_moved += write_demo_uses(target, &id, created_at, &org).await?;
            continue;
        }

        let row = OrganizationRow {
            id: id.clone(),
            created_at,
            updated_at: sanitize_opt(ts(&org.updated_at)),
            deleted_at: sanitize_opt(ts(&org.deleted_at)),
            is_deleted: org.is_deleted,
            name: org.name.clone(),
            inn: org.inn.clone(),
            pinfl: org.pinfl.clone(),
            balance: org.balance,
            fiscalization_balance: org.fiscalization_balance,
            reserved_fiscalization_balance: org.reserved_fiscalization_balance,
            total_payments: org.total_payments,
            credit_amount: org.credit_amount,
            organization_code: org.organization_code.clone(),
            referral_agent_code: org.referral_agent_code.clone(),
            white_label: org.white_label.clone(),
            offer_number: org.offer_info.number.clone(),
            offer_date: sanitize_opt(ts(&org.offer_info.date)),
        };

        if insert_parent(target, OrganizationRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }

        demo_moved += write_demo_uses(target, &id, created_at, &org).await?;
    }

    let after = target_count(target, OrganizationRow::TABLE).await;
    let demo_after = target_count(target, ServiceDemoUseRow::TABLE).await;
    info!(
        moved,
        skipped,
        demo_uses_moved = demo_moved,
        destination_after = after,
        demo_uses_after = demo_after,
        "organizations done"
    );

    Ok(vec![
        TableReport {
            table: OrganizationRow::TABLE.to_string(),
            source_documents: Some(src_count),
            rows_before: before,
            moved,
            skipped,
            rows_after: after,
        },
        TableReport {
            table: ServiceDemoUseRow::TABLE.to_string(),
            source_documents: None,
            rows_before: demo_before,
            moved: demo_moved,
            skipped: 0,
            rows_after: demo_after,
        },
    ])
}

async fn write_demo_uses(
    target: &dyn TargetStore,
    org_id: &str,
    used_at: chrono::DateTime<chrono::Utc>,
    org: &OrganizationDoc,
) -> Result<u64> {
    let mut written = 0u64;
    for demo_use in &org.service_demo_uses {
        let row = ServiceDemoUseRow {
            organization_id: org_id.to_string(),
            service_code: demo_use.code.clone(),
            used_at,
        };
        if insert_child(target, ServiceDemoUseRow::TABLE, org_id, row.into_row()).await? {
            written += 1;
        }
    }
    Ok(written)
}

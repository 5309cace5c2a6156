//! Organization-balance-bindings migration: `organizationBalanceBindings`
//! collection → `organization_balance_bindings` table.

use futures_util::TryStreamExt;
use tracing::info;

use crate::datetime::sanitize_opt;
use crate::error::Result;
use crate::migrate::{
    decode, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::BalanceBindingDoc;
use crate::model::rows::BalanceBindingRow;
use crate::model::{hex_or_empty, ts, ts_or_epoch};
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "organizationBalanceBindings";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, BalanceBindingRow::TABLE).await;
    info!(
        source = src_count,
        destination_before = before,
        "organization-balance-bindings"
    );

    let mut moved = 0u64;
    let mut skipped = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let binding: BalanceBindingDoc = decode(COLLECTION, doc)?;
        let id = binding.id.to_hex();

        if row_exists(target, BalanceBindingRow::TABLE, &id).await {
            skipped += 1;
            continue;
        }

        let row = BalanceBindingRow {
            id: id.clone(),
            created_at: ts_or_epoch(&binding.created_at),
            deleted_at: sanitize_opt(ts(&binding.deleted_at)),
            is_deleted: binding.is_deleted,
            payer_organization_id: hex_or_empty(&binding.payer_organization.id),
            target_organization_id: hex_or_empty(&binding.target_organization.id),
            payer_organization_name: binding.payer_organization.name.clone(),
            target_organization_name: binding.target_organization.name.clone(),
        };

        if insert_parent(target, BalanceBindingRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }
    }

    let after = target_count(target, BalanceBindingRow::TABLE).await;
    info!(
        moved,
        skipped,
        destination_after = after,
        "organization-balance-bindings done"
    );

    Ok(vec![TableReport {
        table: BalanceBindingRow::TABLE.to_string(),
        source_documents: Some(src_count),
        rows_before: before,
        moved,
        skipped,
        rows_after: after,
    }])
}

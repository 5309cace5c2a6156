//! Credit-updates migration: `creditUpdates` collection → `credit_updates`
//! table.

use futures_util::TryStreamExt;
use tracing::info;

use crate::error::Result;
use crate::migrate::{
    decode, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::CreditUpdateDoc;
use crate::model::rows::CreditUpdateRow;
use crate::model::{hex_or_empty, ts_or_epoch};
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "creditUpdates";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, CreditUpdateRow::TABLE).await;
    info!(
        source = src_count,
        destination_before = before,
        "credit-updates"
    );

    let mut moved = 0u64;
    let mut skipped = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let update: CreditUpdateDoc = decode(COLLECTION, doc)?;
        let id = update.id.to_hex();

        if row_exists(target, CreditUpdateRow::TABLE, &id).await {
            skipped += 1;
            continue;
        }

        let row = CreditUpdateRow {
            id: id.clone(),
            created_at: ts_or_epoch(&update.created_at),
            organization_id: hex_or_empty(&update.organization.id),
            amount: update.amount,
            account_id: hex_or_empty(&update.account.id),
        };

        if insert_parent(target, CreditUpdateRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }
    }

    let after = target_count(target, CreditUpdateRow::TABLE).await;
    info!(
        moved,
        skipped,
        destination_after = after,
        "credit-updates done"
    );

    Ok(vec![TableReport {
        table: CreditUpdateRow::TABLE.to_string(),
        source_documents: Some(src_count),
        rows_before: before,
        moved,
        skipped,
        rows_after: after,
    }])
}

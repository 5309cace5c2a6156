//! Payments migration: `payments` collection → `payments` table.

use futures_util::TryStreamExt;
use tracing::info;

use crate::error::Result;
use crate::migrate::{
    decode, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::PaymentDoc;
use crate::model::rows::PaymentRow;
use crate::model::{hex_or_empty, ts_or_epoch};
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "payments";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, PaymentRow::TABLE).await;
    info!(source = src_count, destination_before = before, "payments");

    let mut moved = 0u64;
    let mut skipped = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let payment: PaymentDoc = decode(COLLECTION, doc)?;
        let id = payment.id.to_hex();

        if row_exists(target, PaymentRow::TABLE, &id).await {
            skipped += 1;
            continue;
        }

        let row = PaymentRow {
            id: id.clone(),
            created_at: ts_or_epoch(&payment.created_at),
            amount: payment.amount,
            organization_id: hex_or_empty(&payment.organization.id),
            account_id: hex_or_empty(&payment.account.id),
            method: payment.method,
            bank_transaction_id: payment.bank_transaction_id,
        };

        if insert_parent(target, PaymentRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }
    }

    let after = target_count(target, PaymentRow::TABLE).await;
    info!(moved, skipped, destination_after = after, "payments done");

    Ok(vec![TableReport {
        table: PaymentRow::TABLE.to_string(),
        source_documents: Some(src_count),
        rows_before: before,
        moved,
        skipped,
        rows_after: after,
    }])
}

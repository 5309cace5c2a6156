//! Payme-transactions migration: `paymeTransactions` collection →
//! `payme_transactions` table.
//!
//! `payme_created_at` is the one mandatory destination timestamp with a
//! fallback chain: provider timestamp → document creation timestamp →
//! migration time.

use futures_util::TryStreamExt;
use tracing::info;

use crate::datetime::{sanitize_opt, sanitize_required};
use crate::error::Result;
use crate::migrate::{
    decode, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::PaymeTransactionDoc;
use crate::model::rows::PaymeTransactionRow;
use crate::model::{hex_or_empty, ts, ts_or_epoch};
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "paymeTransactions";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, PaymeTransactionRow::TABLE).await;
    info!(
        source = src_count,
        destination_before = before,
        "payme-transactions"
    );

    let mut moved = 0u64;
    let mut skipped = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let tx: PaymeTransactionDoc = decode(COLLECTION, doc)?;
        let id = tx.id.to_hex();

        if row_exists(target, PaymeTransactionRow::TABLE, &id).await {
            skipped += 1;
            continue;
        }

        let row = PaymeTransactionRow {
            id: id.clone(),
            created_at: ts_or_epoch(&tx.created_at),
            payme_transaction_id: tx.payme_transaction_id.clone(),
            payme_created_at: sanitize_required(ts(&tx.payme_created_at), ts(&tx.created_at)),
            system_completed_at: sanitize_opt(ts(&tx.system_completed_at)),
            state: tx.state,
            amount: tx.amount,
            payment_id: tx.payment_id.clone(),
            organization_id: hex_or_empty(&tx.organization.id),
            reason: tx.reason,
            system_canceled_at: sanitize_opt(ts(&tx.system_canceled_at)),
        };

        if insert_parent(target, PaymeTransactionRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }
    }

    let after = target_count(target, PaymeTransactionRow::TABLE).await;
    info!(
        moved,
        skipped,
        destination_after = after,
        "payme-transactions done"
    );

    Ok(vec![TableReport {
        table: PaymeTransactionRow::TABLE.to_string(),
        source_documents: Some(src_count),
        rows_before: before,
        moved,
        skipped,
        rows_after: after,
    }])
}

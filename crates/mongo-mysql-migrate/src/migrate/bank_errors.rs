//! Bank-payment-auto-apply-errors migration: `bankPaymentsAutoApplyErrors`
//! collection → `bank_payments_auto_apply_errors` table.

use futures_util::TryStreamExt;
use tracing::info;

use crate::error::Result;
use crate::migrate::{
    decode, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::BankErrorDoc;
use crate::model::rows::BankErrorRow;
use crate::model::ts_or_epoch;
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "bankPaymentsAutoApplyErrors";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, BankErrorRow::TABLE).await;
    info!(
        source = src_count,
        destination_before = before,
        "bank-payment-auto-apply-errors"
    );

    let mut moved = 0u64;
    let mut skipped = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let error_doc: BankErrorDoc = decode(COLLECTION, doc)?;
        let id = error_doc.id.to_hex();

        if row_exists(target, BankErrorRow::TABLE, &id).await {
            skipped += 1;
            continue;
        }

        let row = BankErrorRow {
            id: id.clone(),
            created_at: ts_or_epoch(&error_doc.created_at),
            error_message: error_doc.error_message,
            amount: error_doc.amount,
            transaction_id: error_doc.transaction_id,
            payer_inn: error_doc.payer_inn,
            payer_name: error_doc.payer_name,
            description: error_doc.description,
            resolved: error_doc.resolved,
        };

        if insert_parent(target, BankErrorRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }
    }

    let after = target_count(target, BankErrorRow::TABLE).await;
    info!(
        moved,
        skipped,
        destination_after = after,
        "bank-payment-auto-apply-errors done"
    );

    Ok(vec![TableReport {
        table: BankErrorRow::TABLE.to_string(),
        source_documents: Some(src_count),
        rows_before: before,
        moved,
        skipped,
        rows_after: after,
    }])
}

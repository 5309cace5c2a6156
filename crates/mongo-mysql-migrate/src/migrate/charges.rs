//! Charges migration: `charges` collection → `charges` table.
//!
//! The `type`, `object_id`, `number`, `date1` and `date2` columns are
//! derived by the linked-document resolver rather than copied.

use futures_util::TryStreamExt;
use tracing::{debug, info};

use crate::charge_link;
use crate::datetime::sanitize_opt;
use crate::error::Result;
use crate::migrate::{
    decode, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::ChargeDoc;
use crate::model::rows::ChargeRow;
use crate::model::{hex_or_empty, ts_or_epoch};
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "charges";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, ChargeRow::TABLE).await;
    info!(source = src_count, destination_before = before, "charges");

    let mut moved = 0u64;
    let mut skipped = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let charge: ChargeDoc = decode(COLLECTION, doc)?;
        let id = charge.id.to_hex();

        if row_exists(target, ChargeRow::TABLE, &id).await {
            skipped += 1;
            continue;
        }

        let created_at = ts_or_epoch(&charge.created_at);
        let link = charge_link::resolve(&charge, created_at);
        debug!(record = %id, charge_type = link.code, "charge classified");

        let row = ChargeRow {
            id: id.clone(),
            created_at,
            is_deleted: charge.is_deleted,
            organization_id: hex_or_empty(&charge.organization.id),
            price: charge.price,
            charge_type: link.code,
            bought_package_id: hex_or_empty(&charge.package.id),
            bought_package_item_code: charge.item.code,
            service_code: charge.service.code.clone(),
            object_id: link.object_id,
            number: link.number,
            date1: sanitize_opt(link.date1),
            date2: sanitize_opt(link.date2),
        };

        if insert_parent(target, ChargeRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }
    }

    let after = target_count(target, ChargeRow::TABLE).await;
    info!(moved, skipped, destination_after = after, "charges done");

    Ok(vec![TableReport {
        table: ChargeRow::TABLE.to_string(),
        source_documents: Some(src_count),
        rows_before: before,
        moved,
        skipped,
        rows_after: after,
    }])
}

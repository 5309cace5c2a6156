//! Services migration: `services` collection → `services` table.

use futures_util::TryStreamExt;
use tracing::info;

use crate::error::Result;
use crate::migrate::{
    decode, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::ServiceDoc;
use crate::model::rows::ServiceRow;
use crate::model::ts_or_epoch;
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "services";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, ServiceRow::TABLE).await;
    info!(source = src_count, destination_before = before, "services");

    let mut moved = 0u64;
    let mut skipped = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let service: ServiceDoc = decode(COLLECTION, doc)?;
        let id = service.id.to_hex();

        if row_exists(target, ServiceRow::TABLE, &id).await {
            skipped += 1;
            continue;
        }

        let row = ServiceRow {
            id: id.clone(),
            created_at: ts_or_epoch(&service.created_at),
            name: service.name,
            code: service.code,
        };

        if insert_parent(target, ServiceRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }
    }

    let after = target_count(target, ServiceRow::TABLE).await;
    info!(moved, skipped, destination_after = after, "services done");

    Ok(vec![TableReport {
        table: ServiceRow::TABLE.to_string(),
        source_documents: Some(src_count),
        rows_before: before,
        moved,
        skipped,
        rows_after: after,
    }])
}

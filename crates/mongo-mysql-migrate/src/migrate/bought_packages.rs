//! Bought-packages migration: `boughtPackages` collection →
//! `bought_packages` table plus `bought_package_items`.
//!
//! Item rows are embedded in the source without identifiers of their own, so
//! each gets a freshly minted ObjectId hex. They are written with a plain
//! insert alongside their freshly created parent and, unlike the other child
//! tables, are not re-written when the parent is skipped.

use bson::oid::ObjectId;
use futures_util::TryStreamExt;
use tracing::info;

use crate::error::{MigrateError, Result};
use crate::migrate::{
    decode, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::BoughtPackageDoc;
use crate::model::rows::{BoughtPackageItemRow, BoughtPackageRow};
use crate::model::{hex_or_empty, ts_or_epoch};
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "boughtPackages";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, BoughtPackageRow::TABLE).await;
    let items_before = target_count(target, BoughtPackageItemRow::TABLE).await;
    info!(
        source = src_count,
        destination_before = before,
        items_before,
        "bought-packages"
    );

    let mut moved = 0u64;
    let mut skipped = 0u64;
    let mut items_moved = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let bought: BoughtPackageDoc = decode(COLLECTION, doc)?;
        let id = bought.id.to_hex();

        if row_exists(target, BoughtPackageRow::TABLE, &id).await {
            skipped += 1;
            continue;
        }

        let row = BoughtPackageRow {
            id: id.clone(),
            organization_id: hex_or_empty(&bought.organization.id),
            package_id: hex_or_empty(&bought.package.id),
            bought_at: ts_or_epoch(&bought.bought_at),
            expires_at: ts_or_epoch(&bought.expires_at),
            is_auto_extend: bought.is_auto_extend,
            is_active: !bought.is_deleted,
            // The price column snapshots the embedded package's price, not
            // the top-level charge amount.
            price: bought.package.price,
        };

        if !insert_parent(target, BoughtPackageRow::TABLE, &id, row.into_row()).await? {
            skipped += 1;
            continue;
        }
        moved += 1;

        for item in &bought.package.package_items {
            let item_id = ObjectId::new().to_hex();
            let item_row = BoughtPackageItemRow {
                id: item_id.clone(),
                bought_package_id: id.clone(),
                name: item.name.clone(),
                code: item.code,
                is_over_limit_allowed: item.is_over_limit_allowed,
                over_limit_price: item.over_limit_price,
                is_unlimited: item.is_unlimited,
                limit_value: item.limit,
                used_count: item.used_count,
            };
            // Fresh ids cannot collide; any failure here is fatal.
            target
                .insert(BoughtPackageItemRow::TABLE, item_row.into_row())
                .await
                .map_err(|e| MigrateError::insert(BoughtPackageItemRow::TABLE, item_id.as_str(), e))?;
            items_moved += 1;
        }
    }

    let after = target_count(target, BoughtPackageRow::TABLE).await;
    let items_after = target_count(target, BoughtPackageItemRow::TABLE).await;
    info!(
        moved,
        skipped,
        items_moved,
        destination_after = after,
        items_after,
        "bought-packages done"
    );

    Ok(vec![
        TableReport {
            table: BoughtPackageRow::TABLE.to_string(),
            source_documents: Some(src_count),
            rows_before: before,
            moved,
            skipped,
            rows_after: after,
        },
        TableReport {
            table: BoughtPackageItemRow::TABLE.to_string(),
            source_documents: None,
            rows_before: items_before,
            moved: items_moved,
            skipped: 0,
            rows_after: items_after,
        },
    ])
}

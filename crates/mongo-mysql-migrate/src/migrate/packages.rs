//! Packages migration: `packages` collection → `packages` table plus the
//! denormalized `package_items` and `package_activation_bonus_packages`
//! child tables.
//!
//! Like organizations, children are (re-)written with insert-or-ignore even
//! for an already-migrated parent.

use futures_util::TryStreamExt;
use tracing::info;

use crate::error::Result;
use crate::migrate::{
    decode, insert_child, insert_parent, row_exists, source_count, target_count, TableReport,
};
use crate::model::docs::PackageDoc;
use crate::model::rows::{BonusPackageRow, PackageItemRow, PackageRow};
use crate::model::{hex_or_empty, ts_or_epoch};
use crate::source::SourceStore;
use crate::target::TargetStore;

const COLLECTION: &str = "packages";

pub(crate) async fn run(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
) -> Result<Vec<TableReport>> {
    let src_count = source_count(source, COLLECTION).await;
    let before = target_count(target, PackageRow::TABLE).await;
    let items_before = target_count(target, PackageItemRow::TABLE).await;
    let bonus_before = target_count(target, BonusPackageRow::TABLE).await;
    info!(
        source = src_count,
        destination_before = before,
        items_before,
        bonus_before,
        "packages"
    );

    let mut moved = 0u64;
    let mut skipped = 0u64;
    let mut items_moved = 0u64;
    let mut bonus_moved = 0u64;

    let mut docs = source.stream_collection(COLLECTION).await?;
    while let Some(doc) = docs.try_next().await? {
        let package: PackageDoc = decode(COLLECTION, doc)?;
        let id = package.id.to_hex();

        if row_exists(target, PackageRow::TABLE, &id).await {
            skipped += 1;
            let (items, bonus) = write_children(target, &id, &package).await?;
            items_moved += items;
            bonus_moved += bonus;
            continue;
        }

        let row = PackageRow {
            id: id.clone(),
            created_at: ts_or_epoch(&package.created_at),
            is_deleted: package.is_deleted,
            name: package.name.clone(),
            price: package.price,
            brv_rate: package.brv_rate,
            duration_days: package.duration_days,
            duration_months: package.duration_months,
            is_demo: package.is_demo,
            is_public: package.is_public,
            service_code: package.service.code.clone(),
            default_set_on_new_organization: package.default_set_on_new_organization,
        };

        if insert_parent(target, PackageRow::TABLE, &id, row.into_row()).await? {
            moved += 1;
        } else {
            skipped += 1;
        }

        let (items, bonus) = write_children(target, &id, &package).await?;
        items_moved += items;
        bonus_moved += bonus;
    }

    let after = target_count(target, PackageRow::TABLE).await;
    let items_after = target_count(target, PackageItemRow::TABLE).await;
    let bonus_after = target_count(target, BonusPackageRow::TABLE).await;
    info!(
        moved,
        skipped,
        items_moved,
        bonus_moved,
        destination_after = after,
        "packages done"
    );

    Ok(vec![
        TableReport {
            table: PackageRow::TABLE.to_string(),
            source_documents: Some(src_count),
            rows_before: before,
            moved,
            skipped,
            rows_after: after,
        },
        TableReport {
            table: PackageItemRow::TABLE.to_string(),
            source_documents: None,
            rows_before: items_before,
            moved: items_moved,
            skipped: 0,
            rows_after: items_after,
        },
        TableReport {
            table: BonusPackageRow::TABLE.to_string(),
            source_documents: None,
            rows_before: bonus_before,
            moved: bonus_moved,
            skipped: 0,
            rows_after: bonus_after,
        },
    ])
}

/// Write the package's embedded items and activation-bonus links.
/// Returns how many rows of each kind were actually written.
async fn write_children(
    target: &dyn TargetStore,
    package_id: &str,
    package: &PackageDoc,
) -> Result<(u64, u64)> {
    let mut items_written = 0u64;
    for item in &package.items {
        let row = PackageItemRow {
            package_id: package_id.to_string(),
            name: item.name.clone(),
            code: item.code,
            is_over_limit_allowed: item.is_over_limit_allowed,
            over_limit_price: item.over_limit_price,
            brv_rate: item.brv_rate,
            is_unlimited: item.is_unlimited,
            limit: item.limit,
        };
        if insert_child(target, PackageItemRow::TABLE, package_id, row.into_row()).await? {
            items_written += 1;
        }
    }

    let mut bonus_written = 0u64;
    for bonus in &package.on_activation_bonus_packages {
        let row = BonusPackageRow {
            package_id: package_id.to_string(),
            bonus_package_id: hex_or_empty(&bonus.id),
        };
        if insert_child(target, BonusPackageRow::TABLE, package_id, row.into_row()).await? {
            bonus_written += 1;
        }
    }

    Ok((items_written, bonus_written))
}

//! Destination schema: DDL for the fourteen billing tables.
//!
//! Tables are created in dependency order and dropped in reverse. The
//! duplicate-tolerant child tables carry a UNIQUE key over their full
//! column tuple; that key is what gives `INSERT IGNORE` its
//! insert-or-ignore semantics on re-runs.

use tracing::{debug, info};

use crate::error::{MigrateError, Result};
use crate::target::MysqlTarget;

/// Destination tables in creation order, each with its DDL.
pub(crate) const TABLES: [(&str, &str); 14] = [
    (
        "services",
        "CREATE TABLE IF NOT EXISTS `services` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `name` VARCHAR(255) NOT NULL,
    `code` VARCHAR(36) NOT NULL,
    PRIMARY KEY (`id`),
    UNIQUE KEY `uniq_services_code` (`code`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "organizations",
        "CREATE TABLE IF NOT EXISTS `organizations` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `updated_at` DATETIME(6) NULL,
    `deleted_at` DATETIME(6) NULL,
    `is_deleted` TINYINT(1) NOT NULL,
    `name` VARCHAR(255) NOT NULL,
    `inn` VARCHAR(36) NULL,
    `pinfl` VARCHAR(36) NULL,
    `balance` DOUBLE NOT NULL,
    `fiscalization_balance` DOUBLE NOT NULL,
    `reserved_fiscalization_balance` DOUBLE NOT NULL,
    `total_payments` DOUBLE NOT NULL,
    `credit_amount` DOUBLE NOT NULL,
    `organization_code` VARCHAR(255) NOT NULL,
    `referral_agent_code` VARCHAR(255) NULL,
    `white_label` VARCHAR(255) NOT NULL,
    `offer_number` VARCHAR(255) NOT NULL,
    `offer_date` DATETIME(6) NULL,
    PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "organization_service_demo_uses",
        "CREATE TABLE IF NOT EXISTS `organization_service_demo_uses` (
    `organization_id` VARCHAR(36) NOT NULL,
    `service_code` VARCHAR(36) NOT NULL,
    `used_at` DATETIME(6) NOT NULL,
    UNIQUE KEY `uniq_demo_use` (`organization_id`, `service_code`, `used_at`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "packages",
        "CREATE TABLE IF NOT EXISTS `packages` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `is_deleted` TINYINT(1) NOT NULL,
    `name` VARCHAR(255) NOT NULL,
    `price` DOUBLE NOT NULL,
    `brv_rate` DOUBLE NOT NULL,
    `duration_days` INT NOT NULL,
    `duration_months` INT NOT NULL,
    `is_demo` TINYINT(1) NOT NULL,
    `is_public` TINYINT(1) NOT NULL,
    `service_code` VARCHAR(36) NOT NULL,
    `default_set_on_new_organization` TINYINT(1) NOT NULL,
    PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "package_items",
        "CREATE TABLE IF NOT EXISTS `package_items` (
    `package_id` VARCHAR(36) NOT NULL,
    `name` VARCHAR(255) NOT NULL,
    `code` INT NOT NULL,
    `is_over_limit_allowed` TINYINT(1) NOT NULL,
    `over_limit_price` DOUBLE NOT NULL,
    `brv_rate` DOUBLE NOT NULL,
    `is_unlimited` TINYINT(1) NOT NULL,
    `limit` INT NOT NULL,
    UNIQUE KEY `uniq_package_item` (`package_id`, `name`, `code`, `is_over_limit_allowed`, `over_limit_price`, `brv_rate`, `is_unlimited`, `limit`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "package_activation_bonus_packages",
        "CREATE TABLE IF NOT EXISTS `package_activation_bonus_packages` (
    `package_id` VARCHAR(36) NOT NULL,
    `bonus_package_id` VARCHAR(36) NOT NULL,
    UNIQUE KEY `uniq_bonus_package` (`package_id`, `bonus_package_id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "bought_packages",
        "CREATE TABLE IF NOT EXISTS `bought_packages` (
    `id` VARCHAR(36) NOT NULL,
    `organization_id` VARCHAR(36) NOT NULL,
    `package_id` VARCHAR(36) NOT NULL,
    `bought_at` DATETIME(6) NOT NULL,
    `expires_at` DATETIME(6) NOT NULL,
    `is_auto_extend` TINYINT(1) NOT NULL,
    `is_active` TINYINT(1) NOT NULL,
    `price` DOUBLE NOT NULL,
    PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "bought_package_items",
        "CREATE TABLE IF NOT EXISTS `bought_package_items` (
    `id` VARCHAR(36) NOT NULL,
    `bought_package_id` VARCHAR(36) NOT NULL,
    `name` VARCHAR(255) NOT NULL,
    `code` INT NOT NULL,
    `is_over_limit_allowed` TINYINT(1) NOT NULL,
    `over_limit_price` DOUBLE NOT NULL,
    `is_unlimited` TINYINT(1) NOT NULL,
    `limit_value` INT NOT NULL,
    `used_count` INT NOT NULL,
    PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "charges",
        "CREATE TABLE IF NOT EXISTS `charges` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `is_deleted` TINYINT(1) NOT NULL,
    `organization_id` VARCHAR(36) NOT NULL,
    `price` DOUBLE NOT NULL,
    `type` INT NOT NULL,
    `bought_package_id` VARCHAR(36) NOT NULL,
    `bought_package_item_code` INT NOT NULL,
    `service_code` VARCHAR(36) NOT NULL,
    `object_id` VARCHAR(36) NOT NULL,
    `number` VARCHAR(36) NOT NULL,
    `date1` DATETIME(6) NULL,
    `date2` DATETIME(6) NULL,
    PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "payments",
        "CREATE TABLE IF NOT EXISTS `payments` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `amount` DOUBLE NOT NULL,
    `organization_id` VARCHAR(36) NOT NULL,
    `account_id` VARCHAR(36) NOT NULL,
    `method` INT NOT NULL,
    `bank_transaction_id` VARCHAR(36) NULL,
    PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "payme_transactions",
        "CREATE TABLE IF NOT EXISTS `payme_transactions` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `payme_transaction_id` VARCHAR(36) NOT NULL,
    `payme_created_at` DATETIME(6) NOT NULL,
    `system_completed_at` DATETIME(6) NULL,
    `state` INT NOT NULL,
    `amount` DOUBLE NOT NULL,
    `payment_id` VARCHAR(36) NULL,
    `organization_id` VARCHAR(36) NOT NULL,
    `reason` INT NOT NULL,
    `system_canceled_at` DATETIME(6) NULL,
    PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "organization_balance_bindings",
        "CREATE TABLE IF NOT EXISTS `organization_balance_bindings` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `deleted_at` DATETIME(6) NULL,
    `is_deleted` TINYINT(1) NOT NULL,
    `payer_organization_id` VARCHAR(36) NOT NULL,
    `target_organization_id` VARCHAR(36) NOT NULL,
    `payer_organization_name` VARCHAR(255) NOT NULL,
    `target_organization_name` VARCHAR(255) NOT NULL,
    PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "credit_updates",
        "CREATE TABLE IF NOT EXISTS `credit_updates` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `organization_id` VARCHAR(36) NOT NULL,
    `amount` DOUBLE NOT NULL,
    `account_id` VARCHAR(36) NOT NULL,
    PRIMARY KEY (`id`),
    INDEX `idx_credit_updates_organization_id` (`organization_id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
    (
        "bank_payments_auto_apply_errors",
        "CREATE TABLE IF NOT EXISTS `bank_payments_auto_apply_errors` (
    `id` VARCHAR(36) NOT NULL,
    `created_at` DATETIME(6) NOT NULL,
    `error_message` TEXT NOT NULL,
    `amount` DOUBLE NOT NULL,
    `transaction_id` VARCHAR(36) NOT NULL,
    `payer_inn` VARCHAR(14) NOT NULL,
    `payer_name` VARCHAR(255) NOT NULL,
    `description` TEXT NULL,
    `resolved` TINYINT(1) NOT NULL,
    PRIMARY KEY (`id`),
    INDEX `idx_bank_errors_transaction_id` (`transaction_id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci",
    ),
];

/// Create every destination table that does not exist yet.
///
/// Existing tables and their rows are left untouched, so re-running the
/// migration exercises the per-record idempotency checks.
pub async fn ensure_tables(target: &MysqlTarget) -> Result<()> {
    for (name, ddl) in TABLES {
        target
            .execute(ddl)
            .await
            .map_err(|e| MigrateError::Schema(format!("creating table {name}: {e}")))?;
        debug!(table = name, "table ensured");
    }
    info!(tables = TABLES.len(), "Destination schema ready");
    Ok(())
}

/// Drop all destination tables (children first) and recreate them empty.
pub async fn reset_tables(target: &MysqlTarget) -> Result<()> {
    for (name, _) in TABLES.iter().rev() {
        target
            .execute(&format!("DROP TABLE IF EXISTS `{name}`"))
            .await
            .map_err(|e| MigrateError::Schema(format!("dropping table {name}: {e}")))?;
        debug!(table = name, "table dropped");
    }
    info!("Destination schema reset");
    ensure_tables(target).await
}

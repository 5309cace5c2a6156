//! MySQL row shapes and their column bindings.
//!
//! Each struct mirrors one destination table. `TABLE` names the table and
//! `into_row` produces the ordered `(column, value)` pairs handed to the
//! target store. Timestamps are bound as naive UTC datetimes; the session
//! time zone is fixed at connect time.

use chrono::{DateTime, Utc};
use mysql_async::Value;

use crate::target::Row;

fn dt(value: DateTime<Utc>) -> Value {
    Value::from(value.naive_utc())
}

fn dt_opt(value: Option<DateTime<Utc>>) -> Value {
    Value::from(value.map(|v| v.naive_utc()))
}

#[derive(Debug, Clone)]
pub struct ServiceRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub code: String,
}

impl ServiceRow {
    pub const TABLE: &'static str = "services";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("name", self.name.into()),
            ("code", self.code.into()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct OrganizationRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub name: String,
    pub inn: Option<String>,
    pub pinfl: Option<String>,
    pub balance: f64,
    pub fiscalization_balance: f64,
    pub reserved_fiscalization_balance: f64,
    pub total_payments: f64,
    pub credit_amount: f64,
    pub organization_code: String,
    pub referral_agent_code: Option<String>,
    pub white_label: String,
    pub offer_number: String,
    pub offer_date: Option<DateTime<Utc>>,
}

impl OrganizationRow {
    pub const TABLE: &'static str = "organizations";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("updated_at", dt_opt(self.updated_at)),
            ("deleted_at", dt_opt(self.deleted_at)),
            ("is_deleted", self.is_deleted.into()),
            ("name", self.name.into()),
            ("inn", self.inn.into()),
            ("pinfl", self.pinfl.into()),
            ("balance", self.balance.into()),
            ("fiscalization_balance", self.fiscalization_balance.into()),
            (
                "reserved_fiscalization_balance",
                self.reserved_fiscalization_balance.into(),
            ),
            ("total_payments", self.total_payments.into()),
            ("credit_amount", self.credit_amount.into()),
            ("organization_code", self.organization_code.into()),
            ("referral_agent_code", self.referral_agent_code.into()),
            ("white_label", self.white_label.into()),
            ("offer_number", self.offer_number.into()),
            ("offer_date", dt_opt(self.offer_date)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ServiceDemoUseRow {
    pub organization_id: String,
    pub service_code: String,
    pub used_at: DateTime<Utc>,
}

impl ServiceDemoUseRow {
    pub const TABLE: &'static str = "organization_service_demo_uses";

    pub fn into_row(self) -> Row {
        vec![
            ("organization_id", self.organization_id.into()),
            ("service_code", self.service_code.into()),
            ("used_at", dt(self.used_at)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PackageRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub name: String,
    pub price: f64,
    pub brv_rate: f64,
    pub duration_days: i32,
    pub duration_months: i32,
    pub is_demo: bool,
    pub is_public: bool,
    pub service_code: String,
    pub default_set_on_new_organization: bool,
}

impl PackageRow {
    pub const TABLE: &'static str = "packages";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("is_deleted", self.is_deleted.into()),
            ("name", self.name.into()),
            ("price", self.price.into()),
            ("brv_rate", self.brv_rate.into()),
            ("duration_days", self.duration_days.into()),
            ("duration_months", self.duration_months.into()),
            ("is_demo", self.is_demo.into()),
            ("is_public", self.is_public.into()),
            ("service_code", self.service_code.into()),
            (
                "default_set_on_new_organization",
                self.default_set_on_new_organization.into(),
            ),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PackageItemRow {
    pub package_id: String,
    pub name: String,
    pub code: i32,
    pub is_over_limit_allowed: bool,
    pub over_limit_price: f64,
    pub brv_rate: f64,
    pub is_unlimited: bool,
    pub limit: i32,
}

impl PackageItemRow {
    pub const TABLE: &'static str = "package_items";

    pub fn into_row(self) -> Row {
        vec![
            ("package_id", self.package_id.into()),
            ("name", self.name.into()),
            ("code", self.code.into()),
            ("is_over_limit_allowed", self.is_over_limit_allowed.into()),
            ("over_limit_price", self.over_limit_price.into()),
            ("brv_rate", self.brv_rate.into()),
            ("is_unlimited", self.is_unlimited.into()),
            ("limit", self.limit.into()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BonusPackageRow {
    pub package_id: String,
    pub bonus_package_id: String,
}

impl BonusPackageRow {
    pub const TABLE: &'static str = "package_activation_bonus_packages";

    pub fn into_row(self) -> Row {
        vec![
            ("package_id", self.package_id.into()),
            ("bonus_package_id", self.bonus_package_id.into()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BoughtPackageRow {
    pub id: String,
    pub organization_id: String,
    pub package_id: String,
    pub bought_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_auto_extend: bool,
    pub is_active: bool,
    pub price: f64,
}

impl BoughtPackageRow {
    pub const TABLE: &'static str = "bought_packages";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("organization_id", self.organization_id.into()),
            ("package_id", self.package_id.into()),
            ("bought_at", dt(self.bought_at)),
            ("expires_at", dt(self.expires_at)),
            ("is_auto_extend", self.is_auto_extend.into()),
            ("is_active", self.is_active.into()),
            ("price", self.price.into()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BoughtPackageItemRow {
    pub id: String,
    pub bought_package_id: String,
    pub name: String,
    pub code: i32,
    pub is_over_limit_allowed: bool,
    pub over_limit_price: f64,
    pub is_unlimited: bool,
    pub limit_value: i32,
    pub used_count: i32,
}

impl BoughtPackageItemRow {
    pub const TABLE: &'static str = "bought_package_items";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("bought_package_id", self.bought_package_id.into()),
            ("name", self.name.into()),
            ("code", self.code.into()),
            ("is_over_limit_allowed", self.is_over_limit_allowed.into()),
            ("over_limit_price", self.over_limit_price.into()),
            ("is_unlimited", self.is_unlimited.into()),
            ("limit_value", self.limit_value.into()),
            ("used_count", self.used_count.into()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ChargeRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub organization_id: String,
    pub price: f64,
    pub charge_type: i32,
    pub bought_package_id: String,
    pub bought_package_item_code: i32,
    pub service_code: String,
    pub object_id: String,
    pub number: String,
    pub date1: Option<DateTime<Utc>>,
    pub date2: Option<DateTime<Utc>>,
}

impl ChargeRow {
    pub const TABLE: &'static str = "charges";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("is_deleted", self.is_deleted.into()),
            ("organization_id", self.organization_id.into()),
            ("price", self.price.into()),
            ("type", self.charge_type.into()),
            ("bought_package_id", self.bought_package_id.into()),
            (
                "bought_package_item_code",
                self.bought_package_item_code.into(),
            ),
            ("service_code", self.service_code.into()),
            ("object_id", self.object_id.into()),
            ("number", self.number.into()),
            ("date1", dt_opt(self.date1)),
            ("date2", dt_opt(self.date2)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub amount: f64,
    pub organization_id: String,
    pub account_id: String,
    pub method: i32,
    pub bank_transaction_id: Option<String>,
}

impl PaymentRow {
    pub const TABLE: &'static str = "payments";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("amount", self.amount.into()),
            ("organization_id", self.organization_id.into()),
            ("account_id", self.account_id.into()),
            ("method", self.method.into()),
            ("bank_transaction_id", self.bank_transaction_id.into()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PaymeTransactionRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub payme_transaction_id: String,
    pub payme_created_at: DateTime<Utc>,
    pub system_completed_at: Option<DateTime<Utc>>,
    pub state: i32,
    pub amount: f64,
    pub payment_id: Option<String>,
    pub organization_id: String,
    pub reason: i32,
    pub system_canceled_at: Option<DateTime<Utc>>,
}

impl PaymeTransactionRow {
    pub const TABLE: &'static str = "payme_transactions";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("payme_transaction_id", self.payme_transaction_id.into()),
            ("payme_created_at", dt(self.payme_created_at)),
            ("system_completed_at", dt_opt(self.system_completed_at)),
            ("state", self.state.into()),
            ("amount", self.amount.into()),
            ("payment_id", self.payment_id.into()),
            ("organization_id", self.organization_id.into()),
            ("reason", self.reason.into()),
            ("system_canceled_at", dt_opt(self.system_canceled_at)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BalanceBindingRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub payer_organization_id: String,
    pub target_organization_id: String,
    pub payer_organization_name: String,
    pub target_organization_name: String,
}

impl BalanceBindingRow {
    pub const TABLE: &'static str = "organization_balance_bindings";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("deleted_at", dt_opt(self.deleted_at)),
            ("is_deleted", self.is_deleted.into()),
            ("payer_organization_id", self.payer_organization_id.into()),
            (
                "target_organization_id",
                self.target_organization_id.into(),
            ),
            (
                "payer_organization_name",
                self.payer_organization_name.into(),
            ),
            (
                "target_organization_name",
                self.target_organization_name.into(),
            ),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct CreditUpdateRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub organization_id: String,
    pub amount: f64,
    pub account_id: String,
}

impl CreditUpdateRow {
    pub const TABLE: &'static str = "credit_updates";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("organization_id", self.organization_id.into()),
            ("amount", self.amount.into()),
            ("account_id", self.account_id.into()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BankErrorRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub error_message: String,
    pub amount: f64,
    pub transaction_id: String,
    pub payer_inn: String,
    pub payer_name: String,
    pub description: Option<String>,
    pub resolved: bool,
}

impl BankErrorRow {
    pub const TABLE: &'static str = "bank_payments_auto_apply_errors";

    pub fn into_row(self) -> Row {
        vec![
            ("id", self.id.into()),
            ("created_at", dt(self.created_at)),
            ("error_message", self.error_message.into()),
            ("amount", self.amount.into()),
            ("transaction_id", self.transaction_id.into()),
            ("payer_inn", self.payer_inn.into()),
            ("payer_name", self.payer_name.into()),
            ("description", self.description.into()),
            ("resolved", self.resolved.into()),
        ]
    }
}

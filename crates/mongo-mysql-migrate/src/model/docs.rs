//! MongoDB document shapes for decoding.
//!
//! Decoding is tolerant by design: every field other than `_id` carries
//! `#[serde(default)]`, so absent optional fields and missing embedded
//! sub-objects become zero values instead of decode failures. A document
//! whose `_id` is missing or mistyped is malformed and fails the decode.

use bson::oid::ObjectId;
use bson::Document;
use serde::Deserialize;

/// Embedded reference carrying only an `_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdRefDoc {
    #[serde(rename = "_id", default)]
    pub id: Option<ObjectId>,
}

/// Embedded service reference; only the code survives migration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceRefDoc {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ServiceDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferInfoDoc {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: Option<bson::DateTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDemoUseDoc {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub updated_at: Option<bson::DateTime>,
    #[serde(default)]
    pub deleted_at: Option<bson::DateTime>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inn: Option<String>,
    #[serde(default)]
    pub pinfl: Option<String>,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub fiscalization_balance: f64,
    #[serde(default)]
    pub reserved_fiscalization_balance: f64,
    #[serde(default)]
    pub total_payments: f64,
    #[serde(default)]
    pub credit_amount: f64,
    #[serde(default)]
    pub organization_code: String,
    #[serde(default)]
    pub referral_agent_code: Option<String>,
    #[serde(default)]
    pub white_label: String,
    #[serde(default)]
    pub offer_info: OfferInfoDoc,
    #[serde(default)]
    pub service_demo_uses: Vec<ServiceDemoUseDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageItemDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub is_over_limit_allowed: bool,
    #[serde(default)]
    pub over_limit_price: f64,
    #[serde(default)]
    pub brv_rate: f64,
    #[serde(default)]
    pub is_unlimited: bool,
    #[serde(default)]
    pub limit: i32,
}

#[derive(Debug, Deserialize)]
pub struct PackageDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub brv_rate: f64,
    #[serde(default)]
    pub duration_days: i32,
    #[serde(default)]
    pub duration_months: i32,
    #[serde(default)]
    pub is_demo: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub service: ServiceRefDoc,
    #[serde(default)]
    pub items: Vec<PackageItemDoc>,
    #[serde(default)]
    pub default_set_on_new_organization: bool,
    #[serde(default)]
    pub on_activation_bonus_packages: Vec<IdRefDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoughtPackageItemDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub is_over_limit_allowed: bool,
    #[serde(default)]
    pub over_limit_price: f64,
    #[serde(default)]
    pub is_unlimited: bool,
    #[serde(default)]
    pub limit: i32,
    #[serde(default)]
    pub used_count: i32,
}

/// Package snapshot embedded inside a bought package.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoughtPackageRefDoc {
    #[serde(rename = "_id", default)]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub package_items: Vec<BoughtPackageItemDoc>,
}

#[derive(Debug, Deserialize)]
pub struct BoughtPackageDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub organization: IdRefDoc,
    #[serde(default)]
    pub package: BoughtPackageRefDoc,
    #[serde(default)]
    pub bought_at: Option<bson::DateTime>,
    #[serde(default)]
    pub expires_at: Option<bson::DateTime>,
    #[serde(default)]
    pub is_auto_extend: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargeItemDoc {
    #[serde(default)]
    pub code: i32,
}

#[derive(Debug, Deserialize)]
pub struct ChargeDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub organization: IdRefDoc,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub package: IdRefDoc,
    #[serde(default)]
    pub service: ServiceRefDoc,
    #[serde(default)]
    pub item: ChargeItemDoc,

    // Mutually exclusive linked-document sub-objects; kept as raw documents
    // because their shape varies and only a handful of fields is extracted.
    #[serde(default)]
    pub edi_return_invoice: Option<Document>,
    #[serde(default)]
    pub edi_attorney: Option<Document>,
    #[serde(default)]
    pub roaming_invoice: Option<Document>,
    #[serde(default)]
    pub roaming_contract: Option<Document>,
    #[serde(default)]
    pub roaming_waybill: Option<Document>,
    #[serde(default)]
    pub roaming_act: Option<Document>,
    #[serde(default)]
    pub roaming_verification_act: Option<Document>,
    #[serde(default)]
    pub roaming_empowerment: Option<Document>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub organization: IdRefDoc,
    #[serde(default)]
    pub account: IdRefDoc,
    #[serde(default)]
    pub method: i32,
    #[serde(default)]
    pub bank_transaction_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymeTransactionDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub payme_transaction_id: String,
    #[serde(default)]
    pub payme_created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub system_completed_at: Option<bson::DateTime>,
    #[serde(default)]
    pub state: i32,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub organization: IdRefDoc,
    #[serde(default)]
    pub reason: i32,
    #[serde(default)]
    pub system_canceled_at: Option<bson::DateTime>,
}

/// Balance-binding party; the source stores the reference id under `id`
/// rather than `_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartyRefDoc {
    #[serde(default)]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BalanceBindingDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub deleted_at: Option<bson::DateTime>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub payer_organization: PartyRefDoc,
    #[serde(default)]
    pub target_organization: PartyRefDoc,
}

#[derive(Debug, Deserialize)]
pub struct CreditUpdateDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub organization: IdRefDoc,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub account: IdRefDoc,
}

#[derive(Debug, Deserialize)]
pub struct BankErrorDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub payer_inn: String,
    #[serde(default)]
    pub payer_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_minimal_service_decodes() {
        let oid = ObjectId::new();
        let doc = doc! { "_id": oid };
        let svc: ServiceDoc = bson::from_document(doc).unwrap();
        assert_eq!(svc.id, oid);
        assert!(svc.created_at.is_none());
        assert_eq!(svc.name, "");
    }

    #[test]
    fn test_missing_id_fails_decode() {
        let doc = doc! { "name": "edo" };
        assert!(bson::from_document::<ServiceDoc>(doc).is_err());
    }

    #[test]
    fn test_organization_tolerates_absent_subobjects() {
        let doc = doc! { "_id": ObjectId::new(), "name": "Acme" };
        let org: OrganizationDoc = bson::from_document(doc).unwrap();
        assert_eq!(org.offer_info.number, "");
        assert!(org.offer_info.date.is_none());
        assert!(org.service_demo_uses.is_empty());
        assert!(org.inn.is_none());
    }

    #[test]
    fn test_balance_binding_party_uses_plain_id_key() {
        let payer = ObjectId::new();
        let doc = doc! {
            "_id": ObjectId::new(),
            "payer_organization": { "id": payer, "name": "Payer LLC" },
        };
        let binding: BalanceBindingDoc = bson::from_document(doc).unwrap();
        assert_eq!(binding.payer_organization.id, Some(payer));
        assert_eq!(binding.target_organization.name, "");
    }
}

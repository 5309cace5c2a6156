//! Charge classification by linked document.
//!
//! A charge document optionally embeds exactly one of eight "linked
//! document" sub-objects (roaming documents, EDI return invoice, EDI
//! attorney). The charge's destination row derives its `type`, `object_id`,
//! `number`, `date1` and `date2` columns from whichever sub-object is
//! present, probed in a fixed priority order.

use bson::{Bson, Document};
use chrono::{DateTime, Utc};

use crate::model::docs::ChargeDoc;

/// Discriminant code stored for a charge with no linked document.
pub const UNCATEGORIZED: i32 = 0;

/// The linked-document subtypes a charge can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedDocKind {
    EdiReturnInvoice,
    RoamingInvoice,
    EdiAttorney,
    RoamingContract,
    RoamingVerificationAct,
    RoamingAct,
    RoamingWaybill,
    RoamingEmpowerment,
}

impl LinkedDocKind {
    /// Discriminant code stored in the `type` column. These codes are a
    /// contract with downstream consumers; never renumber them.
    pub fn code(self) -> i32 {
        match self {
            Self::EdiReturnInvoice => 2,
            Self::RoamingInvoice => 3,
            Self::EdiAttorney => 4,
            Self::RoamingContract => 7,
            Self::RoamingVerificationAct => 8,
            Self::RoamingAct => 9,
            Self::RoamingWaybill => 10,
            Self::RoamingEmpowerment => 11,
        }
    }

    /// Empowerments and attorneys model a validity interval and carry
    /// `start_date`/`end_date` instead of a single `date`.
    fn spans_interval(self) -> bool {
        matches!(self, Self::RoamingEmpowerment | Self::EdiAttorney)
    }
}

/// Probe order for classification. The first present sub-object wins.
pub const PROBE_ORDER: [LinkedDocKind; 8] = [
    LinkedDocKind::RoamingInvoice,
    LinkedDocKind::RoamingContract,
    LinkedDocKind::RoamingWaybill,
    LinkedDocKind::RoamingAct,
    LinkedDocKind::RoamingVerificationAct,
    LinkedDocKind::RoamingEmpowerment,
    LinkedDocKind::EdiReturnInvoice,
    LinkedDocKind::EdiAttorney,
];

/// Normalized reference extracted from a charge's linked document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedDocRef {
    pub code: i32,
    pub object_id: String,
    pub number: String,
    pub date1: Option<DateTime<Utc>>,
    pub date2: Option<DateTime<Utc>>,
}

/// Classify a charge by its embedded linked document.
///
/// Returns the discriminant code plus the normalized
/// `(object_id, number, date1, date2)` tuple. A charge with no linked
/// document is uncategorized (code 0). `date1` falls back to `created_at`
/// whenever the linked document carried no parsable date, so the column is
/// never left unset.
pub fn resolve(charge: &ChargeDoc, created_at: DateTime<Utc>) -> LinkedDocRef {
    let mut resolved = PROBE_ORDER
        .iter()
        .find_map(|&kind| embedded(charge, kind).map(|doc| extract(kind, doc)))
        .unwrap_or_default();

    if resolved.date1.is_none() {
        resolved.date1 = Some(created_at);
    }
    resolved
}

fn embedded(charge: &ChargeDoc, kind: LinkedDocKind) -> Option<&Document> {
    match kind {
        LinkedDocKind::EdiReturnInvoice => charge.edi_return_invoice.as_ref(),
        LinkedDocKind::EdiAttorney => charge.edi_attorney.as_ref(),
        LinkedDocKind::RoamingInvoice => charge.roaming_invoice.as_ref(),
        LinkedDocKind::RoamingContract => charge.roaming_contract.as_ref(),
        LinkedDocKind::RoamingWaybill => charge.roaming_waybill.as_ref(),
        LinkedDocKind::RoamingAct => charge.roaming_act.as_ref(),
        LinkedDocKind::RoamingVerificationAct => charge.roaming_verification_act.as_ref(),
        LinkedDocKind::RoamingEmpowerment => charge.roaming_empowerment.as_ref(),
    }
}

fn extract(kind: LinkedDocKind, doc: &Document) -> LinkedDocRef {
    let (date1, date2) = if kind.spans_interval() {
        (field_datetime(doc, "start_date"), field_datetime(doc, "end_date"))
    } else {
        (field_datetime(doc, "date"), None)
    };

    LinkedDocRef {
        code: kind.code(),
        object_id: field_string(doc, "_id"),
        number: field_string(doc, "number"),
        date1,
        date2,
    }
}

/// A string-typed field, or empty. Non-string values (including ObjectIds)
/// are deliberately ignored.
fn field_string(doc: &Document, key: &str) -> String {
    doc.get_str(key).unwrap_or_default().to_string()
}

/// A date field, either as a native BSON datetime or as an RFC 3339 string.
/// Unparsable strings and other types leave the field unset.
fn field_datetime(doc: &Document, key: &str) -> Option<DateTime<Utc>> {
    match doc.get(key) {
        Some(Bson::DateTime(dt)) => Some(dt.to_chrono()),
        Some(Bson::String(raw)) => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use chrono::TimeZone;

    fn charge_with(field: &str, linked: Document) -> ChargeDoc {
        let mut doc = doc! { "_id": ObjectId::new() };
        doc.insert(field, linked);
        bson::from_document(doc).unwrap()
    }

    fn bare_charge() -> ChargeDoc {
        bson::from_document(doc! { "_id": ObjectId::new() }).unwrap()
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 10, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_codes_are_pinned() {
        assert_eq!(LinkedDocKind::EdiReturnInvoice.code(), 2);
        assert_eq!(LinkedDocKind::RoamingInvoice.code(), 3);
        assert_eq!(LinkedDocKind::EdiAttorney.code(), 4);
        assert_eq!(LinkedDocKind::RoamingContract.code(), 7);
        assert_eq!(LinkedDocKind::RoamingVerificationAct.code(), 8);
        assert_eq!(LinkedDocKind::RoamingAct.code(), 9);
        assert_eq!(LinkedDocKind::RoamingWaybill.code(), 10);
        assert_eq!(LinkedDocKind::RoamingEmpowerment.code(), 11);
    }

    #[test]
    fn test_roaming_invoice_wins_and_extracts() {
        let when = bson::DateTime::from_chrono(Utc.with_ymd_and_hms(2023, 5, 2, 0, 0, 0).unwrap());
        let charge = charge_with(
            "roaming_invoice",
            doc! { "_id": "inv-1", "number": "N-42", "date": when },
        );

        let resolved = resolve(&charge, created());
        assert_eq!(resolved.code, 3);
        assert_eq!(resolved.object_id, "inv-1");
        assert_eq!(resolved.number, "N-42");
        assert_eq!(resolved.date1, Some(when.to_chrono()));
        assert_eq!(resolved.date2, None);
    }

    #[test]
    fn test_probe_order_prefers_roaming_invoice() {
        let mut doc = doc! { "_id": ObjectId::new() };
        doc.insert("edi_return_invoice", doc! { "number": "ret" });
        doc.insert("roaming_invoice", doc! { "number": "roam" });
        let charge: ChargeDoc = bson::from_document(doc).unwrap();

        let resolved = resolve(&charge, created());
        assert_eq!(resolved.code, 3);
        assert_eq!(resolved.number, "roam");
    }

    #[test]
    fn test_uncategorized_defaults_to_creation_time() {
        let resolved = resolve(&bare_charge(), created());
        assert_eq!(resolved.code, UNCATEGORIZED);
        assert_eq!(resolved.object_id, "");
        assert_eq!(resolved.number, "");
        assert_eq!(resolved.date1, Some(created()));
        assert_eq!(resolved.date2, None);
    }

    #[test]
    fn test_dateless_linked_doc_falls_back_to_creation_time() {
        let charge = charge_with("roaming_contract", doc! { "number": "C-9" });
        let resolved = resolve(&charge, created());
        assert_eq!(resolved.code, 7);
        assert_eq!(resolved.date1, Some(created()));
    }

    #[test]
    fn test_rfc3339_string_date_is_parsed() {
        let charge = charge_with(
            "roaming_invoice",
            doc! { "date": "2023-05-02T10:15:00Z" },
        );
        let resolved = resolve(&charge, created());
        assert_eq!(
            resolved.date1,
            Some(Utc.with_ymd_and_hms(2023, 5, 2, 10, 15, 0).unwrap())
        );
    }

    #[test]
    fn test_garbage_string_date_falls_back() {
        let charge = charge_with("roaming_invoice", doc! { "date": "not-a-date" });
        let resolved = resolve(&charge, created());
        assert_eq!(resolved.date1, Some(created()));
    }

    #[test]
    fn test_empowerment_extracts_validity_interval() {
        let start = bson::DateTime::from_chrono(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let end = bson::DateTime::from_chrono(Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap());
        let charge = charge_with(
            "roaming_empowerment",
            doc! { "number": "E-1", "start_date": start, "end_date": end },
        );

        let resolved = resolve(&charge, created());
        assert_eq!(resolved.code, 11);
        assert_eq!(resolved.date1, Some(start.to_chrono()));
        assert_eq!(resolved.date2, Some(end.to_chrono()));
    }

    #[test]
    fn test_non_string_object_id_is_ignored() {
        let charge = charge_with(
            "roaming_act",
            doc! { "_id": ObjectId::new(), "number": "A-3" },
        );
        let resolved = resolve(&charge, created());
        assert_eq!(resolved.code, 9);
        assert_eq!(resolved.object_id, "");
        assert_eq!(resolved.number, "A-3");
    }
}

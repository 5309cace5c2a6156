//! Typed representations of the billing data on both sides of the move.
//!
//! [`docs`] holds the MongoDB document shapes as they are decoded from BSON;
//! [`rows`] holds the MySQL row shapes as they are written. Migrators map
//! from one to the other, field by field.

pub mod docs;
pub mod rows;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

/// Render an optional embedded object id as its 24-hex string, or empty when
/// the reference is absent from the source document.
pub(crate) fn hex_or_empty(id: &Option<ObjectId>) -> String {
    id.map(|oid| oid.to_hex()).unwrap_or_default()
}

/// Convert an optional BSON datetime to chrono.
pub(crate) fn ts(value: &Option<bson::DateTime>) -> Option<DateTime<Utc>> {
    value.map(|dt| dt.to_chrono())
}

/// Convert a BSON datetime that feeds a non-nullable column; an absent
/// source value degrades to the Unix epoch rather than failing the decode.
pub(crate) fn ts_or_epoch(value: &Option<bson::DateTime>) -> DateTime<Utc> {
    ts(value).unwrap_or(DateTime::UNIX_EPOCH)
}

//! Timestamp validation for MySQL-bound values.
//!
//! Source documents carry timestamps that MySQL either rejects or silently
//! mangles: Unix-epoch placeholders, zero values rendered as year 1, and
//! far-future garbage. Every nullable timestamp column goes through
//! [`sanitize_opt`] on its way to the destination; mandatory columns with a
//! documented fallback chain use [`sanitize_required`].

use chrono::{DateTime, Datelike, Utc};

/// Lowest year accepted for storage.
pub const MIN_YEAR: i32 = 1970;

/// Highest year accepted for storage.
pub const MAX_YEAR: i32 = 2100;

/// Return the value unchanged when its year falls within
/// [`MIN_YEAR`]..=[`MAX_YEAR`], otherwise `None`.
///
/// Zero/unset timestamps decode to year 1 (or 0) and fail the lower bound.
pub fn sanitize(value: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let year = value.year();
    if year < MIN_YEAR || year > MAX_YEAR {
        return None;
    }
    Some(value)
}

/// [`sanitize`] lifted over an optional value.
pub fn sanitize_opt(value: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    value.and_then(sanitize)
}

/// Sanitize a value destined for a non-nullable column.
///
/// Falls back to `fallback` when `primary` is absent or invalid, and to the
/// current time when both are. The column never receives a zero or
/// out-of-range value.
pub fn sanitize_required(
    primary: Option<DateTime<Utc>>,
    fallback: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    primary
        .and_then(sanitize)
        .or_else(|| fallback.and_then(sanitize))
        .unwrap_or_else(Utc::now)
}

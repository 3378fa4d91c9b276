//! Freshness policy for cached rate data.
//!
//! Freshness is a calendar-day check in the local time zone, not an elapsed
//! duration: data saved at 23:59 is stale at 00:00, data saved at 00:01 is
//! still fresh at 23:59 the same day. A saved day later than today (clock
//! skew) counts as fresh.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::domain::RateStatus;
use crate::error::{RateError, RateResult};

/// Parses an ISO-8601 (RFC 3339) instant into epoch milliseconds.
pub fn parse_timestamp(timestamp: &str) -> RateResult<i64> {
    DateTime::parse_from_rfc3339(timestamp.trim())
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| RateError::Parse(format!("{timestamp:?}: {e}")))
}

/// Formats epoch milliseconds as an RFC 3339 UTC instant.
pub fn format_timestamp(epoch_millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(epoch_millis).map(|dt| dt.to_rfc3339())
}

fn local_date<Tz: TimeZone>(epoch_millis: i64, tz: &Tz) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(epoch_millis).map(|dt| dt.with_timezone(tz).date_naive())
}

/// Whether data saved at `saved_millis` is fresh at `current_millis` in `tz`.
///
/// Full dates are compared so the check stays correct across a year boundary.
pub fn is_fresh_in<Tz: TimeZone>(saved_millis: i64, current_millis: i64, tz: &Tz) -> bool {
    match (local_date(saved_millis, tz), local_date(current_millis, tz)) {
        (Some(saved), Some(current)) => current <= saved,
        _ => false,
    }
}

/// [`is_fresh_in`] using the system's current time zone.
pub fn is_fresh(saved_millis: i64, current_millis: i64) -> bool {
    is_fresh_in(saved_millis, current_millis, &Local)
}

pub fn derive_status(is_fresh: bool) -> RateStatus {
    if is_fresh {
        RateStatus::Fresh
    } else {
        RateStatus::Stale
    }
}

//! Time utilities: time zone parsing and calendar-month boundaries.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Parse an IANA time zone name like "America/Chicago".
pub fn parse_tz(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| Error::InvalidTimezone(name.to_string()))
}

/// True when `at` falls in the same local calendar month as `now`.
pub fn same_local_month(at: DateTime<Utc>, now: DateTime<Utc>, tz: Tz) -> bool {
    let a = tz.from_utc_datetime(&at.naive_utc());
    let n = tz.from_utc_datetime(&now.naive_utc());
    a.year() == n.year() && a.month() == n.month()
}

/// Helper: format a UTC time into RFC3339.
pub fn to_rfc3339_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

//! Shared utilities for CLI commands.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use om_core::time::{form_defaults, local_date, local_timestamp};
use om_core::ValidationError;

/// Resolves optional form-style date and time against the current moment.
///
/// Missing parts default to the local date and time of `now`.
pub fn entry_timestamp<Z: TimeZone>(
    date: Option<&str>,
    time: Option<&str>,
    now: DateTime<Utc>,
    tz: &Z,
) -> Result<DateTime<Utc>, ValidationError> {
    let (default_date, default_time) = form_defaults(now, tz);
    local_timestamp(
        date.unwrap_or(&default_date),
        time.unwrap_or(&default_time),
        tz,
    )
}

/// Parses a `YYYY-MM-DD` day, defaulting to the local date of `now`.
pub fn parse_day<Z: TimeZone>(
    date: Option<&str>,
    now: DateTime<Utc>,
    tz: &Z,
) -> Result<NaiveDate> {
    match date {
        None => Ok(local_date(now, tz)),
        Some(s) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            Ok(date) => Ok(date),
            Err(_) => bail!("invalid date: {s}. Use YYYY-MM-DD (e.g., 2025-01-15)"),
        },
    }
}

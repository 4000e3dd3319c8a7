//! Time zone aware conversions between instants and local calendar values.
//!
//! Everything here takes the zone and, where relevant, the current instant as
//! parameters so results do not depend on the host clock or locale.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::validate::ValidationError;

/// Interprets a form-style local date and time in `tz` as an absolute instant.
///
/// Accepts `YYYY-MM-DD` and `HH:MM` (seconds optional). Ambiguous local times
/// during a DST fall-back resolve to the earlier instant; local times that do
/// not exist in `tz` are rejected.
pub fn local_timestamp<Z: TimeZone>(
    date: &str,
    time: &str,
    tz: &Z,
) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || ValidationError::InvalidTimestamp {
        date: date.trim().to_string(),
        time: time.trim().to_string(),
    };

    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|_| invalid())?;

    resolve_local(&date.and_time(time), tz).ok_or_else(invalid)
}

/// Returns the local calendar date of `ts` in `tz`.
pub fn local_date<Z: TimeZone>(ts: DateTime<Utc>, tz: &Z) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

/// Returns the instant at which `date` begins in `tz`.
///
/// Handles DST ambiguity by picking the earlier time. If midnight falls in a
/// DST gap, 01:00 local is used instead. Returns `None` only if neither exists.
pub fn local_day_start<Z: TimeZone>(date: NaiveDate, tz: &Z) -> Option<DateTime<Utc>> {
    resolve_local(&date.and_time(NaiveTime::MIN), tz).or_else(|| {
        let one_am = NaiveTime::from_hms_opt(1, 0, 0)?;
        resolve_local(&date.and_time(one_am), tz)
    })
}

/// Form defaults for the current moment: local `YYYY-MM-DD` and `HH:MM`.
pub fn form_defaults<Z: TimeZone>(now: DateTime<Utc>, tz: &Z) -> (String, String) {
    let local = now.with_timezone(tz).naive_local();
    (
        local.format("%Y-%m-%d").to_string(),
        local.format("%H:%M").to_string(),
    )
}

/// Formats the local date of `ts` as `MM/DD/YYYY`.
pub fn format_local_date<Z: TimeZone>(ts: DateTime<Utc>, tz: &Z) -> String {
    ts.with_timezone(tz)
        .naive_local()
        .format("%m/%d/%Y")
        .to_string()
}

/// Formats the local time of `ts` as `h:mm AM`.
pub fn format_local_time<Z: TimeZone>(ts: DateTime<Utc>, tz: &Z) -> String {
    ts.with_timezone(tz)
        .naive_local()
        .format("%-I:%M %p")
        .to_string()
}

/// Formats a calendar date as `MM/DD/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

fn resolve_local<Z: TimeZone>(naive: &NaiveDateTime, tz: &Z) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

//! Daily hourly-average allocation.
//!
//! Converts irregularly spaced volume readings into an average hourly rate per
//! local calendar day.
//!
//! # Algorithm Summary
//!
//! 1. Sort readings ascending by timestamp; readings sharing a timestamp are
//!    ordered by amount, largest first
//! 2. For each consecutive pair, the later reading's amount accrued evenly over
//!    the interval between them
//! 3. Split each interval at local midnights and credit each day with its share
//! 4. Report each day's credited volume divided by a full 24 hours
//!
//! Dividing by 24 rather than by the hours actually covered keeps partially
//! observed days conservative.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use thiserror::Error;

use crate::entry::Reading;
use crate::time::{local_date, local_day_start};

const MS_PER_HOUR: f64 = 3_600_000.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Configuration for daily allocation.
#[derive(Debug, Clone)]
pub struct AllocationConfig {
    /// Upper bound on day segments processed for a single interval.
    /// Intervals spanning more days are truncated.
    /// Default: 100.
    pub max_day_segments: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_day_segments: 100,
        }
    }
}

/// Faults that abort an allocation pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Neither local midnight nor 01:00 exists for a date in the zone.
    #[error("no representable start of day for {0}")]
    NoDayStart(NaiveDate),
    /// Date arithmetic ran off the supported calendar range.
    #[error("date out of range after {0}")]
    DateOutOfRange(NaiveDate),
    /// A day boundary did not advance past the current position.
    #[error("day boundary for {date} does not advance past {at}")]
    StalledBoundary { date: NaiveDate, at: DateTime<Utc> },
}

/// Distributes reading volumes across the local calendar days they span.
///
/// Each reading's amount is treated as volume accrued since the previous
/// reading; the first reading only anchors the timeline. Pairs with
/// non-positive elapsed time or a non-finite or negative rate are skipped.
///
/// Input order does not matter. Among readings with the same timestamp the
/// largest amount closes the preceding interval; the others form zero-length
/// pairs and are skipped.
///
/// Returns accumulated mL per local date. Days no interval touched are absent.
pub fn allocate_daily_volume<R: Reading, Z: TimeZone>(
    readings: &[R],
    tz: &Z,
    config: &AllocationConfig,
) -> Result<BTreeMap<NaiveDate, f64>, AllocationError> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    if readings.len() < 2 {
        return Ok(totals);
    }

    let mut sorted: Vec<&R> = readings.iter().collect();
    sorted.sort_by(|a, b| {
        a.timestamp()
            .cmp(&b.timestamp())
            .then_with(|| b.amount_ml().total_cmp(&a.amount_ml()))
    });

    for pair in sorted.windows(2) {
        let (start, end) = (pair[0].timestamp(), pair[1].timestamp());

        #[allow(clippy::cast_precision_loss)]
        let elapsed_hours = (end - start).num_milliseconds() as f64 / MS_PER_HOUR;
        if elapsed_hours <= 0.0 {
            continue;
        }

        let rate = pair[1].amount_ml() / elapsed_hours;
        if !rate.is_finite() || rate < 0.0 {
            continue;
        }

        allocate_interval(start, end, rate, tz, config, &mut totals)?;
    }

    Ok(totals)
}

/// Credits `rate` mL/hr over `[start, end)` to each local day it overlaps.
fn allocate_interval<Z: TimeZone>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rate: f64,
    tz: &Z,
    config: &AllocationConfig,
    totals: &mut BTreeMap<NaiveDate, f64>,
) -> Result<(), AllocationError> {
    let mut cursor = start;
    let mut segments = 0;

    while cursor < end && segments < config.max_day_segments {
        segments += 1;

        let day = local_date(cursor, tz);
        let next_day = day.succ_opt().ok_or(AllocationError::DateOutOfRange(day))?;
        let next_start = local_day_start(next_day, tz).ok_or(AllocationError::NoDayStart(next_day))?;
        if next_start <= cursor {
            return Err(AllocationError::StalledBoundary { date: day, at: cursor });
        }

        let segment_end = next_start.min(end);
        #[allow(clippy::cast_precision_loss)]
        let hours = (segment_end - cursor).num_milliseconds() as f64 / MS_PER_HOUR;
        let volume = rate * hours;
        if volume.is_finite() {
            *totals.entry(day).or_insert(0.0) += volume;
        }

        cursor = segment_end;
    }

    if cursor < end {
        tracing::warn!(
            %start,
            %end,
            max_day_segments = config.max_day_segments,
            "interval truncated at segment cap"
        );
    }

    Ok(())
}

/// Computes the reported hourly average per local day.
///
/// Fewer than two readings yield an empty map. Any allocation fault is logged
/// and also yields an empty map, so callers see "no data" in both cases.
pub fn daily_hourly_averages<R: Reading, Z: TimeZone>(
    readings: &[R],
    tz: &Z,
) -> BTreeMap<NaiveDate, u32> {
    match allocate_daily_volume(readings, tz, &AllocationConfig::default()) {
        Ok(totals) => totals
            .into_iter()
            .filter_map(|(day, volume)| hourly_rate(volume).map(|rate| (day, rate)))
            .collect(),
        Err(err) => {
            tracing::error!(error = %err, "failed to calculate daily hourly averages");
            BTreeMap::new()
        }
    }
}

/// Rounds a day's volume spread over 24 hours. `None` for non-finite or negative input.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn hourly_rate(volume_ml: f64) -> Option<u32> {
    let average = (volume_ml / HOURS_PER_DAY).round();
    if average.is_finite() && average >= 0.0 {
        Some(average.min(f64::from(u32::MAX)) as u32)
    } else {
        None
    }
}

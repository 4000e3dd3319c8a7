//! Daily totals, clinical thresholds, and the hourly-average trend.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::allocation::{daily_hourly_averages, hourly_rate};
use crate::entry::{DressingEntry, OutputEntry};
use crate::time::local_date;

/// Default patient weight in kilograms.
pub const DEFAULT_PATIENT_WEIGHT_KG: f64 = 7.7;

/// Normal urine output range, in mL per kg per hour.
const NORMAL_LOW_ML_PER_KG_HR: f64 = 1.0;
const NORMAL_HIGH_ML_PER_KG_HR: f64 = 3.0;

/// Hourly-rate bounds of the normal output range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub low_ml_per_hour: f64,
    pub high_ml_per_hour: f64,
}

impl Thresholds {
    /// Derives the normal range from the patient's weight.
    pub fn for_weight(weight_kg: f64) -> Self {
        Self {
            low_ml_per_hour: weight_kg * NORMAL_LOW_ML_PER_KG_HR,
            high_ml_per_hour: weight_kg * NORMAL_HIGH_ML_PER_KG_HR,
        }
    }

    /// Classifies an hourly rate against the low line.
    ///
    /// The high line is a reference for charts only; rates above it are still
    /// adequate.
    pub fn classify(&self, rate: u32) -> RateStatus {
        if f64::from(rate) < self.low_ml_per_hour {
            RateStatus::Low
        } else {
            RateStatus::Adequate
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::for_weight(DEFAULT_PATIENT_WEIGHT_KG)
    }
}

/// Whether an hourly rate reaches the low line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateStatus {
    Low,
    Adequate,
}

impl RateStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Adequate => "adequate",
        }
    }
}

impl fmt::Display for RateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Totals for one local day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_output_ml: u64,
    pub entry_count: usize,
    pub hourly_average: u32,
    pub status: RateStatus,
    pub urine_leak: bool,
}

/// One point of the hourly-average trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub hourly_average: u32,
    pub status: RateStatus,
}

/// Sums output recorded on a local day.
pub fn total_for_day<Z: TimeZone>(outputs: &[OutputEntry], date: NaiveDate, tz: &Z) -> u64 {
    outputs
        .iter()
        .filter(|entry| local_date(entry.timestamp, tz) == date)
        .map(|entry| u64::from(entry.amount_ml))
        .sum()
}

/// Same-day total divided by 24, rounded. Zero when the day has no entries.
#[allow(clippy::cast_precision_loss)]
pub fn simple_hourly_average<Z: TimeZone>(
    outputs: &[OutputEntry],
    date: NaiveDate,
    tz: &Z,
) -> u32 {
    hourly_rate(total_for_day(outputs, date, tz) as f64).unwrap_or(0)
}

/// Builds the summary for a local day.
pub fn daily_summary<Z: TimeZone>(
    outputs: &[OutputEntry],
    dressings: &[DressingEntry],
    date: NaiveDate,
    tz: &Z,
    thresholds: &Thresholds,
) -> DailySummary {
    let entry_count = outputs
        .iter()
        .filter(|entry| local_date(entry.timestamp, tz) == date)
        .count();
    let hourly_average = simple_hourly_average(outputs, date, tz);
    let urine_leak = dressings
        .iter()
        .any(|entry| local_date(entry.timestamp, tz) == date && entry.has_urine_leak());

    DailySummary {
        date,
        total_output_ml: total_for_day(outputs, date, tz),
        entry_count,
        hourly_average,
        status: thresholds.classify(hourly_average),
        urine_leak,
    }
}

/// Hourly-average trend over every local day with a reading of either kind.
///
/// Days the allocator credited with volume use its average; other days fall
/// back to the simple same-day average.
pub fn daily_trend<Z: TimeZone>(
    outputs: &[OutputEntry],
    dressings: &[DressingEntry],
    tz: &Z,
    thresholds: &Thresholds,
) -> Vec<TrendPoint> {
    let allocated = daily_hourly_averages(outputs, tz);

    let dates: BTreeSet<NaiveDate> = outputs
        .iter()
        .map(|entry| local_date(entry.timestamp, tz))
        .chain(dressings.iter().map(|entry| local_date(entry.timestamp, tz)))
        .collect();

    dates
        .into_iter()
        .map(|date| {
            let hourly_average = allocated
                .get(&date)
                .copied()
                .filter(|rate| *rate > 0)
                .unwrap_or_else(|| simple_hourly_average(outputs, date, tz));
            TrendPoint {
                date,
                hourly_average,
                status: thresholds.classify(hourly_average),
            }
        })
        .collect()
}

//! CSV export of both entry kinds and the daily trend.

use chrono::{DateTime, TimeZone, Utc};

use crate::entry::{DressingEntry, OutputEntry};
use crate::summary::TrendPoint;
use crate::time::{format_date, format_local_date, format_local_time};

const OUTPUT_SECTION: &str = "Urine Output Entries";
const DRESSING_SECTION: &str = "Dressing Change Entries";
const TREND_SECTION: &str = "Daily Hourly Averages";

const OUTPUT_HEADER: [&str; 4] = ["Date", "Time", "Amount (mL)", "Entered By"];
const DRESSING_HEADER: [&str; 5] = [
    "Date",
    "Time",
    "Amount (mL)",
    "Drainage Types",
    "Entered By",
];
const TREND_HEADER: [&str; 3] = ["Date", "Hourly Average (mL/hr)", "Status"];

/// Renders the export document.
///
/// Three titled sections separated by blank lines. A section without rows
/// still carries its title and header.
pub fn render_csv<Z: TimeZone>(
    outputs: &[OutputEntry],
    dressings: &[DressingEntry],
    trend: &[TrendPoint],
    tz: &Z,
) -> String {
    let mut csv = String::new();

    push_section(
        &mut csv,
        OUTPUT_SECTION,
        &OUTPUT_HEADER,
        outputs.iter().map(|entry| {
            vec![
                format_local_date(entry.timestamp, tz),
                format_local_time(entry.timestamp, tz),
                entry.amount_ml.to_string(),
                entry.entered_by.clone(),
            ]
        }),
    );
    csv.push('\n');

    push_section(
        &mut csv,
        DRESSING_SECTION,
        &DRESSING_HEADER,
        dressings.iter().map(|entry| {
            let drainage = if entry.drainage_types.is_empty() {
                "None".to_string()
            } else {
                entry
                    .drainage_types
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            vec![
                format_local_date(entry.timestamp, tz),
                format_local_time(entry.timestamp, tz),
                entry.amount_ml.to_string(),
                drainage,
                entry.entered_by.clone(),
            ]
        }),
    );
    csv.push('\n');

    push_section(
        &mut csv,
        TREND_SECTION,
        &TREND_HEADER,
        trend.iter().map(|point| {
            vec![
                format_date(point.date),
                point.hourly_average.to_string(),
                point.status.to_string(),
            ]
        }),
    );

    csv
}

/// File name for an export taken at `now`, stamped in local time.
pub fn export_filename<Z: TimeZone>(now: DateTime<Utc>, tz: &Z) -> String {
    let local = now.with_timezone(tz).naive_local();
    format!("output_monitor_{}.csv", local.format("%Y-%m-%d_%H%M%S"))
}

fn push_section<I>(csv: &mut String, title: &str, header: &[&str], rows: I)
where
    I: Iterator<Item = Vec<String>>,
{
    csv.push_str(title);
    csv.push('\n');
    push_row(csv, header.iter().copied());
    for row in rows {
        push_row(csv, row.iter().map(String::as_str));
    }
}

fn push_row<'a>(csv: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line = cells.map(escape_csv).collect::<Vec<_>>().join(",");
    csv.push_str(&line);
    csv.push('\n');
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

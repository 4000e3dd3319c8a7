//! Summary command for one day's output totals.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use om_core::summary::daily_summary;
use om_core::time::format_date;
use om_core::{DailySummary, Dashboard, Thresholds};
use serde::Serialize;

use super::util::parse_day;
use crate::{Backend, Config};

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Local date to summarize (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SummaryOutput<'a> {
    #[serde(flatten)]
    summary: &'a DailySummary,
    normal_range: &'a Thresholds,
}

pub fn run<W: Write>(writer: &mut W, args: &SummaryArgs, config: &Config) -> Result<()> {
    run_at(writer, args, config, Utc::now())
}

fn run_at<W: Write>(
    writer: &mut W,
    args: &SummaryArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let tz = config.tz()?;
    let thresholds = config.thresholds()?;
    let day = parse_day(args.date.as_deref(), now, &tz)?;

    let store = Backend::open(config)?;
    let dashboard = Dashboard::load(&store).context("failed to load entries")?;
    let summary = daily_summary(
        dashboard.outputs(),
        dashboard.dressings(),
        day,
        &tz,
        &thresholds,
    );

    if args.json {
        let output = SummaryOutput {
            summary: &summary,
            normal_range: &thresholds,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    writeln!(writer, "Summary for {}", format_date(summary.date))?;
    writeln!(
        writer,
        "Total output: {} mL ({} entries)",
        summary.total_output_ml, summary.entry_count
    )?;
    writeln!(
        writer,
        "Hourly average: {} mL/hr ({})",
        summary.hourly_average, summary.status
    )?;
    writeln!(
        writer,
        "Normal range: {:.1}-{:.1} mL/hr",
        thresholds.low_ml_per_hour, thresholds.high_ml_per_hour
    )?;
    writeln!(
        writer,
        "Urine leak: {}",
        if summary.urine_leak { "yes" } else { "no" }
    )?;
    Ok(())
}

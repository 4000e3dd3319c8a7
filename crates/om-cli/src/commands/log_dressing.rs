//! Log dressing command for recording a weighed dressing change.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use om_core::time::{format_local_date, format_local_time};
use om_core::validate::{
    dressing_volume_ml, parse_drainage_list, parse_weight, validate_caregiver,
};
use om_core::{Dashboard, NewDressingEntry};

use super::util::entry_timestamp;
use crate::{Backend, Config};

#[derive(Debug, Args)]
pub struct LogDressingArgs {
    /// Who changed the dressing.
    #[arg(long = "by")]
    pub entered_by: String,
    /// Weight of the removed dressing in grams.
    #[arg(long)]
    pub weight: String,
    /// Drainage observed (serous, serosanguinous, purulent, urine). Repeatable.
    #[arg(long)]
    pub drainage: Vec<String>,
    /// Local date of the change (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,
    /// Local time of the change (HH:MM). Defaults to now.
    #[arg(long)]
    pub time: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &LogDressingArgs, config: &Config) -> Result<()> {
    run_at(writer, args, config, Utc::now())
}

fn run_at<W: Write>(
    writer: &mut W,
    args: &LogDressingArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let tz = config.tz()?;

    let weight = parse_weight(&args.weight)?;
    let entry = NewDressingEntry {
        entered_by: validate_caregiver(&args.entered_by, &config.caregivers)?,
        drainage_types: parse_drainage_list(&args.drainage)?,
        amount_ml: dressing_volume_ml(weight),
        timestamp: entry_timestamp(args.date.as_deref(), args.time.as_deref(), now, &tz)?,
    };

    let mut store = Backend::open(config)?;
    let mut dashboard = Dashboard::load(&store).context("failed to load entries")?;
    let stored = dashboard
        .submit_dressing(&mut store, &entry)
        .context("failed to save dressing entry")?;

    let drainage = if stored.drainage_types.is_empty() {
        "none".to_string()
    } else {
        stored
            .drainage_types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    writeln!(
        writer,
        "Saved dressing change at {} {} (entered by {})",
        format_local_date(stored.timestamp, &tz),
        format_local_time(stored.timestamp, &tz),
        stored.entered_by
    )?;
    writeln!(
        writer,
        "Weight {weight} g, absorbed {} mL, drainage: {drainage}",
        stored.amount_ml
    )?;
    if stored.has_urine_leak() {
        writeln!(writer, "Urine leak recorded")?;
    }
    Ok(())
}

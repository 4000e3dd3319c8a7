//! Log output command for recording a urine output measurement.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use om_core::summary::daily_summary;
use om_core::time::{format_date, format_local_date, format_local_time, local_date};
use om_core::validate::{parse_amount, validate_caregiver};
use om_core::{Dashboard, NewOutputEntry};

use super::util::entry_timestamp;
use crate::{Backend, Config};

#[derive(Debug, Args)]
pub struct LogOutputArgs {
    /// Who measured the output.
    #[arg(long = "by")]
    pub entered_by: String,
    /// Measured output in mL.
    #[arg(long)]
    pub amount: String,
    /// Local date of the measurement (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,
    /// Local time of the measurement (HH:MM). Defaults to now.
    #[arg(long)]
    pub time: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &LogOutputArgs, config: &Config) -> Result<()> {
    run_at(writer, args, config, Utc::now())
}

fn run_at<W: Write>(
    writer: &mut W,
    args: &LogOutputArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let tz = config.tz()?;
    let thresholds = config.thresholds()?;

    let entry = NewOutputEntry {
        entered_by: validate_caregiver(&args.entered_by, &config.caregivers)?,
        amount_ml: parse_amount(&args.amount)?,
        timestamp: entry_timestamp(args.date.as_deref(), args.time.as_deref(), now, &tz)?,
    };

    let mut store = Backend::open(config)?;
    let mut dashboard = Dashboard::load(&store).context("failed to load entries")?;
    let stored = dashboard
        .submit_output(&mut store, &entry)
        .context("failed to save output entry")?;

    writeln!(
        writer,
        "Saved {} mL output at {} {} (entered by {})",
        stored.amount_ml,
        format_local_date(stored.timestamp, &tz),
        format_local_time(stored.timestamp, &tz),
        stored.entered_by
    )?;

    let day = local_date(stored.timestamp, &tz);
    let summary = daily_summary(
        dashboard.outputs(),
        dashboard.dressings(),
        day,
        &tz,
        &thresholds,
    );
    writeln!(
        writer,
        "Total for {}: {} mL across {} entries ({} mL/hr, {})",
        format_date(day),
        summary.total_output_ml,
        summary.entry_count,
        summary.hourly_average,
        summary.status
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use om_db::Database;

    fn args(by: &str, amount: &str, time: &str) -> LogOutputArgs {
        LogOutputArgs {
            entered_by: by.to_string(),
            amount: amount.to_string(),
            date: Some("2025-01-15".to_string()),
            time: Some(time.to_string()),
        }
    }

    fn now() -> DateTime<Utc> {
        "2025-01-15T23:00:00Z".parse().unwrap()
    }

    #[test]
    fn log_output_saves_entry_and_reports_day_total() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("om.db"),
            ..Config::default()
        };

        let mut output = Vec::new();
        run_at(&mut output, &args("Joe", "45", "09:05"), &config, now()).unwrap();
        let mut output = Vec::new();
        run_at(&mut output, &args("Tori", "120", "14:30"), &config, now()).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Saved 120 mL output at 01/15/2025 2:30 PM (entered by Tori)
        Total for 01/15/2025: 165 mL across 2 entries (7 mL/hr, low)
        ");

        let db = Database::open(&config.database_path).unwrap();
        let stored = db.list_outputs().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].timestamp.to_rfc3339(), "2025-01-15T19:30:00+00:00");
    }

    #[test]
    fn invalid_amount_is_rejected_before_saving() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("om.db"),
            ..Config::default()
        };

        let mut output = Vec::new();
        let err = run_at(&mut output, &args("Joe", "-5", "09:05"), &config, now()).unwrap_err();
        assert!(err.to_string().contains("valid positive number for amount"));
        assert!(output.is_empty());
        assert!(!config.database_path.exists());
    }

    #[test]
    fn roster_spelling_is_stored() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("om.db"),
            caregivers: vec!["Joe".to_string(), "Tori".to_string()],
            ..Config::default()
        };

        let mut output = Vec::new();
        run_at(&mut output, &args("tori", "30", "08:00"), &config, now()).unwrap();
        let db = Database::open(&config.database_path).unwrap();
        assert_eq!(db.list_outputs().unwrap()[0].entered_by, "Tori");

        let err = run_at(&mut output, &args("Sam", "30", "08:00"), &config, now()).unwrap_err();
        assert!(err.to_string().contains("unknown caregiver"));
    }
}

//! Trend command for per-day hourly averages.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use om_core::Dashboard;
use om_core::summary::daily_trend;
use om_core::time::format_date;

use crate::{Backend, Config};

#[derive(Debug, Args)]
pub struct TrendArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &TrendArgs, config: &Config) -> Result<()> {
    let tz = config.tz()?;
    let thresholds = config.thresholds()?;

    let store = Backend::open(config)?;
    let dashboard = Dashboard::load(&store).context("failed to load entries")?;
    let trend = daily_trend(dashboard.outputs(), dashboard.dressings(), &tz, &thresholds);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&trend)?)?;
        return Ok(());
    }

    if trend.is_empty() {
        writeln!(writer, "No data available for trending")?;
        return Ok(());
    }

    writeln!(writer, "{:<12}{:>8}  Status", "Date", "mL/hr")?;
    for point in &trend {
        writeln!(
            writer,
            "{:<12}{:>8}  {}",
            format_date(point.date),
            point.hourly_average,
            point.status
        )?;
    }
    writeln!(
        writer,
        "Normal range: {:.1}-{:.1} mL/hr",
        thresholds.low_ml_per_hour, thresholds.high_ml_per_hour
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use om_core::{NewDressingEntry, NewOutputEntry};
    use om_db::Database;

    fn config_with_outputs(temp: &tempfile::TempDir, readings: &[(&str, u32)]) -> Config {
        let config = Config {
            database_path: temp.path().join("om.db"),
            ..Config::default()
        };
        let mut db = Database::open(&config.database_path).unwrap();
        for (ts, amount_ml) in readings {
            db.insert_output(&NewOutputEntry {
                entered_by: "Joe".to_string(),
                amount_ml: *amount_ml,
                timestamp: ts.parse().unwrap(),
            })
            .unwrap();
        }
        config
    }

    #[test]
    fn trend_spreads_overnight_interval() {
        let temp = tempfile::tempdir().unwrap();
        // 22:00 to 02:00 local, 240 mL accrued over the four hours.
        let config = config_with_outputs(
            &temp,
            &[("2025-01-15T03:00:00Z", 10), ("2025-01-15T07:00:00Z", 240)],
        );

        let mut output = Vec::new();
        run(&mut output, &TrendArgs { json: false }, &config).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Date           mL/hr  Status
        01/14/2025         5  low
        01/15/2025         5  low
        Normal range: 7.7-23.1 mL/hr
        ");
    }

    #[test]
    fn dressing_only_day_falls_back_to_zero() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with_outputs(&temp, &[]);
        let mut db = Database::open(&config.database_path).unwrap();
        db.insert_dressing(&NewDressingEntry {
            entered_by: "Tori".to_string(),
            drainage_types: Vec::new(),
            amount_ml: 4,
            timestamp: "2025-01-15T16:00:00Z".parse().unwrap(),
        })
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &TrendArgs { json: true }, &config).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"date": "2025-01-15", "hourly_average": 0, "status": "low"}])
        );
    }

    #[test]
    fn empty_trend_prints_placeholder() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with_outputs(&temp, &[]);

        let mut output = Vec::new();
        run(&mut output, &TrendArgs { json: false }, &config).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No data available for trending\n"
        );
    }
}

//! Export command for writing all entries to a CSV file.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use om_core::Dashboard;
use om_core::export::{export_filename, render_csv};
use om_core::summary::daily_trend;

use crate::{Backend, Config};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory to write the CSV file into.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

pub fn run<W: Write>(writer: &mut W, args: &ExportArgs, config: &Config) -> Result<()> {
    run_at(writer, args, config, Utc::now())
}

fn run_at<W: Write>(
    writer: &mut W,
    args: &ExportArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let tz = config.tz()?;
    let thresholds = config.thresholds()?;

    let store = Backend::open(config)?;
    let dashboard = Dashboard::load(&store).context("failed to load entries")?;
    let trend = daily_trend(dashboard.outputs(), dashboard.dressings(), &tz, &thresholds);
    let csv = render_csv(dashboard.outputs(), dashboard.dressings(), &trend, &tz);

    let path = write_export(&args.output_dir, &export_filename(now, &tz), &csv)?;
    tracing::debug!(path = %path.display(), "export written");
    writeln!(
        writer,
        "Exported {} output entries and {} dressing changes to {}",
        dashboard.outputs().len(),
        dashboard.dressings().len(),
        path.display()
    )?;
    Ok(())
}

fn write_export(dir: &Path, filename: &str, csv: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(filename);
    std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

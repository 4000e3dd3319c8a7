//! List command for showing the most recent entries.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::{Args, ValueEnum};
use om_core::time::{format_local_date, format_local_time};
use om_core::{Dashboard, DressingEntry, OutputEntry};
use serde::Serialize;

use crate::{Backend, Config};

/// Number of entries shown per kind unless overridden.
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntryKind {
    /// Urine output measurements.
    Output,
    /// Dressing changes.
    Dressing,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show one kind of entry.
    #[arg(long, value_enum)]
    pub kind: Option<EntryKind>,
    /// Maximum entries shown per kind.
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Section<'a, T> {
    total: usize,
    entries: &'a [T],
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    outputs: Option<Section<'a, OutputEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dressings: Option<Section<'a, DressingEntry>>,
}

pub fn run<W: Write>(writer: &mut W, args: &ListArgs, config: &Config) -> Result<()> {
    let tz = config.tz()?;
    let store = Backend::open(config)?;
    let dashboard = Dashboard::load(&store).context("failed to load entries")?;

    let show_outputs = args.kind != Some(EntryKind::Dressing);
    let show_dressings = args.kind != Some(EntryKind::Output);
    let outputs = &dashboard.outputs()[..args.limit.min(dashboard.outputs().len())];
    let dressings = &dashboard.dressings()[..args.limit.min(dashboard.dressings().len())];

    if args.json {
        let output = ListOutput {
            outputs: show_outputs.then_some(Section {
                total: dashboard.outputs().len(),
                entries: outputs,
            }),
            dressings: show_dressings.then_some(Section {
                total: dashboard.dressings().len(),
                entries: dressings,
            }),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    let mut text = String::new();
    if show_outputs {
        format_outputs(&mut text, outputs, dashboard.outputs().len(), &tz);
    }
    if show_outputs && show_dressings {
        text.push('\n');
    }
    if show_dressings {
        format_dressings(&mut text, dressings, dashboard.dressings().len(), &tz);
    }
    write!(writer, "{text}")?;
    Ok(())
}

fn format_outputs(out: &mut String, entries: &[OutputEntry], total: usize, tz: &Tz) {
    writeln!(out, "Urine Output").unwrap();
    if entries.is_empty() {
        writeln!(out, "No output entries recorded.").unwrap();
        return;
    }
    writeln!(out, "{:<12}{:<10}{:>8}  Entered By", "Date", "Time", "Amount").unwrap();
    for entry in entries {
        let amount = format!("{} mL", entry.amount_ml);
        writeln!(
            out,
            "{:<12}{:<10}{amount:>8}  {}",
            format_local_date(entry.timestamp, tz),
            format_local_time(entry.timestamp, tz),
            entry.entered_by
        )
        .unwrap();
    }
    write_footer(out, entries.len(), total);
}

fn format_dressings(out: &mut String, entries: &[DressingEntry], total: usize, tz: &Tz) {
    writeln!(out, "Dressing Changes").unwrap();
    if entries.is_empty() {
        writeln!(out, "No dressing changes recorded.").unwrap();
        return;
    }
    writeln!(
        out,
        "{:<12}{:<10}{:>8}  {:<34}Entered By",
        "Date", "Time", "Amount", "Drainage"
    )
    .unwrap();
    for entry in entries {
        let drainage = if entry.drainage_types.is_empty() {
            "None".to_string()
        } else {
            entry
                .drainage_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let amount = format!("{} mL", entry.amount_ml);
        writeln!(
            out,
            "{:<12}{:<10}{amount:>8}  {drainage:<34}{}",
            format_local_date(entry.timestamp, tz),
            format_local_time(entry.timestamp, tz),
            entry.entered_by
        )
        .unwrap();
    }
    write_footer(out, entries.len(), total);
}

fn write_footer(out: &mut String, shown: usize, total: usize) {
    writeln!(out, "Showing {shown} most recent entries. Total: {total} entries").unwrap();
}

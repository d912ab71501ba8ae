//! Reporting and export — JSON and CSV artifacts.
//!
//! - **JSON**: the full report with a `schema_version` field
//! - **CSV**: the per-bar output series, a batch summary, and raw pair bars
//!
//! Undefined floats (NaN) become JSON `null` and empty CSV cells.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use spreadlab_core::domain::{Direction, PairBar};
use spreadlab_core::BarRecord;

use crate::batch::BatchRow;
use crate::runner::BacktestReport;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a report to pretty JSON.
pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        String::new()
    }
}

fn direction_label(d: Direction) -> &'static str {
    match d {
        Direction::Flat => "FLAT",
        Direction::LongSpread => "LONG_SPREAD",
        Direction::ShortSpread => "SHORT_SPREAD",
    }
}

/// Export the per-bar series.
///
/// Columns: timestamp, price_a, price_b, hedge_ratio, hedge_angle, spread,
/// signal, direction, position_a, position_b, inventory_a, inventory_b,
/// pnl, band_lower, band_upper, active, ratio_as_of
pub fn export_records_csv<W: Write>(records: &[BarRecord], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "timestamp",
        "price_a",
        "price_b",
        "hedge_ratio",
        "hedge_angle",
        "spread",
        "signal",
        "direction",
        "position_a",
        "position_b",
        "inventory_a",
        "inventory_b",
        "pnl",
        "band_lower",
        "band_upper",
        "active",
        "ratio_as_of",
    ])?;

    for r in records {
        wtr.write_record([
            r.timestamp.to_string(),
            cell(r.price_a),
            cell(r.price_b),
            cell(r.hedge_ratio),
            cell(r.hedge_angle),
            cell(r.spread),
            cell(r.signal),
            direction_label(r.direction).to_string(),
            cell(r.position_a),
            cell(r.position_b),
            cell(r.inventory_a),
            cell(r.inventory_b),
            cell(r.pnl),
            cell(r.band_lower),
            cell(r.band_upper),
            r.active.to_string(),
            r.ratio_as_of.map(|i| i.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

/// Export raw pair bars with the given leg headers.
pub fn export_bars_csv<W: Write>(bars: &[PairBar], leg_a: &str, leg_b: &str, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["timestamp", leg_a, leg_b])?;
    for b in bars {
        wtr.write_record([
            b.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            b.price_a.to_string(),
            b.price_b.to_string(),
        ])?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

/// Export a batch summary, one row per run.
pub fn export_batch_csv<W: Write>(rows: &[BatchRow], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a single run.
///
/// Creates `{strategy}_{run_id prefix}/` under `output_dir` containing:
/// - `report.json` — the full `BacktestReport`
/// - `series.csv` — per-bar output series
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.result.strategy,
        &report.run_id[..report.run_id.len().min(12)]
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    std::fs::write(run_dir.join("report.json"), json)
        .with_context(|| format!("failed to write {}", run_dir.join("report.json").display()))?;

    let series_path = run_dir.join("series.csv");
    let file = std::fs::File::create(&series_path)
        .with_context(|| format!("failed to create {}", series_path.display()))?;
    export_records_csv(&report.result.records, std::io::BufWriter::new(file))?;

    Ok(run_dir)
}

//! Loading aligned two-leg price series from CSV.
//!
//! The file carries a header row with a timestamp column and one price
//! column per leg. Rows must already be aligned: strictly increasing
//! timestamps, both prices present, finite and positive. Alignment and
//! forward-fill belong to whatever produced the file, so anything else is a
//! hard error naming the offending line.

use std::io::Read;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use spreadlab_core::domain::PairBar;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DataConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column '{0}' in header")]
    MissingColumn(String),
    #[error("line {line}: cannot parse timestamp '{value}'")]
    BadTimestamp { line: u64, value: String },
    #[error("line {line}: cannot parse {column} price '{value}'")]
    BadPrice {
        line: u64,
        column: String,
        value: String,
    },
    #[error("line {line}: {column} price {value} is not finite and positive")]
    NonFinitePrice { line: u64, column: String, value: f64 },
    #[error("line {line}: timestamp {timestamp} is not after the previous row")]
    Unordered { line: u64, timestamp: NaiveDateTime },
    #[error("line {line}: duplicate timestamp {timestamp}")]
    Duplicate { line: u64, timestamp: NaiveDateTime },
    #[error("no data rows")]
    Empty,
}

/// A loaded series plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedPair {
    pub bars: Vec<PairBar>,
    pub leg_a: String,
    pub leg_b: String,
    /// BLAKE3 over timestamps and prices, for fingerprinting.
    pub dataset_hash: String,
}

/// Load the pair described by a `[data]` section.
pub fn load_pair(config: &DataConfig) -> Result<LoadedPair, LoadError> {
    let file = std::fs::File::open(&config.path).map_err(|source| LoadError::Io {
        path: config.path.clone(),
        source,
    })?;
    let loaded = read_pair(file, config)?;
    info!(
        path = %config.path.display(),
        bars = loaded.bars.len(),
        leg_a = %loaded.leg_a,
        leg_b = %loaded.leg_b,
        "loaded pair series"
    );
    Ok(loaded)
}

/// Parse a pair series from any reader.
pub fn read_pair<R: Read>(reader: R, config: &DataConfig) -> Result<LoadedPair, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    let ts_idx = column(&config.timestamp_column)?;
    let a_idx = column(&config.leg_a)?;
    let b_idx = column(&config.leg_b)?;

    let mut bars: Vec<PairBar> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let raw_ts = field(ts_idx);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::BadTimestamp {
            line,
            value: raw_ts.to_string(),
        })?;
        let price_a = parse_price(field(a_idx), &config.leg_a, line)?;
        let price_b = parse_price(field(b_idx), &config.leg_b, line)?;

        if let Some(prev) = bars.last() {
            if timestamp == prev.timestamp {
                return Err(LoadError::Duplicate { line, timestamp });
            }
            if timestamp < prev.timestamp {
                return Err(LoadError::Unordered { line, timestamp });
            }
        }
        bars.push(PairBar::new(timestamp, price_a, price_b));
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    debug!(bars = bars.len(), "parsed pair CSV");

    let dataset_hash = compute_dataset_hash(&bars);
    Ok(LoadedPair {
        bars,
        leg_a: config.leg_a.clone(),
        leg_b: config.leg_b.clone(),
        dataset_hash,
    })
}

/// Accepts `YYYY-MM-DD HH:MM:SS[.f]`, the ISO `T` form, or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_price(raw: &str, column: &str, line: u64) -> Result<f64, LoadError> {
    let value: f64 = raw.parse().map_err(|_| LoadError::BadPrice {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })?;
    if !(value.is_finite() && value > 0.0) {
        return Err(LoadError::NonFinitePrice {
            line,
            column: column.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Deterministic BLAKE3 hash over every timestamp and price.
pub fn compute_dataset_hash(bars: &[PairBar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.timestamp.and_utc().timestamp_micros().to_le_bytes());
        hasher.update(&bar.price_a.to_le_bytes());
        hasher.update(&bar.price_b.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row containing
//! at least `date,open,high,low,close,volume` (any order, any case; extra
//! columns such as `Adj Close` are ignored). Dates are `YYYY-MM-DD`.
//! Symbols that could name a path outside the base directory are reported
//! as `NoData` without touching the filesystem.

use crate::domain::error::TrendvolError;
use crate::domain::ohlcv::{is_valid_symbol, OhlcvBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn data_err(reason: impl Into<String>) -> TrendvolError {
    TrendvolError::Data {
        reason: reason.into(),
    }
}

fn parse_field(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, TrendvolError> {
    let raw = record
        .get(idx)
        .ok_or_else(|| data_err(format!("missing {} column", name)))?;
    raw.trim()
        .parse()
        .map_err(|e| data_err(format!("invalid {} value {:?}: {}", name, raw, e)))
}

impl DataPort for CsvAdapter {
    fn fetch_price_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<PriceSeries, TrendvolError> {
        if !is_valid_symbol(symbol) {
            return Err(TrendvolError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TrendvolError::NoData {
                symbol: symbol.to_string(),
            },
            _ => data_err(format!("failed to read {}: {}", path.display(), e)),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_err(format!("CSV header error: {}", e)))?
            .clone();

        let mut idx = [0usize; 6];
        for (slot, name) in idx.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| data_err(format!("missing {} column", name)))?;
        }

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| data_err(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(idx[0])
                .ok_or_else(|| data_err("missing date column"))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| data_err(format!("invalid date format: {}", e)))?;

            if date < start_date {
                continue;
            }

            bars.push(OhlcvBar {
                date,
                open: parse_field(&record, idx[1], "open")?,
                high: parse_field(&record, idx[2], "high")?,
                low: parse_field(&record, idx[3], "low")?,
                close: parse_field(&record, idx[4], "close")?,
                volume: parse_field(&record, idx[5], "volume")?.round() as i64,
            });
        }

        if bars.is_empty() {
            return Err(TrendvolError::NoData {
                symbol: symbol.to_string(),
            });
        }

        bars.sort_by_key(|b| b.date);
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TrendvolError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_err(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_err(format!("directory entry error: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

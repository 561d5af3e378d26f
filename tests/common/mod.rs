#![allow(dead_code)]

use chrono::NaiveDate;
pub use trendvol::domain::ohlcv::{OhlcvBar, PriceSeries};
use trendvol::domain::error::TrendvolError;
use trendvol::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_price_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<PriceSeries, TrendvolError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TrendvolError::Data {
                reason: reason.clone(),
            });
        }
        let bars: Vec<OhlcvBar> = self
            .data
            .get(symbol)
            .map(|bars| bars.iter().filter(|b| b.date >= start_date).cloned().collect())
            .unwrap_or_default();
        if bars.is_empty() {
            return Err(TrendvolError::NoData {
                symbol: symbol.to_string(),
            });
        }
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TrendvolError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000_000,
        })
        .collect()
}

/// `n` closes evenly spaced from `from` to `to`, one per calendar day.
pub fn linear_bars(n: usize, from: f64, to: f64) -> Vec<OhlcvBar> {
    let step = if n > 1 { (to - from) / (n - 1) as f64 } else { 0.0 };
    let closes: Vec<f64> = (0..n).map(|i| from + step * i as f64).collect();
    bars_from_closes(date(2020, 1, 1), &closes)
}

pub fn constant_bars(n: usize, close: f64) -> Vec<OhlcvBar> {
    bars_from_closes(date(2020, 1, 1), &vec![close; n])
}

/// Random walk with drift, reproducible from `seed`.
pub fn noisy_bars(n: usize, drift: f64, seed: u64) -> Vec<OhlcvBar> {
    let mut state = seed;
    let mut uniform = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    let mut close = 100.0;
    let closes: Vec<f64> = (0..n)
        .map(|i| {
            let z = (0..12).map(|_| uniform()).sum::<f64>() - 6.0;
            let scale = if (i / 120) % 2 == 0 { 0.008 } else { 0.02 };
            close *= 1.0 + drift + scale * z;
            close
        })
        .collect();
    bars_from_closes(date(2020, 1, 1), &closes)
}

pub fn series(symbol: &str, bars: Vec<OhlcvBar>) -> PriceSeries {
    PriceSeries::new(symbol, bars).unwrap()
}

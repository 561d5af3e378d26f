//! OHLCV bars and the validated price series fed into the pipeline.

use crate::domain::error::TrendvolError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Whether `symbol` is safe to use as a ticker: non-empty, made only of
/// ASCII letters, digits, `.`, `_` and `-`, and free of `..`.
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && !symbol.contains("..")
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Daily bars for one instrument.
///
/// Construction enforces strictly ascending dates and a finite, positive
/// close on every bar, so later stages can divide by closes freely.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, TrendvolError> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(TrendvolError::InvalidSeries {
                    reason: format!(
                        "dates must be strictly ascending ({} follows {})",
                        pair[1].date, pair[0].date
                    ),
                });
            }
        }
        if let Some(bar) = bars.iter().find(|b| !(b.close.is_finite() && b.close > 0.0)) {
            return Err(TrendvolError::InvalidSeries {
                reason: format!("close must be positive on {} (got {})", bar.date, bar.close),
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

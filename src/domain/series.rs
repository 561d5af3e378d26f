//! The derived series table: a price series plus the column groups each
//! pipeline stage adds.
//!
//! A column group is `None` until its stage has run. Inside a group, values
//! that cannot be computed for a row (warm-up rows, the first return) are
//! `None` rather than NaN.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumns {
    pub ma_fast: IndicatorSeries,
    pub ma_slow: IndicatorSeries,
    pub momentum: IndicatorSeries,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityColumns {
    pub daily: Vec<Option<f64>>,
    pub annual: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    #[default]
    Flat,
    Long,
}

impl Signal {
    pub fn as_u8(self) -> u8 {
        match self {
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_u8())
    }

    /// Label shown to end users for the latest signal.
    pub fn label(self) -> &'static str {
        match self {
            Signal::Long => "BUY",
            Signal::Flat => "HOLD/SELL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalColumns {
    pub signal: Vec<Signal>,
    pub position_size: Vec<f64>,
    pub exposure: Vec<f64>,
    pub stop_loss: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub prices: PriceSeries,
    pub indicators: Option<IndicatorColumns>,
    pub volatility: Option<VolatilityColumns>,
    pub signals: Option<SignalColumns>,
}

/// One row of the derived table, flattened for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub close: f64,
    pub ma_fast: Option<f64>,
    pub ma_slow: Option<f64>,
    pub momentum: Option<f64>,
    pub cond_vol_daily: Option<f64>,
    pub cond_vol_annual: Option<f64>,
    pub signal: Option<Signal>,
    pub position_size: Option<f64>,
    pub exposure: Option<f64>,
    pub stop_loss: Option<f64>,
}

impl DerivedSeries {
    pub fn new(prices: PriceSeries) -> Self {
        Self {
            prices,
            indicators: None,
            volatility: None,
            signals: None,
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn symbol(&self) -> &str {
        self.prices.symbol()
    }

    pub fn row(&self, i: usize) -> Option<DerivedRow> {
        let bar = self.prices.bars().get(i)?;
        let ind = self.indicators.as_ref();
        let vol = self.volatility.as_ref();
        let sig = self.signals.as_ref();

        Some(DerivedRow {
            date: bar.date,
            close: bar.close,
            ma_fast: ind.and_then(|c| c.ma_fast.value_at(i)),
            ma_slow: ind.and_then(|c| c.ma_slow.value_at(i)),
            momentum: ind.and_then(|c| c.momentum.value_at(i)),
            cond_vol_daily: vol.and_then(|c| c.daily.get(i).copied().flatten()),
            cond_vol_annual: vol.and_then(|c| c.annual.get(i).copied().flatten()),
            signal: sig.and_then(|c| c.signal.get(i).copied()),
            position_size: sig.and_then(|c| c.position_size.get(i).copied()),
            exposure: sig.and_then(|c| c.exposure.get(i).copied()),
            stop_loss: sig.and_then(|c| c.stop_loss.get(i).copied().flatten()),
        })
    }

    /// The last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> Vec<DerivedRow> {
        let start = self.len().saturating_sub(n);
        (start..self.len()).filter_map(|i| self.row(i)).collect()
    }
}

//! Trend indicators: moving averages and momentum.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of indicator values
//!
//! Warm-up rows carry `None`. Nothing here fails on short input; the
//! signal stage decides whether there is enough data.

pub mod momentum;
pub mod sma;

use crate::domain::ohlcv::PriceSeries;
use crate::domain::series::{DerivedSeries, IndicatorColumns};
use crate::domain::strategy::StrategyParams;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Momentum(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn value_at(&self, i: usize) -> Option<f64> {
        self.values.get(i).and_then(|p| p.value)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Momentum(period) => write!(f, "MOMENTUM({})", period),
        }
    }
}

/// Adds `MA_fast`, `MA_slow` and `Momentum` to a fresh derived table.
pub fn compute_indicators(prices: PriceSeries, params: &StrategyParams) -> DerivedSeries {
    let bars = prices.bars();
    let columns = IndicatorColumns {
        ma_fast: sma::calculate_sma(bars, params.fast_window),
        ma_slow: sma::calculate_sma(bars, params.slow_window),
        momentum: momentum::calculate_momentum(bars, params.momentum_window),
    };

    let mut table = DerivedSeries::new(prices);
    table.indicators = Some(columns);
    table
}

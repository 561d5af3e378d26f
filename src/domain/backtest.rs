//! Daily P&L simulation of the exposure series against buy-and-hold.
//!
//! MarketReturn[i]   = C[i] / C[i-1] - 1
//! StrategyReturn[i] = Exposure[i-1] * MarketReturn[i]
//!
//! Exposure decided at the close of day i-1 earns day i's return. The first
//! row has no return and is dropped, so the result is one row shorter than
//! its input and indexes from the second input row.

use crate::domain::error::TrendvolError;
use crate::domain::series::{DerivedSeries, Signal};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRow {
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Signal,
    pub exposure: f64,
    pub cond_vol_annual: Option<f64>,
    pub market_return: f64,
    pub strategy_return: f64,
    pub cum_market: f64,
    pub cum_strategy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub symbol: String,
    pub rows: Vec<BacktestRow>,
}

impl BacktestResult {
    pub fn strategy_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strategy_return).collect()
    }

    pub fn market_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.market_return).collect()
    }

    pub fn cum_strategy(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.cum_strategy).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn last(&self) -> Option<&BacktestRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn run_backtest(table: &DerivedSeries) -> Result<BacktestResult, TrendvolError> {
    let signals = table
        .signals
        .as_ref()
        .ok_or_else(|| TrendvolError::missing("Exposure"))?;
    let annual_vol = table.volatility.as_ref().map(|v| &v.annual);
    let bars = table.prices.bars();

    let mut rows = Vec::with_capacity(bars.len().saturating_sub(1));
    let mut cum_market = 1.0;
    let mut cum_strategy = 1.0;

    for i in 1..bars.len() {
        let Some(prev_exposure) = signals.exposure.get(i - 1).copied() else {
            continue;
        };
        let market_return = bars[i].close / bars[i - 1].close - 1.0;
        let strategy_return = prev_exposure * market_return;
        if !strategy_return.is_finite() {
            continue;
        }

        cum_market *= 1.0 + market_return;
        cum_strategy *= 1.0 + strategy_return;

        rows.push(BacktestRow {
            date: bars[i].date,
            close: bars[i].close,
            signal: signals.signal.get(i).copied().unwrap_or_default(),
            exposure: signals.exposure.get(i).copied().unwrap_or_default(),
            cond_vol_annual: annual_vol.and_then(|v| v.get(i).copied().flatten()),
            market_return,
            strategy_return,
            cum_market,
            cum_strategy,
        });
    }

    if rows.is_empty() {
        return Err(TrendvolError::EmptySeries);
    }

    Ok(BacktestResult {
        symbol: table.symbol().to_string(),
        rows,
    })
}

//! Runs every stage in order for one instrument.

use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::error::TrendvolError;
use crate::domain::indicator::compute_indicators;
use crate::domain::metrics::{performance_metrics, PerformanceReport};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::series::DerivedSeries;
use crate::domain::signal::generate_signals;
use crate::domain::strategy::StrategyParams;
use crate::domain::volatility::estimate_volatility;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub table: DerivedSeries,
    pub backtest: BacktestResult,
    pub report: PerformanceReport,
}

pub fn run(prices: PriceSeries, params: &StrategyParams) -> Result<PipelineOutput, TrendvolError> {
    let table = compute_indicators(prices, params);
    let table = estimate_volatility(table, params)?;
    let table = generate_signals(table, params)?;
    let backtest = run_backtest(&table)?;
    let report = performance_metrics(&backtest)?;

    Ok(PipelineOutput {
        table,
        backtest,
        report,
    })
}

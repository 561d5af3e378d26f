//! Display view of a pipeline run: the trailing window of the backtest,
//! formatted metrics and the current signal label.

use crate::domain::metrics::{Metric, PerformanceReport};
use crate::domain::pipeline::PipelineOutput;
use serde::Serialize;

pub const DEFAULT_WINDOW: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub cagr: String,
    pub sharpe: String,
    pub max_dd: String,
    pub beta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub ticker: String,
    pub dates: Vec<String>,
    pub equity_curve: Vec<f64>,
    pub benchmark: Vec<f64>,
    /// Annualized conditional volatility in percent.
    pub volatility: Vec<Option<f64>>,
    pub signals: Vec<u8>,
    pub metrics: MetricsView,
    pub current_signal: String,
}

impl MetricsView {
    pub fn from_report(report: &PerformanceReport) -> Self {
        Self {
            cagr: format_percent(report.cagr),
            sharpe: format_ratio(report.sharpe),
            max_dd: format_percent(report.max_drawdown),
            beta: format_ratio(report.beta),
        }
    }
}

impl ResultView {
    pub fn from_output(ticker: &str, output: &PipelineOutput, window: usize) -> Self {
        let rows = &output.backtest.rows;
        let tail = &rows[rows.len().saturating_sub(window)..];

        let current = tail.last().map(|r| r.signal).unwrap_or_default();

        Self {
            ticker: ticker.to_string(),
            dates: tail
                .iter()
                .map(|r| r.date.format("%Y-%m-%d").to_string())
                .collect(),
            equity_curve: tail.iter().map(|r| r.cum_strategy).collect(),
            benchmark: tail.iter().map(|r| r.cum_market).collect(),
            volatility: tail
                .iter()
                .map(|r| r.cond_vol_annual.map(|v| v * 100.0))
                .collect(),
            signals: tail.iter().map(|r| r.signal.as_u8()).collect(),
            metrics: MetricsView::from_report(&output.report),
            current_signal: current.label().to_string(),
        }
    }
}

pub fn format_percent(metric: Metric) -> String {
    match metric {
        Metric::Value(v) => format!("{:.2}%", v * 100.0),
        Metric::Undefined(_) => "n/a".to_string(),
    }
}

pub fn format_ratio(metric: Metric) -> String {
    match metric {
        Metric::Value(v) => format!("{:.2}", v),
        Metric::Undefined(_) => "n/a".to_string(),
    }
}

//! Performance metrics of a completed backtest.
//!
//! Each metric is computed independently. Degenerate inputs (zero variance,
//! zero-day span) yield `Metric::Undefined` for that metric only.

use super::backtest::BacktestResult;
use super::error::TrendvolError;
use super::strategy::{DAYS_PER_YEAR, TRADING_DAYS_PER_YEAR};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degenerate {
    ZeroVariance,
    ZeroDuration,
    TooFewObservations,
    NonFinite,
}

impl fmt::Display for Degenerate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Degenerate::ZeroVariance => "zero variance",
            Degenerate::ZeroDuration => "zero-day span",
            Degenerate::TooFewObservations => "too few observations",
            Degenerate::NonFinite => "non-finite result",
        };
        f.write_str(text)
    }
}

/// A scalar metric that may be undefined. Undefined is not zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    Undefined(Degenerate),
}

impl Metric {
    fn checked(value: f64) -> Self {
        if value.is_finite() {
            Metric::Value(value)
        } else {
            Metric::Undefined(Degenerate::NonFinite)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::Undefined(_) => None,
        }
    }

    /// The value, or NaN when undefined.
    pub fn as_f64(self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Metric::Value(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cagr: Metric,
    pub sharpe: Metric,
    pub max_drawdown: Metric,
    pub beta: Metric,
}

/// Compute all four metrics. Only an empty result (which `run_backtest`
/// never produces) is an error.
pub fn performance_metrics(result: &BacktestResult) -> Result<PerformanceReport, TrendvolError> {
    let (first, last) = match (result.rows.first(), result.rows.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(TrendvolError::EmptySeries),
    };

    let strategy = result.strategy_returns();
    let market = result.market_returns();
    let cum = result.cum_strategy();

    let cagr = match cagr(last.cum_strategy, first.date, last.date) {
        Ok(v) => Metric::checked(v),
        Err(_) => Metric::Undefined(Degenerate::ZeroDuration),
    };

    Ok(PerformanceReport {
        start_date: first.date,
        end_date: last.date,
        cagr,
        sharpe: sharpe_ratio(&strategy),
        max_drawdown: Metric::checked(max_drawdown(&cum)),
        beta: beta(&strategy, &market),
    })
}

/// (final growth) ^ (365.25 / calendar days) - 1.
pub fn cagr(final_growth: f64, first: NaiveDate, last: NaiveDate) -> Result<f64, TrendvolError> {
    let days = (last - first).num_days();
    if days == 0 {
        return Err(TrendvolError::ZeroDuration { date: first });
    }
    let total_return = final_growth - 1.0;
    Ok((1.0 + total_return).powf(DAYS_PER_YEAR / days as f64) - 1.0)
}

/// sqrt(252) * mean / sample stddev.
pub fn sharpe_ratio(returns: &[f64]) -> Metric {
    if returns.len() < 2 {
        return Metric::Undefined(Degenerate::TooFewObservations);
    }
    let m = mean(returns);
    let sd = sample_covariance(returns, returns).sqrt();
    if sd == 0.0 {
        return Metric::Undefined(Degenerate::ZeroVariance);
    }
    Metric::checked(TRADING_DAYS_PER_YEAR.sqrt() * m / sd)
}

/// Most negative (C - running max) / running max. Always <= 0.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &value in cumulative {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst
}

/// cov(strategy, market) / var(market), sample statistics.
pub fn beta(strategy: &[f64], market: &[f64]) -> Metric {
    if strategy.len() != market.len() || market.len() < 2 {
        return Metric::Undefined(Degenerate::TooFewObservations);
    }
    let var = sample_covariance(market, market);
    if var == 0.0 {
        return Metric::Undefined(Degenerate::ZeroVariance);
    }
    Metric::checked(sample_covariance(strategy, market) / var)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    let ma = mean(a);
    let mb = mean(b);
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    sum / (a.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::BacktestRow;
    use crate::domain::series::Signal;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn make_result(strategy: &[f64], market: &[f64]) -> BacktestResult {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut cum_m = 1.0;
        let mut cum_s = 1.0;
        let rows = strategy
            .iter()
            .zip(market)
            .enumerate()
            .map(|(i, (&s, &m))| {
                cum_m *= 1.0 + m;
                cum_s *= 1.0 + s;
                BacktestRow {
                    date: start + chrono::Duration::days(i as i64),
                    close: 100.0 * cum_m,
                    signal: Signal::Long,
                    exposure: 1.0,
                    cond_vol_annual: None,
                    market_return: m,
                    strategy_return: s,
                    cum_market: cum_m,
                    cum_strategy: cum_s,
                }
            })
            .collect();
        BacktestResult {
            symbol: "TEST".into(),
            rows,
        }
    }

    #[test]
    fn max_drawdown_known_curve() {
        let dd = max_drawdown(&[1.0, 1.1, 0.9, 0.95, 0.8, 1.0]);
        assert_relative_eq!(dd, (0.8 - 1.1) / 1.1, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_monotonic_is_exactly_zero() {
        let dd = max_drawdown(&[1.0, 1.01, 1.02, 1.5, 2.0]);
        assert_eq!(dd, 0.0);
    }

    #[test]
    fn max_drawdown_uses_series_own_peak() {
        // The first value is the initial peak, not 1.0.
        let dd = max_drawdown(&[0.9, 0.81]);
        assert_relative_eq!(dd, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_matches_formula() {
        let r = [0.01, -0.005, 0.02, 0.0, 0.003];
        let m = r.iter().sum::<f64>() / 5.0;
        let var = r.iter().map(|x| (x - m).powi(2)).sum::<f64>() / 4.0;
        let expected = 252f64.sqrt() * m / var.sqrt();
        assert_relative_eq!(sharpe_ratio(&r).value().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_zero_variance_is_undefined() {
        let s = sharpe_ratio(&[0.0; 20]);
        assert_eq!(s, Metric::Undefined(Degenerate::ZeroVariance));
        assert!(s.as_f64().is_nan());
    }

    #[test]
    fn sharpe_single_observation_is_undefined() {
        assert!(!sharpe_ratio(&[0.01]).is_defined());
    }

    #[test]
    fn beta_of_market_against_itself_is_one() {
        let m = [0.01, -0.02, 0.015, 0.0, -0.005];
        assert_relative_eq!(beta(&m, &m).value().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn beta_of_scaled_market() {
        let m = [0.01, -0.02, 0.015, 0.0, -0.005];
        let s: Vec<f64> = m.iter().map(|x| 0.5 * x).collect();
        assert_relative_eq!(beta(&s, &m).value().unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn beta_zero_market_variance_is_undefined() {
        let s = [0.01, 0.02, -0.01];
        let m = [0.0, 0.0, 0.0];
        assert_eq!(beta(&s, &m), Metric::Undefined(Degenerate::ZeroVariance));
    }

    #[test]
    fn cagr_one_year_doubling() {
        let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let last = first + chrono::Duration::days(365);
        let expected = 2f64.powf(365.25 / 365.0) - 1.0;
        assert_relative_eq!(cagr(2.0, first, last).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn cagr_zero_duration_fails() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(matches!(
            cagr(1.2, d, d),
            Err(TrendvolError::ZeroDuration { .. })
        ));
    }

    #[test]
    fn report_with_flat_market_keeps_other_metrics() {
        let result = make_result(&[0.01, -0.02, 0.03, 0.0], &[0.0; 4]);
        let report = performance_metrics(&result).unwrap();

        assert_eq!(report.beta, Metric::Undefined(Degenerate::ZeroVariance));
        assert!(report.sharpe.is_defined());
        assert!(report.cagr.is_defined());
        assert!(report.max_drawdown.value().unwrap() < 0.0);
    }

    #[test]
    fn report_single_row_has_undefined_cagr() {
        let result = make_result(&[0.01], &[0.01]);
        let report = performance_metrics(&result).unwrap();
        assert_eq!(report.cagr, Metric::Undefined(Degenerate::ZeroDuration));
        assert_eq!(report.max_drawdown, Metric::Value(0.0));
        assert_eq!(report.start_date, report.end_date);
    }

    #[test]
    fn report_on_empty_result_fails() {
        let result = BacktestResult {
            symbol: "TEST".into(),
            rows: vec![],
        };
        assert!(matches!(
            performance_metrics(&result),
            Err(TrendvolError::EmptySeries)
        ));
    }

    #[test]
    fn report_dates_span_rows() {
        let result = make_result(&[0.01, 0.02, 0.03], &[0.01, 0.02, 0.03]);
        let report = performance_metrics(&result).unwrap();
        assert_eq!(report.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(report.end_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_relative_eq!(report.beta.value().unwrap(), 1.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn max_drawdown_never_positive(returns in prop::collection::vec(-0.5f64..0.5, 1..200)) {
            let mut cum = 1.0;
            let curve: Vec<f64> = returns.iter().map(|r| { cum *= 1.0 + r; cum }).collect();
            let dd = max_drawdown(&curve);
            prop_assert!(dd <= 0.0);
            prop_assert!(dd >= -1.0);
        }
    }
}

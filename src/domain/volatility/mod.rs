//! Conditional volatility columns for the derived table.
//!
//! The model is fitted once over the whole close history on every call, so
//! early rows see parameters estimated with later data. Each call is an
//! independent fit; nothing is carried between calls.

pub mod garch;
pub mod optimizer;

use crate::domain::error::TrendvolError;
use crate::domain::series::{DerivedSeries, VolatilityColumns};
use crate::domain::strategy::{StrategyParams, TRADING_DAYS_PER_YEAR};

/// Returns are scaled by this factor before fitting and divided back after.
const RETURN_SCALE: f64 = 100.0;

/// Percentage simple returns: 100 * (C[i] / C[i-1] - 1), one per bar after the first.
pub fn percent_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| RETURN_SCALE * (w[1] / w[0] - 1.0))
        .collect()
}

/// Adds `CondVolDaily` and `CondVolAnnual`. The first row has no return and
/// stays undefined.
pub fn estimate_volatility(
    mut table: DerivedSeries,
    params: &StrategyParams,
) -> Result<DerivedSeries, TrendvolError> {
    let returns = percent_returns(&table.prices.closes());
    if returns.len() < params.min_vol_observations {
        return Err(TrendvolError::ModelFit {
            reason: format!(
                "need at least {} return observations, have {}",
                params.min_vol_observations,
                returns.len()
            ),
        });
    }

    let fit = garch::fit_garch11(&returns)?;

    let annualize = TRADING_DAYS_PER_YEAR.sqrt();
    let mut daily = Vec::with_capacity(table.len());
    let mut annual = Vec::with_capacity(table.len());
    if !table.is_empty() {
        daily.push(None);
        annual.push(None);
    }
    for sigma in &fit.conditional_volatility {
        let d = sigma / RETURN_SCALE;
        daily.push(Some(d));
        annual.push(Some(d * annualize));
    }

    table.volatility = Some(VolatilityColumns { daily, annual });
    Ok(table)
}

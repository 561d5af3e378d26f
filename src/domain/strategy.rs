//! Strategy parameters shared by the pipeline stages.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub fast_window: usize,
    pub slow_window: usize,
    pub momentum_window: usize,
    /// Annualized volatility the position size targets.
    pub target_vol: f64,
    /// Upper clamp for position size. 1.5 means at most 150% of capital.
    pub max_leverage: f64,
    /// Width of the stop-loss band below close, in daily sigmas.
    pub stop_loss_sigmas: f64,
    /// Fewest return observations the volatility model will be fitted on.
    pub min_vol_observations: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            fast_window: 50,
            slow_window: 200,
            momentum_window: 63,
            target_vol: 0.15,
            max_leverage: 1.5,
            stop_loss_sigmas: 2.0,
            min_vol_observations: 100,
        }
    }
}

impl StrategyParams {
    /// Bars needed before every indicator is defined on at least one row.
    pub fn longest_lookback(&self) -> usize {
        self.fast_window
            .max(self.slow_window)
            .max(self.momentum_window + 1)
    }
}

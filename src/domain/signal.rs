//! Trend signal, volatility-targeted position size and stop-loss band.
//!
//! Signal[i]       = Long iff MA_fast > MA_slow and Momentum > 0
//! PositionSize[i] = clamp(target_vol / CondVolAnnual, 0, max_leverage), 0 when vol is 0 or undefined
//! Exposure[i]     = Signal * PositionSize
//! StopLoss[i]     = Close * (1 - k * CondVolDaily)

use crate::domain::error::TrendvolError;
use crate::domain::series::{DerivedSeries, Signal, SignalColumns};
use crate::domain::strategy::StrategyParams;

pub fn generate_signals(
    mut table: DerivedSeries,
    params: &StrategyParams,
) -> Result<DerivedSeries, TrendvolError> {
    let indicators = table
        .indicators
        .as_ref()
        .ok_or_else(|| TrendvolError::missing("MA_fast/MA_slow/Momentum"))?;
    let volatility = table
        .volatility
        .as_ref()
        .ok_or_else(|| TrendvolError::missing("CondVolDaily/CondVolAnnual"))?;

    let minimum = params.longest_lookback();
    if table.len() < minimum {
        return Err(TrendvolError::InsufficientData {
            bars: table.len(),
            minimum,
        });
    }

    let n = table.len();
    let mut columns = SignalColumns {
        signal: Vec::with_capacity(n),
        position_size: Vec::with_capacity(n),
        exposure: Vec::with_capacity(n),
        stop_loss: Vec::with_capacity(n),
    };

    for (i, bar) in table.prices.bars().iter().enumerate() {
        let signal = trend_signal(
            indicators.ma_fast.value_at(i),
            indicators.ma_slow.value_at(i),
            indicators.momentum.value_at(i),
        );
        let size = position_size(volatility.annual.get(i).copied().flatten(), params);
        let stop = volatility
            .daily
            .get(i)
            .copied()
            .flatten()
            .map(|d| bar.close * (1.0 - params.stop_loss_sigmas * d));

        columns.signal.push(signal);
        columns.position_size.push(size);
        columns.exposure.push(signal.as_f64() * size);
        columns.stop_loss.push(stop);
    }

    table.signals = Some(columns);
    Ok(table)
}

/// Long only when every input is defined and both trend conditions hold.
pub fn trend_signal(ma_fast: Option<f64>, ma_slow: Option<f64>, momentum: Option<f64>) -> Signal {
    match (ma_fast, ma_slow, momentum) {
        (Some(fast), Some(slow), Some(mom)) if fast > slow && mom > 0.0 => Signal::Long,
        _ => Signal::Flat,
    }
}

/// Inverse-volatility size, always inside `[0, max_leverage]`.
pub fn position_size(cond_vol_annual: Option<f64>, params: &StrategyParams) -> f64 {
    let raw = match cond_vol_annual {
        Some(vol) if vol != 0.0 => params.target_vol / vol,
        _ => 0.0,
    };
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, params.max_leverage)
}

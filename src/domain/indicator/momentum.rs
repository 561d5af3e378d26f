//! Price momentum over a fixed lookback.
//!
//! MOMENTUM(n)[i] = C[i] / C[i-n] - 1
//! Warmup: first n bars undefined. A zero prior close is also undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_momentum(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let value = if i >= period {
            let prev_close = bars[i - period].close;
            if prev_close == 0.0 {
                None
            } else {
                Some(bars[i].close / prev_close - 1.0)
            }
        } else {
            None
        };

        values.push(IndicatorPoint {
            date: bars[i].date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Momentum(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn momentum_warmup() {
        let bars = make_bars(&[100.0, 105.0, 110.0, 115.0, 120.0]);
        let series = calculate_momentum(&bars, 3);

        assert_eq!(series.values[0].value, None);
        assert_eq!(series.values[1].value, None);
        assert_eq!(series.values[2].value, None);
        assert!(series.values[3].value.is_some());
        assert!(series.values[4].value.is_some());
    }

    #[test]
    fn momentum_basic_calculation() {
        let bars = make_bars(&[100.0, 105.0, 110.0, 115.0]);
        let series = calculate_momentum(&bars, 2);

        assert!((series.values[2].value.unwrap() - 0.10).abs() < 1e-12);
        assert!((series.values[3].value.unwrap() - (115.0 / 105.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn momentum_constant_prices_is_exactly_zero() {
        let bars = make_bars(&[42.0; 8]);
        let series = calculate_momentum(&bars, 3);
        for point in &series.values[3..] {
            assert_eq!(point.value, Some(0.0));
        }
    }

    #[test]
    fn momentum_negative_change() {
        let bars = make_bars(&[100.0, 90.0, 80.0]);
        let series = calculate_momentum(&bars, 2);
        let v = series.values[2].value.unwrap();
        assert!((v - (-0.20)).abs() < 1e-12);
    }

    #[test]
    fn momentum_zero_prior_close_is_undefined() {
        let bars = make_bars(&[0.0, 100.0, 110.0]);
        let series = calculate_momentum(&bars, 2);
        assert_eq!(series.values[2].value, None);
    }

    #[test]
    fn momentum_indicator_type() {
        let bars = make_bars(&[100.0, 105.0]);
        let series = calculate_momentum(&bars, 63);
        assert_eq!(series.indicator_type, IndicatorType::Momentum(63));
    }
}

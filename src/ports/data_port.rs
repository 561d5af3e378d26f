//! Price data access port trait.

use crate::domain::error::TrendvolError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` from `start_date` onwards, ascending.
    fn fetch_price_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<PriceSeries, TrendvolError>;

    fn list_symbols(&self) -> Result<Vec<String>, TrendvolError>;
}

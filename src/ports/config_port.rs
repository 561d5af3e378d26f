//! Configuration access port trait.

use crate::domain::error::TrendvolError;
use chrono::NaiveDate;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// A `YYYY-MM-DD` value. Absent keys are `Ok(None)`; malformed ones are
    /// `ConfigInvalid`.
    fn get_date(&self, section: &str, key: &str) -> Result<Option<NaiveDate>, TrendvolError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| TrendvolError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
                }),
        }
    }
}

//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for trendvol.
#[derive(Debug, thiserror::Error)]
pub enum TrendvolError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("volatility model fit failed: {reason}")]
    ModelFit { reason: String },

    #[error("missing column {column}: run the producing stage first")]
    MissingIndicator { column: String },

    #[error("no rows remain after dropping undefined strategy returns")]
    EmptySeries,

    #[error("zero-day span: first and last dates are both {date}")]
    ZeroDuration { date: NaiveDate },

    #[error("invalid price series: {reason}")]
    InvalidSeries { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendvolError {
    pub(crate) fn missing(column: &str) -> Self {
        TrendvolError::MissingIndicator {
            column: column.to_string(),
        }
    }
}

impl From<&TrendvolError> for std::process::ExitCode {
    fn from(err: &TrendvolError) -> Self {
        let code: u8 = match err {
            TrendvolError::Io(_) => 1,
            TrendvolError::ConfigParse { .. }
            | TrendvolError::ConfigMissing { .. }
            | TrendvolError::ConfigInvalid { .. } => 2,
            TrendvolError::Data { .. } | TrendvolError::InvalidSeries { .. } => 3,
            TrendvolError::NoData { .. }
            | TrendvolError::InsufficientData { .. }
            | TrendvolError::EmptySeries
            | TrendvolError::ZeroDuration { .. } => 5,
            TrendvolError::ModelFit { .. } | TrendvolError::MissingIndicator { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

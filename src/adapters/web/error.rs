//! JSON error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::TrendvolError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &TrendvolError) -> StatusCode {
    match err {
        TrendvolError::NoData { .. } => StatusCode::NOT_FOUND,
        TrendvolError::InsufficientData { .. }
        | TrendvolError::EmptySeries
        | TrendvolError::ZeroDuration { .. }
        | TrendvolError::InvalidSeries { .. }
        | TrendvolError::ModelFit { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TrendvolError::MissingIndicator { .. }
        | TrendvolError::Data { .. }
        | TrendvolError::ConfigParse { .. }
        | TrendvolError::ConfigMissing { .. }
        | TrendvolError::ConfigInvalid { .. }
        | TrendvolError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TrendvolError> for WebError {
    fn from(err: TrendvolError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ticker_is_not_found() {
        let err = TrendvolError::NoData {
            symbol: "XYZ".into(),
        };
        assert_eq!(status_from_error(&err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn short_history_is_unprocessable() {
        let err = TrendvolError::InsufficientData {
            bars: 10,
            minimum: 200,
        };
        assert_eq!(status_from_error(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn provider_failure_is_internal() {
        let web: WebError = TrendvolError::Data {
            reason: "disk".into(),
        }
        .into();
        assert_eq!(web.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(web.message, "data error: disk");
    }
}

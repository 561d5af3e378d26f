//! HTTP request handlers for the JSON API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::{Arc, MutexGuard};

use crate::adapters::result_cache::ResultCache;
use crate::adapters::view::ResultView;
use crate::domain::error::TrendvolError;
use crate::domain::ohlcv::is_valid_symbol;
use crate::domain::pipeline;

use super::{AppState, DEFAULT_TICKER, WebError};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_default_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResultView>, WebError> {
    load_view(state, DEFAULT_TICKER.to_string()).await
}

pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<ResultView>, WebError> {
    load_view(state, ticker).await
}

pub async fn not_found() -> WebError {
    WebError::new(StatusCode::NOT_FOUND, "not found")
}

async fn load_view(state: Arc<AppState>, ticker: String) -> Result<Json<ResultView>, WebError> {
    let ticker = ticker.trim().to_uppercase();
    if !is_valid_symbol(&ticker) {
        tracing::warn!(ticker = %ticker, "rejected ticker");
        return Err(WebError::from(TrendvolError::NoData { symbol: ticker }));
    }

    let cached = lock_cache(&state)?.get(&ticker);
    if let Some(hit) = cached {
        tracing::debug!(ticker = %ticker, "cache hit");
        return Ok(Json(hit));
    }

    let worker = Arc::clone(&state);
    let symbol = ticker.clone();
    let view = tokio::task::spawn_blocking(move || compute_view(&worker, &symbol))
        .await
        .map_err(|e| WebError::internal(format!("pipeline task failed: {e}")))?
        .map_err(|e| {
            tracing::warn!(ticker = %ticker, error = %e, "pipeline failed");
            WebError::from(e)
        })?;

    lock_cache(&state)?.insert(&ticker, view.clone());
    Ok(Json(view))
}

/// Fetches prices and runs the full pipeline for one ticker.
pub fn compute_view(state: &AppState, ticker: &str) -> Result<ResultView, TrendvolError> {
    let prices = state.data_port.fetch_price_series(ticker, state.start_date)?;
    tracing::info!(ticker = %ticker, bars = prices.len(), "running pipeline");
    let output = pipeline::run(prices, &state.params)?;
    Ok(ResultView::from_output(ticker, &output, state.window))
}

fn lock_cache(state: &AppState) -> Result<MutexGuard<'_, ResultCache<ResultView>>, WebError> {
    state
        .cache
        .lock()
        .map_err(|_| WebError::internal("result cache poisoned"))
}

//! JSON API over the pipeline.
//!
//! Results are computed on demand per ticker and held in a bounded,
//! expiring cache shared by all requests.

mod error;
mod handlers;

pub use error::{WebError, status_from_error};
pub use handlers::*;

use axum::{Router, routing::get};
use chrono::NaiveDate;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::result_cache::ResultCache;
use crate::adapters::view::ResultView;
use crate::domain::strategy::StrategyParams;
use crate::ports::data_port::DataPort;

pub const DEFAULT_TICKER: &str = "SPY";

pub struct AppState {
    pub data_port: Arc<dyn DataPort + Send + Sync>,
    pub params: StrategyParams,
    pub start_date: NaiveDate,
    pub window: usize,
    pub cache: Mutex<ResultCache<ResultView>>,
}

impl AppState {
    pub fn new(
        data_port: Arc<dyn DataPort + Send + Sync>,
        params: StrategyParams,
        start_date: NaiveDate,
        window: usize,
        cache_capacity: NonZeroUsize,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            data_port,
            params,
            start_date,
            window,
            cache: Mutex::new(ResultCache::new(cache_capacity, cache_ttl)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/data", get(handlers::get_default_data))
        .route("/api/data/{ticker}", get(handlers::get_data))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

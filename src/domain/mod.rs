//! Core domain types and the signal/backtest pipeline.
//!
//! Stages, leaf first: `indicator` -> `volatility` -> `signal` ->
//! `backtest` -> `metrics`. `pipeline` runs them in order.

pub mod ohlcv;
pub mod series;
pub mod strategy;
pub mod indicator;
pub mod volatility;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod pipeline;
pub mod config_validation;
pub mod error;

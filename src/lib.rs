//! trendvol: trend/momentum signal with volatility-targeted sizing and a
//! daily backtest against buy-and-hold.
//!
//! Hexagonal architecture: the pipeline lives in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;

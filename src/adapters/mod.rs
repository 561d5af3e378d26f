//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod logging;
pub mod result_cache;
pub mod view;

#[cfg(feature = "web")]
pub mod web;

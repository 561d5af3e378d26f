//! Trait seams between the pipeline and its hosts.

pub mod config_port;
pub mod data_port;

//! Configuration validation.
//!
//! Checks every configured value before a pipeline run. Absent keys fall
//! back to defaults and are not errors, except where noted. Present keys
//! must parse as their type.

use crate::domain::error::TrendvolError;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TrendvolError> {
    if config.get_string("data", "path").is_none() {
        return Err(TrendvolError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        });
    }
    config.get_date("data", "start_date")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TrendvolError> {
    let fast = positive_int(config, "strategy", "fast_window", 50)?;
    let slow = positive_int(config, "strategy", "slow_window", 200)?;
    positive_int(config, "strategy", "momentum_window", 63)?;
    positive_int(config, "strategy", "min_vol_observations", 100)?;

    if fast >= slow {
        return Err(invalid(
            "strategy",
            "fast_window",
            "fast_window must be shorter than slow_window",
        ));
    }

    positive_double(config, "strategy", "target_vol", 0.15)?;
    positive_double(config, "strategy", "max_leverage", 1.5)?;

    let sigmas: f64 = parsed(config, "strategy", "stop_loss_sigmas", 2.0, "a number")?;
    if !(sigmas >= 0.0 && sigmas.is_finite()) {
        return Err(invalid(
            "strategy",
            "stop_loss_sigmas",
            "stop_loss_sigmas must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_web_config(config: &dyn ConfigPort) -> Result<(), TrendvolError> {
    if let Some(listen) = config.get_string("web", "listen") {
        if listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(invalid(
                "web",
                "listen",
                "listen must be an address like 127.0.0.1:5001",
            ));
        }
    }
    positive_int(config, "web", "window", 1000)?;
    positive_int(config, "web", "cache_capacity", 64)?;
    positive_int(config, "web", "cache_ttl_secs", 3600)?;
    Ok(())
}

pub fn validate_logging_config(config: &dyn ConfigPort) -> Result<(), TrendvolError> {
    if let Some(format) = config.get_string("logging", "format") {
        if format != "pretty" && format != "json" {
            return Err(invalid(
                "logging",
                "format",
                "format must be pretty or json",
            ));
        }
    }
    Ok(())
}

pub fn validate_all(config: &dyn ConfigPort) -> Result<(), TrendvolError> {
    validate_data_config(config)?;
    validate_strategy_config(config)?;
    validate_web_config(config)?;
    validate_logging_config(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TrendvolError {
    TrendvolError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
    kind: &str,
) -> Result<T, TrendvolError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            invalid(section, key, &format!("{} must be {} (got {:?})", key, kind, raw))
        }),
    }
}

fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, TrendvolError> {
    let value = parsed(config, section, key, default, "an integer")?;
    if value <= 0 {
        return Err(invalid(section, key, &format!("{} must be positive", key)));
    }
    Ok(value)
}

fn positive_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TrendvolError> {
    let value = parsed(config, section, key, default, "a number")?;
    if !(value > 0.0 && value.is_finite()) {
        return Err(invalid(section, key, &format!("{} must be positive", key)));
    }
    Ok(value)
}

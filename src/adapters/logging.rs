//! Tracing subscriber setup for the CLI and the web server.
//!
//! `RUST_LOG` overrides the configured level when set.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Libraries whose debug output drowns out pipeline events.
pub const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "h2", "tower", "axum"];

pub const DEFAULT_LEVEL: &str = "info";
pub const DEFAULT_FORMAT: &str = "pretty";

fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }
    EnvFilter::new(&directives)
}

/// Installs the global subscriber. `format` is `json` or `pretty`; anything
/// else falls back to pretty. A second call is a no-op.
pub fn init_logging(level: &str, format: &str) {
    let subscriber = tracing_subscriber::registry().with(build_filter(level));

    if format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::debug!(level = %level, format = %format, "logging initialized");
}

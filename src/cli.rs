//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::logging::{DEFAULT_FORMAT, DEFAULT_LEVEL, init_logging};
use crate::adapters::view::{format_percent, format_ratio};
use crate::domain::config_validation::{validate_all, validate_data_config, validate_strategy_config};
use crate::domain::error::TrendvolError;
use crate::domain::pipeline::{self, PipelineOutput};
use crate::domain::series::DerivedRow;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub const DEFAULT_START_DATE: (i32, u32, u32) = (2020, 1, 1);

#[derive(Parser, Debug)]
#[command(
    name = "trendvol",
    about = "Trend-following backtester with GARCH volatility targeting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline for one symbol and print performance metrics
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        /// First date to load (YYYY-MM-DD); overrides [data] start_date
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Print the most recent rows of indicators and signals
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(short, long, default_value_t = 10)]
        rows: usize,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the JSON API server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            start,
        } => run_backtest(&config, &symbol, start),
        Command::Signals {
            config,
            symbol,
            start,
            rows,
        } => run_signals(&config, &symbol, start, rows),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Serve { config } => run_serve(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Loads the INI file and installs logging from its `[logging]` section.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    let config = FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    init_logging(
        &config
            .get_string("logging", "level")
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
        &config
            .get_string("logging", "format")
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
    );
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, TrendvolError> {
    validate_strategy_config(config)?;
    let defaults = StrategyParams::default();
    let window = |key: &str, default: usize| config.get_int("strategy", key, default as i64) as usize;

    Ok(StrategyParams {
        fast_window: window("fast_window", defaults.fast_window),
        slow_window: window("slow_window", defaults.slow_window),
        momentum_window: window("momentum_window", defaults.momentum_window),
        target_vol: config.get_double("strategy", "target_vol", defaults.target_vol),
        max_leverage: config.get_double("strategy", "max_leverage", defaults.max_leverage),
        stop_loss_sigmas: config.get_double(
            "strategy",
            "stop_loss_sigmas",
            defaults.stop_loss_sigmas,
        ),
        min_vol_observations: window("min_vol_observations", defaults.min_vol_observations),
    })
}

/// `--start` wins over `[data] start_date`, which wins over 2020-01-01.
pub fn resolve_start_date(
    start_override: Option<NaiveDate>,
    config: &dyn ConfigPort,
) -> Result<NaiveDate, TrendvolError> {
    if let Some(start) = start_override {
        return Ok(start);
    }
    if let Some(start) = config.get_date("data", "start_date")? {
        return Ok(start);
    }
    let (y, m, d) = DEFAULT_START_DATE;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| TrendvolError::ConfigInvalid {
        section: "data".to_string(),
        key: "start_date".to_string(),
        reason: "default start date is invalid".to_string(),
    })
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<CsvAdapter, TrendvolError> {
    validate_data_config(config)?;
    let path = config
        .get_string("data", "path")
        .ok_or_else(|| TrendvolError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(path)))
}

/// Fetches `symbol` and runs every stage.
pub fn run_pipeline(
    config: &dyn ConfigPort,
    symbol: &str,
    start_override: Option<NaiveDate>,
) -> Result<PipelineOutput, TrendvolError> {
    let params = build_strategy_params(config)?;
    let start = resolve_start_date(start_override, config)?;
    let data_port = build_data_port(config)?;

    let symbol = symbol.trim().to_uppercase();
    let prices = data_port.fetch_price_series(&symbol, start)?;
    tracing::info!(symbol = %symbol, bars = prices.len(), %start, "running pipeline");
    pipeline::run(prices, &params)
}

pub fn format_report(symbol: &str, output: &PipelineOutput) -> String {
    let report = &output.report;
    let current = output
        .backtest
        .last()
        .map(|r| r.signal)
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", symbol));
    out.push_str(&format!(
        "Period:           {} to {} ({} rows)\n",
        report.start_date,
        report.end_date,
        output.backtest.len()
    ));
    out.push_str(&format!("CAGR:             {}\n", format_percent(report.cagr)));
    out.push_str(&format!("Sharpe Ratio:     {}\n", format_ratio(report.sharpe)));
    out.push_str(&format!(
        "Max Drawdown:     {}\n",
        format_percent(report.max_drawdown)
    ));
    out.push_str(&format!("Beta vs Market:   {}\n", format_ratio(report.beta)));
    out.push_str(&format!("Current Signal:   {}\n", current.label()));
    out
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

pub fn format_signal_rows(rows: &[DerivedRow]) -> String {
    let mut out = format!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>7} {:>9}\n",
        "Date", "Close", "MA_fast", "MA_slow", "Momentum", "Signal", "Exposure"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<12} {:>10.2} {:>10} {:>10} {:>10} {:>7} {:>9}\n",
            row.date.to_string(),
            row.close,
            cell(row.ma_fast),
            cell(row.ma_slow),
            row.momentum
                .map(|m| format!("{:.2}%", m * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            row.signal.map(|s| s.as_u8().to_string()).unwrap_or_default(),
            cell(row.exposure),
        ));
    }
    out
}

fn fail(err: &TrendvolError) -> ExitCode {
    tracing::error!(error = %err, "command failed");
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn run_backtest(config_path: &Path, symbol: &str, start: Option<NaiveDate>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match run_pipeline(&config, symbol, start) {
        Ok(output) => {
            print!("{}", format_report(&symbol.trim().to_uppercase(), &output));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_signals(config_path: &Path, symbol: &str, start: Option<NaiveDate>, rows: usize) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match run_pipeline(&config, symbol, start) {
        Ok(output) => {
            print!("{}", format_signal_rows(&output.table.tail(rows)));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbols = match build_data_port(&config).and_then(|port| port.list_symbols()) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&config) {
        return fail(&e);
    }

    match build_strategy_params(&config) {
        Ok(params) => {
            eprintln!("Strategy:");
            eprintln!(
                "  MA windows:       {} / {}",
                params.fast_window, params.slow_window
            );
            eprintln!("  Momentum window:  {}", params.momentum_window);
            eprintln!("  Target vol:       {:.2}%", params.target_vol * 100.0);
            eprintln!("  Max leverage:     {:.2}", params.max_leverage);
            eprintln!("  Stop loss sigmas: {:.2}", params.stop_loss_sigmas);
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_serve(config_path: &Path) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};
        use std::net::SocketAddr;
        use std::num::NonZeroUsize;
        use std::sync::Arc;
        use std::time::Duration;

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };

        if let Err(e) = validate_all(&config) {
            return fail(&e);
        }

        let setup = || -> Result<(AppState, SocketAddr), TrendvolError> {
            let params = build_strategy_params(&config)?;
            let start_date = resolve_start_date(None, &config)?;
            let data_port = Arc::new(build_data_port(&config)?)
                as Arc<dyn DataPort + Send + Sync>;

            let invalid = |key: &str, reason: &str| TrendvolError::ConfigInvalid {
                section: "web".to_string(),
                key: key.to_string(),
                reason: reason.to_string(),
            };
            let addr: SocketAddr = config
                .get_string("web", "listen")
                .unwrap_or_else(|| "127.0.0.1:5001".to_string())
                .parse()
                .map_err(|_| invalid("listen", "not a socket address"))?;
            let window = config.get_int("web", "window", 1000) as usize;
            let capacity = NonZeroUsize::new(config.get_int("web", "cache_capacity", 64) as usize)
                .ok_or_else(|| invalid("cache_capacity", "must be positive"))?;
            let ttl = Duration::from_secs(config.get_int("web", "cache_ttl_secs", 3600) as u64);

            Ok((
                AppState::new(data_port, params, start_date, window, capacity, ttl),
                addr,
            ))
        };

        let (state, addr) = match setup() {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => return fail(&TrendvolError::Io(e)),
        };

        let router = build_router(state);
        tracing::info!(%addr, "starting web server");

        let served: std::io::Result<()> = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&TrendvolError::Io(e)),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

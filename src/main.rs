use clap::Parser;
use trendvol::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}

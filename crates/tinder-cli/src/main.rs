mod cli;
mod commands;
mod config;
mod host;
mod util;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};
use config::Config;

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(code) => return code,
    };
    match cli.command {
        Command::Check { source } => commands::check::run(&source),
        Command::Run { source, trace, fuel } => commands::run::run(&source, trace, fuel, &config),
        Command::Dump { source, format } => commands::dump::run(&source, format),
    }
}

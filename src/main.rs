use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

mod caption;
mod config;
mod error;
mod gateway;
mod logger;
mod models;
mod notifier;
mod runner;
mod store;
mod tmdb;

use crate::config::Config;
use crate::runner::RunMode;

/// Notify a chat about top-rated or newly released movies and TV shows.
/// Meant to be started by an external scheduler; every run is a single pass.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional YAML config file; environment variables take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = RunMode::TopRated)]
    mode: RunMode,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write diagnostics to this file
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_config = logger::LogConfig {
        console_level: logger::parse_log_level(&args.log_level),
        log_file: args.log_file.clone(),
        ..Default::default()
    };
    if let Err(e) = logger::init(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Partial failures are logged by the run itself and still exit 0.
    match runner::run(&config, args.mode).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_top_rated_defaults() {
        let args = Args::try_parse_from(["MovieNotifier"]).unwrap();
        assert_eq!(args.mode, RunMode::TopRated);
        assert!(args.config.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn latest_mode_flag() {
        let args = Args::try_parse_from(["MovieNotifier", "--mode", "latest"]).unwrap();
        assert_eq!(args.mode, RunMode::Latest);
    }
}

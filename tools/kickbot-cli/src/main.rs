//! Kickbot CLI: run the tracker and manage its configuration.
//!
//! Usage:
//!   kickbot simulate [OPTIONS]   Play a simulated game with the tracker
//!   kickbot config [OPTIONS]     Show, validate, or initialize configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kickbot_common::config::{config_file_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "kickbot",
    about = "Latency-compensated ball tracking and auto-clicking",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tracker against a simulated game
    Simulate {
        /// Stop after this many seconds (default: until Ctrl+C)
        #[arg(short, long)]
        seconds: Option<f64>,

        /// Interval between status reports in milliseconds
        #[arg(long, default_value = "500")]
        report_ms: u64,

        /// Print reports as JSON lines
        #[arg(long)]
        json: bool,

        /// Aim at raw detections instead of predicted positions
        #[arg(long)]
        raw: bool,

        /// Click every cycle the target is tracked
        #[arg(long)]
        always_click: bool,

        /// Do not click on trigger decisions
        #[arg(long)]
        no_smart_click: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file when used with --init
        #[arg(long)]
        force: bool,

        /// Print the config file path and exit
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config_file_path);
    let (config, load_error) = if config_path.exists() {
        match AppConfig::load_from(&config_path) {
            Ok(config) => (config, None),
            // An explicit path must load; the standard one may be stale
            Err(e) if cli.config.is_some() => return Err(e.into()),
            Err(e) => (AppConfig::default(), Some(e)),
        }
    } else {
        (AppConfig::default(), None)
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    kickbot_common::logging::init_logging(&logging);
    if let Some(e) = load_error {
        tracing::warn!(path = %config_path.display(), error = %e, "Failed to load config, using defaults");
    }

    match cli.command {
        Commands::Simulate {
            seconds,
            report_ms,
            json,
            raw,
            always_click,
            no_smart_click,
        } => {
            commands::simulate::run(
                config,
                commands::simulate::SimulateOptions {
                    seconds,
                    report_ms,
                    json,
                    raw,
                    always_click,
                    no_smart_click,
                },
            )
            .await
        }
        Commands::Config { init, force, path } => {
            commands::config::run(config, config_path, init, force, path)
        }
    }
}

//! mempool CLI - run allocation scripts against a fixed-capacity pool.

mod commands;
mod config;
mod script;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// mempool - first-fit pool allocator simulator.
#[derive(Parser)]
#[command(name = "mempool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute an allocation script and print the resulting directory
    Run {
        /// Path to the script file
        script: PathBuf,

        /// Pool capacity in bytes
        #[arg(short, long)]
        size: Option<usize>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pool name shown in diagnostics
        #[arg(long)]
        name: Option<String>,

        /// Print the final directory and statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            script,
            size,
            config,
            name,
            json,
        } => {
            let overrides = config::Overrides { size, name };
            let settings = config::load(config.as_deref(), overrides)?;
            commands::run::run(&script, settings, json)
        }
        Commands::Config { config } => {
            let settings = config::load(config.as_deref(), config::Overrides::default())?;
            commands::config::run(&settings)
        }
    }
}

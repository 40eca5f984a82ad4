//! Vantage CLI - compile view catalogs into a release
//!
//! Usage:
//!   vantage run --release <name> --config <config.json> --data <data.json>
//!   vantage validate --config <config.json> --data <data.json>
//!
//! Examples:
//!   vantage run -r 2026-08 -c config.json -d data.yaml --force
//!   vantage validate -c config.json -d data.json

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use vantage::compile::{compile_from_paths, CompileOptions};
use vantage::model::loader::{load_config, load_datasets};
use vantage::resolve::views::DEFAULT_WARN_MAX;
use vantage::validation::{validate_config, validate_datasets, validate_sources};

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Vantage - compiles declarative view catalogs into relational metadata")]
#[command(version)]
struct Cli {
    /// Be chatty
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a catalog into a release directory
    Run {
        /// Release name (output directory and database stem)
        #[arg(short, long)]
        release: String,

        /// File defining the filter catalog, views and column overrides
        #[arg(short, long)]
        config: PathBuf,

        /// File detailing the data sources
        #[arg(short, long)]
        data: PathBuf,

        /// Overwrite the release directory if already present
        #[arg(short, long)]
        force: bool,

        /// Distinct-value count that triggers a warning
        #[arg(long, default_value_t = DEFAULT_WARN_MAX)]
        warn_max: usize,
    },

    /// Validate the documents without compiling
    Validate {
        /// File defining the filter catalog, views and column overrides
        #[arg(short, long)]
        config: PathBuf,

        /// File detailing the data sources
        #[arg(short, long)]
        data: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            release,
            config,
            data,
            force,
            warn_max,
        } => {
            let options = CompileOptions::new(release)
                .with_force(force)
                .with_warn_max(warn_max);
            match compile_from_paths(&config, &data, &options) {
                Ok(output) => {
                    println!("release written to {}", output.database_path.display());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Validate { config, data } => match run_validate(&config, &data) {
            Ok(()) => {
                println!("documents are valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_validate(
    config_path: &std::path::Path,
    data_path: &std::path::Path,
) -> Result<(), vantage::compile::CompileError> {
    let config = load_config(config_path)?;
    let datasets = load_datasets(data_path)?;
    validate_config(&config)?;
    validate_datasets(&datasets)?;
    validate_sources(&config, &datasets)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

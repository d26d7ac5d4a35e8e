//! Colony economy - development tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "colony-tools")]
#[command(about = "Development tools for the colony production engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },
    /// Report a colony's production
    Report {
        /// Rule set file
        #[arg(long, default_value = "assets/data/rules/classic.ron")]
        rules: PathBuf,
        /// Colony file
        #[arg(long)]
        colony: PathBuf,
        /// Turns to run before reporting
        #[arg(long, default_value_t = 0)]
        turns: u32,
        /// Seed for queue completion randomness
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            match colony_tools::validate::validate_data_directory(&path) {
                Ok(summary) => tracing::info!(
                    "Validation passed: {} rule sets, {} colonies",
                    summary.rules,
                    summary.colonies
                ),
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Report {
            rules,
            colony,
            turns,
            seed,
            json,
        } => match colony_tools::report::run_report(&rules, &colony, turns, seed) {
            Ok(report) if json => match serde_json::to_string_pretty(&report) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    tracing::error!("Failed to encode report: {e}");
                    std::process::exit(1);
                }
            },
            Ok(report) => print!("{}", report.production),
            Err(e) => {
                tracing::error!("Report failed: {e}");
                std::process::exit(1);
            }
        },
    }
}

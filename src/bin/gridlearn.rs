//! gridlearn CLI - Headless training for tabular grid-world learners
//!
//! This CLI provides:
//! - Training Q-learning, SARSA and the naive baseline side by side
//! - Inspecting the tuned hyperparameters for a grid size

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gridlearn")]
#[command(version, about = "Tabular reinforcement learning on a grid world", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train all three strategies until the episode target is reached
    Train(Box<gridlearn::cli::commands::train::TrainArgs>),

    /// Print the default hyperparameters for a grid size
    Defaults(gridlearn::cli::commands::defaults::DefaultsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gridlearn={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Train(args) => gridlearn::cli::commands::train::execute(*args),
        Commands::Defaults(args) => gridlearn::cli::commands::defaults::execute(args),
    }
}

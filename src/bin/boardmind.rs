//! boardmind CLI - self-learning decision core for turn-based board games
//!
//! This CLI provides a unified interface for:
//! - Training value tables through self-play on the bundled skirmish game
//! - Inspecting and exporting saved value-table snapshots

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "boardmind")]
#[command(version, about = "Self-learning decision core for board game agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run self-play training
    Train(boardmind::cli::commands::train::TrainArgs),

    /// Inspect a saved value table
    Inspect(boardmind::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => boardmind::cli::commands::train::execute(args),
        Commands::Inspect(args) => boardmind::cli::commands::inspect::execute(args),
    }
}

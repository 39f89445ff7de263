//! IPD CLI - Command-line interface
//!
//! Commands:
//! - evolve: Evolve a population of memory strategies
//! - compete: Play one competition between two strategies
//! - tournament: Round robin over a fixed pool of strategies
//! - strategies: List the built-in strategies

mod compete;
mod evolve;
mod players;
mod tournament;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compete::CompeteArgs;
use evolve::EvolveArgs;
use tournament::TournamentArgs;

#[derive(Parser)]
#[command(name = "ipd")]
#[command(about = "Evolution of iterated Prisoner's Dilemma memory strategies")]
#[command(version)]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population of memory strategies
    Evolve(EvolveArgs),
    /// Play one competition between two strategies
    Compete(CompeteArgs),
    /// Round robin over a fixed pool of strategies
    Tournament(TournamentArgs),
    /// List the built-in strategies
    Strategies,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evolve(args) => evolve::run(args, cli.seed),
        Commands::Compete(args) => compete::run(args),
        Commands::Tournament(args) => tournament::run(args),
        Commands::Strategies => list_strategies(),
    }
}

fn list_strategies() -> anyhow::Result<()> {
    for name in ipd_core::builtin_names() {
        let strategy = ipd_core::builtin(name)?;
        println!(
            "{:<24} #{:<4} memory={} start={:<4} decisions={}",
            name,
            strategy.id(),
            strategy.memory_size(),
            strategy.start_state(),
            strategy.decision_list()
        );
    }
    Ok(())
}

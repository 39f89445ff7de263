//! Tournament command - round robin over a fixed pool of strategies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), load_pool(), print_standings()

use anyhow::{bail, Result};
use clap::Args;

use ipd_core::{builtin, builtin_names, Strategy};
use ipd_tournament::{run_tournament, TournamentConfig, TournamentResult};

use crate::compete::match_config;
use crate::players::parse_player;

#[derive(Args)]
pub struct TournamentArgs {
    /// Participants, builtin names or strategy IDs (default: every builtin)
    #[arg(long = "player", value_name = "NAME|ID")]
    pub players: Vec<String>,

    /// Rounds per competition
    #[arg(long, default_value = "64")]
    pub rounds: usize,

    /// Round at which both players are forced to defect
    #[arg(long)]
    pub hard_defect_round: Option<usize>,

    /// Let each strategy also play a copy of itself
    #[arg(long)]
    pub self_play: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TournamentArgs) -> Result<()> {
    let config = build_config(&args)?;
    let pool = load_pool(&args)?;

    tracing::info!("Running tournament: {} strategies, {} rounds", pool.len(), args.rounds);
    let result = run_tournament(&pool, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_standings(&result);
    }

    Ok(())
}

fn build_config(args: &TournamentArgs) -> Result<TournamentConfig> {
    let match_config = match_config(args.rounds, args.hard_defect_round)?;
    Ok(TournamentConfig::new(match_config).with_self_play(args.self_play))
}

fn load_pool(args: &TournamentArgs) -> Result<Vec<Strategy>> {
    let pool = if args.players.is_empty() {
        builtin_names().map(builtin).collect::<Result<Vec<_>, _>>()?
    } else {
        args.players.iter().map(|name| parse_player(name)).collect::<Result<Vec<_>>>()?
    };

    if pool.len() < 2 && !args.self_play {
        bail!("A tournament needs at least two players");
    }
    Ok(pool)
}

fn print_standings(result: &TournamentResult) {
    println!("=== Tournament Standings ===");
    for (rank, standing) in result.standings.iter().enumerate() {
        println!(
            "{:>2}. {:<24} #{:<8} total={:<7} mean={:<9.2} coop={:.1}%",
            rank + 1,
            standing.name,
            standing.id,
            standing.total_score,
            standing.mean_score(),
            standing.cooperation_rate() * 100.0
        );
    }
}

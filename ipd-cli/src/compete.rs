//! Compete command - play one competition between two strategies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_report(), print_report()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use ipd_core::StrategyId;
use ipd_tournament::{Competition, CompetitionSummary, MatchConfig};

use crate::players::parse_player;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct CompeteArgs {
    /// First player: builtin name or strategy ID
    #[arg(long)]
    pub player1: String,

    /// Second player: builtin name or strategy ID
    #[arg(long)]
    pub player2: String,

    /// Rounds to play
    #[arg(long, default_value = "64")]
    pub rounds: usize,

    /// Round at which both players are forced to defect
    #[arg(long)]
    pub hard_defect_round: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Serialize)]
struct PlayerReport {
    name: String,
    id: StrategyId,
    start_state: String,
    decision_list: String,
    moves: String,
}

#[derive(Clone, Debug, Serialize)]
struct CompeteReport {
    rounds: usize,
    hard_defect_round: Option<usize>,
    player1: PlayerReport,
    player2: PlayerReport,
    summary: CompetitionSummary,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: CompeteArgs) -> Result<()> {
    let report = build_report(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_report(args: &CompeteArgs) -> Result<CompeteReport> {
    let strategy1 = parse_player(&args.player1).context("Invalid --player1")?;
    let strategy2 = parse_player(&args.player2).context("Invalid --player2")?;

    let config = match_config(args.rounds, args.hard_defect_round)?;

    let result = Competition::new(&strategy1, &strategy2, config).run();
    let player = |strategy: &ipd_core::Strategy, moves: String| PlayerReport {
        name: strategy.name().to_string(),
        id: strategy.id(),
        start_state: strategy.start_state().to_string(),
        decision_list: strategy.decision_list().to_string(),
        moves,
    };

    Ok(CompeteReport {
        rounds: args.rounds,
        hard_defect_round: args.hard_defect_round,
        player1: player(&strategy1, result.moves1().to_string()),
        player2: player(&strategy2, result.moves2().to_string()),
        summary: result.summary(),
    })
}

/// Competition parameters from `--rounds` and `--hard-defect-round`
pub(crate) fn match_config(rounds: usize, hard_defect_round: Option<usize>) -> Result<MatchConfig> {
    let mut config = MatchConfig::new(rounds);
    if let Some(round) = hard_defect_round {
        config = config.with_hard_defect(round);
    }
    config.validate().context("Invalid --hard-defect-round or --rounds")?;
    Ok(config)
}

fn print_report(report: &CompeteReport) {
    println!("=== {} vs {} ({} rounds) ===", report.player1.name, report.player2.name, report.rounds);
    if let Some(round) = report.hard_defect_round {
        println!("Hard defect at round {}", round);
    }

    let s = &report.summary;
    for (label, player, score, tallies) in [
        ("Player 1", &report.player1, s.score1, [s.retaliation1, s.aggression1, s.forgiveness1, s.reciprocity1]),
        ("Player 2", &report.player2, s.score2, [s.retaliation2, s.aggression2, s.forgiveness2, s.reciprocity2]),
    ] {
        println!(
            "{}: {} #{} [{}|{}]",
            label, player.name, player.id, player.start_state, player.decision_list
        );
        println!("  Moves: {}", player.moves);
        println!("  Score: {}", score);
        println!(
            "  Retaliation: {}  Aggression: {}  Forgiveness: {}  Reciprocity: {}",
            tallies[0], tallies[1], tallies[2], tallies[3]
        );
    }
    println!("Outcomes: CC={} CD={} DC={} DD={}", s.count_cc, s.count_cd, s.count_dc, s.count_dd);
}

//! Round-robin tournaments between fixed strategy pools
//!
//! Level 1 - Orchestration and Level 2 - Phases

use ipd_core::{Strategy, StrategyId};
use rayon::prelude::*;
use serde::Serialize;

use crate::competition::Competition;
use crate::config::TournamentConfig;
use crate::result::CompetitionSummary;

/// Standing of a participant in the tournament
#[derive(Clone, Debug, Serialize)]
pub struct Standing {
    /// Index of the strategy in the input slice
    pub index: usize,
    /// Name of the strategy
    pub name: String,
    /// Strategy ID
    pub id: StrategyId,
    /// Sum of this strategy's scores over all its competitions
    pub total_score: u64,
    /// Competitions played
    pub competitions: usize,
    /// Rounds in which this strategy cooperated
    pub cooperations: usize,
    /// Rounds played
    pub rounds: usize,
}

impl Standing {
    /// Mean score per competition
    pub fn mean_score(&self) -> f64 {
        if self.competitions == 0 {
            0.0
        } else {
            self.total_score as f64 / self.competitions as f64
        }
    }

    /// Fraction of rounds in which this strategy cooperated
    pub fn cooperation_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.cooperations as f64 / self.rounds as f64
        }
    }
}

/// Result of a tournament
#[derive(Clone, Debug, Serialize)]
pub struct TournamentResult {
    /// Final standings sorted by total score (descending)
    pub standings: Vec<Standing>,
    /// Pairing summaries indexed by [player1][player2]
    pub summaries: Vec<Vec<Option<CompetitionSummary>>>,
}

impl TournamentResult {
    /// Highest total score; None for an empty pool
    pub fn winner(&self) -> Option<&Standing> {
        self.standings.first()
    }

    /// The first `n` standings, or all of them when the pool is smaller
    pub fn top_n(&self, n: usize) -> &[Standing] {
        let n = n.min(self.standings.len());
        &self.standings[..n]
    }

    /// Standing of the strategy at `index` in the input pool
    pub fn standing_for(&self, index: usize) -> Option<&Standing> {
        self.standings.iter().find(|s| s.index == index)
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Play every ordered pairing of `strategies` once.
///
/// Each strategy meets every other strategy both as player 1 and as player
/// 2; standings are built from the player-1 side of each pairing so every
/// competition counts once per participant.
pub fn run_tournament(strategies: &[Strategy], config: &TournamentConfig) -> TournamentResult {
    let pairings = generate_pairings(strategies.len(), config.self_play);
    let results = execute_pairings(strategies, &pairings, config);

    let n = strategies.len();
    let mut summaries = vec![vec![None; n]; n];
    for (i, j, summary) in results {
        summaries[i][j] = Some(summary);
    }

    let standings = compute_standings(strategies, &summaries);
    TournamentResult {
        standings,
        summaries,
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

fn generate_pairings(n: usize, self_play: bool) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .filter(|&(i, j)| self_play || i != j)
        .collect()
}

fn execute_pairings(
    strategies: &[Strategy],
    pairings: &[(usize, usize)],
    config: &TournamentConfig,
) -> Vec<(usize, usize, CompetitionSummary)> {
    let play = |&(i, j): &(usize, usize)| {
        let result = Competition::new(&strategies[i], &strategies[j], config.match_config).run();
        (i, j, result.summary())
    };

    if config.parallel {
        pairings.par_iter().map(play).collect()
    } else {
        pairings.iter().map(play).collect()
    }
}

fn compute_standings(
    strategies: &[Strategy],
    summaries: &[Vec<Option<CompetitionSummary>>],
) -> Vec<Standing> {
    let mut standings: Vec<Standing> = strategies
        .iter()
        .enumerate()
        .map(|(i, strategy)| {
            let played: Vec<&CompetitionSummary> = summaries[i].iter().flatten().collect();
            Standing {
                index: i,
                name: strategy.name().to_string(),
                id: strategy.id(),
                total_score: played.iter().map(|s| s.score1 as u64).sum(),
                competitions: played.len(),
                cooperations: played.iter().map(|s| s.count_cc + s.count_cd).sum(),
                rounds: played.iter().map(|s| s.rounds).sum(),
            }
        })
        .collect();

    standings.sort_by(|a, b| b.total_score.cmp(&a.total_score).then(a.index.cmp(&b.index)));
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use ipd_core::builtin;

    fn pool(names: &[&str]) -> Vec<Strategy> {
        names.iter().map(|n| builtin(n).unwrap()).collect()
    }

    #[test]
    fn test_pairings_exclude_self_by_default() {
        assert_eq!(generate_pairings(3, false).len(), 6);
        assert_eq!(generate_pairings(3, true).len(), 9);
        assert!(generate_pairings(1, false).is_empty());
    }

    #[test]
    fn test_always_defect_wins_against_cooperators() {
        let strategies = pool(&["always-cooperate", "always-defect"]);
        let config = TournamentConfig::new(MatchConfig::new(10));
        let result = run_tournament(&strategies, &config);

        let winner = result.winner().unwrap();
        assert_eq!(winner.name, "always-defect");
        assert_eq!(winner.total_score, 50);
        assert_eq!(result.standing_for(0).unwrap().total_score, 0);
        assert_eq!(result.standing_for(0).unwrap().cooperation_rate(), 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let strategies = pool(&["tit-for-tat", "always-defect", "majority", "grudger-2"]);
        let config = TournamentConfig::new(MatchConfig::new(30).with_hard_defect(10)).with_self_play(true);

        let parallel = run_tournament(&strategies, &config);
        let sequential = run_tournament(&strategies, &config.clone().sequential());

        assert_eq!(parallel.summaries, sequential.summaries);
        let names = |r: &TournamentResult| r.standings.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&parallel), names(&sequential));
        assert_eq!(parallel.top_n(10).len(), 4);
        assert_eq!(parallel.standings[0].competitions, 4);
    }

    #[test]
    fn test_result_lookups() {
        let empty = run_tournament(&[], &TournamentConfig::default());
        assert!(empty.winner().is_none());
        assert!(empty.top_n(3).is_empty());

        let strategies = pool(&["tit-for-tat", "always-defect", "majority"]);
        let result = run_tournament(&strategies, &TournamentConfig::new(MatchConfig::new(12)));
        assert_eq!(result.top_n(2).len(), 2);
        assert_eq!(result.top_n(2)[0].name, result.winner().unwrap().name);
        assert_eq!(result.standing_for(1).unwrap().name, "always-defect");
        assert!(result.standing_for(3).is_none());
    }

    #[test]
    fn test_summary_matrix_is_consistent() {
        let strategies = pool(&["tit-for-tat", "suspicious-tit-for-tat"]);
        let result = run_tournament(&strategies, &TournamentConfig::new(MatchConfig::new(8)));

        let forward = result.summaries[0][1].unwrap();
        let backward = result.summaries[1][0].unwrap();
        assert_eq!(forward.score1, backward.score2);
        assert_eq!(forward.score2, backward.score1);
        assert!(result.summaries[0][0].is_none());
    }
}

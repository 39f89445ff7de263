//! Competition engine - iterated play between two strategies
//!
//! Level 2 - Phase-level implementation

use ipd_core::{Bits, Strategy, DEFECT};

use crate::config::MatchConfig;
use crate::result::CompetitionResult;

/// In-progress match between two strategies.
///
/// Each player owns a memory register holding the opponent's most recent
/// moves, seeded with the player's start state. A match can be played in
/// segments; the round counter is absolute so a hard-defect round lands in
/// the same place however the match is split.
#[derive(Clone, Debug)]
pub struct Match<'a> {
    strategy1: &'a Strategy,
    strategy2: &'a Strategy,
    mem1: Bits,
    mem2: Bits,
    round: usize,
}

impl<'a> Match<'a> {
    pub fn new(strategy1: &'a Strategy, strategy2: &'a Strategy) -> Self {
        Self {
            strategy1,
            strategy2,
            mem1: strategy1.start_state().clone(),
            mem2: strategy2.start_state().clone(),
            round: 0,
        }
    }

    /// Rounds played so far
    pub fn round(&self) -> usize {
        self.round
    }

    /// Play one round and return `(action1, action2)`.
    pub fn step(&mut self, hard_defect: bool) -> (bool, bool) {
        let (action1, action2) = if hard_defect {
            (DEFECT, DEFECT)
        } else {
            (
                self.strategy1.action(&self.mem1),
                self.strategy2.action(&self.mem2),
            )
        };

        self.mem1.shift_in(action2);
        self.mem2.shift_in(action1);
        self.round += 1;

        (action1, action2)
    }

    /// Play `rounds` more rounds and return just those rounds.
    pub fn play(&mut self, rounds: usize, hard_defect_round: Option<usize>) -> CompetitionResult {
        let mut result = CompetitionResult::new();
        for _ in 0..rounds {
            let hard_defect = hard_defect_round == Some(self.round);
            let (action1, action2) = self.step(hard_defect);
            result.record(action1, action2);
        }
        result
    }
}

/// A complete competition: two strategies and the match parameters.
#[derive(Clone, Copy, Debug)]
pub struct Competition<'a> {
    strategy1: &'a Strategy,
    strategy2: &'a Strategy,
    config: MatchConfig,
}

impl<'a> Competition<'a> {
    pub fn new(strategy1: &'a Strategy, strategy2: &'a Strategy, config: MatchConfig) -> Self {
        Self {
            strategy1,
            strategy2,
            config,
        }
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Play every round from the start states.
    pub fn run(&self) -> CompetitionResult {
        Match::new(self.strategy1, self.strategy2)
            .play(self.config.num_rounds, self.config.hard_defect_round)
    }
}

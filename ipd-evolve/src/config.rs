//! Evolution configuration
//!
//! Level 4 - Utilities and configuration

use ipd_tournament::{MatchConfig, DEFAULT_NUM_ROUNDS};
use serde::Serialize;
use thiserror::Error;

/// Rejected evolution parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("mutation probability must be within [0, 1], got {0}")]
    MutationProbability(f64),

    #[error("memory cost must be finite and non-negative, got {0}")]
    MemoryCost(f64),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("hard defect round {round} is not below the round count {num_rounds}")]
    HardDefectRound { round: usize, num_rounds: usize },
}

/// Evolution configuration
#[derive(Clone, Debug, Serialize)]
pub struct EvolutionConfig {
    /// Rounds per pairwise competition
    pub num_rounds: usize,
    /// Generations per run
    pub max_generations: usize,
    /// Chance that each offspring is mutated
    pub mut_prob: f64,
    /// Fitness penalty per memory bit, charged once per competition
    pub memory_cost: f64,
    /// Round at which both players are forced to defect (None = never)
    pub hard_defect_round: Option<usize>,
    /// Independent runs with consecutive seeds
    pub max_replicates: usize,
    /// Log a progress line every this many generations
    pub print_step: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            num_rounds: DEFAULT_NUM_ROUNDS,
            max_generations: 1000,
            mut_prob: 0.01,
            memory_cost: 0.0,
            hard_defect_round: None,
            max_replicates: 1,
            print_step: 100,
        }
    }
}

impl EvolutionConfig {
    /// Competition parameters shared by every pairing in a run
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            num_rounds: self.num_rounds,
            hard_defect_round: self.hard_defect_round,
        }
    }

    pub fn with_rounds(mut self, num_rounds: usize) -> Self {
        self.num_rounds = num_rounds;
        self
    }

    pub fn with_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = max_generations;
        self
    }

    pub fn with_mutation(mut self, mut_prob: f64) -> Self {
        self.mut_prob = mut_prob;
        self
    }

    pub fn with_memory_cost(mut self, memory_cost: f64) -> Self {
        self.memory_cost = memory_cost;
        self
    }

    pub fn with_hard_defect(mut self, round: usize) -> Self {
        self.hard_defect_round = Some(round);
        self
    }

    pub fn with_replicates(mut self, max_replicates: usize) -> Self {
        self.max_replicates = max_replicates;
        self
    }

    pub fn with_print_step(mut self, print_step: usize) -> Self {
        self.print_step = print_step;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mut_prob) {
            return Err(ConfigError::MutationProbability(self.mut_prob));
        }
        if !self.memory_cost.is_finite() || self.memory_cost < 0.0 {
            return Err(ConfigError::MemoryCost(self.memory_cost));
        }
        if self.num_rounds == 0 {
            return Err(ConfigError::Zero("num_rounds"));
        }
        if self.max_replicates == 0 {
            return Err(ConfigError::Zero("max_replicates"));
        }
        if self.print_step == 0 {
            return Err(ConfigError::Zero("print_step"));
        }
        if let Some(round) = self.hard_defect_round {
            if round >= self.num_rounds {
                return Err(ConfigError::HardDefectRound {
                    round,
                    num_rounds: self.num_rounds,
                });
            }
        }
        Ok(())
    }
}

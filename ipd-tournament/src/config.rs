//! Configuration types for competitions
//!
//! Level 4 - Utilities and configuration

use serde::Serialize;
use thiserror::Error;

/// Rounds played in a competition when nothing else is configured.
pub const DEFAULT_NUM_ROUNDS: usize = 64;

/// Rejected competition parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchConfigError {
    #[error("a competition needs at least one round")]
    NoRounds,

    #[error("hard defect round {round} is not below the round count {num_rounds}")]
    HardDefectRound { round: usize, num_rounds: usize },
}

/// Parameters of a single pairwise competition.
///
/// Together with the two strategy IDs this is the full identity of a
/// competition: equal configs on equal strategies always give equal results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MatchConfig {
    /// Rounds per competition
    pub num_rounds: usize,
    /// Round at which both players are forced to defect (None = never)
    pub hard_defect_round: Option<usize>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            num_rounds: DEFAULT_NUM_ROUNDS,
            hard_defect_round: None,
        }
    }
}

impl MatchConfig {
    pub fn new(num_rounds: usize) -> Self {
        Self {
            num_rounds,
            hard_defect_round: None,
        }
    }

    /// Force mutual defection at `round`
    pub fn with_hard_defect(mut self, round: usize) -> Self {
        self.hard_defect_round = Some(round);
        self
    }

    pub fn is_hard_defect(&self, round: usize) -> bool {
        self.hard_defect_round == Some(round)
    }

    /// Rounds are zero-based, so a hard defect must fall before `num_rounds`.
    pub fn validate(&self) -> Result<(), MatchConfigError> {
        if self.num_rounds == 0 {
            return Err(MatchConfigError::NoRounds);
        }
        match self.hard_defect_round {
            Some(round) if round >= self.num_rounds => Err(MatchConfigError::HardDefectRound {
                round,
                num_rounds: self.num_rounds,
            }),
            _ => Ok(()),
        }
    }
}

/// Round-robin tournament configuration
#[derive(Clone, Debug)]
pub struct TournamentConfig {
    /// Competition parameters for every pairing
    pub match_config: MatchConfig,
    /// Whether each strategy also plays a copy of itself
    pub self_play: bool,
    /// Whether to run pairings in parallel
    pub parallel: bool,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            self_play: false,
            parallel: true,
        }
    }
}

impl TournamentConfig {
    pub fn new(match_config: MatchConfig) -> Self {
        Self {
            match_config,
            ..Default::default()
        }
    }

    pub fn with_self_play(mut self, self_play: bool) -> Self {
        self.self_play = self_play;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

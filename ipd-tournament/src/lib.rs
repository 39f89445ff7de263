//! IPD Tournament - pairwise competitions between memory strategies
//!
//! This crate provides competition infrastructure:
//! - Round-by-round match engine with hard-defect scheduling
//! - Competition results with payoff and behavior tallies
//! - Memoizing competition cache behind a source trait
//! - Round-robin tournaments over fixed strategy pools
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament (orchestration)
//! - Level 2: Competition::run, Match::play (phases)
//! - Level 3: Match::step, cache lookups (steps)
//! - Level 4: configuration, payoff matrix

mod cache;
mod competition;
mod config;
mod result;
mod tournament;

pub use cache::{CompetitionCache, CompetitionKey, CompetitionSource, DirectCompetition};
pub use competition::{Competition, Match};
pub use config::{MatchConfig, MatchConfigError, TournamentConfig, DEFAULT_NUM_ROUNDS};
pub use result::{payoff, CompetitionResult, CompetitionSummary, PUNISHMENT, REWARD, SUCKER, TEMPTATION};
pub use tournament::{run_tournament, Standing, TournamentResult};

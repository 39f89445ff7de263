//! Competition sources - cached and uncached
//!
//! A competition is a pure function of its key, so results can be memoized
//! exactly. The evolution loop talks to a [`CompetitionSource`] and does not
//! care whether results come from the cache or are recomputed.

use std::borrow::Cow;
use std::collections::hash_map::Entry;

use ipd_core::{Strategy, StrategyId};
use rustc_hash::FxHashMap;

use crate::competition::Competition;
use crate::config::MatchConfig;
use crate::result::CompetitionResult;

/// Anything that can answer "how does `strategy1` fare against `strategy2`".
pub trait CompetitionSource {
    fn compete(
        &mut self,
        strategy1: &Strategy,
        strategy2: &Strategy,
        config: MatchConfig,
    ) -> Cow<'_, CompetitionResult>;
}

/// Identity of a competition. Player order matters.
///
/// A hard defect round at or past `num_rounds` never fires, so it is stored
/// as `None` and shares an entry with the plain competition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompetitionKey {
    pub strategy1: StrategyId,
    pub strategy2: StrategyId,
    pub num_rounds: usize,
    pub hard_defect_round: Option<usize>,
}

impl CompetitionKey {
    pub fn new(strategy1: &Strategy, strategy2: &Strategy, config: MatchConfig) -> Self {
        Self {
            strategy1: strategy1.id(),
            strategy2: strategy2.id(),
            num_rounds: config.num_rounds,
            hard_defect_round: config.hard_defect_round.filter(|&round| round < config.num_rounds),
        }
    }
}

/// Memo table of competition results.
///
/// Entries are never evicted; the table grows with the number of distinct
/// pairings seen during a run.
#[derive(Debug, Default)]
pub struct CompetitionCache {
    results: FxHashMap<CompetitionKey, CompetitionResult>,
    hits: u64,
    misses: u64,
}

impl CompetitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored result for this pairing, running the competition on first use.
    pub fn compute(
        &mut self,
        strategy1: &Strategy,
        strategy2: &Strategy,
        config: MatchConfig,
    ) -> &CompetitionResult {
        let key = CompetitionKey::new(strategy1, strategy2, config);
        match self.results.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                tracing::trace!(?key, "running competition");
                entry.insert(Competition::new(strategy1, strategy2, config).run())
            }
        }
    }

    pub fn get(&self, key: &CompetitionKey) -> Option<&CompetitionResult> {
        self.results.get(key)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl CompetitionSource for CompetitionCache {
    fn compete(
        &mut self,
        strategy1: &Strategy,
        strategy2: &Strategy,
        config: MatchConfig,
    ) -> Cow<'_, CompetitionResult> {
        Cow::Borrowed(self.compute(strategy1, strategy2, config))
    }
}

/// Recomputes every competition.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectCompetition;

impl CompetitionSource for DirectCompetition {
    fn compete(
        &mut self,
        strategy1: &Strategy,
        strategy2: &Strategy,
        config: MatchConfig,
    ) -> Cow<'_, CompetitionResult> {
        Cow::Owned(Competition::new(strategy1, strategy2, config).run())
    }
}

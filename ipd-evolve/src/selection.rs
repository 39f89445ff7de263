//! Selection operators for the evolution loop
//!
//! Fitness-proportional selection: each offspring's parent is drawn with
//! probability proportional to `count * fitness` of its strategy.

use ipd_core::StrategyId;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;

use crate::stats::FitnessEntry;

/// Weighted draws with replacement over the strategies of a fitness table.
#[derive(Clone, Debug)]
pub struct OffspringSampler {
    ids: Vec<StrategyId>,
    index: WeightedIndex<f64>,
}

impl OffspringSampler {
    /// Weight each strategy by `count * fitness`. Non-positive weights
    /// become zero, so those strategies are never drawn.
    pub fn by_fitness(table: &[FitnessEntry]) -> Result<Self, WeightedError> {
        Self::build(table, |e| clamp_weight(e.count as f64 * e.fitness))
    }

    /// Weight each strategy by its count alone.
    pub fn by_count(table: &[FitnessEntry]) -> Result<Self, WeightedError> {
        Self::build(table, |e| e.count as f64)
    }

    fn build(table: &[FitnessEntry], weight: impl Fn(&FitnessEntry) -> f64) -> Result<Self, WeightedError> {
        let index = WeightedIndex::new(table.iter().map(weight))?;
        Ok(Self {
            ids: table.iter().map(|e| e.id).collect(),
            index,
        })
    }

    /// Draw one parent.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> StrategyId {
        self.ids[self.index.sample(rng)]
    }
}

fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

//! Population of strategies under fitness-proportional selection
//!
//! Level 1 - Orchestration and Level 2 - Phases
//!
//! The population is a multiset of strategy IDs. Each generation every
//! present strategy's fitness is its payoff against the whole population
//! (one copy of itself excluded), offspring are drawn in proportion to
//! `count * fitness`, and each offspring mutates with probability
//! `mut_prob`.

use ipd_core::{Strategy, StrategyId};
use ipd_tournament::{CompetitionCache, CompetitionSource};
use rand::distributions::WeightedError;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::config::EvolutionConfig;
use crate::selection::OffspringSampler;
use crate::stats::{FitnessEntry, GenerationStats};

pub struct Population<S: CompetitionSource = CompetitionCache> {
    counts: FxHashMap<StrategyId, usize>,
    /// Every strategy ever seen in this run, present or not
    details: FxHashMap<StrategyId, Strategy>,
    generation: usize,
    config: EvolutionConfig,
    source: S,
    history: Vec<GenerationStats>,
}

impl Population<CompetitionCache> {
    /// Empty population backed by a fresh competition cache
    pub fn new(config: EvolutionConfig) -> Self {
        Self::with_source(config, CompetitionCache::new())
    }
}

impl<S: CompetitionSource> Population<S> {
    pub fn with_source(config: EvolutionConfig, source: S) -> Self {
        Self {
            counts: FxHashMap::default(),
            details: FxHashMap::default(),
            generation: 0,
            config,
            source,
            history: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Total number of individuals
    pub fn size(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, id: StrategyId) -> usize {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn strategy(&self, id: StrategyId) -> Option<&Strategy> {
        self.details.get(&id)
    }

    /// Strategies seen so far, including extinct ones
    pub fn known_strategies(&self) -> usize {
        self.details.len()
    }

    /// IDs with at least one individual, ascending
    pub fn present_ids(&self) -> Vec<StrategyId> {
        let mut ids: Vec<StrategyId> = self
            .counts
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// `(strategy, count)` for every present strategy, by ascending ID
    pub fn iter(&self) -> impl Iterator<Item = (&Strategy, usize)> + '_ {
        self.present_ids()
            .into_iter()
            .map(move |id| (&self.details[&id], self.counts[&id]))
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    /// Add `count` copies of `strategy`. A later registration of the same
    /// genome replaces the stored name.
    pub fn add_org(&mut self, strategy: Strategy, count: usize) {
        let id = strategy.id();
        *self.counts.entry(id).or_insert(0) += count;
        self.details.insert(id, strategy);
    }

    /// Fitness of one individual of `id` against the current population.
    ///
    /// Sums the payoff of each competition, less the memory cost, weighted
    /// by how many opponents of that kind it meets. Unknown IDs score 0.
    pub fn calc_fitness(&mut self, id: StrategyId) -> f64 {
        let Some(strategy) = self.details.get(&id) else {
            return 0.0;
        };
        let match_config = self.config.match_config();
        let penalty = self.config.memory_cost * strategy.memory_size() as f64;

        let mut fitness = 0.0;
        for opponent_id in self.present_ids() {
            let count = self.counts[&opponent_id];
            let opponents = if opponent_id == id { count - 1 } else { count };
            if opponents == 0 {
                continue;
            }
            let opponent = &self.details[&opponent_id];
            let score = self.source.compete(strategy, opponent, match_config).score1();
            fitness += (score as f64 - penalty) * opponents as f64;
        }
        fitness
    }

    /// Fitness of every present strategy, by ascending ID
    pub fn fitness_table(&mut self) -> Vec<FitnessEntry> {
        let ids = self.present_ids();
        let mut table = Vec::with_capacity(ids.len());
        for id in ids {
            let fitness = self.calc_fitness(id);
            table.push(FitnessEntry {
                id,
                count: self.counts[&id],
                memory_size: self.details[&id].memory_size(),
                fitness,
            });
        }
        table
    }

    /// Replace the population with the next generation.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let table = self.fitness_table();
        self.reproduce(&table, rng);
    }

    /// Record statistics for the current generation, then advance it.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GenerationStats {
        let table = self.fitness_table();
        let stats = GenerationStats::from_table(self.generation, &table);

        if self.generation % self.config.print_step.max(1) == 0 {
            tracing::info!(
                generation = stats.generation,
                distinct = stats.distinct_strategies,
                best_id = stats.best_id,
                best_fitness = stats.best_fitness,
                most_common_id = stats.most_common_id,
                most_common_count = stats.most_common_count,
                mean_memory = stats.mean_memory,
                "generation"
            );
        }

        self.history.push(stats.clone());
        self.reproduce(&table, rng);
        stats
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    /// Run `max_generations` generations and return the full history.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &[GenerationStats] {
        for _ in 0..self.config.max_generations {
            self.step(rng);
        }
        tracing::debug!(
            generations = self.generation,
            known_strategies = self.details.len(),
            "run complete"
        );
        &self.history
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    fn reproduce<R: Rng + ?Sized>(&mut self, table: &[FitnessEntry], rng: &mut R) {
        self.generation += 1;
        let population_size: usize = table.iter().map(|e| e.count).sum();

        let sampler = match OffspringSampler::by_fitness(table) {
            Err(WeightedError::AllWeightsZero) => {
                tracing::warn!(
                    generation = self.generation,
                    "no strategy has positive fitness, selecting by count"
                );
                OffspringSampler::by_count(table)
            }
            other => other,
        };
        let Ok(sampler) = sampler else {
            self.counts.clear();
            return;
        };

        let mut next: FxHashMap<StrategyId, usize> = FxHashMap::default();
        for _ in 0..population_size {
            let mut id = sampler.sample(rng);
            if rng.gen_bool(self.config.mut_prob) {
                let mutant = self.details[&id].mutate(rng);
                id = mutant.id();
                if !self.details.contains_key(&id) {
                    tracing::debug!(id, name = mutant.name(), "new strategy");
                    self.details.insert(id, mutant);
                }
            }
            *next.entry(id).or_insert(0) += 1;
        }
        self.counts = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipd_core::{builtin, Bits};
    use ipd_tournament::{CompetitionResult, DirectCompetition, MatchConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::borrow::Cow;

    fn population(config: EvolutionConfig, entries: &[(&str, usize)]) -> Population {
        let mut pop = Population::new(config);
        for &(name, count) in entries {
            pop.add_org(builtin(name).unwrap(), count);
        }
        pop
    }

    /// Every player 1 cooperates into a defection.
    struct AlwaysSucker;

    impl CompetitionSource for AlwaysSucker {
        fn compete(&mut self, _: &Strategy, _: &Strategy, config: MatchConfig) -> Cow<'_, CompetitionResult> {
            Cow::Owned(CompetitionResult::from_moves(
                Bits::ones(config.num_rounds),
                Bits::new(config.num_rounds),
            ))
        }
    }

    #[test]
    fn test_add_org_accumulates() {
        let mut pop = population(EvolutionConfig::default(), &[("tit-for-tat", 3)]);
        pop.add_org(builtin("tit-for-tat").unwrap().renamed("tft"), 2);

        assert_eq!(pop.size(), 5);
        assert_eq!(pop.count(5), 5);
        assert_eq!(pop.strategy(5).unwrap().name(), "tft");
        assert_eq!(pop.known_strategies(), 1);
    }

    #[test]
    fn test_calc_fitness_excludes_one_self_copy() {
        let config = EvolutionConfig::default().with_rounds(10);
        let mut pop = population(config, &[("always-cooperate", 2), ("always-defect", 1)]);

        // AC: 30 against the other AC, 0 against AD
        assert_eq!(pop.calc_fitness(1), 30.0);
        // AD: 50 against each AC, no other AD to meet
        assert_eq!(pop.calc_fitness(0), 100.0);
        assert_eq!(pop.calc_fitness(12345), 0.0);
    }

    #[test]
    fn test_memory_cost_is_charged_per_competition() {
        let config = EvolutionConfig::default().with_rounds(10).with_memory_cost(2.0);
        let mut pop = population(config, &[("tit-for-tat", 3)]);
        assert_eq!(pop.calc_fitness(5), (30.0 - 2.0) * 2.0);
    }

    #[test]
    fn test_size_is_conserved() {
        for seed in [1u64, 7, 42, 1234] {
            let config = EvolutionConfig::default()
                .with_rounds(16)
                .with_generations(15)
                .with_mutation(0.2);
            let mut pop = population(
                config,
                &[("always-defect", 10), ("tit-for-tat", 10), ("majority", 5), ("grudger-2", 5)],
            );
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let history = pop.run(&mut rng).to_vec();
            assert_eq!(history.len(), 15);
            assert!(history.iter().all(|s| s.population_size == 30), "seed {}", seed);
            assert_eq!(pop.size(), 30);
            assert_eq!(pop.generation(), 15);
            for (strategy, count) in pop.iter() {
                assert!(count > 0);
                assert_eq!(pop.strategy(strategy.id()), Some(strategy));
            }
        }
    }

    #[test]
    fn test_same_seed_same_history() {
        let config = EvolutionConfig::default().with_rounds(16).with_generations(10).with_mutation(0.1);
        let entries = [("always-cooperate", 8), ("suspicious-tit-for-tat", 8)];

        let mut a = population(config.clone(), &entries);
        let mut b = population(config, &entries);
        let history_a = a.run(&mut ChaCha8Rng::seed_from_u64(99)).to_vec();
        let history_b = b.run(&mut ChaCha8Rng::seed_from_u64(99)).to_vec();

        assert_eq!(history_a, history_b);
    }

    #[test]
    fn test_defectors_take_over_cooperators() {
        let config = EvolutionConfig::default().with_rounds(10).with_mutation(0.0);
        let mut pop = population(config, &[("always-cooperate", 50), ("always-defect", 50)]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..10 {
            pop.update(&mut rng);
        }
        assert_eq!(pop.size(), 100);
        assert!(pop.count(0) > pop.count(1));
    }

    #[test]
    fn test_full_mutation_registers_new_strategies() {
        let config = EvolutionConfig::default().with_rounds(8).with_mutation(1.0);
        let mut pop = population(config, &[("tit-for-tat", 20)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        pop.update(&mut rng);

        assert_eq!(pop.size(), 20);
        assert!(pop.known_strategies() > 1);
        for id in pop.present_ids() {
            assert!(pop.strategy(id).is_some());
        }
    }

    #[test]
    fn test_zero_fitness_falls_back_to_counts() {
        let config = EvolutionConfig::default().with_rounds(8).with_mutation(0.0);
        let mut pop = Population::with_source(config, AlwaysSucker);
        pop.add_org(builtin("always-cooperate").unwrap(), 6);
        pop.add_org(builtin("always-defect").unwrap(), 4);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        assert_eq!(pop.calc_fitness(1), 0.0);
        let stats = pop.step(&mut rng);

        assert_eq!(stats.best_fitness, 0.0);
        assert_eq!(pop.size(), 10);
    }

    #[test]
    fn test_negative_fitness_falls_back_to_counts() {
        // memory cost outweighs any payoff, so every fitness is negative
        let config = EvolutionConfig::default()
            .with_rounds(8)
            .with_memory_cost(100.0)
            .with_mutation(0.0);
        let mut pop = population(config, &[("tit-for-tat", 5), ("grudger-2", 5)]);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        assert!(pop.calc_fitness(5) < 0.0);
        for _ in 0..5 {
            pop.update(&mut rng);
            assert_eq!(pop.size(), 10);
        }
        for id in pop.present_ids() {
            assert!(id == 5 || id == builtin("grudger-2").unwrap().id());
        }
    }

    #[test]
    fn test_cache_and_direct_sources_agree() {
        let config = EvolutionConfig::default().with_rounds(12).with_generations(8).with_mutation(0.3);
        let entries = [("tit-for-tat", 6), ("always-defect", 6), ("tit-for-two-tats", 6)];

        let mut cached = population(config.clone(), &entries);
        let mut direct = Population::with_source(config, DirectCompetition);
        for &(name, count) in &entries {
            direct.add_org(builtin(name).unwrap(), count);
        }

        let a = cached.run(&mut ChaCha8Rng::seed_from_u64(5)).to_vec();
        let b = direct.run(&mut ChaCha8Rng::seed_from_u64(5)).to_vec();
        assert_eq!(a, b);
        assert!(cached.source().hits() > 0);
    }
}

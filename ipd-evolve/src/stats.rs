//! Per-generation population statistics

use ipd_core::StrategyId;
use serde::Serialize;

/// Fitness of one strategy present in the population
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FitnessEntry {
    pub id: StrategyId,
    pub count: usize,
    pub memory_size: usize,
    pub fitness: f64,
}

/// Summary of a generation, taken before selection acts on it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub population_size: usize,
    pub distinct_strategies: usize,
    pub best_fitness: f64,
    pub best_id: StrategyId,
    /// Mean fitness per individual
    pub mean_fitness: f64,
    pub most_common_id: StrategyId,
    pub most_common_count: usize,
    pub min_memory: usize,
    pub max_memory: usize,
    /// Mean memory size per individual
    pub mean_memory: f64,
}

impl GenerationStats {
    /// Summarize a fitness table. Ties go to the lowest ID.
    pub fn from_table(generation: usize, table: &[FitnessEntry]) -> Self {
        let mut sorted: Vec<&FitnessEntry> = table.iter().filter(|e| e.count > 0).collect();
        sorted.sort_by_key(|e| e.id);

        let population_size: usize = sorted.iter().map(|e| e.count).sum();
        let mut stats = Self {
            generation,
            population_size,
            distinct_strategies: sorted.len(),
            best_fitness: 0.0,
            best_id: 0,
            mean_fitness: 0.0,
            most_common_id: 0,
            most_common_count: 0,
            min_memory: 0,
            max_memory: 0,
            mean_memory: 0.0,
        };

        let Some(first) = sorted.first() else {
            return stats;
        };

        stats.best_fitness = first.fitness;
        stats.best_id = first.id;
        stats.min_memory = first.memory_size;
        stats.max_memory = first.memory_size;

        let mut fitness_sum = 0.0;
        let mut memory_sum = 0usize;
        for entry in &sorted {
            if entry.fitness > stats.best_fitness {
                stats.best_fitness = entry.fitness;
                stats.best_id = entry.id;
            }
            if entry.count > stats.most_common_count {
                stats.most_common_count = entry.count;
                stats.most_common_id = entry.id;
            }
            stats.min_memory = stats.min_memory.min(entry.memory_size);
            stats.max_memory = stats.max_memory.max(entry.memory_size);
            fitness_sum += entry.fitness * entry.count as f64;
            memory_sum += entry.memory_size * entry.count;
        }

        stats.mean_fitness = fitness_sum / population_size as f64;
        stats.mean_memory = memory_sum as f64 / population_size as f64;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: StrategyId, count: usize, memory_size: usize, fitness: f64) -> FitnessEntry {
        FitnessEntry {
            id,
            count,
            memory_size,
            fitness,
        }
    }

    #[test]
    fn test_summarizes_table() {
        let table = [entry(5, 3, 1, 10.0), entry(0, 1, 0, 40.0), entry(69, 4, 2, 10.0)];
        let stats = GenerationStats::from_table(7, &table);

        assert_eq!(stats.generation, 7);
        assert_eq!(stats.population_size, 8);
        assert_eq!(stats.distinct_strategies, 3);
        assert_eq!(stats.best_id, 0);
        assert_eq!(stats.best_fitness, 40.0);
        assert_eq!(stats.most_common_id, 69);
        assert_eq!(stats.most_common_count, 4);
        assert_eq!(stats.mean_fitness, (30.0 + 40.0 + 40.0) / 8.0);
        assert_eq!((stats.min_memory, stats.max_memory), (0, 2));
        assert_eq!(stats.mean_memory, 11.0 / 8.0);
    }

    #[test]
    fn test_ties_prefer_lowest_id() {
        let table = [entry(9, 2, 1, 5.0), entry(3, 2, 1, 5.0)];
        let stats = GenerationStats::from_table(0, &table);
        assert_eq!(stats.best_id, 3);
        assert_eq!(stats.most_common_id, 3);
    }

    #[test]
    fn test_empty_table() {
        let stats = GenerationStats::from_table(2, &[]);
        assert_eq!(stats.population_size, 0);
        assert_eq!(stats.distinct_strategies, 0);
        assert_eq!(stats.mean_fitness, 0.0);
    }
}

//! IPD Evolution - fitness-proportional evolution of memory strategies
//!
//! This crate provides the evolutionary loop:
//! - Population management over strategy IDs
//! - Fitness-proportional selection over `rand`'s `WeightedIndex`
//! - Per-offspring mutation through the strategy mutation operator
//! - Per-generation statistics
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Population::run (orchestration)
//! - Level 2: Population::step, reproduction (phases)
//! - Level 3: fitness evaluation, weighted draws (steps)
//! - Level 4: configuration and statistics

mod config;
mod population;
mod selection;
mod stats;

pub use config::{ConfigError, EvolutionConfig};
pub use population::Population;
pub use selection::OffspringSampler;
pub use stats::{FitnessEntry, GenerationStats};

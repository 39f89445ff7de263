//! IPD Core - genomes, strategy IDs and strategy behavior
//!
//! This crate provides the building blocks for evolving iterated
//! Prisoner's Dilemma strategies:
//! - Packed bit sequences
//! - Bijective codec between genomes and dense strategy IDs
//! - Memory strategies (action selection, mutation)
//! - Strategy definitions and the built-in registry

pub mod bits;
pub mod codec;
pub mod definition;
pub mod error;
pub mod genome;
pub mod strategy;

// Re-exports for convenient access
pub use bits::Bits;
pub use codec::{bracket_offset, count_strategies, decode, encode, total_strategies, StrategyId, MAX_MEM_SIZE};
pub use definition::{builtin, builtin_names, load_definitions, StrategyDef};
pub use error::GenomeError;
pub use genome::Genome;
pub use strategy::{Strategy, COOPERATE, DEFECT, MEM_SIZE_MUTATION_PROB};

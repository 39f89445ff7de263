//! Errors for user-supplied genomes and strategy definitions

use thiserror::Error;

/// Rejected genome input. Raised before a simulation starts; the engine
/// itself never sees an invalid genome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    #[error("invalid bit character {ch:?} at position {position}")]
    InvalidBit { ch: char, position: usize },

    #[error("decision list must contain at least one bit")]
    EmptyDecisions,

    #[error("start state has {start} bits but decision list has {decisions}; expected exactly one more decision than start bits")]
    LengthMismatch { start: usize, decisions: usize },

    #[error("memory size {size} must be below {limit}")]
    MemoryTooLarge { size: usize, limit: usize },

    #[error("strategy id {0} is outside the encodable range")]
    IdOutOfRange(u64),

    #[error("unknown strategy {0:?}")]
    UnknownStrategy(String),
}

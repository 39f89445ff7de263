//! Strategy ID codec
//!
//! Every genome maps to a dense integer ID. IDs are grouped into brackets by
//! memory size: a genome with `m` memory bits carries `2m + 1` bits in total,
//! so its bracket holds `2^(2m+1)` strategies.
//!
//! | memory | genome bits | strategies | first id |
//! |--------|-------------|------------|----------|
//! | 0      | 1           | 2          | 0        |
//! | 1      | 3           | 8          | 2        |
//! | 2      | 5           | 32         | 10       |
//! | 3      | 7           | 128        | 42       |
//! | 4      | 9           | 512        | 170      |
//!
//! Inside a bracket the start state occupies the low `m` bits and the
//! decision list the `m + 1` bits above it.

use crate::bits::Bits;
use crate::error::GenomeError;
use crate::genome::Genome;

/// Dense strategy identifier
pub type StrategyId = u64;

/// Memory sizes must stay strictly below this bound.
pub const MAX_MEM_SIZE: usize = 10;

/// Number of distinct genomes with `mem_size` memory bits.
///
/// # Panics
/// Panics if `mem_size >= MAX_MEM_SIZE`.
pub const fn count_strategies(mem_size: usize) -> u64 {
    assert!(mem_size < MAX_MEM_SIZE, "memory size out of range");
    1u64 << (2 * mem_size + 1)
}

/// First ID of the bracket for `mem_size`. `bracket_offset(MAX_MEM_SIZE)`
/// is one past the last valid ID.
pub const fn bracket_offset(mem_size: usize) -> StrategyId {
    assert!(mem_size <= MAX_MEM_SIZE, "memory size out of range");
    let mut total = 0;
    let mut m = 0;
    while m < mem_size {
        total += count_strategies(m);
        m += 1;
    }
    total
}

/// Size of the whole ID space.
pub const fn total_strategies() -> u64 {
    bracket_offset(MAX_MEM_SIZE)
}

/// Split an ID into `(memory size, offset within bracket)`.
///
/// # Panics
/// Panics if `id` is outside the ID space.
pub fn decode(id: StrategyId) -> (usize, u64) {
    assert!(id < total_strategies(), "strategy id {} outside the id space", id);
    let mut local = id;
    let mut mem_size = 0;
    while local >= count_strategies(mem_size) {
        local -= count_strategies(mem_size);
        mem_size += 1;
    }
    (mem_size, local)
}

/// Fallible [`decode`] for IDs that come from user input.
pub fn try_decode(id: StrategyId) -> Result<(usize, u64), GenomeError> {
    if id < total_strategies() {
        Ok(decode(id))
    } else {
        Err(GenomeError::IdOutOfRange(id))
    }
}

pub fn encode(genome: &Genome) -> StrategyId {
    let mem_size = genome.memory_size();
    let start = genome.start_state().to_uint();
    let decisions = genome.decision_list().to_uint();
    bracket_offset(mem_size) + start + (decisions << mem_size)
}

/// Genome at offset `local` of the `mem_size` bracket.
pub fn genome_for(mem_size: usize, local: u64) -> Genome {
    assert!(
        local < count_strategies(mem_size),
        "offset {} outside bracket {}",
        local,
        mem_size
    );
    let start_mask = (1u64 << mem_size) - 1;
    Genome::from_parts(
        Bits::from_uint(local & start_mask, mem_size),
        Bits::from_uint(local >> mem_size, mem_size + 1),
    )
}

//! Genome - start state plus decision list

use serde::Serialize;

use crate::bits::Bits;
use crate::codec::{self, StrategyId, MAX_MEM_SIZE};
use crate::error::GenomeError;

/// Bit-level definition of a memory strategy.
///
/// `start_state` is the memory a strategy begins a match with (`m` bits) and
/// `decision_list[k]` is the move played when the opponent defected `k` times
/// inside the memory window (`m + 1` bits).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Genome {
    start_state: Bits,
    decision_list: Bits,
}

impl Genome {
    /// Validate and build a genome.
    pub fn new(start_state: Bits, decision_list: Bits) -> Result<Self, GenomeError> {
        if decision_list.is_empty() {
            return Err(GenomeError::EmptyDecisions);
        }
        if decision_list.len() != start_state.len() + 1 {
            return Err(GenomeError::LengthMismatch {
                start: start_state.len(),
                decisions: decision_list.len(),
            });
        }
        if start_state.len() >= MAX_MEM_SIZE {
            return Err(GenomeError::MemoryTooLarge {
                size: start_state.len(),
                limit: MAX_MEM_SIZE,
            });
        }
        Ok(Self::from_parts(start_state, decision_list))
    }

    /// Parse `0`/`1` strings, first character = bit 0.
    pub fn parse(start_state: &str, decision_list: &str) -> Result<Self, GenomeError> {
        Self::new(start_state.parse()?, decision_list.parse()?)
    }

    /// Decode an ID. Panics outside the ID space, see [`Genome::try_from_id`].
    pub fn from_id(id: StrategyId) -> Self {
        let (mem_size, local) = codec::decode(id);
        codec::genome_for(mem_size, local)
    }

    pub fn try_from_id(id: StrategyId) -> Result<Self, GenomeError> {
        let (mem_size, local) = codec::try_decode(id)?;
        Ok(codec::genome_for(mem_size, local))
    }

    pub(crate) fn from_parts(start_state: Bits, decision_list: Bits) -> Self {
        debug_assert_eq!(decision_list.len(), start_state.len() + 1);
        Self {
            start_state,
            decision_list,
        }
    }

    pub fn id(&self) -> StrategyId {
        codec::encode(self)
    }

    pub fn memory_size(&self) -> usize {
        self.start_state.len()
    }

    pub fn start_state(&self) -> &Bits {
        &self.start_state
    }

    pub fn decision_list(&self) -> &Bits {
        &self.decision_list
    }

    /// Drop the last bit of both lists. No-op at memory size 0.
    pub fn shrunk(&self) -> Genome {
        let mut genome = self.clone();
        if genome.memory_size() > 0 {
            genome.start_state.pop_back();
            genome.decision_list.pop_back();
        }
        genome
    }

    /// Append one bit to each list. No-op once the codec's memory limit
    /// would be reached.
    pub fn grown(&self, start_bit: bool, decision_bit: bool) -> Genome {
        let mut genome = self.clone();
        if genome.memory_size() + 1 < MAX_MEM_SIZE {
            genome.start_state.push_back(start_bit);
            genome.decision_list.push_back(decision_bit);
        }
        genome
    }

    pub fn with_start_flipped(&self, index: usize) -> Genome {
        let mut genome = self.clone();
        genome.start_state.flip(index);
        genome
    }

    pub fn with_decision_flipped(&self, index: usize) -> Genome {
        let mut genome = self.clone();
        genome.decision_list.flip(index);
        genome
    }
}

//! Strategy - a named genome with behavior
//!
//! Strategies are values: mutation returns a new strategy and never changes
//! the one it was called on, so a strategy can be shared between population
//! slots and cache keys.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use rand::Rng;
use serde::Serialize;

use crate::bits::Bits;
use crate::codec::StrategyId;
use crate::error::GenomeError;
use crate::genome::Genome;

/// Chance that a mutation changes memory size instead of flipping a bit.
pub const MEM_SIZE_MUTATION_PROB: f64 = 0.01;

const MUTANT_PREFIX: &str = "mutant of ";

pub const COOPERATE: bool = true;
pub const DEFECT: bool = false;

/// Named memory strategy
///
/// Equality, ordering and hashing only look at the genome; two strategies
/// with different names but the same bits are the same strategy.
#[derive(Clone, Debug, Serialize)]
pub struct Strategy {
    name: String,
    id: StrategyId,
    genome: Genome,
}

impl Strategy {
    pub fn new(name: impl Into<String>, genome: Genome) -> Self {
        Self {
            name: name.into(),
            id: genome.id(),
            genome,
        }
    }

    /// Build from `0`/`1` strings.
    pub fn parse(
        name: impl Into<String>,
        start_state: &str,
        decision_list: &str,
    ) -> Result<Self, GenomeError> {
        Ok(Self::new(name, Genome::parse(start_state, decision_list)?))
    }

    /// Decode a strategy ID. Panics outside the ID space.
    pub fn from_id(id: StrategyId, name: impl Into<String>) -> Self {
        Self::new(name, Genome::from_id(id))
    }

    pub fn try_from_id(id: StrategyId, name: impl Into<String>) -> Result<Self, GenomeError> {
        Ok(Self::new(name, Genome::try_from_id(id)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> StrategyId {
        self.id
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn memory_size(&self) -> usize {
        self.genome.memory_size()
    }

    pub fn start_state(&self) -> &Bits {
        self.genome.start_state()
    }

    pub fn decision_list(&self) -> &Bits {
        self.genome.decision_list()
    }

    /// Same genome under another name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Move to play given the opponent's recent moves.
    ///
    /// `memory` holds the opponent's last `m` moves (1 = cooperate). The
    /// number of defections in it indexes the decision list. With no memory
    /// the single decision is played unconditionally.
    ///
    /// # Panics
    /// Panics if `memory.len()` differs from the strategy's memory size.
    pub fn action(&self, memory: &Bits) -> bool {
        assert_eq!(
            memory.len(),
            self.memory_size(),
            "memory register does not match strategy {}",
            self.name
        );
        if self.memory_size() == 0 {
            return self.decision_list().get(0);
        }
        self.decision_list().get(memory.count_zeros())
    }

    /// Apply one random mutation and return the mutant.
    ///
    /// With probability [`MEM_SIZE_MUTATION_PROB`] the memory size changes
    /// (shrink and grow split that band evenly). Otherwise one bit flips,
    /// in the start state or the decision list with equal chance.
    pub fn mutate<R: Rng + ?Sized>(&self, rng: &mut R) -> Strategy {
        let p: f64 = rng.gen();

        let genome = if p < MEM_SIZE_MUTATION_PROB {
            if p < MEM_SIZE_MUTATION_PROB / 2.0 {
                self.genome.shrunk()
            } else {
                let start_bit = rng.gen_bool(0.5);
                let decision_bit = rng.gen_bool(0.5);
                self.genome.grown(start_bit, decision_bit)
            }
        } else {
            let split = MEM_SIZE_MUTATION_PROB + (1.0 - MEM_SIZE_MUTATION_PROB) / 2.0;
            if p < split {
                match self.memory_size() {
                    0 => self.genome.clone(),
                    m => self.genome.with_start_flipped(rng.gen_range(0..m)),
                }
            } else {
                let len = self.decision_list().len();
                self.genome.with_decision_flipped(rng.gen_range(0..len))
            }
        };

        Strategy::new(self.mutant_name(), genome)
    }

    fn mutant_name(&self) -> String {
        let root = self.name.strip_prefix(MUTANT_PREFIX).unwrap_or(&self.name);
        format!("{}{}", MUTANT_PREFIX, root)
    }
}

impl PartialEq for Strategy {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome
    }
}

impl Eq for Strategy {}

impl Hash for Strategy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.genome.hash(state);
    }
}

impl PartialOrd for Strategy {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Strategy {
    fn cmp(&self, other: &Self) -> Ordering {
        self.genome.cmp(&other.genome)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}|{}] #{}",
            self.name,
            self.start_state(),
            self.decision_list(),
            self.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MAX_MEM_SIZE;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    /// Replays a fixed list of draws, each given as a fraction of the
    /// `u64` range, so `gen::<f64>()` returns roughly that fraction.
    struct Scripted {
        values: Vec<u64>,
        next: usize,
    }

    impl Scripted {
        fn new(fractions: &[f64]) -> Self {
            Self {
                values: fractions.iter().map(|x| (x * 18_446_744_073_709_551_616.0) as u64).collect(),
                next: 0,
            }
        }
    }

    impl RngCore for Scripted {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn bits(s: &str) -> Bits {
        s.parse().unwrap()
    }

    fn majority() -> Strategy {
        Strategy::parse("majority", "110", "1100").unwrap()
    }

    #[test]
    fn test_zero_memory_plays_single_decision() {
        let ac = Strategy::parse("AC", "", "1").unwrap();
        let ad = Strategy::parse("AD", "", "0").unwrap();
        assert_eq!(ac.action(&Bits::new(0)), COOPERATE);
        assert_eq!(ad.action(&Bits::new(0)), DEFECT);
    }

    #[test]
    fn test_action_counts_defections() {
        let strategy = majority();
        assert_eq!(strategy.action(&bits("111")), COOPERATE);
        assert_eq!(strategy.action(&bits("011")), COOPERATE);
        assert_eq!(strategy.action(&bits("010")), DEFECT);
        assert_eq!(strategy.action(&bits("000")), DEFECT);
    }

    #[test]
    #[should_panic]
    fn test_action_rejects_wrong_memory_length() {
        majority().action(&bits("11"));
    }

    #[test]
    fn test_id_and_equality_follow_genome() {
        let a = Strategy::parse("tit-for-tat", "1", "10").unwrap();
        let b = Strategy::from_id(5, "five");
        assert_eq!(a.id(), 5);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "tit-for-tat [1|10] #5");
    }

    #[test]
    fn test_mutate_shrinks_in_lower_band() {
        let parent = majority();
        let mutant = parent.mutate(&mut Scripted::new(&[0.001]));
        assert_eq!(mutant.memory_size(), 2);
        assert_eq!(mutant.start_state().to_string(), "11");
        assert_eq!(mutant.decision_list().to_string(), "110");
        assert_eq!(mutant.id(), mutant.genome().id());
        assert_eq!(parent.memory_size(), 3);
    }

    #[test]
    fn test_mutate_grows_in_upper_band() {
        let parent = majority();
        // band draw, then start bit 1 (0.2 < 0.5), then decision bit 0
        let mutant = parent.mutate(&mut Scripted::new(&[0.007, 0.2, 0.9]));
        assert_eq!(mutant.start_state().to_string(), "1101");
        assert_eq!(mutant.decision_list().to_string(), "11000");
    }

    #[test]
    fn test_mutate_flips_start_bit() {
        let parent = majority();
        // 0.3 lands in the start-state half, 0.5 picks index 1 of 3
        let mutant = parent.mutate(&mut Scripted::new(&[0.3, 0.5]));
        assert_eq!(mutant.start_state().to_string(), "100");
        assert_eq!(mutant.decision_list(), parent.decision_list());
    }

    #[test]
    fn test_mutate_flips_decision_bit() {
        let parent = majority();
        // 0.9 lands in the decision half, 0.8 picks index 3 of 4
        let mutant = parent.mutate(&mut Scripted::new(&[0.9, 0.8]));
        assert_eq!(mutant.decision_list().to_string(), "1101");
        assert_eq!(mutant.start_state(), parent.start_state());
    }

    #[test]
    fn test_mutate_zero_memory_start_flip_is_noop() {
        let ac = Strategy::parse("AC", "", "1").unwrap();
        let mutant = ac.mutate(&mut Scripted::new(&[0.3]));
        assert_eq!(mutant, ac);
        assert_eq!(mutant.name(), "mutant of AC");
    }

    #[test]
    fn test_mutant_names_do_not_nest() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let first = majority().mutate(&mut rng);
        let second = first.mutate(&mut rng);
        assert_eq!(first.name(), "mutant of majority");
        assert_eq!(second.name(), "mutant of majority");
    }

    #[test]
    fn test_mutants_stay_valid() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut current = majority();
        for _ in 0..5000 {
            current = current.mutate(&mut rng);
            assert_eq!(current.decision_list().len(), current.memory_size() + 1);
            assert!(current.memory_size() < MAX_MEM_SIZE);
            assert_eq!(Strategy::from_id(current.id(), "x"), current);
        }
    }
}

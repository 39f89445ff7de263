//! Competition results and the payoff matrix
//!
//! A result stores nothing but the two move sequences. Every tally is
//! derived from them with whole-sequence bit operations.

use ipd_core::{Bits, COOPERATE, DEFECT};
use serde::Serialize;

/// Payoff to each player when both defect
pub const PUNISHMENT: u32 = 1;
/// Payoff to each player when both cooperate
pub const REWARD: u32 = 3;
/// Payoff to a defector facing a cooperator
pub const TEMPTATION: u32 = 5;
/// Payoff to a cooperator facing a defector
pub const SUCKER: u32 = 0;

/// Payoffs `(player 1, player 2)` for one round.
pub fn payoff(action1: bool, action2: bool) -> (u32, u32) {
    match (action1, action2) {
        (DEFECT, DEFECT) => (PUNISHMENT, PUNISHMENT),
        (COOPERATE, COOPERATE) => (REWARD, REWARD),
        (COOPERATE, DEFECT) => (SUCKER, TEMPTATION),
        (DEFECT, COOPERATE) => (TEMPTATION, SUCKER),
    }
}

/// Moves of both players over a sequence of rounds (1 = cooperate).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompetitionResult {
    moves1: Bits,
    moves2: Bits,
}

impl CompetitionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// Panics if the sequences differ in length.
    pub fn from_moves(moves1: Bits, moves2: Bits) -> Self {
        assert_eq!(moves1.len(), moves2.len(), "move sequences differ in length");
        Self { moves1, moves2 }
    }

    /// Append one round.
    pub fn record(&mut self, action1: bool, action2: bool) {
        self.moves1.push_back(action1);
        self.moves2.push_back(action2);
    }

    /// Append all rounds of `other` after this result's rounds.
    pub fn append(&mut self, other: &CompetitionResult) {
        self.moves1.append(&other.moves1);
        self.moves2.append(&other.moves2);
    }

    /// Results of two sequential segments joined into one.
    pub fn combine(&self, other: &CompetitionResult) -> CompetitionResult {
        let mut joined = self.clone();
        joined.append(other);
        joined
    }

    pub fn rounds(&self) -> usize {
        self.moves1.len()
    }

    pub fn moves1(&self) -> &Bits {
        &self.moves1
    }

    pub fn moves2(&self) -> &Bits {
        &self.moves2
    }

    /// Payoffs of round `round`
    pub fn round_payoffs(&self, round: usize) -> (u32, u32) {
        payoff(self.moves1.get(round), self.moves2.get(round))
    }

    // ------------------------------------------------------------------
    // Outcome tallies
    // ------------------------------------------------------------------

    pub fn count_cc(&self) -> usize {
        (&self.moves1 & &self.moves2).count_ones()
    }

    pub fn count_cd(&self) -> usize {
        (&self.moves1 & &!&self.moves2).count_ones()
    }

    pub fn count_dc(&self) -> usize {
        (&!&self.moves1 & &self.moves2).count_ones()
    }

    pub fn count_dd(&self) -> usize {
        (&!&self.moves1 & &!&self.moves2).count_ones()
    }

    pub fn score1(&self) -> u32 {
        self.count_dd() as u32 * PUNISHMENT
            + self.count_cc() as u32 * REWARD
            + self.count_dc() as u32 * TEMPTATION
            + self.count_cd() as u32 * SUCKER
    }

    pub fn score2(&self) -> u32 {
        self.count_dd() as u32 * PUNISHMENT
            + self.count_cc() as u32 * REWARD
            + self.count_cd() as u32 * TEMPTATION
            + self.count_dc() as u32 * SUCKER
    }

    pub fn cooperations1(&self) -> usize {
        self.moves1.count_ones()
    }

    pub fn cooperations2(&self) -> usize {
        self.moves2.count_ones()
    }

    pub fn defections1(&self) -> usize {
        self.moves1.count_zeros()
    }

    pub fn defections2(&self) -> usize {
        self.moves2.count_zeros()
    }

    // ------------------------------------------------------------------
    // Behavior: a player's move at round r against the opponent's move at
    // round r - 1. Round 0 has no previous round and is never counted.
    // ------------------------------------------------------------------

    /// Player 1 defected right after player 2 defected
    pub fn retaliation1(&self) -> usize {
        let (own, prev) = responses(&self.moves1, &self.moves2);
        (&!&own & &!&prev).count_ones()
    }

    /// Player 1 defected right after player 2 cooperated
    pub fn aggression1(&self) -> usize {
        let (own, prev) = responses(&self.moves1, &self.moves2);
        (&!&own & &prev).count_ones()
    }

    /// Player 1 cooperated right after player 2 defected
    pub fn forgiveness1(&self) -> usize {
        let (own, prev) = responses(&self.moves1, &self.moves2);
        (&own & &!&prev).count_ones()
    }

    /// Player 1 cooperated right after player 2 cooperated
    pub fn reciprocity1(&self) -> usize {
        let (own, prev) = responses(&self.moves1, &self.moves2);
        (&own & &prev).count_ones()
    }

    pub fn retaliation2(&self) -> usize {
        let (own, prev) = responses(&self.moves2, &self.moves1);
        (&!&own & &!&prev).count_ones()
    }

    pub fn aggression2(&self) -> usize {
        let (own, prev) = responses(&self.moves2, &self.moves1);
        (&!&own & &prev).count_ones()
    }

    pub fn forgiveness2(&self) -> usize {
        let (own, prev) = responses(&self.moves2, &self.moves1);
        (&own & &!&prev).count_ones()
    }

    pub fn reciprocity2(&self) -> usize {
        let (own, prev) = responses(&self.moves2, &self.moves1);
        (&own & &prev).count_ones()
    }

    /// Every derived tally in one record
    pub fn summary(&self) -> CompetitionSummary {
        CompetitionSummary {
            rounds: self.rounds(),
            score1: self.score1(),
            score2: self.score2(),
            count_cc: self.count_cc(),
            count_cd: self.count_cd(),
            count_dc: self.count_dc(),
            count_dd: self.count_dd(),
            retaliation1: self.retaliation1(),
            aggression1: self.aggression1(),
            forgiveness1: self.forgiveness1(),
            reciprocity1: self.reciprocity1(),
            retaliation2: self.retaliation2(),
            aggression2: self.aggression2(),
            forgiveness2: self.forgiveness2(),
            reciprocity2: self.reciprocity2(),
        }
    }
}

/// Align a player's moves from round 1 on with the opponent's moves one
/// round earlier.
fn responses(own: &Bits, opponent: &Bits) -> (Bits, Bits) {
    match own.len() {
        0 => (Bits::new(0), Bits::new(0)),
        n => (own.drop_front(1), opponent.truncated(n - 1)),
    }
}

/// Flattened tallies of a competition, for reporting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompetitionSummary {
    pub rounds: usize,
    pub score1: u32,
    pub score2: u32,
    pub count_cc: usize,
    pub count_cd: usize,
    pub count_dc: usize,
    pub count_dd: usize,
    pub retaliation1: usize,
    pub aggression1: usize,
    pub forgiveness1: usize,
    pub reciprocity1: usize,
    pub retaliation2: usize,
    pub aggression2: usize,
    pub forgiveness2: usize,
    pub reciprocity2: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(moves1: &str, moves2: &str) -> CompetitionResult {
        CompetitionResult::from_moves(moves1.parse().unwrap(), moves2.parse().unwrap())
    }

    #[test]
    fn test_payoff_sums() {
        for a1 in [COOPERATE, DEFECT] {
            for a2 in [COOPERATE, DEFECT] {
                let (p1, p2) = payoff(a1, a2);
                let expected = match (a1, a2) {
                    (DEFECT, DEFECT) => 2,
                    (COOPERATE, COOPERATE) => 6,
                    _ => 5,
                };
                assert_eq!(p1 + p2, expected);
            }
        }
    }

    #[test]
    fn test_outcome_counts_partition_rounds() {
        let r = result("110010", "101010");
        assert_eq!(r.count_cc(), 2);
        assert_eq!(r.count_cd(), 1);
        assert_eq!(r.count_dc(), 1);
        assert_eq!(r.count_dd(), 2);
        assert_eq!(r.count_cc() + r.count_cd() + r.count_dc() + r.count_dd(), r.rounds());
    }

    #[test]
    fn test_scores_match_round_payoffs() {
        let r = result("110010", "101010");
        let (sum1, sum2) = (0..r.rounds())
            .map(|i| r.round_payoffs(i))
            .fold((0, 0), |(a, b), (p1, p2)| (a + p1, b + p2));
        assert_eq!(r.score1(), sum1);
        assert_eq!(r.score2(), sum2);
        assert_eq!(r.score1(), 2 * 1 + 2 * 3 + 5);
        assert_eq!(r.score2(), 2 * 1 + 2 * 3 + 5);
    }

    #[test]
    fn test_behavior_tallies() {
        // r1: p1 C after p2 C (reciprocity), p2 D after p1 C (aggression)
        // r2: p1 D after p2 D (retaliation), p2 C after p1 C (reciprocity)
        // r3: p1 C after p2 C (reciprocity), p2 D after p1 D (retaliation)
        let r = result("1101", "1010");
        assert_eq!(r.reciprocity1(), 2);
        assert_eq!(r.retaliation1(), 1);
        assert_eq!(r.aggression1(), 0);
        assert_eq!(r.forgiveness1(), 0);
        assert_eq!(r.reciprocity2(), 1);
        assert_eq!(r.retaliation2(), 1);
        assert_eq!(r.aggression2(), 1);
        assert_eq!(r.forgiveness2(), 0);
    }

    #[test]
    fn test_behavior_covers_all_but_first_round() {
        let r = result("0110100111", "1011001010");
        let s = r.summary();
        assert_eq!(s.retaliation1 + s.aggression1 + s.forgiveness1 + s.reciprocity1, 9);
        assert_eq!(s.retaliation2 + s.aggression2 + s.forgiveness2 + s.reciprocity2, 9);
        assert_eq!(r.cooperations1() + r.defections1(), 10);
    }

    #[test]
    fn test_empty_and_single_round() {
        let empty = CompetitionResult::new();
        assert_eq!(empty.summary(), CompetitionSummary::default());

        let single = result("1", "0");
        assert_eq!(single.score1(), 0);
        assert_eq!(single.score2(), 5);
        assert_eq!(single.retaliation1() + single.reciprocity1(), 0);
    }

    #[test]
    fn test_combine_is_associative() {
        let a = result("10", "11");
        let b = result("011", "001");
        let c = result("1", "0");
        assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
        assert_eq!(a.combine(&b).moves1().to_string(), "10011");
    }

    #[test]
    #[should_panic]
    fn test_from_moves_rejects_uneven_lengths() {
        result("10", "1");
    }
}

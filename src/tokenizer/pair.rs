// src/tokenizer/pair.rs

use rustc_hash::FxHashMap;

use crate::tokenizer::Rank;

/// Two adjacent symbol ids, `(left, right)`.
pub type Pair = (Rank, Rank);

/// Where a pair occurs first in a scan: (sequence index, position).
pub type Position = (usize, usize);

/// Frequency-weighted count of one pair plus the earliest place it was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairStats {
    pub count: u64,
    pub first_seen: Position,
}

impl PairStats {
    /// Folds in a partial result from another slice of the corpus. Summing and
    /// taking the minimum are both order-independent.
    pub fn absorb(&mut self, other: PairStats) {
        self.count += other.count;
        self.first_seen = self.first_seen.min(other.first_seen);
    }
}

pub type PairCounts = FxHashMap<Pair, PairStats>;

pub fn merge_pair_counts(a: PairCounts, b: PairCounts) -> PairCounts {
    // fold the smaller map into the larger one
    let (mut into, from) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (pair, stats) in from {
        into.entry(pair)
            .and_modify(|s| s.absorb(stats))
            .or_insert(stats);
    }
    into
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_sums_counts_and_keeps_earliest_position() {
        let mut a = PairCounts::default();
        a.insert((1, 2), PairStats { count: 3, first_seen: (4, 0) });
        let mut b = PairCounts::default();
        b.insert((1, 2), PairStats { count: 2, first_seen: (1, 7) });
        b.insert((2, 3), PairStats { count: 1, first_seen: (2, 0) });

        let merged = merge_pair_counts(a, b);
        assert_eq!(merged[&(1, 2)], PairStats { count: 5, first_seen: (1, 7) });
        assert_eq!(merged[&(2, 3)].count, 1);
    }
}

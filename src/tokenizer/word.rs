// src/tokenizer/word.rs

use crate::tokenizer::Rank;
use crate::tokenizer::pair::{PairCounts, PairStats};

/// A chunk of text as a sequence of symbol ids.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct Word {
    pub chars: Vec<Rank>,
}

impl Word {
    pub fn from_ids(chars: Vec<Rank>) -> Self {
        Self { chars }
    }

    pub fn get_chars(&self) -> &[Rank] {
        &self.chars
    }

    pub fn into_chars(self) -> Vec<Rank> {
        self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Replaces every occurrence of `(a, b)` with `new_id`, scanning left to
    /// right without overlap: `[a, a, a]` merged on `(a, a)` becomes
    /// `[new_id, a]`. Returns how many replacements were made.
    pub fn merge(&mut self, a: Rank, b: Rank, new_id: Rank) -> usize {
        let mut merged = 0;
        let mut i = 0;
        let mut new_chars = Vec::with_capacity(self.chars.len());
        while i < self.chars.len() {
            if i + 1 < self.chars.len() && self.chars[i] == a && self.chars[i + 1] == b {
                new_chars.push(new_id);
                merged += 1;
                i += 2;
            } else {
                new_chars.push(self.chars[i]);
                i += 1;
            }
        }
        if merged > 0 {
            self.chars = new_chars;
        }
        merged
    }

    /// Adds this word's adjacent pairs, weighted by `count`, to `stats`.
    /// `index` is the word's position in the frequency table.
    pub fn count_pairs(&self, index: usize, count: u64, stats: &mut PairCounts) {
        for (pos, window) in self.chars.windows(2).enumerate() {
            let seen = PairStats {
                count,
                first_seen: (index, pos),
            };
            stats
                .entry((window[0], window[1]))
                .and_modify(|s| s.absorb(seen))
                .or_insert(seen);
        }
    }
}

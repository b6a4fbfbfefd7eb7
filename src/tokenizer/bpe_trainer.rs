// src/tokenizer/bpe_trainer.rs

use std::cmp::Ordering;

use bstr::BStr;
use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::tokenizer::byte_codec::ByteCodec;
use crate::tokenizer::merge_table::MergeTable;
use crate::tokenizer::pair::{Pair, PairCounts, PairStats, merge_pair_counts};
use crate::tokenizer::parallelism::MaybeParallelSlice;
use crate::tokenizer::progress::{ProgressBar, ProgressStyle};
use crate::tokenizer::word::Word;
use crate::tokenizer::{Rank, Result, Trainer};

/// How to choose among pairs that share the highest count.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// The pair whose first occurrence comes earliest, scanning sequences in
    /// first-appearance order and each sequence left to right.
    #[default]
    FirstSeen,
    /// The lexicographically smallest `(left, right)`.
    SmallestPair,
}

/// What training does once no pair is left to merge.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExhaustionPolicy {
    /// Append zero-width placeholder entries so the vocabulary grows by
    /// exactly the requested number of merges.
    #[default]
    Pad,
    /// Stop; the vocabulary grows by fewer entries than requested.
    Stop,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Completed,
    PairsExhausted,
}

/// Outcome of one training call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub merges_learned: usize,
    pub placeholders: usize,
    pub stop_reason: StopReason,
}

impl TrainingSummary {
    /// Number of vocabulary entries the call added.
    pub fn vocab_growth(&self) -> usize {
        self.merges_learned + self.placeholders
    }
}

struct Config {
    min_frequency: u64,
    show_progress: bool,
    tie_break: TieBreak,
    exhaustion: ExhaustionPolicy,
    parallel: bool,
}

pub struct BpeTrainerBuilder {
    config: Config,
}

impl Default for BpeTrainerBuilder {
    fn default() -> Self {
        Self {
            config: Config {
                min_frequency: 1,
                show_progress: false,
                tie_break: TieBreak::default(),
                exhaustion: ExhaustionPolicy::default(),
                parallel: true,
            },
        }
    }
}

impl BpeTrainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs seen fewer times than this are treated as absent.
    #[must_use]
    pub fn min_frequency(mut self, frequency: u64) -> Self {
        self.config.min_frequency = frequency;
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    #[must_use]
    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.config.tie_break = tie_break;
        self
    }

    #[must_use]
    pub fn exhaustion(mut self, policy: ExhaustionPolicy) -> Self {
        self.config.exhaustion = policy;
        self
    }

    /// Count pairs on the rayon pool. Does not change which merges are learned.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn build(self) -> BpeTrainer {
        BpeTrainer {
            min_frequency: self.config.min_frequency,
            show_progress: self.config.show_progress,
            tie_break: self.config.tie_break,
            exhaustion: self.config.exhaustion,
            parallel: self.config.parallel,
            words: Vec::new(),
            counts: Vec::new(),
        }
    }
}

/// Learns merge rules from a frequency table of chunks.
///
/// The table (`words` and `counts`, index-aligned, in first-appearance order)
/// only lives between [`Trainer::feed`] and the end of [`Trainer::train`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpeTrainer {
    pub min_frequency: u64,
    pub show_progress: bool,
    pub tie_break: TieBreak,
    pub exhaustion: ExhaustionPolicy,
    pub parallel: bool,

    #[serde(skip)]
    words: Vec<Word>,
    #[serde(skip)]
    counts: Vec<u64>,
}

impl Default for BpeTrainer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BpeTrainer {
    pub fn builder() -> BpeTrainerBuilder {
        BpeTrainerBuilder::new()
    }

    /// Unique sequences currently waiting to be trained on.
    pub fn pending_sequences(&self) -> usize {
        self.words.len()
    }

    fn setup_progress(&self, len: usize) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let p = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {msg:<30!} {wide_bar} {pos:>9!}/{len:<9!}")
        {
            p.set_style(style);
        }
        p.set_message("Compute merges");
        Some(p)
    }

    fn count_pairs(&self) -> PairCounts {
        let counts = &self.counts;
        self.words
            .maybe_par_iter(self.parallel)
            .enumerate()
            .map(|(i, word)| {
                let mut local = PairCounts::default();
                word.count_pairs(i, counts[i], &mut local);
                local
            })
            .reduce(PairCounts::default, merge_pair_counts)
    }

    /// Highest count first, then the configured tie-break.
    fn compare(&self, a: (&Pair, &PairStats), b: (&Pair, &PairStats)) -> Ordering {
        b.1.count.cmp(&a.1.count).then_with(|| match self.tie_break {
            TieBreak::FirstSeen => a.1.first_seen.cmp(&b.1.first_seen),
            TieBreak::SmallestPair => a.0.cmp(b.0),
        })
    }

    fn best_pair(&self) -> Option<(Pair, u64)> {
        let stats = self.count_pairs();
        stats
            .iter()
            .filter(|(_, s)| s.count >= self.min_frequency)
            .min_by(|a, b| self.compare(*a, *b))
            .map(|(pair, s)| (*pair, s.count))
    }

    /// Rewrites every sequence and drops the ones too short to hold a pair.
    /// Returns the frequency-weighted number of replacements.
    fn apply_merge(&mut self, (a, b): Pair, new_id: Rank) -> u64 {
        let replaced: u64 = if self.parallel {
            self.words
                .par_iter_mut()
                .zip(self.counts.par_iter())
                .map(|(word, &count)| word.merge(a, b, new_id) as u64 * count)
                .sum()
        } else {
            self.words
                .iter_mut()
                .zip(self.counts.iter())
                .map(|(word, &count)| word.merge(a, b, new_id) as u64 * count)
                .sum()
        };

        // Merging keeps each sequence's byte expansion, so distinct sequences
        // never collide and no re-deduplication is needed.
        let words = std::mem::take(&mut self.words);
        let counts = std::mem::take(&mut self.counts);
        for (word, count) in words.into_iter().zip(counts) {
            if word.len() >= 2 {
                self.words.push(word);
                self.counts.push(count);
            }
        }
        replaced
    }
}

impl Trainer for BpeTrainer {
    type Model = MergeTable;

    fn feed<'a, I>(&mut self, chunks: I, model: &Self::Model) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index: FxHashMap<&'a str, usize> = FxHashMap::default();
        let mut distinct: Vec<&'a str> = Vec::new();
        let mut counts: Vec<u64> = Vec::new();
        for chunk in chunks {
            match index.get(chunk) {
                Some(&i) => counts[i] += 1,
                None => {
                    index.insert(chunk, distinct.len());
                    distinct.push(chunk);
                    counts.push(1);
                }
            }
        }

        // Merges already in the table are applied first so that a pair is
        // never learned twice across training calls.
        let words: Vec<Word> = distinct
            .maybe_par_iter(self.parallel)
            .map(|chunk| {
                let mut word = Word::from_ids(ByteCodec::encode(chunk));
                model.apply(&mut word);
                word
            })
            .collect();

        self.words.clear();
        self.counts.clear();
        for (word, count) in words.into_iter().zip(counts) {
            if word.len() >= 2 {
                self.words.push(word);
                self.counts.push(count);
            }
        }
        Ok(())
    }

    fn train(&mut self, model: &mut Self::Model, num_merges: usize) -> Result<TrainingSummary> {
        info!(
            "training up to {num_merges} merges on {} unique sequences (vocab size {})",
            self.words.len(),
            model.vocab_size()
        );
        let progress = self.setup_progress(num_merges);
        let mut summary = TrainingSummary {
            merges_learned: 0,
            placeholders: 0,
            stop_reason: StopReason::Completed,
        };

        while summary.vocab_growth() < num_merges {
            let Some((pair, count)) = self.best_pair() else {
                summary.stop_reason = StopReason::PairsExhausted;
                if self.exhaustion == ExhaustionPolicy::Pad {
                    let remaining = num_merges - summary.vocab_growth();
                    for _ in 0..remaining {
                        model.push_placeholder()?;
                    }
                    summary.placeholders += remaining;
                    if let Some(p) = &progress {
                        p.inc(remaining as u64);
                    }
                }
                info!(
                    "no mergeable pairs left after {} merges; {} placeholder entries added",
                    summary.merges_learned, summary.placeholders
                );
                break;
            };

            // The rule is committed before any sequence is rewritten.
            let new_id = model.push_merge(pair)?;
            let replaced = self.apply_merge(pair, new_id);
            summary.merges_learned += 1;
            debug!(
                "merge {}: ({}, {}) -> {} {:?} count {} replaced {}",
                summary.merges_learned,
                pair.0,
                pair.1,
                new_id,
                BStr::new(model.token_bytes(new_id).unwrap_or_default()),
                count,
                replaced
            );
            if let Some(p) = &progress {
                p.inc(1);
            }
        }

        if let Some(p) = &progress {
            p.finish();
        }
        self.words = Vec::new();
        self.counts = Vec::new();
        info!(
            "training finished: {} merges, {} placeholders, vocab size {}",
            summary.merges_learned,
            summary.placeholders,
            model.vocab_size()
        );
        Ok(summary)
    }

    fn should_show_progress(&self) -> bool {
        self.show_progress
    }
}

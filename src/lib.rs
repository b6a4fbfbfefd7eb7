//! Byte-pair-encoding tokenizer: learns a sub-word vocabulary from text and
//! uses it to encode text into integer ids and back.
//!
//! Two variants are available. [`Variant::BoundaryAware`] pre-tokenizes text
//! into words, numbers, punctuation and whitespace runs and never merges
//! across those chunks. [`Variant::BoundaryFree`] works on the raw byte stream
//! and can learn tokens that span words, such as a letter followed by a space.

pub mod tokenizer;

pub use tokenizer::{
    BPE, BpeTrainer, BpeTrainerBuilder, Decoder, Encoder, Error, ExhaustionPolicy, MergeRule,
    MergeTable, Model, Rank, Result, StopReason, TieBreak, Trainer, TrainingSummary, Variant,
};

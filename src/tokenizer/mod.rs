// src/tokenizer/mod.rs

pub mod bpe;
pub mod bpe_trainer;
pub mod byte_codec;
pub mod decoder;
pub mod encoder;
pub mod merge_table;
pub mod pair;
pub mod parallelism;
pub mod pre_tokenizer;
pub mod progress;
pub mod result;
pub mod word;

pub use bpe::{BPE, Rank};
pub use bpe_trainer::{
    BpeTrainer, BpeTrainerBuilder, ExhaustionPolicy, StopReason, TieBreak, TrainingSummary,
};
pub use byte_codec::ByteCodec;
pub use decoder::Decoder;
pub use encoder::{Encoder, byte_pair_encode};
pub use merge_table::{BASE_VOCAB_SIZE, MergeRule, MergeTable, SerializedMergeTable};
pub use pair::Pair;
pub use pre_tokenizer::{ByteLevel, Chunks, Identity, PreTokenizer, Variant};
pub use result::{Error, Result};
pub use word::Word;

/// A trained tokenizer as seen by inference code.
pub trait Model: Send + Sync {
    /// Encodes `text` into symbol ids.
    fn tokenize(&self, text: &str) -> Vec<Rank>;

    /// Concatenated byte expansions of `tokens`.
    fn decode_bytes(&self, tokens: &[Rank]) -> Result<Vec<u8>>;

    /// Display form of a single id, `None` if it is not in the vocabulary.
    fn id_to_token(&self, id: Rank) -> Option<String>;

    fn get_vocab_size(&self) -> usize;
}

/// Grows a model from text.
pub trait Trainer {
    /// What training mutates.
    type Model;

    /// Builds the frequency table for the next [`Trainer::train`] call from
    /// already-chunked text. Replaces anything fed before.
    fn feed<'a, I>(&mut self, chunks: I, model: &Self::Model) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>;

    /// Learns up to `num_merges` rules from the fed table, then discards it.
    fn train(&mut self, model: &mut Self::Model, num_merges: usize) -> Result<TrainingSummary>;

    fn should_show_progress(&self) -> bool;
}

// src/tokenizer/bpe.rs

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::tokenizer::bpe_trainer::{BpeTrainer, TrainingSummary};
use crate::tokenizer::byte_codec::ByteCodec;
use crate::tokenizer::decoder::Decoder;
use crate::tokenizer::encoder::Encoder;
use crate::tokenizer::merge_table::MergeTable;
use crate::tokenizer::pre_tokenizer::Variant;
use crate::tokenizer::{Model, Result, Trainer};

pub type Rank = u32;

/// A byte-level BPE tokenizer: the variant it follows, the merge table it
/// owns, and the trainer settings used to grow that table.
///
/// ```
/// use bpe_subword::{BPE, Variant};
///
/// let mut bpe = BPE::new(Variant::BoundaryFree);
/// bpe.train("the the the the ", 3).unwrap();
/// let ids = bpe.encode("ether");
/// assert_eq!(bpe.decode(&ids).unwrap(), "ether");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BPE {
    variant: Variant,
    table: MergeTable,
    #[serde(default)]
    trainer: BpeTrainer,
}

impl Default for BPE {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}

impl BPE {
    /// An untrained tokenizer (`vocab_size() == 256`) with default trainer settings.
    pub fn new(variant: Variant) -> Self {
        Self::with_trainer(variant, BpeTrainer::default())
    }

    pub fn with_trainer(variant: Variant, trainer: BpeTrainer) -> Self {
        Self {
            variant,
            table: MergeTable::new(),
            trainer,
        }
    }

    /// Wraps a previously exported table.
    pub fn from_merge_table(variant: Variant, table: MergeTable) -> Self {
        Self {
            variant,
            table,
            trainer: BpeTrainer::default(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn merge_table(&self) -> &MergeTable {
        &self.table
    }

    pub fn trainer(&self) -> &BpeTrainer {
        &self.trainer
    }

    pub fn vocab_size(&self) -> usize {
        self.table.vocab_size()
    }

    pub fn token_bytes(&self, id: Rank) -> Option<&[u8]> {
        self.table.token_bytes(id)
    }

    /// Grows the vocabulary by up to `num_merges` rules learned from `corpus`.
    ///
    /// Training runs against a copy of the table that replaces the current
    /// one only on success, so a failed call changes nothing.
    pub fn train(&mut self, corpus: &str, num_merges: usize) -> Result<TrainingSummary> {
        let mut table = self.table.clone();
        let mut trainer = self.trainer.clone();
        trainer.feed(self.variant.training_chunks(corpus), &table)?;
        let summary = trainer.train(&mut table, num_merges)?;
        self.table = table;
        Ok(summary)
    }

    /// [`BPE::train`] for raw input; anything that is not UTF-8 is rejected
    /// with `InvalidCorpus` before training starts.
    pub fn train_bytes(&mut self, corpus: &[u8], num_merges: usize) -> Result<TrainingSummary> {
        let corpus = ByteCodec::validate(corpus)?;
        self.train(corpus, num_merges)
    }

    pub fn encoder(&self) -> Encoder<'_> {
        Encoder::new(&self.table, self.variant)
    }

    pub fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.table)
    }

    pub fn encode(&self, text: &str) -> Vec<Rank> {
        self.encoder().encode(text)
    }

    pub fn encode_batch<S>(&self, texts: &[S]) -> Vec<Vec<Rank>>
    where
        S: AsRef<str> + Sync,
    {
        self.encoder().encode_batch(texts)
    }

    pub fn decode(&self, tokens: &[Rank]) -> Result<String> {
        self.decoder().decode(tokens)
    }

    pub fn decode_bytes(&self, tokens: &[Rank]) -> Result<Vec<u8>> {
        self.decoder().decode_bytes(tokens)
    }

    /// Writes variant, merge table and trainer settings as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl Model for BPE {
    fn tokenize(&self, text: &str) -> Vec<Rank> {
        self.encode(text)
    }

    fn decode_bytes(&self, tokens: &[Rank]) -> Result<Vec<u8>> {
        self.decoder().decode_bytes(tokens)
    }

    fn id_to_token(&self, id: Rank) -> Option<String> {
        self.decoder().id_to_token(id)
    }

    fn get_vocab_size(&self) -> usize {
        self.vocab_size()
    }
}

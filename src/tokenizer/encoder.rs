// src/tokenizer/encoder.rs

use crate::tokenizer::Rank;
use crate::tokenizer::byte_codec::ByteCodec;
use crate::tokenizer::merge_table::MergeTable;
use crate::tokenizer::parallelism::MaybeParallelSlice;
use crate::tokenizer::pre_tokenizer::Variant;
use crate::tokenizer::word::Word;

/// Applies learned merges to one piece of text, lowest rank first. Bytes no
/// rule covers stay as their single-byte ids.
pub fn byte_pair_encode(piece: &str, table: &MergeTable) -> Vec<Rank> {
    let mut word = Word::from_ids(ByteCodec::encode(piece));
    table.apply(&mut word);
    word.into_chars()
}

/// Read-only view used for inference. Holding one keeps the table borrowed,
/// so it cannot be trained further until the view is dropped.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    table: &'a MergeTable,
    variant: Variant,
}

impl<'a> Encoder<'a> {
    pub fn new(table: &'a MergeTable, variant: Variant) -> Self {
        Self { table, variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Chunks `text` according to the variant and encodes each chunk on its
    /// own. Pure in `text` and the table.
    pub fn encode(&self, text: &str) -> Vec<Rank> {
        let mut ids = Vec::with_capacity(text.len());
        for chunk in self.variant.chunks(text) {
            ids.extend(byte_pair_encode(chunk, self.table));
        }
        ids
    }

    /// Encodes independent inputs on the rayon pool. Output order matches input order.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Vec<Vec<Rank>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .maybe_par_iter(true)
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }
}

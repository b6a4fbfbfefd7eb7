// src/tokenizer/merge_table.rs

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::tokenizer::pair::Pair;
use crate::tokenizer::word::Word;
use crate::tokenizer::{Error, Rank, Result};

/// Ids below this are the single bytes and never change.
pub const BASE_VOCAB_SIZE: usize = 256;

/// `(left, right) -> id`. Serialized as a `[left, right, id]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(Rank, Rank, Rank)", into = "(Rank, Rank, Rank)")]
pub struct MergeRule {
    pub left: Rank,
    pub right: Rank,
    pub id: Rank,
}

impl MergeRule {
    pub fn pair(&self) -> Pair {
        (self.left, self.right)
    }
}

impl From<(Rank, Rank, Rank)> for MergeRule {
    fn from((left, right, id): (Rank, Rank, Rank)) -> Self {
        Self { left, right, id }
    }
}

impl From<MergeRule> for (Rank, Rank, Rank) {
    fn from(rule: MergeRule) -> Self {
        (rule.left, rule.right, rule.id)
    }
}

/// The trained artifact: an append-only vocabulary arena plus the merge rules
/// in the order they were learned.
///
/// Every id in `256..vocab_size()` is either produced by exactly one rule, in
/// which case its bytes are the concatenation of the rule's operands, or is a
/// zero-width placeholder that no rule produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SerializedMergeTable", into = "SerializedMergeTable")]
pub struct MergeTable {
    vocab: Vec<Vec<u8>>,
    merges: Vec<MergeRule>,
    ranks: FxHashMap<Pair, Rank>,
}

impl Default for MergeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeTable {
    /// A table with only the 256 byte symbols.
    pub fn new() -> Self {
        Self {
            vocab: (0..=u8::MAX).map(|b| vec![b]).collect(),
            merges: Vec::new(),
            ranks: FxHashMap::default(),
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn merges(&self) -> &[MergeRule] {
        &self.merges
    }

    /// Byte expansion of `id`, or `None` if the id is outside the vocabulary.
    pub fn token_bytes(&self, id: Rank) -> Option<&[u8]> {
        self.vocab.get(id as usize).map(Vec::as_slice)
    }

    /// The id a pair merges into. Lower ids were learned earlier and win.
    pub fn rank(&self, pair: &Pair) -> Option<Rank> {
        self.ranks.get(pair).copied()
    }

    pub fn is_placeholder(&self, id: Rank) -> bool {
        id as usize >= BASE_VOCAB_SIZE && self.token_bytes(id).is_some_and(<[u8]>::is_empty)
    }

    fn next_id(&self) -> Result<Rank> {
        Rank::try_from(self.vocab.len())
            .map_err(|_| Error::InvalidMergeTable("vocabulary size exceeds u32::MAX".into()))
    }

    fn check_operand(&self, id: Rank) -> Result<()> {
        match self.token_bytes(id) {
            None => Err(Error::InvalidMergeTable(format!(
                "merge operand {id} is not in the vocabulary"
            ))),
            Some([]) => Err(Error::InvalidMergeTable(format!(
                "merge operand {id} is a placeholder"
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Appends a rule for `pair` and returns the new id. Nothing is modified
    /// when the pair is unknown or already merged.
    pub fn push_merge(&mut self, pair: Pair) -> Result<Rank> {
        let (left, right) = pair;
        self.check_operand(left)?;
        self.check_operand(right)?;
        if let Some(existing) = self.rank(&pair) {
            return Err(Error::InvalidMergeTable(format!(
                "pair ({left}, {right}) is already merged into {existing}"
            )));
        }
        let id = self.next_id()?;
        let mut bytes = Vec::with_capacity(
            self.vocab[left as usize].len() + self.vocab[right as usize].len(),
        );
        bytes.extend_from_slice(&self.vocab[left as usize]);
        bytes.extend_from_slice(&self.vocab[right as usize]);

        self.vocab.push(bytes);
        self.merges.push(MergeRule { left, right, id });
        self.ranks.insert(pair, id);
        Ok(id)
    }

    /// Appends a zero-width entry with no rule behind it.
    pub fn push_placeholder(&mut self) -> Result<Rank> {
        let id = self.next_id()?;
        self.vocab.push(Vec::new());
        Ok(id)
    }

    /// Repeatedly applies the lowest-ranked rule that matches an adjacent
    /// pair of `word` until no rule matches.
    pub fn apply(&self, word: &mut Word) {
        if self.merges.is_empty() {
            return;
        }
        loop {
            let best = word
                .get_chars()
                .windows(2)
                .filter_map(|w| {
                    let pair = (w[0], w[1]);
                    self.rank(&pair).map(|id| (id, pair))
                })
                .min();
            match best {
                Some((id, (a, b))) => {
                    word.merge(a, b, id);
                }
                None => break,
            }
        }
    }

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

/// On-disk form of a [`MergeTable`]. The base bytes are implied by
/// `base_vocab_size`; ids in `256..vocab_size` that no rule produces are
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedMergeTable {
    pub base_vocab_size: usize,
    pub vocab_size: usize,
    pub merges: Vec<MergeRule>,
}

impl From<MergeTable> for SerializedMergeTable {
    fn from(table: MergeTable) -> Self {
        Self {
            base_vocab_size: BASE_VOCAB_SIZE,
            vocab_size: table.vocab.len(),
            merges: table.merges,
        }
    }
}

impl TryFrom<SerializedMergeTable> for MergeTable {
    type Error = Error;

    fn try_from(serialized: SerializedMergeTable) -> Result<Self> {
        if serialized.base_vocab_size != BASE_VOCAB_SIZE {
            return Err(Error::InvalidMergeTable(format!(
                "base vocabulary must have {BASE_VOCAB_SIZE} entries, found {}",
                serialized.base_vocab_size
            )));
        }
        let mut table = MergeTable::new();
        for rule in &serialized.merges {
            let id = rule.id as usize;
            if id < table.vocab_size() || id >= serialized.vocab_size {
                return Err(Error::InvalidMergeTable(format!(
                    "merge id {} is out of order or outside 256..{}",
                    rule.id, serialized.vocab_size
                )));
            }
            while table.vocab_size() < id {
                table.push_placeholder()?;
            }
            table.push_merge(rule.pair())?;
        }
        if serialized.vocab_size < table.vocab_size() {
            return Err(Error::InvalidMergeTable(format!(
                "vocab_size {} is smaller than the {} entries the merges need",
                serialized.vocab_size,
                table.vocab_size()
            )));
        }
        while table.vocab_size() < serialized.vocab_size {
            table.push_placeholder()?;
        }
        Ok(table)
    }
}

// src/tokenizer/byte_codec.rs

use bstr::ByteSlice;

use crate::tokenizer::{Error, Rank, Result};

/// Moves between text and the 256 reserved single-byte symbol ids.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ByteCodec;

impl ByteCodec {
    /// The UTF-8 bytes of `text`, each widened to its reserved id.
    pub fn encode(text: &str) -> Vec<Rank> {
        text.as_bytes().iter().map(|&b| Rank::from(b)).collect()
    }

    /// Decodes `bytes` as UTF-8, substituting U+FFFD for every maximal
    /// invalid subsequence instead of failing.
    pub fn decode_lossy(bytes: &[u8]) -> String {
        bytes.to_str_lossy().into_owned()
    }

    /// Strict variant used on raw training input.
    pub fn validate(bytes: &[u8]) -> Result<&str> {
        bytes.to_str().map_err(|e| {
            Error::InvalidCorpus(format!(
                "corpus is not valid UTF-8 (first bad byte at offset {})",
                e.valid_up_to()
            ))
        })
    }
}

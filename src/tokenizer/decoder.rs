// src/tokenizer/decoder.rs

use crate::tokenizer::byte_codec::ByteCodec;
use crate::tokenizer::merge_table::MergeTable;
use crate::tokenizer::{Error, Rank, Result};

/// Read-only view that turns ids back into bytes and text.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    table: &'a MergeTable,
}

impl<'a> Decoder<'a> {
    pub fn new(table: &'a MergeTable) -> Self {
        Self { table }
    }

    /// Concatenated byte expansions. Fails on the first id with no entry.
    pub fn decode_bytes(&self, tokens: &[Rank]) -> Result<Vec<u8>> {
        let mut ret = Vec::with_capacity(tokens.len() * 2);
        for &token in tokens {
            let bytes = self
                .table
                .token_bytes(token)
                .ok_or(Error::UnknownSymbolId(token))?;
            ret.extend_from_slice(bytes);
        }
        Ok(ret)
    }

    /// Like [`Decoder::decode_bytes`], then UTF-8 with lossy replacement of
    /// invalid sequences.
    pub fn decode(&self, tokens: &[Rank]) -> Result<String> {
        let bytes = self.decode_bytes(tokens)?;
        Ok(ByteCodec::decode_lossy(&bytes))
    }

    /// Display form of a single token.
    pub fn id_to_token(&self, id: Rank) -> Option<String> {
        self.table.token_bytes(id).map(ByteCodec::decode_lossy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_merged_and_raw_ids() {
        let mut table = MergeTable::new();
        let th = table.push_merge((116, 104)).unwrap();
        let decoder = Decoder::new(&table);
        assert_eq!(decoder.decode(&[th, 101]).unwrap(), "the");
        assert_eq!(decoder.decode(&[]).unwrap(), "");
        assert_eq!(decoder.id_to_token(th).as_deref(), Some("th"));
    }

    #[test]
    fn unknown_id_is_an_error() {
        let table = MergeTable::new();
        let err = Decoder::new(&table).decode(&[104, 256]).unwrap_err();
        assert!(matches!(err, Error::UnknownSymbolId(256)));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let table = MergeTable::new();
        let decoder = Decoder::new(&table);
        // first two bytes of a three-byte character, then 'a'
        assert_eq!(decoder.decode(&[0xE3, 0x81, 97]).unwrap(), "\u{FFFD}a");
        assert_eq!(decoder.decode_bytes(&[0xFF]).unwrap(), vec![0xFF]);
    }
}

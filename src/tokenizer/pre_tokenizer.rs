// src/tokenizer/pre_tokenizer.rs

use std::sync::LazyLock;

use fancy_regex::{Matches, Regex};
use log::warn;
use serde::{Deserialize, Serialize};

/// GPT-2 style split pattern. The `\s+(?!\S)` branch needs lookahead, hence
/// `fancy_regex` rather than `regex`.
pub const BYTE_LEVEL_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

pub static RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(BYTE_LEVEL_PATTERN).expect("BYTE_LEVEL_PATTERN must compile")
});

/// Splits text into the chunks that merges are confined to.
///
/// Implementations must satisfy `split(text).collect::<String>() == text` for
/// every input. The returned iterator is lazy; calling `split` again starts a
/// fresh pass over the same text.
pub trait PreTokenizer {
    fn split<'t>(&self, text: &'t str) -> Chunks<'t>;
}

/// Word/number/punctuation/whitespace chunker used by the boundary-aware
/// variant.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ByteLevel;

impl ByteLevel {
    pub fn new() -> Self {
        ByteLevel
    }
}

impl PreTokenizer for ByteLevel {
    fn split<'t>(&self, text: &'t str) -> Chunks<'t> {
        Chunks {
            text,
            pos: 0,
            matches: Some(RE.find_iter(text)),
            pending: None,
        }
    }
}

/// Whole input as a single chunk. Used by the boundary-free variant.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Identity;

impl PreTokenizer for Identity {
    fn split<'t>(&self, text: &'t str) -> Chunks<'t> {
        Chunks {
            text,
            pos: 0,
            matches: None,
            pending: None,
        }
    }
}

/// Lazy chunk iterator. Text the pattern does not cover is emitted as its own
/// chunk, so nothing is ever dropped.
pub struct Chunks<'t> {
    text: &'t str,
    pos: usize,
    matches: Option<Matches<'static, 't>>,
    pending: Option<&'t str>,
}

impl<'t> Chunks<'t> {
    fn rest(&mut self) -> Option<&'t str> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        self.pos = self.text.len();
        Some(rest)
    }
}

impl<'t> Iterator for Chunks<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(chunk) = self.pending.take() {
            return Some(chunk);
        }
        if self.matches.is_none() {
            return self.rest();
        }
        loop {
            let next = self.matches.as_mut().and_then(|matches| matches.next());
            match next {
                Some(Ok(m)) => {
                    let (start, end) = (m.start(), m.end());
                    if start == end {
                        continue;
                    }
                    let chunk = &self.text[start..end];
                    if start > self.pos {
                        let gap = &self.text[self.pos..start];
                        self.pos = end;
                        self.pending = Some(chunk);
                        return Some(gap);
                    }
                    self.pos = end;
                    return Some(chunk);
                }
                Some(Err(err)) => {
                    warn!(
                        "pre-tokenizer regex failed at byte {}: {err}; keeping the rest as one chunk",
                        self.pos
                    );
                    self.matches = None;
                    return self.rest();
                }
                None => {
                    self.matches = None;
                    return self.rest();
                }
            }
        }
    }
}

/// Which tokenization philosophy a tokenizer follows. Chosen explicitly,
/// never inferred from the input.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Merges never cross a [`ByteLevel`] chunk boundary.
    #[default]
    BoundaryAware,
    /// Raw byte stream; merges may span words and absorb spaces.
    BoundaryFree,
}

impl Variant {
    pub fn chunks<'t>(&self, text: &'t str) -> Chunks<'t> {
        match self {
            Variant::BoundaryAware => ByteLevel.split(text),
            Variant::BoundaryFree => Identity.split(text),
        }
    }

    /// Chunks fed to the trainer. The boundary-free variant trains line by
    /// line and skips empty lines.
    pub fn training_chunks<'t>(&self, corpus: &'t str) -> Box<dyn Iterator<Item = &'t str> + 't> {
        match self {
            Variant::BoundaryAware => Box::new(ByteLevel.split(corpus)),
            Variant::BoundaryFree => Box::new(corpus.split('\n').filter(|line| !line.is_empty())),
        }
    }
}

// src/tokenizer/result.rs

use thiserror::Error;

use crate::tokenizer::Rank;

/// Every failure the tokenizer can report. Each one is raised by the call that
/// triggered it and leaves the tokenizer in the state it had before the call.
#[derive(Debug, Error)]
pub enum Error {
    /// A decode request referenced an id that has no vocabulary entry.
    #[error("unknown symbol id: {0}")]
    UnknownSymbolId(Rank),
    /// The training input could not be interpreted as text.
    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),
    /// An imported merge table violates the vocabulary invariants.
    #[error("invalid merge table: {0}")]
    InvalidMergeTable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

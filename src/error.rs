//! Error taxonomy
//!
//! Configuration problems surface from constructors and validators only.
//! Index construction failures are fatal to the build that raised them.
//! Search-task failures never escape the orchestrator; they are captured as
//! [`TaskFailure`](crate::algorithm::engine::TaskFailure) values instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("alphabet size {0} is outside [1, 256]")]
    OutOfBounds(usize),

    #[error("alphabet '{alphabet}' lists symbol '{symbol}' more than once")]
    DuplicateSymbol { alphabet: String, symbol: char },

    #[error("mask has {found} active positions but the sub-sequence length is {expected}")]
    MaskLengthMismatch { expected: usize, found: usize },

    #[error("invalid mask: {0}")]
    InvalidMask(String),

    #[error("sub-sequence length {length} does not fit a {word_bits}-bit word at {bits_per_symbol} bits per symbol")]
    SubSequenceTooLong {
        length: usize,
        bits_per_symbol: u32,
        word_bits: u32,
    },

    #[error("key space of {bits} bits exceeds the supported maximum of {max} bits")]
    KeyspaceTooLarge { bits: u32, max: u32 },

    #[error("sort memory budget of {budget} bytes is below the minimum of {minimum} bytes")]
    MemoryBudgetTooSmall { budget: usize, minimum: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error("orientation {orientation} cannot be searched against a {alphabet} databank")]
    UnsupportedOrientation {
        orientation: String,
        alphabet: String,
    },

    #[error("cannot derive alignment statistics: {0}")]
    Statistics(String),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed bucket file {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    #[error("index holds more than {0} postings")]
    TooManyPostings(usize),

    #[error("sequence {sequence_id}: position {position} does not fit in a posting")]
    PositionOverflow { sequence_id: u32, position: usize },

    #[error("key {key} is outside the key space of {keyspace} keys")]
    KeyOutOfRange { key: u32, keyspace: usize },

    #[error("sequence id {0} does not fit the 32-bit posting layout")]
    SequenceIdOverflow(usize),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl IndexError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        IndexError::Io {
            context: context.into(),
            source,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("target sequence {0} is missing from the sequence store")]
    MissingSequence(u32),

    #[error("alignment of target {target} failed: {reason}")]
    Alignment { target: u32, reason: String },

    #[error("task panicked: {0}")]
    Panic(String),
}

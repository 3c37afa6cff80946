//! Symbol-level building blocks
//!
//! - `alphabet`: symbol <-> code tables, nucleotide complements
//! - `encoding`: bit-packed sequences and k-mer keys
//! - `mask`: spaced-seed masks
//! - `registry`: shared encoders per `(alphabet, k)`
//! - `translation`: six-frame translation of nucleotide queries

pub mod alphabet;
pub mod encoding;
pub mod mask;
pub mod registry;
pub mod translation;

pub use alphabet::{Alphabet, AlphabetKind};
pub use encoding::{EncodedSequence, SymbolEncoder};
pub use mask::Mask;
pub use registry::EncoderRegistry;

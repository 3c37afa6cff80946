//! Stored databank sequences
//!
//! The search core only needs a stable `id -> EncodedSequence` lookup; where
//! the words live is up to the store.

use crate::core::encoding::EncodedSequence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSequence {
    pub id: u32,
    /// First word of the FASTA header line.
    pub name: String,
    pub description: Option<String>,
    pub encoded: EncodedSequence,
}

impl StoredSequence {
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }
}

pub trait SequenceStore: Send + Sync {
    fn get_encoded_sequence(&self, id: u32) -> Option<&StoredSequence>;

    /// Number of stored sequences.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all sequence lengths, in symbols.
    fn total_length(&self) -> u64;
}

/// Store backed by a vector; ids are indices.
#[derive(Debug, Default, Clone)]
pub struct MemorySequenceStore {
    sequences: Vec<StoredSequence>,
    total_length: u64,
}

impl MemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the id of the new sequence.
    pub fn push(&mut self, name: String, description: Option<String>, encoded: EncodedSequence) -> u32 {
        let id = self.sequences.len() as u32;
        self.total_length += encoded.len() as u64;
        self.sequences.push(StoredSequence {
            id,
            name,
            description,
            encoded,
        });
        id
    }

    /// Id the next pushed sequence will receive.
    pub fn next_id(&self) -> usize {
        self.sequences.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredSequence> {
        self.sequences.iter()
    }
}

impl SequenceStore for MemorySequenceStore {
    fn get_encoded_sequence(&self, id: u32) -> Option<&StoredSequence> {
        self.sequences.get(id as usize)
    }

    fn len(&self) -> usize {
        self.sequences.len()
    }

    fn total_length(&self) -> u64 {
        self.total_length
    }
}

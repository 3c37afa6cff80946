//! In-memory index construction: one growable bucket per key.

use log::debug;

use super::{check_key, IndexBuilder, InvertedIndex, Posting};
use crate::error::IndexError;

pub struct MemoryIndexBuilder {
    key_bits: u32,
    buckets: Vec<Vec<Posting>>,
    total: usize,
}

impl MemoryIndexBuilder {
    pub fn new(key_bits: u32) -> Self {
        Self {
            key_bits,
            buckets: vec![Vec::new(); 1usize << key_bits],
            total: 0,
        }
    }

    pub fn total_postings(&self) -> usize {
        self.total
    }
}

impl IndexBuilder for MemoryIndexBuilder {
    fn key_bits(&self) -> u32 {
        self.key_bits
    }

    #[inline]
    fn add_postings(&mut self, key: u32, postings: &[Posting]) -> Result<(), IndexError> {
        check_key(key, self.buckets.len())?;
        self.buckets[key as usize].extend_from_slice(postings);
        self.total += postings.len();
        Ok(())
    }

    fn finish_construction(self: Box<Self>) -> Result<InvertedIndex, IndexError> {
        debug!(
            "freezing in-memory index: {} keys, {} postings",
            self.buckets.len(),
            self.total
        );
        InvertedIndex::from_buckets(self.key_bits, self.buckets)
    }
}

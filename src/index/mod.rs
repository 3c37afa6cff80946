//! Inverted k-mer index
//!
//! Maps every key in `[0, 2^key_bits)` to an ordered slice of [`Posting`]s.
//! Construction goes through an [`IndexBuilder`]; `finish_construction`
//! consumes the builder, so only a completed build can ever be queried.
//!
//! Two builders are provided:
//! - [`MemoryIndexBuilder`]: one growable bucket per key, frozen at the end.
//! - [`SortMergeIndexBuilder`]: append-only posting log, sorted runs spilled
//!   to disk, k-way merged into the bucket file format of [`bucket_file`].

pub mod bucket_file;
pub mod memory;
pub mod sort_merge;

use std::fmt;
use std::path::Path;

use crate::config::IndexStrategy;
use crate::core::encoding::EncodedSequence;
use crate::error::IndexError;

pub use memory::MemoryIndexBuilder;
pub use sort_merge::SortMergeIndexBuilder;

/// One occurrence of a key: `(sequence_id, position)` packed into 64 bits.
///
/// Ordering is by sequence id, then position.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Posting(u64);

impl Posting {
    #[inline(always)]
    pub const fn new(sequence_id: u32, position: u32) -> Self {
        Posting(((sequence_id as u64) << 32) | position as u64)
    }

    #[inline(always)]
    pub const fn from_raw(raw: u64) -> Self {
        Posting(raw)
    }

    #[inline(always)]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn sequence_id(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline(always)]
    pub const fn position(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Debug for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.sequence_id(), self.position())
    }
}

/// Queryable, read-only index. Postings are stored contiguously per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    key_bits: u32,
    offsets: Vec<u32>,
    postings: Vec<Posting>,
}

impl InvertedIndex {
    /// Freeze per-key buckets. Each bucket is sorted.
    pub(crate) fn from_buckets(key_bits: u32, buckets: Vec<Vec<Posting>>) -> Result<Self, IndexError> {
        let total: usize = buckets.iter().map(Vec::len).sum();
        if total > u32::MAX as usize {
            return Err(IndexError::TooManyPostings(u32::MAX as usize));
        }
        let mut offsets = Vec::with_capacity(buckets.len() + 1);
        let mut postings = Vec::with_capacity(total);
        offsets.push(0);
        for mut bucket in buckets {
            bucket.sort_unstable();
            postings.extend_from_slice(&bucket);
            offsets.push(postings.len() as u32);
        }
        Ok(Self {
            key_bits,
            offsets,
            postings,
        })
    }

    pub(crate) fn from_parts(key_bits: u32, offsets: Vec<u32>, postings: Vec<Posting>) -> Self {
        debug_assert_eq!(offsets.len(), (1usize << key_bits) + 1);
        Self {
            key_bits,
            offsets,
            postings,
        }
    }

    /// Postings for `key`; empty when the key never occurs.
    #[inline(always)]
    pub fn lookup(&self, key: u32) -> &[Posting] {
        let idx = key as usize;
        if idx + 1 >= self.offsets.len() {
            return &[];
        }
        let start = self.offsets[idx] as usize;
        let end = self.offsets[idx + 1] as usize;
        &self.postings[start..end]
    }

    pub fn key_bits(&self) -> u32 {
        self.key_bits
    }

    pub fn keyspace(&self) -> usize {
        1usize << self.key_bits
    }

    pub fn total_postings(&self) -> usize {
        self.postings.len()
    }

    /// `(key, postings)` for every key that has at least one posting.
    pub fn buckets(&self) -> impl Iterator<Item = (u32, &[Posting])> + '_ {
        (0..self.keyspace() as u32).filter_map(move |key| {
            let postings = self.lookup(key);
            (!postings.is_empty()).then_some((key, postings))
        })
    }

    /// Persist in the bucket file format.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let mut writer = bucket_file::BucketWriter::create(path, self.key_bits)?;
        for (key, postings) in self.buckets() {
            writer.push(key, postings)?;
        }
        writer.finish()
    }

    /// Read a bucket file back without re-sorting.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        bucket_file::read_bucket_file(path)
    }
}

/// Construction side of the index state machine.
pub trait IndexBuilder: Send {
    fn key_bits(&self) -> u32;

    fn keyspace(&self) -> usize {
        1usize << self.key_bits()
    }

    fn add_postings(&mut self, key: u32, postings: &[Posting]) -> Result<(), IndexError>;

    /// Post every complete word of `encoded` at `chunk_index * offset_unit`.
    ///
    /// Returns the number of postings added. The trailing partial word, if
    /// any, is not indexed.
    fn add_sequence(
        &mut self,
        sequence_id: u32,
        encoded: &EncodedSequence,
        offset_unit: usize,
    ) -> Result<usize, IndexError> {
        let words = encoded.complete_words();
        for (chunk, &word) in words.iter().enumerate() {
            let position = chunk.saturating_mul(offset_unit);
            let fitted = u32::try_from(position).map_err(|_| IndexError::PositionOverflow {
                sequence_id,
                position,
            })?;
            self.add_postings(word as u32, &[Posting::new(sequence_id, fitted)])?;
        }
        Ok(words.len())
    }

    /// One-way transition to the queryable state.
    fn finish_construction(self: Box<Self>) -> Result<InvertedIndex, IndexError>;
}

pub(crate) fn check_key(key: u32, keyspace: usize) -> Result<(), IndexError> {
    if key as usize >= keyspace {
        return Err(IndexError::KeyOutOfRange { key, keyspace });
    }
    Ok(())
}

/// Builder for `strategy` over keys of `key_bits` bits.
pub fn new_builder(strategy: &IndexStrategy, key_bits: u32) -> Result<Box<dyn IndexBuilder>, IndexError> {
    match strategy {
        IndexStrategy::InMemory => Ok(Box::new(MemoryIndexBuilder::new(key_bits))),
        IndexStrategy::SortMerge {
            work_dir,
            memory_budget,
            output,
        } => Ok(Box::new(SortMergeIndexBuilder::new(
            key_bits,
            work_dir,
            *memory_budget,
            output.clone(),
        )?)),
    }
}

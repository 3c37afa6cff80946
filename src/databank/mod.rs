//! Databanks: stored sequences plus the inverted index over them
//!
//! A [`DatabankBuilder`] ingests records one by one. Records too short to hold
//! a single seed are skipped (and logged), never fatal. Only a successful
//! [`DatabankBuilder::finish`] yields a [`Databank`], so a databank always
//! carries a queryable index.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::IndexParams;
use crate::core::alphabet::Alphabet;
use crate::core::encoding::SymbolEncoder;
use crate::core::mask::Mask;
use crate::core::registry::EncoderRegistry;
use crate::error::IndexError;
use crate::index::{new_builder, IndexBuilder, InvertedIndex};
use crate::sequence::{MemorySequenceStore, SequenceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Shorter than one seed span.
    TooShort { length: usize, minimum: usize },
}

/// Outcome of [`DatabankBuilder::add_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    Indexed { id: u32, postings: usize },
    Skipped(SkipReason),
}

/// How seeds are cut out of sequences: plain k-mers or spaced-seed windows.
#[derive(Debug, Clone)]
struct Seeding {
    encoder: Arc<SymbolEncoder>,
    mask: Option<Mask>,
}

impl Seeding {
    fn span(&self) -> usize {
        match &self.mask {
            Some(mask) => mask.pattern_length(),
            None => self.encoder.sub_sequence_length(),
        }
    }
}

pub struct Databank {
    name: String,
    seeding: Seeding,
    store: MemorySequenceStore,
    index: InvertedIndex,
    composition: Vec<u64>,
}

impl std::fmt::Debug for Databank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Databank")
            .field("name", &self.name)
            .field("sequences", &self.store.len())
            .field("total_length", &self.store.total_length())
            .field("postings", &self.index.total_postings())
            .finish()
    }
}

impl Databank {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encoder(&self) -> &Arc<SymbolEncoder> {
        &self.seeding.encoder
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.seeding.encoder.alphabet()
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.seeding.mask.as_ref()
    }

    /// Symbols one seed covers: the pattern length when masked, else k.
    pub fn seed_span(&self) -> usize {
        self.seeding.span()
    }

    pub fn store(&self) -> &dyn SequenceStore {
        &self.store
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Symbol counts per alphabet code over all stored sequences.
    pub fn composition(&self) -> &[u64] {
        &self.composition
    }

    pub fn total_length(&self) -> u64 {
        self.store.total_length()
    }

    /// Swap in an index without checking it against the store.
    #[cfg(test)]
    pub(crate) fn replace_index(&mut self, index: InvertedIndex) {
        self.index = index;
    }

    /// Index key of the seed starting at `window[0]`.
    ///
    /// `window` must hold at least [`seed_span`](Self::seed_span) symbols.
    #[inline]
    pub fn seed_key(&self, window: &[u8]) -> u32 {
        match &self.seeding.mask {
            Some(mask) => self.seeding.encoder.apply_mask(window, mask),
            None => self
                .seeding
                .encoder
                .encode_kmer(&window[..self.seeding.encoder.sub_sequence_length()]) as u32,
        }
    }
}

enum IndexSource {
    Build(Box<dyn IndexBuilder>),
    /// Records are only stored; postings come from an earlier build.
    Prebuilt(InvertedIndex),
}

pub struct DatabankBuilder {
    name: String,
    seeding: Seeding,
    store: MemorySequenceStore,
    source: IndexSource,
    composition: Vec<u64>,
    skipped: usize,
}

impl DatabankBuilder {
    pub fn new(
        name: &str,
        params: &IndexParams,
        registry: &mut EncoderRegistry,
    ) -> Result<Self, IndexError> {
        let seeding = Self::seeding(params, registry)?;
        let builder = new_builder(&params.strategy, seeding.encoder.key_bits())?;
        Ok(Self::with_parts(name, seeding, IndexSource::Build(builder)))
    }

    /// Ingest records against an index that was built earlier.
    ///
    /// Records must be added in the same order and with the same skips as
    /// when the index was built, so that ids line up.
    pub fn with_index(
        name: &str,
        params: &IndexParams,
        registry: &mut EncoderRegistry,
        index: InvertedIndex,
    ) -> Result<Self, IndexError> {
        let seeding = Self::seeding(params, registry)?;
        if index.key_bits() != seeding.encoder.key_bits() {
            return Err(IndexError::Format {
                path: name.into(),
                reason: format!(
                    "index keys are {} bits wide, the encoder produces {}",
                    index.key_bits(),
                    seeding.encoder.key_bits()
                ),
            });
        }
        Ok(Self::with_parts(name, seeding, IndexSource::Prebuilt(index)))
    }

    fn seeding(params: &IndexParams, registry: &mut EncoderRegistry) -> Result<Seeding, IndexError> {
        let encoder = registry.encoder(&params.alphabet, params.sub_sequence_length)?;
        encoder.check_key_space()?;
        let mask = params.build_mask()?;
        Ok(Seeding { encoder, mask })
    }

    fn with_parts(name: &str, seeding: Seeding, source: IndexSource) -> Self {
        let size = seeding.encoder.alphabet().size();
        Self {
            name: name.to_string(),
            seeding,
            store: MemorySequenceStore::new(),
            source,
            composition: vec![0; size],
            skipped: 0,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn sequences(&self) -> usize {
        self.store.len()
    }

    pub fn add_record(
        &mut self,
        name: &str,
        description: Option<&str>,
        sequence: &[u8],
    ) -> Result<Ingest, IndexError> {
        let minimum = self.seeding.span();
        if sequence.len() < minimum {
            warn!(
                "{}: skipping '{}' ({} symbols, a seed needs {})",
                self.name,
                name,
                sequence.len(),
                minimum
            );
            self.skipped += 1;
            return Ok(Ingest::Skipped(SkipReason::TooShort {
                length: sequence.len(),
                minimum,
            }));
        }
        let next = self.store.next_id();
        if next > u32::MAX as usize {
            return Err(IndexError::SequenceIdOverflow(next));
        }
        let id = next as u32;

        let alphabet = self.seeding.encoder.alphabet();
        for &symbol in sequence {
            self.composition[alphabet.code(symbol) as usize] += 1;
        }

        let encoder = &self.seeding.encoder;
        let postings = match &mut self.source {
            IndexSource::Build(builder) => match &self.seeding.mask {
                Some(mask) => {
                    let masked = encoder.encode_masked_sequence(sequence, mask);
                    builder.add_sequence(id, &masked, mask.pattern_length())?
                }
                None => {
                    let plain = encoder.encode_sequence(sequence);
                    builder.add_sequence(id, &plain, encoder.sub_sequence_length())?
                }
            },
            IndexSource::Prebuilt(_) => 0,
        };

        let encoded = encoder.encode_sequence(sequence);
        self.store.push(
            name.to_string(),
            description.map(str::to_string),
            encoded,
        );
        debug!("{}: indexed '{}' as {} with {} postings", self.name, name, id, postings);
        Ok(Ingest::Indexed { id, postings })
    }

    pub fn finish(self) -> Result<Databank, IndexError> {
        let index = match self.source {
            IndexSource::Build(builder) => builder.finish_construction()?,
            IndexSource::Prebuilt(index) => {
                check_postings(&index, self.store.len(), &self.name)?;
                index
            }
        };
        info!(
            "databank {}: {} sequences, {} symbols, {} postings, {} skipped",
            self.name,
            self.store.len(),
            self.store.total_length(),
            index.total_postings(),
            self.skipped
        );
        Ok(Databank {
            name: self.name,
            seeding: self.seeding,
            store: self.store,
            index,
            composition: self.composition,
        })
    }
}

/// A prebuilt index may only point at sequences that were ingested.
fn check_postings(index: &InvertedIndex, sequences: usize, name: &str) -> Result<(), IndexError> {
    let bad = index
        .buckets()
        .flat_map(|(_, postings)| postings.iter())
        .find(|p| p.sequence_id() as usize >= sequences);
    match bad {
        Some(p) => Err(IndexError::Format {
            path: name.into(),
            reason: format!(
                "posting {:?} refers past the {} ingested sequences",
                p, sequences
            ),
        }),
        None => Ok(()),
    }
}

/// Several databanks searched as one.
#[derive(Debug, Default, Clone)]
pub struct DatabankCollection {
    databanks: Vec<Arc<Databank>>,
}

impl DatabankCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, databank: Databank) {
        self.databanks.push(Arc::new(databank));
    }

    pub fn databanks(&self) -> &[Arc<Databank>] {
        &self.databanks
    }

    pub fn len(&self) -> usize {
        self.databanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databanks.is_empty()
    }

    pub fn total_length(&self) -> u64 {
        self.databanks.iter().map(|d| d.total_length()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Posting;

    fn params(k: usize) -> IndexParams {
        IndexParams {
            sub_sequence_length: k,
            ..IndexParams::default()
        }
    }

    #[test]
    fn short_records_are_skipped_not_fatal() {
        let mut registry = EncoderRegistry::new();
        let mut builder = DatabankBuilder::new("db", &params(8), &mut registry).unwrap();
        assert_eq!(
            builder.add_record("tiny", None, b"ACGT").unwrap(),
            Ingest::Skipped(SkipReason::TooShort { length: 4, minimum: 8 })
        );
        assert_eq!(
            builder.add_record("ok", None, b"ACGTACGTAC").unwrap(),
            Ingest::Indexed { id: 0, postings: 1 }
        );
        let bank = builder.finish().unwrap();
        assert_eq!(bank.store().len(), 1);
        assert_eq!(bank.total_length(), 10);
        assert_eq!(bank.composition(), &[3, 3, 2, 2]);
    }

    #[test]
    fn oversized_key_space_fails_at_construction() {
        let mut registry = EncoderRegistry::new();
        let err = DatabankBuilder::new("db", &params(14), &mut registry).err().unwrap();
        assert!(matches!(
            err,
            IndexError::Config(crate::error::ConfigError::KeyspaceTooLarge { bits: 28, .. })
        ));
    }

    #[test]
    fn prebuilt_index_must_match_the_records() {
        let mut registry = EncoderRegistry::new();
        let mut buckets = vec![Vec::new(); 1 << 8];
        buckets[0] = vec![Posting::new(3, 0)];
        let index = InvertedIndex::from_buckets(8, buckets).unwrap();
        let mut builder = DatabankBuilder::with_index("db", &params(4), &mut registry, index).unwrap();
        builder.add_record("only", None, b"AAAAAAAA").unwrap();
        assert!(matches!(builder.finish(), Err(IndexError::Format { .. })));
    }
}

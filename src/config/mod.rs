//! Search and index configuration
//!
//! Everything here is plain data: built once (from defaults or CLI
//! arguments), validated, then only read.

pub mod args;
pub mod scoring;

use std::path::PathBuf;

use crate::algorithm::orientation::Orientation;
use crate::core::alphabet::Alphabet;
use crate::core::mask::Mask;
use crate::error::ConfigError;

pub use scoring::{AlignerConfig, AlphabetChoice};

/// Parameters of one search. See [`SearchParams::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Largest query/target gap that still extends an open area.
    pub max_sub_sequence_distance: usize,
    /// X-drop threshold of ungapped extension.
    pub extend_dropoff: i32,
    /// Areas shorter than this are discarded when closed.
    pub min_hsp_length: usize,
    /// Hits reported per query, 0 for all.
    pub max_hits_results: usize,
    /// Index-search pool size, 0 for one thread per CPU.
    pub threads_index_search: usize,
    /// Extension/alignment pool size, 0 for one thread per CPU.
    pub threads_extend_align: usize,
    pub min_query_slice_length: usize,
    pub query_split_quantity: usize,
    pub match_score: i32,
    pub mismatch_score: i32,
    pub orientations: Vec<Orientation>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_sub_sequence_distance: 100,
            extend_dropoff: 5,
            min_hsp_length: 32,
            max_hits_results: 20,
            threads_index_search: 0,
            threads_extend_align: 0,
            min_query_slice_length: 300,
            query_split_quantity: 1,
            match_score: 1,
            mismatch_score: -3,
            orientations: Orientation::NUCLEOTIDE.to_vec(),
        }
    }
}

impl SearchParams {
    /// Six translated frames instead of the nucleotide strands.
    pub fn translated(mut self) -> Self {
        self.orientations = Orientation::SIX_FRAMES.to_vec();
        self
    }

    pub fn with_orientations(mut self, orientations: &[Orientation]) -> Self {
        self.orientations = orientations.to_vec();
        self
    }

    /// Validate and replace automatic thread counts with the CPU count.
    pub fn resolve(mut self) -> Result<Self, ConfigError> {
        let invalid = |name: &'static str, reason: &str| ConfigError::InvalidParam {
            name,
            reason: reason.to_string(),
        };
        if self.min_hsp_length == 0 {
            return Err(invalid("min_hsp_length", "must be at least 1"));
        }
        if self.extend_dropoff < 0 {
            return Err(invalid("extend_dropoff", "must not be negative"));
        }
        if self.query_split_quantity == 0 {
            return Err(invalid("query_split_quantity", "must be at least 1"));
        }
        if self.match_score <= 0 {
            return Err(invalid("match_score", "must be positive"));
        }
        if self.mismatch_score >= 0 {
            return Err(invalid("mismatch_score", "must be negative"));
        }
        if self.orientations.is_empty() {
            return Err(invalid("orientations", "at least one orientation is required"));
        }
        let mut seen = self.orientations.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != self.orientations.len() {
            return Err(invalid("orientations", "orientations must be distinct"));
        }
        if self.orientations.iter().any(|o| o.is_translated())
            && self.orientations.iter().any(|o| !o.is_translated())
        {
            return Err(invalid(
                "orientations",
                "translated frames cannot be mixed with nucleotide strands",
            ));
        }

        if self.threads_index_search == 0 {
            self.threads_index_search = num_cpus::get();
        }
        if self.threads_extend_align == 0 {
            self.threads_extend_align = num_cpus::get();
        }
        Ok(self)
    }
}

/// How the inverted index is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndexStrategy {
    /// Growable per-key buckets; memory grows with the posting count.
    #[default]
    InMemory,
    /// External sort/merge bounded by `memory_budget` bytes.
    SortMerge {
        work_dir: PathBuf,
        memory_budget: usize,
        /// Keep the merged bucket file here.
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskSpec {
    pub pattern: String,
    pub pattern_length: usize,
}

/// Parameters of one databank index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexParams {
    pub alphabet: Alphabet,
    pub sub_sequence_length: usize,
    pub mask: Option<MaskSpec>,
    pub strategy: IndexStrategy,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::dna(),
            sub_sequence_length: 11,
            mask: None,
            strategy: IndexStrategy::InMemory,
        }
    }
}

impl IndexParams {
    pub fn with_mask(mut self, pattern: &str, pattern_length: usize) -> Self {
        self.mask = Some(MaskSpec {
            pattern: pattern.to_string(),
            pattern_length,
        });
        self
    }

    /// Parsed mask, validated against the sub-sequence length.
    pub fn build_mask(&self) -> Result<Option<Mask>, ConfigError> {
        self.mask
            .as_ref()
            .map(|spec| Mask::parse(&spec.pattern, spec.pattern_length, self.sub_sequence_length))
            .transpose()
    }
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::{AlignerConfig, AlphabetChoice, IndexParams, IndexStrategy, MaskSpec, SearchParams};
use crate::algorithm::orientation::Orientation;

#[derive(Parser, Debug)]
#[command(name = "kblast")]
#[command(version)]
#[command(about = "Seed-and-extend similarity search over k-mer inverted indexes", long_about = None)]
pub struct Cli {
    /// Log verbosity: 1=error, 2=warning, 3=info, 4=debug, 5+=trace
    #[arg(long, global = true, default_value_t = 2)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a databank from FASTA and write its bucket file
    Index(IndexArgs),

    /// Search FASTA queries against one or more databanks
    Search(SearchArgs),
}

/// Options shared by every command that builds an index.
#[derive(Args, Debug, Clone)]
pub struct IndexOptions {
    #[arg(long, default_value = "dna")]
    pub alphabet: AlphabetChoice,
    /// Symbols per k-mer key
    #[arg(short = 'k', long, default_value_t = 11)]
    pub sub_sequence_length: usize,
    /// Spaced-seed mask of '1' (used) and '0' (ignored) positions
    #[arg(long)]
    pub mask: Option<String>,
    /// Window length of the spaced seed (defaults to the mask length)
    #[arg(long)]
    pub pattern_length: Option<usize>,
    /// Build with external sort/merge in this directory instead of in memory
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
    /// Memory budget in bytes for each sorted run
    #[arg(long, default_value_t = 64 * 1024 * 1024)]
    pub memory_budget: usize,
}

impl IndexOptions {
    pub fn to_params(&self, output: Option<PathBuf>) -> IndexParams {
        let strategy = match &self.work_dir {
            Some(dir) => IndexStrategy::SortMerge {
                work_dir: dir.clone(),
                memory_budget: self.memory_budget,
                output,
            },
            None => IndexStrategy::InMemory,
        };
        let mask = self.mask.as_ref().map(|pattern| MaskSpec {
            pattern: pattern.clone(),
            pattern_length: self.pattern_length.unwrap_or(pattern.len()),
        });
        IndexParams {
            alphabet: self.alphabet.alphabet(),
            sub_sequence_length: self.sub_sequence_length,
            mask,
            strategy,
        }
    }
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// FASTA file of databank sequences
    #[arg(short, long)]
    pub input: PathBuf,
    /// Bucket file to write
    #[arg(short, long)]
    pub output: PathBuf,
    #[command(flatten)]
    pub index: IndexOptions,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(short, long)]
    pub query: PathBuf,
    /// Databank FASTA; repeat for a collection of databanks
    #[arg(short, long = "db", required = true)]
    pub databanks: Vec<PathBuf>,
    /// Prebuilt bucket file for a single databank
    #[arg(long)]
    pub index_file: Option<PathBuf>,
    #[command(flatten)]
    pub index: IndexOptions,
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    #[arg(long, default_value_t = 100)]
    pub max_distance: usize,
    #[arg(long, default_value_t = 5)]
    pub dropoff: i32,
    #[arg(long, default_value_t = 32)]
    pub min_hsp_length: usize,
    /// Hits reported per query (0 = all)
    #[arg(long, default_value_t = 20)]
    pub max_hits: usize,
    /// Index-search threads (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    pub search_threads: usize,
    /// Extension/alignment threads (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    pub align_threads: usize,
    #[arg(long, default_value_t = 300)]
    pub min_slice_length: usize,
    #[arg(long, default_value_t = 1)]
    pub split: usize,
    #[arg(long, default_value_t = 1)]
    pub reward: i32,
    #[arg(long, default_value_t = -3, allow_negative_numbers = true)]
    pub penalty: i32,
    /// Linear gap score of the final alignment
    #[arg(long, default_value_t = -2, allow_negative_numbers = true)]
    pub gap: i32,
    /// Comma-separated orientations (forward, reverse, complement, reverse-complement)
    #[arg(long, value_delimiter = ',')]
    pub strands: Vec<Orientation>,
    /// Search the six translated frames of the query
    #[arg(long, default_value_t = false)]
    pub translated: bool,
}

impl SearchArgs {
    pub fn search_params(&self) -> SearchParams {
        let mut params = SearchParams {
            max_sub_sequence_distance: self.max_distance,
            extend_dropoff: self.dropoff,
            min_hsp_length: self.min_hsp_length,
            max_hits_results: self.max_hits,
            threads_index_search: self.search_threads,
            threads_extend_align: self.align_threads,
            min_query_slice_length: self.min_slice_length,
            query_split_quantity: self.split,
            match_score: self.reward,
            mismatch_score: self.penalty,
            ..SearchParams::default()
        };
        if self.translated {
            params = params.translated();
        } else if !self.strands.is_empty() {
            params = params.with_orientations(&self.strands);
        } else if self.index.alphabet != AlphabetChoice::Dna {
            params = params.with_orientations(&[Orientation::Forward]);
        }
        params
    }

    pub fn aligner_config(&self) -> AlignerConfig {
        AlignerConfig {
            match_score: self.reward,
            mismatch_score: self.penalty,
            gap_score: self.gap,
        }
    }
}

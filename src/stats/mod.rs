//! Alignment statistics
//!
//! [`Statistics`] turns raw alignment scores into bit scores and e-values
//! for one databank and scoring system.

pub mod karlin;
pub mod karlin_calc;
pub mod tables;

use log::debug;

use crate::core::alphabet::{Alphabet, AlphabetKind};
use crate::error::ConfigError;

pub use karlin::{bit_score, evalue};
pub use karlin_calc::{compute_karlin_params, ScoreProfile};
pub use tables::{ungapped_nucleotide_params, KarlinParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    params: KarlinParams,
    databank_length: u64,
}

impl Statistics {
    /// Tabulated parameters for standard nucleotide scoring, otherwise
    /// parameters computed from the databank `composition` (counts per code).
    pub fn new(
        alphabet: &Alphabet,
        composition: &[u64],
        match_score: i32,
        mismatch_score: i32,
        databank_length: u64,
    ) -> Result<Self, ConfigError> {
        let tabulated = match alphabet.kind() {
            AlphabetKind::Nucleotide => ungapped_nucleotide_params(match_score, mismatch_score),
            _ => None,
        };
        let params = match tabulated {
            Some(params) => params,
            None => {
                // a pseudocount keeps absent symbols from zeroing the profile
                let frequencies: Vec<f64> = composition.iter().map(|&c| c as f64 + 1.0).collect();
                let profile = ScoreProfile::match_mismatch(match_score, mismatch_score, &frequencies)?;
                let params = compute_karlin_params(&profile)?;
                debug!(
                    "computed {} statistics for {}/{}: lambda {:.4}, K {:.4}, H {:.4}",
                    alphabet.name(),
                    match_score,
                    mismatch_score,
                    params.lambda,
                    params.k,
                    params.h
                );
                params
            }
        };
        Ok(Self {
            params,
            databank_length,
        })
    }

    pub fn from_params(params: KarlinParams, databank_length: u64) -> Self {
        Self {
            params,
            databank_length,
        }
    }

    pub fn params(&self) -> &KarlinParams {
        &self.params
    }

    pub fn databank_length(&self) -> u64 {
        self.databank_length
    }

    /// Normalized score, in bits.
    pub fn normalized_score(&self, raw_score: i32) -> f64 {
        bit_score(raw_score, &self.params)
    }

    pub fn evalue(&self, raw_score: i32, query_length: usize) -> f64 {
        let space = query_length as f64 * self.databank_length as f64;
        evalue(self.normalized_score(raw_score), space)
    }
}

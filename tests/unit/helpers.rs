//! Shared fixtures: deterministic sequences and small databanks

use std::sync::Arc;

use kblast::config::{IndexParams, SearchParams};
use kblast::core::{Alphabet, EncoderRegistry, SymbolEncoder};
use kblast::{Databank, DatabankBuilder};

/// Deterministic pseudo-random DNA (xorshift64).
pub fn random_dna(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            b"ACGT"[(state >> 33) as usize & 3]
        })
        .collect()
}

pub fn dna_encoder(k: usize) -> SymbolEncoder {
    SymbolEncoder::new(Arc::new(Alphabet::dna()), k).unwrap()
}

/// Build a databank over `records` (name, sequence) with `params`.
pub fn build_databank(name: &str, params: &IndexParams, records: &[(&str, &[u8])]) -> Databank {
    let mut registry = EncoderRegistry::new();
    let mut builder = DatabankBuilder::new(name, params, &mut registry).unwrap();
    for (id, seq) in records {
        builder.add_record(id, None, seq).unwrap();
    }
    builder.finish().unwrap()
}

/// Three random 600-base targets named t0, t1, t2.
pub fn three_targets() -> Vec<(String, Vec<u8>)> {
    (0..3)
        .map(|i| (format!("t{}", i), random_dna(600, 11 + i as u64)))
        .collect()
}

pub fn as_records(targets: &[(String, Vec<u8>)]) -> Vec<(&str, &[u8])> {
    targets
        .iter()
        .map(|(name, seq)| (name.as_str(), seq.as_slice()))
        .collect()
}

/// Small, explicit thread pools so tests do not depend on the host.
pub fn test_search_params() -> SearchParams {
    SearchParams {
        threads_index_search: 2,
        threads_extend_align: 2,
        ..SearchParams::default()
    }
}

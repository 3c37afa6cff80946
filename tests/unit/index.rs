//! Index construction: exactness, strategies and the bucket file

use std::collections::BTreeSet;

use kblast::config::{IndexParams, IndexStrategy};
use kblast::core::{EncoderRegistry, SymbolEncoder};
use kblast::error::{ConfigError, IndexError};
use kblast::index::{new_builder, InvertedIndex, Posting};
use kblast::DatabankBuilder;
use tempfile::TempDir;

use crate::helpers::{build_databank, dna_encoder, random_dna};

fn index_over(encoder: &SymbolEncoder, strategy: &IndexStrategy, seqs: &[(u32, Vec<u8>)]) -> InvertedIndex {
    let mut builder = new_builder(strategy, encoder.key_bits()).unwrap();
    for (id, seq) in seqs {
        let encoded = encoder.encode_sequence(seq);
        builder
            .add_sequence(*id, &encoded, encoder.sub_sequence_length())
            .unwrap();
    }
    builder.finish_construction().unwrap()
}

#[test]
fn poly_a_fixture_k8() {
    let encoder = dna_encoder(8);
    let seq = vec![b'A'; 62];
    let index = index_over(&encoder, &IndexStrategy::InMemory, &[(4, seq)]);
    let key = encoder.encode_kmer(b"AAAAAAAA") as u32;
    let expected: Vec<Posting> = [0, 8, 16, 24, 32, 40, 48]
        .iter()
        .map(|&p| Posting::new(4, p))
        .collect();
    assert_eq!(index.lookup(key), expected.as_slice());
}

/// Every posting points at a chunk holding its key, and every complete
/// chunk is posted exactly once.
fn assert_exact(k: usize) {
    let encoder = dna_encoder(k);
    let seqs: Vec<(u32, Vec<u8>)> = (0..4)
        .map(|i| (i, random_dna(137 + 31 * i as usize, 100 + i as u64)))
        .collect();
    let index = index_over(&encoder, &IndexStrategy::InMemory, &seqs);

    let mut expected = BTreeSet::new();
    for (id, seq) in &seqs {
        for chunk in 0..seq.len() / k {
            expected.insert((*id, (chunk * k) as u32));
        }
    }

    let mut found = BTreeSet::new();
    for (key, postings) in index.buckets() {
        let kmer = encoder.decode_kmer(key as u64, k);
        for p in postings {
            let seq = &seqs[p.sequence_id() as usize].1;
            let pos = p.position() as usize;
            assert_eq!(&seq[pos..pos + k], kmer.as_slice(), "posting {:?}", p);
            assert!(found.insert((p.sequence_id(), p.position())));
        }
    }
    assert_eq!(found, expected);

    // and lookups by literal content find the chunk
    for (id, seq) in &seqs {
        let key = encoder.encode_kmer(&seq[k..2 * k]) as u32;
        assert!(index.lookup(key).contains(&Posting::new(*id, k as u32)));
    }
}

#[test]
fn index_is_exact_for_k8() {
    assert_exact(8);
}

#[test]
fn index_is_exact_for_k11() {
    assert_exact(11);
}

#[test]
fn sort_merge_matches_in_memory() {
    let dir = TempDir::new().unwrap();
    let encoder = dna_encoder(11);
    let seqs: Vec<(u32, Vec<u8>)> = (0..5).map(|i| (i, random_dna(500, 7 + i as u64))).collect();

    let memory = index_over(&encoder, &IndexStrategy::InMemory, &seqs);
    // a tiny budget forces many sorted runs
    let sorted = index_over(
        &encoder,
        &IndexStrategy::SortMerge {
            work_dir: dir.path().to_path_buf(),
            memory_budget: 16 * 12,
            output: None,
        },
        &seqs,
    );
    assert_eq!(sorted, memory);
}

#[test]
fn bucket_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.kbix");
    let encoder = dna_encoder(11);
    let seqs: Vec<(u32, Vec<u8>)> = (0..3).map(|i| (i, random_dna(400, 21 + i as u64))).collect();
    let index = index_over(&encoder, &IndexStrategy::InMemory, &seqs);

    index.save(&path).unwrap();
    let loaded = InvertedIndex::load(&path).unwrap();
    assert_eq!(loaded.key_bits(), index.key_bits());
    for (key, postings) in index.buckets() {
        assert_eq!(loaded.lookup(key), postings);
    }
    assert_eq!(loaded.total_postings(), index.total_postings());
}

#[test]
fn sort_merge_output_is_loadable() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("kept.kbix");
    let targets: Vec<Vec<u8>> = (0..2).map(|i| random_dna(300, 40 + i)).collect();
    let params = IndexParams {
        strategy: IndexStrategy::SortMerge {
            work_dir: dir.path().join("work"),
            memory_budget: 1024,
            output: Some(output.clone()),
        },
        ..IndexParams::default()
    };
    let databank = build_databank(
        "db",
        &params,
        &[("a", targets[0].as_slice()), ("b", targets[1].as_slice())],
    );
    let loaded = InvertedIndex::load(&output).unwrap();
    assert_eq!(&loaded, databank.index());
}

#[test]
fn tiny_memory_budget_fails_at_construction() {
    let dir = TempDir::new().unwrap();
    let strategy = IndexStrategy::SortMerge {
        work_dir: dir.path().to_path_buf(),
        memory_budget: 8,
        output: None,
    };
    let err = new_builder(&strategy, 22).err().unwrap();
    assert!(matches!(
        err,
        IndexError::Config(ConfigError::MemoryBudgetTooSmall { budget: 8, .. })
    ));
}

#[test]
fn mask_weight_mismatch_fails_at_construction() {
    let params = IndexParams::default().with_mask("110111", 6);
    let mut registry = EncoderRegistry::new();
    let err = DatabankBuilder::new("db", &params, &mut registry).err().unwrap();
    assert!(matches!(
        err,
        IndexError::Config(ConfigError::MaskLengthMismatch { expected: 11, found: 5 })
    ));
}

#[test]
fn positions_beyond_the_posting_range_are_rejected() {
    let encoder = dna_encoder(8);
    let encoded = encoder.encode_sequence(&random_dna(24, 9));
    let mut builder = new_builder(&IndexStrategy::InMemory, encoder.key_bits()).unwrap();
    // the second chunk lands past u32::MAX
    let err = builder.add_sequence(3, &encoded, 1 << 32).unwrap_err();
    assert!(matches!(
        err,
        IndexError::PositionOverflow { sequence_id: 3, position } if position == 1 << 32
    ));
}

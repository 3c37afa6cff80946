//! End-to-end searches through the orchestrator

use std::sync::Arc;

use kblast::align::{AlignmentResult, LocalAligner, SmithWaterman};
use kblast::algorithm::{Orientation, Phase};
use kblast::config::{AlignerConfig, IndexParams, SearchParams};
use kblast::core::translation::translate_frame;
use kblast::core::{alphabet::reverse_complement, Alphabet};
use kblast::error::{ConfigError, SearchError};
use kblast::{search_collection, DatabankCollection, Searcher};

use crate::helpers::{as_records, build_databank, test_search_params, three_targets};

fn searcher(params: SearchParams) -> Searcher {
    Searcher::new(params, Arc::new(SmithWaterman::new(AlignerConfig::default()))).unwrap()
}

#[test]
fn embedded_query_is_found_on_the_forward_strand() {
    let targets = three_targets();
    let databank = build_databank("db", &IndexParams::default(), &as_records(&targets));
    let query = targets[1].1[100..300].to_vec();

    let results = searcher(test_search_params()).search(&databank, "q", &query).unwrap();
    assert!(!results.has_failures());
    let best = &results.hits[0];
    assert_eq!(best.target_name, "t1");
    let hsp = &best.hsps[0];
    assert_eq!(hsp.orientation, Orientation::Forward);
    assert_eq!((hsp.query_from, hsp.query_to), (1, 200));
    assert_eq!((hsp.target_from, hsp.target_to), (101, 300));
    assert_eq!(hsp.score, 200);
    assert_eq!(hsp.identity, 100.0);
    assert!(hsp.evalue < 1e-30);
}

#[test]
fn reverse_complement_hit_reports_reversed_query_coordinates() {
    let targets = three_targets();
    let databank = build_databank("db", &IndexParams::default(), &as_records(&targets));
    let query = reverse_complement(&targets[2].1[250..450]);

    let params = test_search_params().with_orientations(&[Orientation::ReverseComplement]);
    let results = searcher(params).search(&databank, "rc", &query).unwrap();
    let best = &results.hits[0];
    assert_eq!(best.target_name, "t2");
    let hsp = &best.hsps[0];
    assert_eq!(hsp.orientation, Orientation::ReverseComplement);
    assert_eq!((hsp.query_from, hsp.query_to), (200, 1));
    assert_eq!((hsp.target_from, hsp.target_to), (251, 450));
}

#[test]
fn split_queries_find_the_same_hit() {
    let targets = three_targets();
    let databank = build_databank("db", &IndexParams::default(), &as_records(&targets));
    let query = targets[0].1[..600].to_vec();

    let params = SearchParams {
        query_split_quantity: 2,
        min_query_slice_length: 100,
        ..test_search_params()
    }
    .with_orientations(&[Orientation::Forward]);
    let results = searcher(params).search(&databank, "q", &query).unwrap();
    let best = &results.hits[0];
    assert_eq!(best.target_name, "t0");
    assert_eq!(best.hsps.len(), 1);
    assert_eq!((best.hsps[0].query_from, best.hsps[0].query_to), (1, 600));
}

#[test]
fn unrelated_query_has_no_hits() {
    let targets = three_targets();
    let databank = build_databank("db", &IndexParams::default(), &as_records(&targets));
    let query = crate::helpers::random_dna(300, 999);
    let results = searcher(test_search_params()).search(&databank, "none", &query).unwrap();
    assert!(!results.has_failures());
    assert!(results.hits.is_empty());
}

#[test]
fn long_identical_hit_is_aligned_in_full() {
    let target = crate::helpers::random_dna(17_000, 4242);
    let databank = build_databank("long", &IndexParams::default(), &[("self", target.as_slice())]);
    let params = test_search_params().with_orientations(&[Orientation::Forward]);

    let results = searcher(params).search(&databank, "self", &target).unwrap();
    assert!(!results.has_failures(), "{:?}", results.failures);
    let hsp = &results.hits[0].hsps[0];
    assert_eq!((hsp.query_from, hsp.query_to), (1, 17_000));
    assert_eq!((hsp.target_from, hsp.target_to), (1, 17_000));
    assert_eq!(hsp.score, 17_000);
    assert_eq!(hsp.gap_opens, 0);
}

#[test]
fn collection_search_merges_databanks() {
    let targets = three_targets();
    let mut collection = DatabankCollection::new();
    collection.push(build_databank("a", &IndexParams::default(), &as_records(&targets[..1])));
    collection.push(build_databank("b", &IndexParams::default(), &as_records(&targets[1..])));
    let query = targets[2].1[50..250].to_vec();

    let results = search_collection(&searcher(test_search_params()), &collection, "q", &query).unwrap();
    assert!(!results.has_failures());
    assert_eq!(results.hits[0].databank, "b");
    assert_eq!(results.hits[0].target_name, "t2");
}

#[test]
fn translated_query_hits_a_protein_databank() {
    let dna = crate::helpers::random_dna(600, 77);
    let protein = translate_frame(&dna, 1);
    let params = IndexParams {
        alphabet: Alphabet::protein(),
        sub_sequence_length: 4,
        ..IndexParams::default()
    };
    let databank = build_databank("prot", &params, &[("p", protein.as_slice())]);

    let results = searcher(test_search_params().translated()).search(&databank, "nt", &dna).unwrap();
    let hsp = &results.hits[0].hsps[0];
    assert_eq!(hsp.orientation, Orientation::Frame(1));
    assert_eq!((hsp.query_from, hsp.query_to), (1, 600));
    assert_eq!((hsp.target_from, hsp.target_to), (1, 200));
}

#[test]
fn strands_are_rejected_against_a_protein_databank() {
    let params = IndexParams {
        alphabet: Alphabet::protein(),
        sub_sequence_length: 4,
        ..IndexParams::default()
    };
    let databank = build_databank("prot", &params, &[("p", b"MKVLAAGIVGLLLAQW".as_slice())]);
    let err = searcher(test_search_params()).search(&databank, "q", b"ACGT").unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedOrientation { .. }));
}

struct FailingAligner;

impl LocalAligner for FailingAligner {
    fn align(&self, _query: &[u8], _target: &[u8]) -> Result<Option<AlignmentResult>, SearchError> {
        Err(SearchError::Alignment {
            target: 0,
            reason: "out of memory".to_string(),
        })
    }
}

struct PanickingAligner;

impl LocalAligner for PanickingAligner {
    fn align(&self, _query: &[u8], _target: &[u8]) -> Result<Option<AlignmentResult>, SearchError> {
        panic!("aligner bug")
    }
}

#[test]
fn failing_aligner_yields_failures_and_no_hits() {
    let targets = three_targets();
    let databank = build_databank("db", &IndexParams::default(), &as_records(&targets));
    let query = targets[1].1[100..300].to_vec();
    let params = test_search_params().with_orientations(&[Orientation::Forward]);

    let searcher = Searcher::new(params, Arc::new(FailingAligner)).unwrap();
    let results = searcher.search(&databank, "q", &query).unwrap();
    assert!(results.has_failures());
    assert!(results.hits.is_empty());
    let failure = &results.failures[0];
    assert_eq!(failure.phase, Phase::Alignment);
    assert_eq!(
        failure.error,
        SearchError::Alignment {
            target: 1,
            reason: "out of memory".to_string()
        }
    );
}

#[test]
fn panicking_aligner_is_captured() {
    let targets = three_targets();
    let databank = build_databank("db", &IndexParams::default(), &as_records(&targets));
    let query = targets[0].1[0..200].to_vec();
    let params = test_search_params().with_orientations(&[Orientation::Forward]);

    let searcher = Searcher::new(params, Arc::new(PanickingAligner)).unwrap();
    let results = searcher.search(&databank, "q", &query).unwrap();
    assert!(results.has_failures());
    assert!(results.hits.is_empty());
    assert!(matches!(results.failures[0].error, SearchError::Panic(ref msg) if msg == "aligner bug"));
}

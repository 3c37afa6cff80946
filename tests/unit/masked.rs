//! Spaced-seed (masked) indexing and retrieval

use std::sync::Arc;

use kblast::align::SmithWaterman;
use kblast::algorithm::Orientation;
use kblast::config::{AlignerConfig, IndexParams};
use kblast::core::Mask;
use kblast::Searcher;

use crate::helpers::{build_databank, random_dna, test_search_params};

const PATTERN: &str = "111010010100110111";
const PATTERN_LENGTH: usize = 19;

fn masked_params() -> IndexParams {
    IndexParams::default().with_mask(PATTERN, PATTERN_LENGTH)
}

/// Change every don't-care position of the first window.
fn mutate_ignored_positions(window: &[u8], mask: &Mask) -> Vec<u8> {
    window
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if mask.is_active(i) {
                b
            } else if b == b'A' {
                b'C'
            } else {
                b'A'
            }
        })
        .collect()
}

#[test]
fn masked_lookup_ignores_dont_care_positions() {
    let mask = Mask::parse(PATTERN, PATTERN_LENGTH, 11).unwrap();
    let hit = random_dna(95, 1);
    // same sequence but an active position of window 0 changed
    let mut miss = hit.clone();
    miss[4] = if miss[4] == b'G' { b'T' } else { b'G' };
    assert!(mask.is_active(4));

    let databank = build_databank(
        "masked",
        &masked_params(),
        &[("hit", hit.as_slice()), ("miss", miss.as_slice())],
    );
    assert_eq!(databank.seed_span(), 19);
    // 95 symbols: five complete 19-windows per sequence
    assert_eq!(databank.index().total_postings(), 10);

    let query = mutate_ignored_positions(&hit[..19], &mask);
    assert_ne!(query, hit[..19].to_vec());
    let ids: Vec<(u32, u32)> = databank
        .index()
        .lookup(databank.seed_key(&query))
        .iter()
        .map(|p| (p.sequence_id(), p.position()))
        .collect();
    assert_eq!(ids, vec![(0, 0)]);

    // later windows are posted at window index * pattern length
    let key = databank.seed_key(&hit[38..57]);
    assert!(databank
        .index()
        .lookup(key)
        .iter()
        .any(|p| p.sequence_id() == 0 && p.position() == 38));
}

#[test]
fn masked_databank_keeps_the_full_sequence() {
    let seq = random_dna(50, 2);
    let databank = build_databank("masked", &masked_params(), &[("s", seq.as_slice())]);
    let stored = databank.store().get_encoded_sequence(0).unwrap();
    assert_eq!(stored.len(), 50);
    assert_eq!(databank.encoder().decode_sequence(&stored.encoded), seq);
    // only the two complete windows are posted
    assert_eq!(databank.index().total_postings(), 2);
}

#[test]
fn records_shorter_than_the_pattern_are_skipped() {
    let short = random_dna(18, 3);
    let long = random_dna(40, 4);
    let databank = build_databank(
        "masked",
        &masked_params(),
        &[("short", short.as_slice()), ("long", long.as_slice())],
    );
    assert_eq!(databank.store().len(), 1);
    assert_eq!(databank.store().get_encoded_sequence(0).unwrap().name, "long");
}

#[test]
fn masked_databank_search_finds_the_embedded_query() {
    let a = random_dna(600, 5);
    let b = random_dna(600, 6);
    let databank = build_databank(
        "masked",
        &masked_params(),
        &[("a", a.as_slice()), ("b", b.as_slice())],
    );
    let query = b[100..300].to_vec();

    let params = test_search_params().with_orientations(&[Orientation::Forward]);
    let searcher = Searcher::new(params, Arc::new(SmithWaterman::new(AlignerConfig::default()))).unwrap();
    let results = searcher.search(&databank, "q", &query).unwrap();
    assert!(!results.has_failures());
    let best = &results.hits[0];
    assert_eq!(best.target_name, "b");
    let hsp = &best.hsps[0];
    assert_eq!((hsp.query_from, hsp.query_to), (1, 200));
    assert_eq!((hsp.target_from, hsp.target_to), (101, 300));
    assert_eq!(hsp.score, 200);
}

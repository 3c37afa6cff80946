//! X-drop extension boundaries

use kblast::algorithm::extension::extend_area;
use kblast::seed::RetrievedArea;

use crate::helpers::dna_encoder;

// seed, 3 matches, 2 mismatches, 1 match, 3 mismatches, 4 matches
const QUERY: &[u8] = b"ACGTACGTTACCCGGGG";
const TARGET: &[u8] = b"ACGTACGAAAGGGGGGG";

#[test]
fn boundary_stays_at_the_best_score_after_a_dip() {
    let encoder = dna_encoder(4);
    let (q, t) = (encoder.encode_sequence(QUERY), encoder.encode_sequence(TARGET));
    let segment = extend_area(&RetrievedArea::new(0, 0, 4), &q, &t, 3);
    // the lone match at 9 recovers to 2, below the best of 3 at 7
    assert_eq!(segment.bounds(), (0, 7, 0, 7));
}

#[test]
fn a_generous_dropoff_reaches_the_tying_recovery() {
    let encoder = dna_encoder(4);
    let (q, t) = (encoder.encode_sequence(QUERY), encoder.encode_sequence(TARGET));
    let segment = extend_area(&RetrievedArea::new(0, 0, 4), &q, &t, 10);
    // the final run climbs back to 3, and ties move the boundary
    assert_eq!(segment.bounds(), (0, 17, 0, 17));
}

#[test]
fn extends_left_to_the_sequence_start() {
    let encoder = dna_encoder(4);
    let seq = b"TTGCATGCAAGGCCTTAAGG";
    let q = encoder.encode_sequence(seq);
    let t = encoder.encode_sequence(seq);
    let segment = extend_area(&RetrievedArea::new(12, 12, 4), &q, &t, 2);
    assert_eq!(segment.bounds(), (0, 20, 0, 20));
    assert_eq!(encoder.decode_range(segment.query, 0, 20), seq.to_vec());
}

//! Segment merging

use kblast::algorithm::extension::ExtendedSegment;
use kblast::core::EncodedSequence;
use kblast::post::merge_segments;

use crate::helpers::{dna_encoder, random_dna};

fn segment<'a>(
    q: &'a EncodedSequence,
    t: &'a EncodedSequence,
    (query_begin, query_end, target_begin, target_end): (usize, usize, usize, usize),
) -> ExtendedSegment<'a> {
    ExtendedSegment {
        query_begin,
        query_end,
        target_begin,
        target_end,
        query: q,
        target: t,
    }
}

#[test]
fn contained_segment_collapses_into_the_larger() {
    let encoder = dna_encoder(11);
    let (q, t) = (
        encoder.encode_sequence(&random_dna(600, 1)),
        encoder.encode_sequence(&random_dna(600, 2)),
    );
    let outer = segment(&q, &t, (0, 50, 0, 50));
    let merged = merge_segments(vec![segment(&q, &t, (10, 20, 10, 20)), outer, outer]);
    assert_eq!(merged, vec![outer]);
}

#[test]
fn query_containment_with_target_overlap_merges() {
    let encoder = dna_encoder(11);
    let (q, t) = (
        encoder.encode_sequence(&random_dna(600, 1)),
        encoder.encode_sequence(&random_dna(600, 2)),
    );
    let merged = merge_segments(vec![
        segment(&q, &t, (0, 100, 0, 100)),
        segment(&q, &t, (20, 60, 90, 150)),
    ]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].bounds(), (0, 100, 0, 150));
}

#[test]
fn far_apart_segments_are_left_alone() {
    let encoder = dna_encoder(11);
    let (q, t) = (
        encoder.encode_sequence(&random_dna(600, 1)),
        encoder.encode_sequence(&random_dna(600, 2)),
    );
    let input = vec![segment(&q, &t, (0, 10, 0, 10)), segment(&q, &t, (500, 510, 500, 510))];
    assert_eq!(merge_segments(input.clone()), input);
}

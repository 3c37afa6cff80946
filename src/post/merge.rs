//! Collapse redundant extended segments of one target
//!
//! Two segments merge into their bounding box when one axis is contained
//! (either way round) and the other axis overlaps. Merging restarts after
//! every merge until no pair qualifies. Candidate lists are short, so the
//! quadratic scan is fine.

use crate::algorithm::extension::ExtendedSegment;

#[inline]
fn contains(outer: (usize, usize), inner: (usize, usize)) -> bool {
    outer.0 <= inner.0 && inner.1 <= outer.1
}

/// Closed-interval overlap, so touching boundaries count.
#[inline]
fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Whether `a` and `b` describe the same local similarity.
pub fn should_merge(a: &ExtendedSegment<'_>, b: &ExtendedSegment<'_>) -> bool {
    if !a.same_sequences(b) {
        return false;
    }
    let (qa, ta) = ((a.query_begin, a.query_end), (a.target_begin, a.target_end));
    let (qb, tb) = ((b.query_begin, b.query_end), (b.target_begin, b.target_end));

    let query_nested = contains(qa, qb) || contains(qb, qa);
    let target_nested = contains(ta, tb) || contains(tb, ta);
    (target_nested && overlaps(qa, qb)) || (query_nested && overlaps(ta, tb))
}

fn bounding<'a>(a: &ExtendedSegment<'a>, b: &ExtendedSegment<'a>) -> ExtendedSegment<'a> {
    ExtendedSegment {
        query_begin: a.query_begin.min(b.query_begin),
        query_end: a.query_end.max(b.query_end),
        target_begin: a.target_begin.min(b.target_begin),
        target_end: a.target_end.max(b.target_end),
        query: a.query,
        target: a.target,
    }
}

/// Drop structurally identical segments, keeping first occurrences.
pub fn dedup_segments<'a>(segments: &mut Vec<ExtendedSegment<'a>>) {
    let mut seen: Vec<ExtendedSegment<'a>> = Vec::with_capacity(segments.len());
    segments.retain(|s| {
        if seen.contains(s) {
            false
        } else {
            seen.push(*s);
            true
        }
    });
}

/// Merge to a fixed point.
pub fn merge_segments<'a>(mut segments: Vec<ExtendedSegment<'a>>) -> Vec<ExtendedSegment<'a>> {
    dedup_segments(&mut segments);
    'restart: loop {
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                if should_merge(&segments[i], &segments[j]) {
                    let merged = bounding(&segments[i], &segments[j]);
                    segments.swap_remove(j);
                    segments[i] = merged;
                    continue 'restart;
                }
            }
        }
        return segments;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alphabet::Alphabet;
    use crate::core::encoding::{EncodedSequence, SymbolEncoder};
    use std::sync::Arc;

    fn seq() -> EncodedSequence {
        SymbolEncoder::new(Arc::new(Alphabet::dna()), 4)
            .unwrap()
            .encode_sequence(&[b'A'; 400])
    }

    fn seg<'a>(q: &'a EncodedSequence, t: &'a EncodedSequence, b: (usize, usize, usize, usize)) -> ExtendedSegment<'a> {
        ExtendedSegment {
            query_begin: b.0,
            query_end: b.1,
            target_begin: b.2,
            target_end: b.3,
            query: q,
            target: t,
        }
    }

    #[test]
    fn contained_segment_is_absorbed() {
        let (q, t) = (seq(), seq());
        let merged = merge_segments(vec![seg(&q, &t, (0, 100, 0, 100)), seg(&q, &t, (10, 50, 10, 50))]);
        assert_eq!(merged, vec![seg(&q, &t, (0, 100, 0, 100))]);
    }

    #[test]
    fn self_merge_is_identity() {
        let (q, t) = (seq(), seq());
        let s = seg(&q, &t, (5, 40, 25, 60));
        assert_eq!(merge_segments(vec![s, s]), vec![s]);
    }

    #[test]
    fn far_apart_segments_stay_separate() {
        let (q, t) = (seq(), seq());
        let input = vec![seg(&q, &t, (0, 40, 0, 40)), seg(&q, &t, (200, 240, 200, 240))];
        assert_eq!(merge_segments(input.clone()), input);
    }

    #[test]
    fn merges_cascade_to_a_fixed_point() {
        let (q, t) = (seq(), seq());
        // a and c only qualify once b has widened a
        let a = seg(&q, &t, (0, 50, 0, 50));
        let c = seg(&q, &t, (60, 80, 40, 90));
        let b = seg(&q, &t, (40, 90, 10, 45));
        let merged = merge_segments(vec![a, c, b]);
        assert_eq!(merged, vec![seg(&q, &t, (0, 90, 0, 90))]);
    }

    #[test]
    fn staggered_overlap_is_not_enough() {
        let (q, t) = (seq(), seq());
        let a = seg(&q, &t, (0, 50, 0, 50));
        let b = seg(&q, &t, (30, 80, 30, 80));
        assert!(!should_merge(&a, &b));
    }

    #[test]
    fn different_targets_never_merge() {
        let (q, t1, t2) = (seq(), seq(), seq());
        assert!(!should_merge(&seg(&q, &t1, (0, 50, 0, 50)), &seg(&q, &t2, (0, 50, 0, 50))));
    }
}

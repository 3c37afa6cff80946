//! Ungapped X-drop extension of retrieved areas
//!
//! Each direction walks one symbol at a time from the area boundary, +1 for
//! an identical code and -1 otherwise, and stops once the running score has
//! fallen more than `dropoff` below the best seen, or at a sequence end. The
//! segment ends where the best score was last reached, not where the walk
//! stopped.

use std::fmt;
use std::ptr;

use crate::core::encoding::EncodedSequence;
use crate::seed::area::RetrievedArea;

/// Maximal ungapped segment over the encoded query and target it came from.
#[derive(Clone, Copy)]
pub struct ExtendedSegment<'a> {
    pub query_begin: usize,
    pub query_end: usize,
    pub target_begin: usize,
    pub target_end: usize,
    pub query: &'a EncodedSequence,
    pub target: &'a EncodedSequence,
}

impl<'a> ExtendedSegment<'a> {
    pub fn query_len(&self) -> usize {
        self.query_end - self.query_begin
    }

    pub fn target_len(&self) -> usize {
        self.target_end - self.target_begin
    }

    /// `(query_begin, query_end, target_begin, target_end)`
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (self.query_begin, self.query_end, self.target_begin, self.target_end)
    }

    /// Whether both segments were extended over the same two sequences.
    pub fn same_sequences(&self, other: &ExtendedSegment<'_>) -> bool {
        ptr::eq(self.query, other.query) && ptr::eq(self.target, other.target)
    }
}

impl PartialEq for ExtendedSegment<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bounds() == other.bounds() && self.same_sequences(other)
    }
}

impl Eq for ExtendedSegment<'_> {}

impl fmt::Debug for ExtendedSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExtendedSegment(q {}..{}, t {}..{})",
            self.query_begin, self.query_end, self.target_begin, self.target_end
        )
    }
}

/// Extend `area` in both directions over `query` and `target`.
pub fn extend_area<'a>(
    area: &RetrievedArea,
    query: &'a EncodedSequence,
    target: &'a EncodedSequence,
    dropoff: i32,
) -> ExtendedSegment<'a> {
    let query_end = area.query_end.min(query.len());
    let target_end = area.target_end.min(target.len());
    let query_begin = area.query_begin.min(query_end);
    let target_begin = area.target_begin.min(target_end);

    let (query_end, target_end) = extend_right(query, target, query_end, target_end, dropoff);
    let (query_begin, target_begin) = extend_left(query, target, query_begin, target_begin, dropoff);

    ExtendedSegment {
        query_begin,
        query_end,
        target_begin,
        target_end,
        query,
        target,
    }
}

/// Walk right from exclusive ends `(q, t)`; returns the best exclusive ends.
fn extend_right(
    query: &EncodedSequence,
    target: &EncodedSequence,
    mut q: usize,
    mut t: usize,
    dropoff: i32,
) -> (usize, usize) {
    let (mut score, mut best) = (0i32, 0i32);
    let mut best_end = (q, t);
    while q < query.len() && t < target.len() {
        if query.value_at(q) == target.value_at(t) {
            score += 1;
            if score >= best {
                best = score;
                best_end = (q + 1, t + 1);
            }
        } else {
            score -= 1;
            if best - score > dropoff {
                break;
            }
        }
        q += 1;
        t += 1;
    }
    best_end
}

/// Walk left from inclusive begins `(q, t)`; returns the best begins.
fn extend_left(
    query: &EncodedSequence,
    target: &EncodedSequence,
    mut q: usize,
    mut t: usize,
    dropoff: i32,
) -> (usize, usize) {
    let (mut score, mut best) = (0i32, 0i32);
    let mut best_begin = (q, t);
    while q > 0 && t > 0 {
        q -= 1;
        t -= 1;
        if query.value_at(q) == target.value_at(t) {
            score += 1;
            if score >= best {
                best = score;
                best_begin = (q, t);
            }
        } else {
            score -= 1;
            if best - score > dropoff {
                break;
            }
        }
    }
    best_begin
}

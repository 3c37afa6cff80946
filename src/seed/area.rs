//! Seed retrieval: postings to provisional hit areas
//!
//! Hits arrive in increasing query position. Per target sequence the tracker
//! keeps a few open areas; a hit joins the first open area it is close to on
//! both axes, otherwise it opens a new one. Areas left behind by more than
//! `max_distance` on the query axis are closed and kept only when long enough.

use rustc_hash::FxHashMap;

use crate::index::Posting;

/// Provisional diagonal-consistent hit, ends exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RetrievedArea {
    pub query_begin: usize,
    pub query_end: usize,
    pub target_begin: usize,
    pub target_end: usize,
    pub length: usize,
}

impl RetrievedArea {
    pub fn new(query_pos: usize, target_pos: usize, span: usize) -> Self {
        Self {
            query_begin: query_pos,
            query_end: query_pos + span,
            target_begin: target_pos,
            target_end: target_pos + span,
            length: span,
        }
    }

    /// Grow this area to cover the seed at `(query_pos, target_pos)` when the
    /// seed starts inside it or at most `max_distance` past its end on both
    /// axes. Returns whether the seed was absorbed.
    #[inline]
    pub fn test_and_extend(
        &mut self,
        query_pos: usize,
        target_pos: usize,
        span: usize,
        max_distance: usize,
    ) -> bool {
        let near_query = query_pos >= self.query_begin && query_pos <= self.query_end + max_distance;
        let near_target =
            target_pos >= self.target_begin && target_pos <= self.target_end + max_distance;
        if !(near_query && near_target) {
            return false;
        }
        self.query_end = self.query_end.max(query_pos + span);
        self.target_end = self.target_end.max(target_pos + span);
        self.length = (self.query_end - self.query_begin).min(self.target_end - self.target_begin);
        true
    }

    /// Diagonal of the area start, `target_begin - query_begin`.
    pub fn diagonal(&self) -> i64 {
        self.target_begin as i64 - self.query_begin as i64
    }
}

/// Streaming area accumulator for one search task.
#[derive(Debug)]
pub struct AreaTracker {
    span: usize,
    max_distance: usize,
    min_length: usize,
    open: FxHashMap<u32, Vec<RetrievedArea>>,
    closed: FxHashMap<u32, Vec<RetrievedArea>>,
    last_query_pos: usize,
}

impl AreaTracker {
    /// `span` is the symbol width of one seed on both sequences.
    pub fn new(span: usize, max_distance: usize, min_length: usize) -> Self {
        Self {
            span,
            max_distance,
            min_length,
            open: FxHashMap::default(),
            closed: FxHashMap::default(),
            last_query_pos: 0,
        }
    }

    /// Feed one seed hit. `query_pos` must not decrease between calls.
    pub fn add_hit(&mut self, query_pos: usize, posting: Posting) {
        debug_assert!(query_pos >= self.last_query_pos, "hits out of query order");
        self.last_query_pos = query_pos;

        let target = posting.sequence_id();
        let target_pos = posting.position() as usize;
        let (span, max_distance, min_length) = (self.span, self.max_distance, self.min_length);
        let areas = self.open.entry(target).or_default();

        let mut kept = Vec::new();
        areas.retain(|area| {
            if query_pos.saturating_sub(area.query_end) > max_distance {
                if area.length >= min_length {
                    kept.push(*area);
                }
                false
            } else {
                true
            }
        });
        if !kept.is_empty() {
            self.closed.entry(target).or_default().extend(kept);
        }

        let absorbed = areas
            .iter_mut()
            .any(|area| area.test_and_extend(query_pos, target_pos, span, max_distance));
        if !absorbed {
            areas.push(RetrievedArea::new(query_pos, target_pos, span));
        }
    }

    /// Number of targets with at least one open area.
    pub fn open_targets(&self) -> usize {
        self.open.values().filter(|a| !a.is_empty()).count()
    }

    /// Close everything and return the kept areas per target.
    pub fn finish(mut self) -> FxHashMap<u32, Vec<RetrievedArea>> {
        for (target, areas) in self.open.drain() {
            let kept: Vec<RetrievedArea> = areas
                .into_iter()
                .filter(|a| a.length >= self.min_length)
                .collect();
            if !kept.is_empty() {
                self.closed.entry(target).or_default().extend(kept);
            }
        }
        self.closed
    }
}

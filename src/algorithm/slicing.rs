//! Query slicing
//!
//! A long query is cut into overlapping slices that are searched as
//! independent tasks. Each slice reaches `overlap` symbols past its nominal
//! end so an HSP crossing a boundary is still seeded in one slice.

/// Half-open `[begin, end)` window of the (oriented) query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySlice {
    pub begin: usize,
    pub end: usize,
}

impl QuerySlice {
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.begin
    }
}

/// Number of slices actually used: `requested`, reduced until every slice
/// holds at least `min_slice_length` symbols (never below 1).
pub fn effective_split(query_len: usize, requested: usize, min_slice_length: usize) -> usize {
    let mut quantity = requested.max(1);
    while quantity > 1 && query_len / quantity < min_slice_length {
        quantity -= 1;
    }
    quantity
}

/// Slices covering `[0, query_len)`.
///
/// The overlap is `min_hsp_length - seed_span` (0 when the seed is longer),
/// clamped to the query end.
pub fn split_query(
    query_len: usize,
    requested: usize,
    min_slice_length: usize,
    min_hsp_length: usize,
    seed_span: usize,
) -> Vec<QuerySlice> {
    if query_len == 0 {
        return Vec::new();
    }
    let quantity = effective_split(query_len, requested, min_slice_length);
    let step = query_len.div_ceil(quantity);
    let overlap = min_hsp_length.saturating_sub(seed_span);

    (0..quantity)
        .map(|i| i * step)
        .take_while(|&begin| begin < query_len)
        .map(|begin| QuerySlice {
            begin,
            end: (begin + step + overlap).min(query_len),
        })
        .collect()
}

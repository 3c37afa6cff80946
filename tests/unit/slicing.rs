//! Query slicing

use kblast::algorithm::slicing::{effective_split, split_query, QuerySlice};

#[test]
fn slices_cover_the_query_with_overlap() {
    let slices = split_query(1000, 3, 300, 40, 11);
    assert_eq!(slices.len(), 3);
    assert_eq!(slices[0], QuerySlice { begin: 0, end: 363 });
    assert_eq!(slices[1], QuerySlice { begin: 334, end: 697 });
    assert_eq!(slices[2], QuerySlice { begin: 668, end: 1000 });
    for pair in slices.windows(2) {
        assert!(pair[0].end > pair[1].begin);
    }
}

#[test]
fn short_queries_are_not_split() {
    assert_eq!(effective_split(450, 4, 300), 1);
    assert_eq!(split_query(450, 4, 300, 32, 11), vec![QuerySlice { begin: 0, end: 450 }]);
}

#[test]
fn seeds_longer_than_min_hsp_need_no_overlap() {
    let slices = split_query(900, 3, 300, 8, 11);
    assert_eq!(
        slices,
        vec![
            QuerySlice { begin: 0, end: 300 },
            QuerySlice { begin: 300, end: 600 },
            QuerySlice { begin: 600, end: 900 },
        ]
    );
}

#[test]
fn empty_query_has_no_slices() {
    assert!(split_query(0, 2, 300, 32, 11).is_empty());
}

//! Area tracking over streams of seed hits

use kblast::index::Posting;
use kblast::seed::{AreaTracker, RetrievedArea};

#[test]
fn close_seeds_on_one_diagonal_form_one_area() {
    let mut tracker = AreaTracker::new(8, 20, 20);
    for q in [0, 20, 40] {
        tracker.add_hit(q, Posting::new(3, (q + 100) as u32));
    }
    let areas = tracker.finish();
    assert_eq!(
        areas[&3],
        vec![RetrievedArea {
            query_begin: 0,
            query_end: 48,
            target_begin: 100,
            target_end: 148,
            length: 48,
        }]
    );
}

#[test]
fn a_wide_gap_splits_areas_and_short_ones_are_dropped() {
    let mut tracker = AreaTracker::new(8, 20, 20);
    for q in [0, 8, 16] {
        tracker.add_hit(q, Posting::new(0, (q + 100) as u32));
    }
    // 60 - 24 > 20: the first area closes here
    tracker.add_hit(60, Posting::new(0, 160));
    tracker.add_hit(68, Posting::new(0, 168));
    let areas = tracker.finish();
    let kept = &areas[&0];
    assert_eq!(kept.len(), 1);
    assert_eq!((kept[0].query_begin, kept[0].query_end, kept[0].length), (0, 24, 24));
}

#[test]
fn both_areas_survive_when_long_enough() {
    let mut tracker = AreaTracker::new(8, 10, 16);
    for q in [0, 8, 100, 108] {
        tracker.add_hit(q, Posting::new(1, q as u32));
    }
    let mut areas = tracker.finish().remove(&1).unwrap();
    areas.sort();
    let spans: Vec<(usize, usize)> = areas.iter().map(|a| (a.query_begin, a.query_end)).collect();
    assert_eq!(spans, vec![(0, 16), (100, 116)]);
}

#[test]
fn off_diagonal_seed_opens_a_second_area() {
    let mut tracker = AreaTracker::new(4, 10, 4);
    tracker.add_hit(0, Posting::new(0, 50));
    // far behind on the target axis
    tracker.add_hit(2, Posting::new(0, 10));
    assert_eq!(tracker.open_targets(), 1);
    assert_eq!(tracker.finish()[&0].len(), 2);
}

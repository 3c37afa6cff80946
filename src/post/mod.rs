//! Post-extension processing of segments

pub mod merge;

pub use merge::{dedup_segments, merge_segments, should_merge};

//! Seed retrieval: grouping index hits into candidate areas

pub mod area;

pub use area::{AreaTracker, RetrievedArea};

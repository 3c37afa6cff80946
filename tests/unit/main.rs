//! Cross-module tests for kblast
//!
//! Tests are organized by component:
//! - `encoding`, `index`, `masked`: packing, index construction and lookup
//! - `area`, `extension`, `merge`, `slicing`: the seed-and-extend pipeline
//! - `search`: end-to-end searches through the orchestrator

mod helpers;

mod area;
mod encoding;
mod extension;
mod index;
mod masked;
mod merge;
mod search;
mod slicing;

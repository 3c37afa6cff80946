//! Search algorithm: query orientation and slicing, X-drop extension, and
//! the two-phase search orchestrator.

pub mod collection;
pub mod engine;
pub mod extension;
pub mod orientation;
pub mod slicing;

pub use collection::search_collection;
pub use engine::{Phase, SearchResults, Searcher, TaskFailure};
pub use orientation::Orientation;

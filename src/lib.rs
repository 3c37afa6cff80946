pub mod algorithm;
pub mod common;
pub mod databank;
pub mod error;
pub mod sequence;

pub mod align;
pub mod config;
pub mod post;
pub mod report;
pub mod seed;
pub mod stats;

pub mod core;
pub mod index;

pub use algorithm::{search_collection, Orientation, SearchResults, Searcher};
pub use databank::{Databank, DatabankBuilder, DatabankCollection};
pub use error::{ConfigError, IndexError, SearchError};

//! Result output

pub mod tabular;

pub use tabular::{format_bit_score, format_evalue, TabularConfig, TabularWriter};

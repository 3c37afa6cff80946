//! Query orientations
//!
//! One searcher handles every orientation: the orientation only decides how
//! the query symbols are produced and how coordinates on the oriented query
//! map back to the original one.

use std::fmt;
use std::str::FromStr;

use crate::core::alphabet::{self, Alphabet, AlphabetKind};
use crate::core::translation;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Forward,
    Reverse,
    Complement,
    ReverseComplement,
    /// Translated reading frame, ±1..±3.
    Frame(i8),
}

impl Orientation {
    pub const NUCLEOTIDE: [Orientation; 4] = [
        Orientation::Forward,
        Orientation::Reverse,
        Orientation::Complement,
        Orientation::ReverseComplement,
    ];

    pub const SIX_FRAMES: [Orientation; 6] = [
        Orientation::Frame(1),
        Orientation::Frame(2),
        Orientation::Frame(3),
        Orientation::Frame(-1),
        Orientation::Frame(-2),
        Orientation::Frame(-3),
    ];

    pub fn is_translated(self) -> bool {
        matches!(self, Orientation::Frame(_))
    }

    /// Whether oriented coordinates run against the original query.
    pub fn is_reversed(self) -> bool {
        match self {
            Orientation::Reverse | Orientation::ReverseComplement => true,
            Orientation::Frame(f) => f < 0,
            _ => false,
        }
    }

    pub fn needs_complement(self) -> bool {
        matches!(self, Orientation::Complement | Orientation::ReverseComplement)
    }

    /// Fails if this orientation makes no sense against `databank` symbols.
    pub fn check_compatible(self, databank: &Alphabet) -> Result<(), ConfigError> {
        let ok = match self {
            Orientation::Frame(f) => {
                f != 0 && f.abs() <= 3 && databank.kind() != AlphabetKind::Nucleotide
            }
            Orientation::Complement | Orientation::ReverseComplement => databank.supports_complement(),
            Orientation::Forward | Orientation::Reverse => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedOrientation {
                orientation: self.to_string(),
                alphabet: databank.kind().to_string(),
            })
        }
    }

    /// The query as this orientation searches it.
    pub fn apply(self, query: &[u8]) -> Vec<u8> {
        match self {
            Orientation::Forward => query.to_vec(),
            Orientation::Reverse => query.iter().rev().copied().collect(),
            Orientation::Complement => alphabet::complement(query),
            Orientation::ReverseComplement => alphabet::reverse_complement(query),
            Orientation::Frame(f) => translation::translate_frame(query, f),
        }
    }

    /// Map half-open `[begin, end)` on the oriented query to 1-based,
    /// inclusive `(from, to)` on the original query. Reversed orientations
    /// give `from > to`.
    pub fn query_coordinates(self, begin: usize, end: usize, query_len: usize) -> (usize, usize) {
        match self {
            Orientation::Forward | Orientation::Complement => (begin + 1, end),
            Orientation::Reverse | Orientation::ReverseComplement => {
                (query_len - begin, query_len - end + 1)
            }
            Orientation::Frame(f) => translation::frame_to_nucleotide(f, begin, end, query_len),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Forward => write!(f, "forward"),
            Orientation::Reverse => write!(f, "reverse"),
            Orientation::Complement => write!(f, "complement"),
            Orientation::ReverseComplement => write!(f, "reverse-complement"),
            Orientation::Frame(frame) => write!(f, "frame{:+}", frame),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "forward" | "plus" | "f" => return Ok(Orientation::Forward),
            "reverse" | "r" => return Ok(Orientation::Reverse),
            "complement" | "c" => return Ok(Orientation::Complement),
            "reverse-complement" | "revcomp" | "minus" | "rc" => {
                return Ok(Orientation::ReverseComplement)
            }
            _ => {}
        }
        if let Some(frame) = lower.strip_prefix("frame") {
            if let Ok(n) = frame.parse::<i8>() {
                if n != 0 && n.abs() <= 3 {
                    return Ok(Orientation::Frame(n));
                }
            }
        }
        Err(format!("Unknown orientation: {}", s))
    }
}

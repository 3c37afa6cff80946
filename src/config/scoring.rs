use crate::core::alphabet::Alphabet;

/// Scoring of the local aligner that finishes each extended segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignerConfig {
    pub match_score: i32,
    pub mismatch_score: i32,
    /// Linear gap score, applied per gap column (negative).
    pub gap_score: i32,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            match_score: 1,
            mismatch_score: -3,
            gap_score: -2,
        }
    }
}

/// Named alphabets selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphabetChoice {
    #[default]
    Dna,
    Protein,
    Murphy10,
}

impl AlphabetChoice {
    pub fn alphabet(self) -> Alphabet {
        match self {
            AlphabetChoice::Dna => Alphabet::dna(),
            AlphabetChoice::Protein => Alphabet::protein(),
            AlphabetChoice::Murphy10 => Alphabet::murphy10(),
        }
    }
}

impl std::str::FromStr for AlphabetChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dna" | "nucl" | "nucleotide" => Ok(AlphabetChoice::Dna),
            "protein" | "prot" | "aa" => Ok(AlphabetChoice::Protein),
            "murphy10" | "reduced" => Ok(AlphabetChoice::Murphy10),
            _ => Err(format!(
                "Unknown alphabet: {}. Use 'dna', 'protein' or 'murphy10'",
                s
            )),
        }
    }
}

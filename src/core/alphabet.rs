//! Fixed, small symbol alphabets
//!
//! An alphabet maps ASCII symbols to dense codes `0..size` and back. The code
//! width is `bits_per_symbol = max(1, ceil(log2(size)))`. Lookup is
//! case-insensitive; symbols outside the alphabet encode to the wildcard
//! code 0, so decoding is lossy for them.

use std::fmt;

use crate::error::ConfigError;

/// Code assigned to symbols the alphabet does not know.
pub const WILDCARD_CODE: u8 = 0;

const UNKNOWN: u16 = u16::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphabetKind {
    Nucleotide,
    Protein,
    Reduced,
}

impl fmt::Display for AlphabetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphabetKind::Nucleotide => write!(f, "nucleotide"),
            AlphabetKind::Protein => write!(f, "protein"),
            AlphabetKind::Reduced => write!(f, "reduced"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Alphabet {
    name: String,
    kind: AlphabetKind,
    /// code -> canonical symbol
    symbols: Vec<u8>,
    /// ASCII -> code, `UNKNOWN` for symbols outside the alphabet
    codes: [u16; 256],
    bits_per_symbol: u32,
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind && self.symbols == other.symbols
    }
}

impl Eq for Alphabet {}

impl Alphabet {
    /// Build an alphabet where every symbol is its own code.
    pub fn new(name: &str, kind: AlphabetKind, symbols: &[u8]) -> Result<Self, ConfigError> {
        let groups: Vec<Vec<u8>> = symbols.iter().map(|&s| vec![s]).collect();
        Self::from_groups(name, kind, &groups)
    }

    /// Build an alphabet where each group of symbols shares one code.
    ///
    /// The first symbol of a group is what decoding produces.
    pub fn from_groups(
        name: &str,
        kind: AlphabetKind,
        groups: &[Vec<u8>],
    ) -> Result<Self, ConfigError> {
        let size = groups.len();
        if size == 0 || size > 256 || groups.iter().any(|g| g.is_empty()) {
            return Err(ConfigError::OutOfBounds(size));
        }

        let mut codes = [UNKNOWN; 256];
        let mut symbols = Vec::with_capacity(size);
        for (code, group) in groups.iter().enumerate() {
            symbols.push(group[0].to_ascii_uppercase());
            for &symbol in group {
                for variant in [symbol.to_ascii_uppercase(), symbol.to_ascii_lowercase()] {
                    let slot = &mut codes[variant as usize];
                    if *slot != UNKNOWN && *slot != code as u16 {
                        return Err(ConfigError::DuplicateSymbol {
                            alphabet: name.to_string(),
                            symbol: symbol as char,
                        });
                    }
                    *slot = code as u16;
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            kind,
            symbols,
            codes,
            bits_per_symbol: bits_for_size(size),
        })
    }

    /// A, C, G, T with U folded onto T.
    pub fn dna() -> Self {
        let groups = vec![b"A".to_vec(), b"C".to_vec(), b"G".to_vec(), b"TU".to_vec()];
        Self::from_groups("dna", AlphabetKind::Nucleotide, &groups)
            .expect("four-symbol alphabet is always valid")
    }

    /// The 20 standard amino acids.
    pub fn protein() -> Self {
        Self::new("protein", AlphabetKind::Protein, b"ACDEFGHIKLMNPQRSTVWY")
            .expect("twenty-symbol alphabet is always valid")
    }

    /// Murphy et al. 10-letter reduction of the amino acids.
    pub fn murphy10() -> Self {
        let groups: Vec<Vec<u8>> = ["LVIM", "C", "A", "G", "ST", "P", "FYW", "EDNQ", "KR", "H"]
            .iter()
            .map(|g| g.as_bytes().to_vec())
            .collect();
        Self::from_groups("murphy10", AlphabetKind::Reduced, &groups)
            .expect("murphy10 groups are disjoint")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.bits_per_symbol
    }

    #[inline]
    pub fn code_mask(&self) -> u64 {
        (1u64 << self.bits_per_symbol) - 1
    }

    /// Code of `symbol`, or the wildcard code when unknown.
    #[inline(always)]
    pub fn code(&self, symbol: u8) -> u8 {
        match self.codes[symbol as usize] {
            UNKNOWN => WILDCARD_CODE,
            code => code as u8,
        }
    }

    #[inline]
    pub fn contains(&self, symbol: u8) -> bool {
        self.codes[symbol as usize] != UNKNOWN
    }

    /// Canonical symbol of `code`; codes past the alphabet decode as the wildcard.
    #[inline(always)]
    pub fn symbol(&self, code: u8) -> u8 {
        self.symbols
            .get(code as usize)
            .copied()
            .unwrap_or(self.symbols[WILDCARD_CODE as usize])
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn supports_complement(&self) -> bool {
        self.kind == AlphabetKind::Nucleotide
    }
}

fn bits_for_size(size: usize) -> u32 {
    let mut bits = 0u32;
    while (1usize << bits) < size {
        bits += 1;
    }
    bits.max(1)
}

// IUPAC nucleotide <-> 4-bit ambiguity mask, used so complements keep
// ambiguity codes intact.
const NCBI4NA_TO_IUPACNA: [u8; 16] = [
    b'-', b'A', b'C', b'M', b'G', b'R', b'S', b'V',
    b'T', b'W', b'Y', b'H', b'K', b'D', b'B', b'N',
];

const IUPACNA_TO_NCBI4NA: [u8; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 1, 14, 2, 13, 0, 0, 4, 11, 0, 0, 12, 0, 3, 15, 0,
    0, 0, 5, 6, 8, 8, 7, 9, 0, 10, 0, 0, 0, 0, 0, 0,
    0, 1, 14, 2, 13, 0, 0, 4, 11, 0, 0, 12, 0, 3, 15, 0,
    0, 0, 5, 6, 8, 8, 7, 9, 0, 10, 0, 0, 0, 0, 0, 0,
];

const NCBI4NA_COMPLEMENT: [u8; 16] = [
    0, 8, 4, 12,
    2, 10, 6, 14,
    1, 9, 5, 13,
    3, 11, 7, 15,
];

/// IUPAC complement of one nucleotide; anything unrecognised becomes `N`.
#[inline]
pub fn complement_base(base: u8) -> u8 {
    let idx = if base < 128 { IUPACNA_TO_NCBI4NA[base as usize] } else { 0 };
    if idx == 0 {
        return b'N';
    }
    NCBI4NA_TO_IUPACNA[NCBI4NA_COMPLEMENT[idx as usize] as usize]
}

pub fn complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| complement_base(b)).collect()
}

pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement_base(b)).collect()
}

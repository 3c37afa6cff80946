//! Spaced-seed masks
//!
//! A mask selects `weight` positions out of a window of `pattern_length`
//! symbols. The selected symbols, compacted in order, form the seed k-mer.

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mask {
    bits: Vec<bool>,
    active: Vec<usize>,
}

impl Mask {
    /// Parse a `0`/`1` pattern.
    ///
    /// The pattern may be shorter than `pattern_length`; the remaining
    /// positions are don't-care. The number of `1`s must equal
    /// `sub_sequence_length`.
    pub fn parse(
        pattern: &str,
        pattern_length: usize,
        sub_sequence_length: usize,
    ) -> Result<Self, ConfigError> {
        if pattern.len() > pattern_length {
            return Err(ConfigError::InvalidMask(format!(
                "pattern '{}' is longer than the pattern length {}",
                pattern, pattern_length
            )));
        }
        let mut bits = Vec::with_capacity(pattern_length);
        for c in pattern.chars() {
            match c {
                '1' => bits.push(true),
                '0' => bits.push(false),
                other => {
                    return Err(ConfigError::InvalidMask(format!(
                        "unexpected character '{}' in pattern '{}'",
                        other, pattern
                    )))
                }
            }
        }
        bits.resize(pattern_length, false);
        Self::from_bits(bits, sub_sequence_length)
    }

    pub fn from_bits(bits: Vec<bool>, sub_sequence_length: usize) -> Result<Self, ConfigError> {
        let active: Vec<usize> = bits
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
            .collect();
        if active.len() != sub_sequence_length {
            return Err(ConfigError::MaskLengthMismatch {
                expected: sub_sequence_length,
                found: active.len(),
            });
        }
        Ok(Self { bits, active })
    }

    /// Window length the mask spans.
    pub fn pattern_length(&self) -> usize {
        self.bits.len()
    }

    /// Number of active positions.
    pub fn weight(&self) -> usize {
        self.active.len()
    }

    pub fn active_positions(&self) -> &[usize] {
        &self.active
    }

    pub fn is_active(&self, pos: usize) -> bool {
        self.bits.get(pos).copied().unwrap_or(false)
    }
}

impl std::fmt::Display for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &on in &self.bits {
            f.write_str(if on { "1" } else { "0" })?;
        }
        Ok(())
    }
}

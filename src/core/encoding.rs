//! Fixed-width bit packing of symbol sequences
//!
//! # Layout
//! An [`EncodedSequence`] is a vector of 64-bit words. Word 0 holds the total
//! symbol length. Every following word packs one chunk of
//! `sub_sequence_length` symbols, most significant symbol first:
//!
//! ```text
//! value |= code(symbol[i]) << ((k - 1 - i) * bits_per_symbol)
//! ```
//!
//! # Trailing chunk
//! When the length is not a multiple of `k` the last, shorter chunk is still
//! stored as the final word. It is left-aligned: its symbols sit in the same
//! slots they would occupy in a full chunk and the unused low slots are 0.
//! Random access and window decoding see every symbol; the inverted index
//! only posts complete words (see [`EncodedSequence::complete_words`]).

use std::sync::Arc;

use super::alphabet::Alphabet;
use super::mask::Mask;
use crate::error::ConfigError;

pub const WORD_BITS: u32 = 64;

/// Widest key the dense inverted index will address.
pub const MAX_KEY_BITS: u32 = 26;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedSequence {
    words: Vec<u64>,
    symbols_per_word: u32,
    bits_per_symbol: u32,
}

impl EncodedSequence {
    /// Number of symbols encoded (word 0).
    #[inline]
    pub fn len(&self) -> usize {
        self.words[0] as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw words including the length header.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Data words, trailing partial chunk included.
    pub fn data_words(&self) -> &[u64] {
        &self.words[1..]
    }

    /// Data words holding a full chunk of `symbols_per_word` symbols.
    pub fn complete_words(&self) -> &[u64] {
        let full = self.len() / self.symbols_per_word as usize;
        &self.words[1..1 + full]
    }

    pub fn symbols_per_word(&self) -> usize {
        self.symbols_per_word as usize
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.bits_per_symbol
    }

    /// Code of the symbol at `pos` without decoding the whole sequence.
    ///
    /// # Panics
    /// Panics if `pos >= len()`.
    #[inline(always)]
    pub fn value_at(&self, pos: usize) -> u8 {
        debug_assert!(pos < self.len(), "position {} out of bounds", pos);
        let k = self.symbols_per_word as usize;
        let word = self.words[1 + pos / k];
        let shift = (k - 1 - pos % k) as u32 * self.bits_per_symbol;
        ((word >> shift) & ((1u64 << self.bits_per_symbol) - 1)) as u8
    }
}

/// Packs symbols of one alphabet into words of `sub_sequence_length` symbols.
#[derive(Debug, Clone)]
pub struct SymbolEncoder {
    alphabet: Arc<Alphabet>,
    sub_sequence_length: usize,
    word_capacity: usize,
}

impl SymbolEncoder {
    pub fn new(alphabet: Arc<Alphabet>, sub_sequence_length: usize) -> Result<Self, ConfigError> {
        let bits = alphabet.bits_per_symbol();
        let word_capacity = (WORD_BITS / bits) as usize;
        if sub_sequence_length == 0 {
            return Err(ConfigError::InvalidParam {
                name: "sub_sequence_length",
                reason: "must be at least 1".to_string(),
            });
        }
        if sub_sequence_length > word_capacity {
            return Err(ConfigError::SubSequenceTooLong {
                length: sub_sequence_length,
                bits_per_symbol: bits,
                word_bits: WORD_BITS,
            });
        }
        Ok(Self {
            alphabet,
            sub_sequence_length,
            word_capacity,
        })
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    pub fn sub_sequence_length(&self) -> usize {
        self.sub_sequence_length
    }

    /// Symbols one word can hold, `floor(64 / bits_per_symbol)`.
    pub fn word_capacity(&self) -> usize {
        self.word_capacity
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.alphabet.bits_per_symbol()
    }

    /// Bits of an index key, `bits_per_symbol * sub_sequence_length`.
    pub fn key_bits(&self) -> u32 {
        self.bits_per_symbol() * self.sub_sequence_length as u32
    }

    /// Fails unless keys of this encoder fit the dense index key space.
    pub fn check_key_space(&self) -> Result<(), ConfigError> {
        let bits = self.key_bits();
        if bits > MAX_KEY_BITS {
            return Err(ConfigError::KeyspaceTooLarge {
                bits,
                max: MAX_KEY_BITS,
            });
        }
        Ok(())
    }

    /// Pack `symbols` MSB-first. Any length up to the word capacity is accepted.
    #[inline]
    pub fn encode_kmer(&self, symbols: &[u8]) -> u64 {
        debug_assert!(symbols.len() <= self.word_capacity);
        let bits = self.bits_per_symbol();
        symbols
            .iter()
            .fold(0u64, |acc, &s| (acc << bits) | self.alphabet.code(s) as u64)
    }

    /// Inverse of [`encode_kmer`](Self::encode_kmer) for a `k`-symbol value.
    ///
    /// Symbols that were unknown when encoded come back as the wildcard symbol.
    pub fn decode_kmer(&self, value: u64, k: usize) -> Vec<u8> {
        let bits = self.bits_per_symbol();
        let mask = self.alphabet.code_mask();
        (0..k)
            .map(|i| {
                let shift = (k - 1 - i) as u32 * bits;
                self.alphabet.symbol(((value >> shift) & mask) as u8)
            })
            .collect()
    }

    /// Pack a whole sequence into non-overlapping `k`-symbol chunks.
    pub fn encode_sequence(&self, symbols: &[u8]) -> EncodedSequence {
        let k = self.sub_sequence_length;
        let bits = self.bits_per_symbol();
        let mut words = Vec::with_capacity(1 + (symbols.len() + k - 1) / k);
        words.push(symbols.len() as u64);
        for chunk in symbols.chunks(k) {
            let value = self.encode_kmer(chunk);
            // left-align a short trailing chunk
            let pad = (k - chunk.len()) as u32 * bits;
            words.push(value << pad);
        }
        EncodedSequence {
            words,
            symbols_per_word: k as u32,
            bits_per_symbol: bits,
        }
    }

    /// Pack every complete, non-overlapping `pattern_length` window of
    /// `symbols` through `mask`. Incomplete trailing windows are dropped.
    pub fn encode_masked_sequence(&self, symbols: &[u8], mask: &Mask) -> EncodedSequence {
        let span = mask.pattern_length();
        let windows = symbols.len() / span;
        let mut words = Vec::with_capacity(1 + windows);
        words.push((windows * self.sub_sequence_length) as u64);
        for window in symbols.chunks_exact(span) {
            words.push(self.apply_mask(window, mask) as u64);
        }
        EncodedSequence {
            words,
            symbols_per_word: self.sub_sequence_length as u32,
            bits_per_symbol: self.bits_per_symbol(),
        }
    }

    /// Compact the active positions of `window`, MSB-first.
    ///
    /// The result is `weight * bits_per_symbol` bits wide and equals
    /// `encode_kmer` of the compacted sub-sequence.
    #[inline]
    pub fn apply_mask(&self, window: &[u8], mask: &Mask) -> u32 {
        debug_assert!(window.len() >= mask.pattern_length());
        let bits = self.bits_per_symbol();
        mask.active_positions()
            .iter()
            .fold(0u32, |acc, &p| (acc << bits) | self.alphabet.code(window[p]) as u32)
    }

    /// Code at `pos` of `encoded`, see [`EncodedSequence::value_at`].
    #[inline(always)]
    pub fn value_at_word_position(&self, encoded: &EncodedSequence, pos: usize) -> u8 {
        encoded.value_at(pos)
    }

    /// Decode symbols `[begin, end)` of `encoded` straight from the words.
    pub fn decode_range(&self, encoded: &EncodedSequence, begin: usize, end: usize) -> Vec<u8> {
        let end = end.min(encoded.len());
        (begin.min(end)..end)
            .map(|pos| self.alphabet.symbol(encoded.value_at(pos)))
            .collect()
    }

    pub fn decode_sequence(&self, encoded: &EncodedSequence) -> Vec<u8> {
        self.decode_range(encoded, 0, encoded.len())
    }
}

//! Encoder registry
//!
//! Encoders are created once per `(alphabet, k)` and shared by reference.
//! The registry is an ordinary value owned by the caller that builds
//! databanks; there is no process-wide cache.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::alphabet::Alphabet;
use super::encoding::SymbolEncoder;
use crate::error::ConfigError;

#[derive(Debug, Default)]
pub struct EncoderRegistry {
    encoders: FxHashMap<(String, usize), Arc<SymbolEncoder>>,
    alphabets: FxHashMap<String, Arc<Alphabet>>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared encoder for `alphabet` and `sub_sequence_length`, created on first use.
    pub fn encoder(
        &mut self,
        alphabet: &Alphabet,
        sub_sequence_length: usize,
    ) -> Result<Arc<SymbolEncoder>, ConfigError> {
        let key = (alphabet.name().to_string(), sub_sequence_length);
        if let Some(encoder) = self.encoders.get(&key) {
            if encoder.alphabet().as_ref() == alphabet {
                return Ok(Arc::clone(encoder));
            }
        }
        let shared = self
            .alphabets
            .entry(alphabet.name().to_string())
            .or_insert_with(|| Arc::new(alphabet.clone()));
        if shared.as_ref() != alphabet {
            *shared = Arc::new(alphabet.clone());
        }
        let encoder = Arc::new(SymbolEncoder::new(Arc::clone(shared), sub_sequence_length)?);
        self.encoders.insert(key, Arc::clone(&encoder));
        Ok(encoder)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

//! Six-frame translation of nucleotide queries
//!
//! Frames +1..+3 read the forward strand from offsets 0..2; frames -1..-3
//! read the reverse complement from offsets 0..2. Codons with ambiguous
//! bases translate to `X`, stop codons to `*`.

use bio::alphabets::dna;

/// Standard genetic code in TCAG order: index = 16*b1 + 4*b2 + b3.
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

#[inline]
fn tcag_index(base: u8) -> Option<usize> {
    match base {
        b'T' | b't' | b'U' | b'u' => Some(0),
        b'C' | b'c' => Some(1),
        b'A' | b'a' => Some(2),
        b'G' | b'g' => Some(3),
        _ => None,
    }
}

/// Translate one codon.
#[inline]
pub fn translate_codon(codon: &[u8]) -> u8 {
    match (tcag_index(codon[0]), tcag_index(codon[1]), tcag_index(codon[2])) {
        (Some(a), Some(b), Some(c)) => STANDARD_CODE[16 * a + 4 * b + c],
        _ => b'X',
    }
}

/// Translate `seq` codon by codon; a trailing partial codon is ignored.
pub fn translate(seq: &[u8]) -> Vec<u8> {
    seq.chunks_exact(3).map(translate_codon).collect()
}

/// Translation of `seq` in `frame` (one of ±1, ±2, ±3).
pub fn translate_frame(seq: &[u8], frame: i8) -> Vec<u8> {
    debug_assert!(frame != 0 && frame.abs() <= 3);
    let offset = (frame.unsigned_abs() - 1) as usize;
    if frame > 0 {
        seq.get(offset..).map(translate).unwrap_or_default()
    } else {
        let rc = dna::revcomp(seq);
        rc.get(offset..).map(translate).unwrap_or_default()
    }
}

/// Map a half-open residue range of `frame` back to 1-based nucleotide
/// coordinates on the forward query. Reverse frames yield `from > to`.
pub fn frame_to_nucleotide(frame: i8, begin: usize, end: usize, query_len: usize) -> (usize, usize) {
    let offset = (frame.unsigned_abs() - 1) as usize;
    let nt_begin = offset + 3 * begin;
    let nt_end = offset + 3 * end; // exclusive
    if frame > 0 {
        (nt_begin + 1, nt_end)
    } else {
        (query_len - nt_begin, query_len - nt_end + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codons_follow_the_standard_code() {
        assert_eq!(translate(b"ATGTTTTAA"), b"MF*".to_vec());
        assert_eq!(translate_codon(b"ANG"), b'X');
    }

    #[test]
    fn reverse_frames_read_the_reverse_complement() {
        // revcomp(TTACAT) = ATGTAA
        assert_eq!(translate_frame(b"TTACAT", -1), b"M*".to_vec());
        assert_eq!(translate_frame(b"GATGTTT", 2), b"MF".to_vec());
        assert!(translate_frame(b"AT", 3).is_empty());
    }

    #[test]
    fn frame_coordinates_map_back_to_nucleotides() {
        // frame +2, residues [0, 2) cover nucleotides 2..=7
        assert_eq!(frame_to_nucleotide(2, 0, 2, 10), (2, 7));
        // frame -1 on a 9-mer, residues [0, 3) cover the whole strand backwards
        assert_eq!(frame_to_nucleotide(-1, 0, 3, 9), (9, 1));
    }
}

//! Packing, random access and the trailing-chunk policy

use kblast::config::IndexParams;

use crate::helpers::{build_databank, dna_encoder, random_dna};

#[test]
fn kmers_round_trip() {
    let encoder = dna_encoder(11);
    for seed in 0..50 {
        let kmer = random_dna(11, seed);
        let value = encoder.encode_kmer(&kmer);
        assert_eq!(encoder.decode_kmer(value, 11), kmer);
    }
}

#[test]
fn random_access_reaches_every_symbol() {
    let encoder = dna_encoder(8);
    let seq = random_dna(61, 3);
    let encoded = encoder.encode_sequence(&seq);
    assert_eq!(encoded.len(), 61);
    for (pos, &symbol) in seq.iter().enumerate() {
        let code = encoder.value_at_word_position(&encoded, pos);
        assert_eq!(encoder.alphabet().symbol(code), symbol, "position {}", pos);
    }
}

#[test]
fn windows_decode_across_word_boundaries() {
    let encoder = dna_encoder(11);
    let seq = random_dna(100, 5);
    let encoded = encoder.encode_sequence(&seq);
    for (begin, end) in [(0, 11), (5, 17), (10, 12), (21, 100), (90, 100), (33, 33)] {
        assert_eq!(encoder.decode_range(&encoded, begin, end), &seq[begin..end]);
    }
}

#[test]
fn trailing_chunk_is_stored_but_not_indexed() {
    // 20 symbols at k = 8: two complete chunks plus a 4-symbol tail
    let seq = b"ACGTACGTCCCCGGGGTTTA";
    let databank = build_databank(
        "tail",
        &IndexParams {
            sub_sequence_length: 8,
            ..IndexParams::default()
        },
        &[("s", seq.as_slice())],
    );
    let stored = databank.store().get_encoded_sequence(0).unwrap();
    assert_eq!(databank.encoder().decode_sequence(&stored.encoded), seq.to_vec());
    assert_eq!(databank.index().total_postings(), 2);

    let tail = databank.encoder().encode_kmer(b"TTTAAAAA") as u32;
    assert!(databank.index().lookup(tail).is_empty());
}

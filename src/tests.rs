use voxell_rng::rng::XorShift128;

use crate::compressor::Compressor;

/// Symbol counts a=8 b=15 c=11 d=12 e=4 f=9.
pub const SCENARIO_DATA: &[u8] = b"aabbccddbbeaebdddfffdbffddabbbbbcdefaabbcccccaabbddfffdcecc";
/// Reference encoding of [`SCENARIO_DATA`], 150 bits.
pub const SCENARIO_BITS: &str = "001001101011111101011010000001000100101011101101100110110110010100110101010101110100011000100110101111111111111110010011010010111011011001111000111111";

const SHORT_DATA: &[u8] = b"Hello, World!";
const LONG_DATA: &[u8] =
    b"This is a longer string to test the huffman coding engine. It should be able to handle various lengths and characters.";
const BINARY_DATA: &[u8] = &[
    0x7f, 0x45, 0x4c, 0x46, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x3e,
    0x00, 0x01, 0x00, 0x00, 0x00, 0x10, 0x6b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xfe, 0xff, 0x00, 0x0a, 0x0d,
];
const REPEATING_DATA: &[u8] = b"a baba da babble da dabble babble doo bee babble dabble dooble dee boo dooble daddle boo";
const SINGLE_SYMBOL_DATA: &[u8] = b"zzzzzzzzzzzzzzzz";
const EMPTY_DATA: &[u8] = &[];

pub const TEST_CASES: &[(&[u8], &str)] = &[
    (REPEATING_DATA, "repeating data"),
    (SHORT_DATA, "short data"),
    (LONG_DATA, "long data"),
    (BINARY_DATA, "binary data"),
    (SINGLE_SYMBOL_DATA, "single symbol data"),
    (SCENARIO_DATA, "scenario data"),
    (EMPTY_DATA, "empty data"),
];

/// `len` pseudo random bytes from a fixed seed.
pub fn rng_data(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut rng = XorShift128::new(0xdeadcafe);
    for _ in 0..len {
        let data = rng.peek_next_u64();
        out.push((data & 0xFF) as u8);
        rng = XorShift128::new(data);
    }
    out
}

pub fn roundtrip_test<C: Compressor>(compressor: C) {
    let rng = rng_data(1000);
    let mut cases: Vec<(&[u8], &str)> = TEST_CASES.to_vec();
    cases.push((&rng, "rng data"));

    for (test_case, test_name) in cases {
        match compressor.test_roundtrip(test_case) {
            Ok(eq) => {
                let ratio = eq.ratio();

                eprintln!(
                    "Compression ratio for {} with {}: {:.2}%",
                    test_name,
                    compressor.compressor_name(),
                    ratio * 100.0
                );

                assert!(
                    eq.is_successful(),
                    "Roundtrip test for {} failed at {}:\n\tExpected: {:?}\n\tGot: {:?}\n\tCompressed: {:?}",
                    compressor.compressor_name(),
                    test_name,
                    eq.get_original(),
                    eq.get_decompressed(),
                    eq.get_compressed(),
                );
            }
            Err(e) => {
                panic!(
                    "Fatal error while trying to compress/decompress {} with {}: {}",
                    test_name,
                    compressor.compressor_name(),
                    e
                );
            }
        }
    }
}

pub use anyhow::Result;
use thiserror::Error;

/// Represents an error emitted by the coding engine.
///
/// Every variant is fatal to the call that produced it: no partial tree, bit sequence
/// or decoded buffer is ever returned alongside an error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HuffmanError {
    /// A tree was requested for a frequency table without a single non-zero count.
    #[error("cannot build a huffman tree from an empty alphabet")]
    EmptyAlphabet,

    /// The input contains a byte that the code table was not built for.
    #[error("symbol {symbol:#04x} at offset {offset} has no code in the code table")]
    UnknownSymbol { symbol: u8, offset: usize },

    /// The bit sequence ended while the decoder was in the middle of a code.
    #[error("bit sequence of {bit_len} bits ends {pending} bits into an incomplete code")]
    TruncatedCode { bit_len: usize, pending: usize },

    /// The bit at `offset` leads nowhere in the tree.
    ///
    /// Only reachable for single-symbol trees, whose sole code is `0`.
    #[error("bit {offset} does not continue any code in the tree")]
    InvalidCode { offset: usize },

    /// Adding a count for `symbol` would overflow the frequency table.
    #[error("frequency of symbol {symbol:#04x} overflows u64")]
    FrequencyOverflow { symbol: u8 },

    /// The encoded form would hold more bits than this platform can address.
    #[error("encoded output of {bits} bits is too large")]
    OutputTooLarge { bits: u128 },

    /// A buffer could not be reserved.
    #[error("failed to allocate {bytes} bytes")]
    AllocationFailure { bytes: usize },

    /// A textual bit sequence contained something other than `0` or `1`.
    #[error("invalid bit character {character:?} at offset {offset}")]
    InvalidBitCharacter { character: char, offset: usize },

    /// A serialized or described tree could not be turned back into a valid tree.
    #[error("malformed huffman tree: {0}")]
    MalformedTree(String),

    /// A compressed frame was truncated, padded, or otherwise inconsistent.
    #[error("malformed huffman container: {0}")]
    MalformedContainer(String),
}

/// Represents shared behavior for all compressors.
///
/// Provides a method [`compress_bytes`](Compressor::compress_bytes) to compress data and
/// [`decompress_bytes`](Compressor::decompress_bytes) to decompress data.
///
/// # Note
///
/// No guarantees are made about the length of the resulting [`Vec<u8>`] from
/// [`compress_bytes`](Compressor::compress_bytes). It can be shorter, equal in length, or longer.
/// The only guarantee is that [`decompress_bytes`](Compressor::decompress_bytes) will be able to
/// reconstruct the original data.
pub trait Compressor {
    /// Compresses a given byte slice and returns the encoded data.
    ///
    /// # Errors
    ///
    /// Returns an error if a working buffer could not be allocated.
    fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompresses a given byte slice and returns the decoded data.
    ///
    /// # Errors
    ///
    /// Returns an error if the input data was malformed. Errors coming from the engine
    /// can be recovered with `downcast_ref::<HuffmanError>()`.
    fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Human readable name, used in reports.
    fn compressor_name(&self) -> String {
        core::any::type_name::<Self>().to_string()
    }

    /// Performs a round-trip test on the compressor.
    ///
    /// Use for sanity checking the compressor and decompressor.
    fn test_roundtrip<'orig>(&self, data: &'orig [u8]) -> Result<RoundTripTestResult<'orig>> {
        let compressed = self.compress_bytes(data)?;
        let decompressed = self.decompress_bytes(&compressed)?;
        let equal = data == decompressed.as_slice();

        Ok(RoundTripTestResult {
            equal,
            original: data,
            compressed,
            decompressed,
        })
    }
}

/// Represents the result of a round-trip test.
///
/// Use accessor methods to retrieve the [`result`][RoundTripTestResult::is_successful],
/// the [`original data`][RoundTripTestResult::get_original],
/// the [`compressed data`][RoundTripTestResult::get_compressed],
/// and the [`decompressed data`][RoundTripTestResult::get_decompressed].
#[derive(Clone, Debug, Hash)]
pub struct RoundTripTestResult<'orig> {
    pub(crate) equal: bool,
    pub(crate) original: &'orig [u8],
    pub(crate) compressed: Vec<u8>,
    pub(crate) decompressed: Vec<u8>,
}

impl<'orig> RoundTripTestResult<'orig> {
    /// Whether the original and decompressed data were equal.
    pub const fn is_successful(&self) -> bool {
        self.equal
    }

    /// The original data before any action was taken.
    pub const fn get_original(&self) -> &'orig [u8] {
        self.original
    }

    /// The data after it has been encoded by the compressor.
    pub fn get_compressed(&self) -> &[u8] {
        self.compressed.as_slice()
    }

    /// The data after it has been decoded by the decompressor.
    pub fn get_decompressed(&self) -> &[u8] {
        self.decompressed.as_slice()
    }

    /// Compressed size over original size. Zero for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original.is_empty() {
            return 0.0;
        }
        self.compressed.len() as f64 / self.original.len() as f64
    }
}

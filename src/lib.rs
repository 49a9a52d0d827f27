//! # huffpack
//!
//! Deterministic Huffman coding over the byte alphabet.
//!
//! The engine is split into the stages it runs in:
//!
//! [`FrequencyTable`] → [`HuffmanTree`] → [`CodeTable`] → {[`encode`], [`decode`]}
//!
//! [`Codebook`] bundles a tree with its code table so both halves of a coding session
//! share the same instance, and [`HuffmanCoding`] wraps everything into a small
//! self-describing container that implements [`Compressor`].
//!
//! ```rust
//! use huffpack::Codebook;
//!
//! let data = b"abracadabra";
//! let codebook = Codebook::from_data(data)?;
//! let bits = codebook.encode(data)?;
//! assert_eq!(bits.len(), 23);
//! assert_eq!(codebook.decode(&bits)?, data);
//! # Ok::<(), huffpack::HuffmanError>(())
//! ```

/// Expands to its body only when the `tracing` feature is enabled.
#[macro_export]
macro_rules! if_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                $($body)*
            }
        }
    };
}

/// Expands to its body only when the `tracing` feature is disabled.
#[macro_export]
macro_rules! if_not_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(not(feature = "tracing"))] {
                $($body)*
            }
        }
    };
}

pub mod algorithms;
pub mod compressor;

#[cfg(test)]
mod tests;

pub use algorithms::bits::BitSequence;
pub use algorithms::code_table::{Code, CodeTable};
pub use algorithms::codebook::Codebook;
pub use algorithms::decoder::decode;
pub use algorithms::encoder::encode;
pub use algorithms::frequency::FrequencyTable;
pub use algorithms::huffman::HuffmanCoding;
pub use algorithms::tree::{HuffmanTree, LeafDescription, Node};
pub use algorithms::tree_format::{read_tree, write_tree};
pub use compressor::{Compressor, HuffmanError, RoundTripTestResult};

//! The stages of the Huffman coding engine, leaves first.

pub mod bits;
pub mod code_table;
pub mod codebook;
pub mod decoder;
pub mod encoder;
pub mod frequency;
pub mod huffman;
pub mod tree;
pub mod tree_format;

use core::fmt;

use crate::algorithms::bits::BitSequence;
use crate::algorithms::code_table::CodeTable;
use crate::algorithms::frequency::FrequencyTable;
use crate::algorithms::tree::{HuffmanTree, LeafDescription};
use crate::algorithms::{decoder, encoder};
use crate::compressor::HuffmanError;

/// A tree together with the code table generated from it.
///
/// Encoding and decoding through the same codebook always agree. The codebook is
/// immutable, so it can be shared between threads once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Codebook {
    tree: HuffmanTree,
    table: CodeTable,
}

impl Codebook {
    /// Counts `data` and builds the codebook for it.
    ///
    /// # Errors
    ///
    /// [`HuffmanError::EmptyAlphabet`] if `data` is empty.
    pub fn from_data(data: &[u8]) -> Result<Self, HuffmanError> {
        Self::from_frequencies(&FrequencyTable::count(data))
    }

    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self, HuffmanError> {
        HuffmanTree::build(frequencies).map(Self::from_tree)
    }

    pub fn from_tree(tree: HuffmanTree) -> Self {
        let table = CodeTable::generate(&tree);
        Self { tree, table }
    }

    /// Rebuilds a codebook from [`describe`](Codebook::describe) output.
    pub fn from_descriptions(leaves: &[LeafDescription]) -> Result<Self, HuffmanError> {
        HuffmanTree::from_descriptions(leaves).map(Self::from_tree)
    }

    pub fn encode(&self, data: &[u8]) -> Result<BitSequence, HuffmanError> {
        encoder::encode(data, &self.table)
    }

    pub fn decode(&self, bits: &BitSequence) -> Result<Vec<u8>, HuffmanError> {
        decoder::decode(bits, &self.tree)
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    pub fn describe(&self) -> Vec<LeafDescription> {
        self.tree.describe()
    }

    pub fn into_tree(self) -> HuffmanTree {
        self.tree
    }
}

impl fmt::Debug for Codebook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codebook")
            .field("tree", &format_args!("{}", self.tree))
            .field("table", &self.table)
            .finish()
    }
}

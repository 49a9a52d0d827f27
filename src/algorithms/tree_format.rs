//! Compact binary form of a [`HuffmanTree`].
//!
//! Nodes are written in pre-order. An internal node is the single byte `0x00` followed
//! by its left and right subtrees; a leaf is `0x01`, the symbol byte, and the leaf
//! frequency as an unsigned LEB128 varint. Internal frequencies are not stored, they
//! are recomputed while reading. The encoding reproduces the exact tree shape, which
//! is what the decoder needs.

use std::io::{self, Read};

use crate::algorithms::tree::{HuffmanTree, Node};
use crate::compressor::HuffmanError;

if_tracing! {
    use tracing::{debug, warn};
}

const INTERNAL_TAG: u8 = 0x00;
const LEAF_TAG: u8 = 0x01;
/// A tree over 256 symbols is at most 255 levels deep.
const MAX_DEPTH: usize = 255;
/// `ceil(64 / 7)`
const MAX_VARINT_LEN: usize = 10;

/// Appends the binary form of `tree` to `buf`.
pub fn write_tree(tree: &HuffmanTree, buf: &mut Vec<u8>) {
    write_node(tree.root(), buf);

    if_tracing! {
        debug!(target: "tree_format", leaves = tree.leaf_count(), buf_len = buf.len(), "tree serialized");
    }
}

fn write_node(node: &Node, buf: &mut Vec<u8>) {
    match node {
        Node::Leaf { symbol, frequency } => {
            buf.push(LEAF_TAG);
            buf.push(*symbol);
            write_varint(*frequency, buf);
        }
        Node::Internal { left, right, .. } => {
            buf.push(INTERNAL_TAG);
            write_node(left, buf);
            write_node(right, buf);
        }
    }
}

fn write_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Reads a tree written by [`write_tree`]. `data` must hold the tree and nothing else.
///
/// # Errors
///
/// [`HuffmanError::MalformedTree`] for unknown tags, truncated input, trailing bytes,
/// repeated symbols, zero leaf frequencies, overlong varints, frequency overflow, or a
/// tree deeper than 255 levels.
pub fn read_tree(data: &[u8]) -> Result<HuffmanTree, HuffmanError> {
    let mut reader = data;
    let mut seen = [false; 256];
    let root = match reader.read_tree_node(&mut seen, 0) {
        Ok(root) => root,
        Err(err) => {
            if_tracing! {
                warn!(target: "tree_format", input_len = data.len(), error = %err, "tree deserialization failed");
            }
            return Err(err);
        }
    };

    if !reader.is_empty() {
        return Err(HuffmanError::MalformedTree(format!(
            "{} trailing bytes after the tree",
            reader.len()
        )));
    }

    let tree = HuffmanTree::from_root(root);
    if_tracing! {
        debug!(target: "tree_format", input_len = data.len(), leaves = tree.leaf_count(), "tree deserialized");
    }
    Ok(tree)
}

trait ReadTreeNode {
    fn read_tree_node(&mut self, seen: &mut [bool; 256], depth: usize) -> Result<Node, HuffmanError>;
    fn read_u8(&mut self) -> Result<u8, HuffmanError>;
    fn read_varint(&mut self) -> Result<u64, HuffmanError>;
}

impl<T: Read> ReadTreeNode for T {
    fn read_tree_node(&mut self, seen: &mut [bool; 256], depth: usize) -> Result<Node, HuffmanError> {
        if depth > MAX_DEPTH {
            return Err(HuffmanError::MalformedTree(format!("tree is deeper than {} levels", MAX_DEPTH)));
        }

        match self.read_u8()? {
            INTERNAL_TAG => {
                let left = self.read_tree_node(seen, depth + 1)?;
                let right = self.read_tree_node(seen, depth + 1)?;
                Node::merge(left, right)
            }
            LEAF_TAG => {
                let symbol = self.read_u8()?;
                if seen[symbol as usize] {
                    return Err(HuffmanError::MalformedTree(format!("symbol {:#04x} appears twice", symbol)));
                }
                seen[symbol as usize] = true;

                let frequency = self.read_varint()?;
                if frequency == 0 {
                    return Err(HuffmanError::MalformedTree(format!("symbol {:#04x} has zero frequency", symbol)));
                }
                Ok(Node::Leaf { symbol, frequency })
            }
            tag => Err(HuffmanError::MalformedTree(format!("unknown node tag {:#04x}", tag))),
        }
    }

    fn read_u8(&mut self) -> Result<u8, HuffmanError> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => HuffmanError::MalformedTree("tree data ends early".to_string()),
            _ => HuffmanError::MalformedTree(e.to_string()),
        })?;
        Ok(byte[0])
    }

    fn read_varint(&mut self) -> Result<u64, HuffmanError> {
        let mut value: u64 = 0;
        for index in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            let payload = u64::from(byte & 0x7f);
            let shift = 7 * index as u32;
            if shift == 63 && payload > 1 {
                return Err(HuffmanError::MalformedTree("frequency does not fit in 64 bits".to_string()));
            }
            value |= payload << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(HuffmanError::MalformedTree("frequency varint is too long".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::frequency::FrequencyTable;
    use crate::tests::{SCENARIO_DATA, TEST_CASES, rng_data};

    fn bytes_of(tree: &HuffmanTree) -> Vec<u8> {
        let mut buf = Vec::new();
        write_tree(tree, &mut buf);
        buf
    }

    fn tree_of(data: &[u8]) -> HuffmanTree {
        HuffmanTree::build(&FrequencyTable::count(data)).unwrap()
    }

    #[test]
    fn reading_restores_the_same_tree() {
        for &(data, name) in TEST_CASES {
            if data.is_empty() {
                continue;
            }
            let tree = tree_of(data);
            assert_eq!(read_tree(&bytes_of(&tree)).unwrap(), tree, "tree of {}", name);
        }
        let tree = tree_of(&rng_data(10_000));
        assert_eq!(read_tree(&bytes_of(&tree)).unwrap(), tree);
    }

    #[test]
    fn single_leaf_layout() {
        let tree = tree_of(&[b'k'; 300]);
        // 300 = 0b10_0101100
        assert_eq!(bytes_of(&tree), vec![LEAF_TAG, b'k', 0xac, 0x02]);
    }

    #[test]
    fn scenario_layout() {
        let bytes = bytes_of(&tree_of(SCENARIO_DATA));
        #[rustfmt::skip]
        let expected = vec![
            INTERNAL_TAG,
                INTERNAL_TAG,
                    INTERNAL_TAG,
                        LEAF_TAG, b'e', 4,
                        LEAF_TAG, b'a', 8,
                    LEAF_TAG, b'd', 12,
                INTERNAL_TAG,
                    LEAF_TAG, b'b', 15,
                    INTERNAL_TAG,
                        LEAF_TAG, b'f', 9,
                        LEAF_TAG, b'c', 11,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn large_frequencies_survive() {
        let tree = HuffmanTree::build(&FrequencyTable::from_counts([(1, u64::MAX / 2), (2, 1)]).unwrap()).unwrap();
        assert_eq!(read_tree(&bytes_of(&tree)).unwrap(), tree);
    }

    #[test]
    fn malformed_input_is_rejected() {
        fn malformed(data: &[u8]) -> bool {
            matches!(read_tree(data), Err(HuffmanError::MalformedTree(_)))
        }

        assert!(malformed(&[]));
        assert!(malformed(&[INTERNAL_TAG, LEAF_TAG, b'a', 1]));
        assert!(malformed(&[0x07]));
        assert!(malformed(&[LEAF_TAG, b'a', 1, 0x00]));
        assert!(malformed(&[LEAF_TAG, b'a', 0]));
        assert!(malformed(&[INTERNAL_TAG, LEAF_TAG, b'a', 1, LEAF_TAG, b'a', 2]));
        assert!(malformed(&[LEAF_TAG, b'a', 0x80, 0x80]));
        assert!(malformed(&[LEAF_TAG, b'a', 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]));
        assert!(malformed(&[INTERNAL_TAG; 300]));
    }
}

use core::cmp::{Ordering, Reverse};
use core::fmt;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::algorithms::code_table::Code;
use crate::algorithms::frequency::FrequencyTable;
use crate::compressor::HuffmanError;

if_tracing! {
    use tracing::{debug, warn};
}

/// A node of a Huffman tree.
///
/// Internal nodes always own exactly two children, and their frequency is the sum of
/// the children's frequencies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: u8, frequency: u64 },
    Internal { frequency: u64, left: Box<Node>, right: Box<Node> },
}

impl Node {
    pub const fn frequency(&self) -> u64 {
        match self {
            Node::Leaf { frequency, .. } | Node::Internal { frequency, .. } => *frequency,
        }
    }

    pub const fn symbol(&self) -> Option<u8> {
        match self {
            Node::Leaf { symbol, .. } => Some(*symbol),
            Node::Internal { .. } => None,
        }
    }

    pub const fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Joins two subtrees under a new internal node, `left` taking bit 0.
    pub(crate) fn merge(left: Node, right: Node) -> Result<Node, HuffmanError> {
        let frequency = left
            .frequency()
            .checked_add(right.frequency())
            .ok_or_else(|| HuffmanError::MalformedTree("total frequency overflows u64".to_string()))?;
        Ok(Node::Internal {
            frequency,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

/// An entry of the builder's working set.
///
/// Entries are totally ordered by frequency, then by the lowest symbol found in the
/// subtree, then by insertion sequence. Leaves are inserted in ascending symbol order
/// and every merged node takes the next sequence number.
struct Pending {
    frequency: u64,
    lowest_symbol: u8,
    sequence: usize,
    node: Node,
}

impl Pending {
    const fn key(&self) -> (u64, u8, usize) {
        (self.frequency, self.lowest_symbol, self.sequence)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// One leaf of a tree as seen from the outside: which symbol, how often, which code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeafDescription {
    pub symbol: u8,
    pub frequency: u64,
    /// The code in `'0'`/`'1'` form.
    pub code: String,
}

/// A Huffman prefix tree over the byte alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Builds the optimal prefix tree for `frequencies`.
    ///
    /// The shape is fully determined by the frequencies. Ties are broken by the lowest
    /// symbol in each subtree, then by insertion order.
    ///
    /// # Errors
    ///
    /// [`HuffmanError::EmptyAlphabet`] if no symbol has a non-zero count.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self, HuffmanError> {
        let mut heap: BinaryHeap<Reverse<Pending>> = frequencies
            .iter()
            .enumerate()
            .map(|(sequence, (symbol, frequency))| {
                Reverse(Pending {
                    frequency,
                    lowest_symbol: symbol,
                    sequence,
                    node: Node::Leaf { symbol, frequency },
                })
            })
            .collect();
        let mut sequence = heap.len();

        loop {
            let Some(Reverse(first)) = heap.pop() else {
                if_tracing! {
                    warn!(target: "tree", "tree build requested for an empty alphabet");
                }
                return Err(HuffmanError::EmptyAlphabet);
            };
            let Some(Reverse(second)) = heap.pop() else {
                let tree = Self { root: first.node };
                if_tracing! {
                    debug!(target: "tree", alphabet_len = frequencies.alphabet_len(), depth = tree.depth(), total = tree.frequency(), "tree built");
                }
                return Ok(tree);
            };

            let lowest_symbol = first.lowest_symbol.min(second.lowest_symbol);
            let node = Node::merge(first.node, second.node)?;
            heap.push(Reverse(Pending {
                frequency: node.frequency(),
                lowest_symbol,
                sequence,
                node,
            }));
            sequence += 1;
        }
    }

    pub(crate) const fn from_root(root: Node) -> Self {
        Self { root }
    }

    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Root frequency, which equals the length of the input the tree was built from.
    pub const fn frequency(&self) -> u64 {
        self.root.frequency()
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.for_each_leaf(|_, _, _| count += 1);
        count
    }

    /// Length of the longest code.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        self.for_each_leaf(|_, _, code| depth = depth.max(code.len()));
        depth
    }

    /// Length of the shortest code. At least one.
    pub fn shortest_code_len(&self) -> usize {
        let mut shortest = usize::MAX;
        self.for_each_leaf(|_, _, code| shortest = shortest.min(code.len()));
        shortest
    }

    /// Symbol, frequency and code of every leaf, left to right.
    pub fn describe(&self) -> Vec<LeafDescription> {
        let mut leaves = Vec::new();
        self.for_each_leaf(|symbol, frequency, code| {
            leaves.push(LeafDescription {
                symbol,
                frequency,
                code: code.to_string(),
            });
        });
        leaves
    }

    /// Visits every leaf left to right together with its code.
    ///
    /// A tree whose root is a leaf assigns that leaf the one-bit code `0`.
    pub(crate) fn for_each_leaf<F>(&self, mut visit: F)
    where
        F: FnMut(u8, u64, &Code),
    {
        fn walk<F: FnMut(u8, u64, &Code)>(node: &Node, path: Code, visit: &mut F) {
            match node {
                Node::Leaf { symbol, frequency } => visit(*symbol, *frequency, &path),
                Node::Internal { left, right, .. } => {
                    walk(left, path.appended(false), visit);
                    walk(right, path.appended(true), visit);
                }
            }
        }

        match &self.root {
            Node::Leaf { symbol, frequency } => visit(*symbol, *frequency, &Code::new().appended(false)),
            root => walk(root, Code::new(), &mut visit),
        }
    }

    /// Rebuilds the exact tree shape from the output of [`describe`](HuffmanTree::describe).
    ///
    /// The order of `leaves` does not matter. Internal frequencies are recomputed from
    /// the leaves.
    ///
    /// # Errors
    ///
    /// [`HuffmanError::EmptyAlphabet`] for no leaves, [`HuffmanError::InvalidBitCharacter`]
    /// for codes that are not `'0'`/`'1'` strings, and [`HuffmanError::MalformedTree`] for
    /// duplicate symbols, zero frequencies, or code sets that are not prefix-free and complete.
    pub fn from_descriptions(leaves: &[LeafDescription]) -> Result<Self, HuffmanError> {
        if leaves.is_empty() {
            return Err(HuffmanError::EmptyAlphabet);
        }

        let mut seen = [false; 256];
        let mut entries = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            if seen[leaf.symbol as usize] {
                return Err(HuffmanError::MalformedTree(format!("symbol {:#04x} appears twice", leaf.symbol)));
            }
            seen[leaf.symbol as usize] = true;
            if leaf.frequency == 0 {
                return Err(HuffmanError::MalformedTree(format!("symbol {:#04x} has zero frequency", leaf.symbol)));
            }
            let code: Code = leaf.code.parse()?;
            if code.is_empty() {
                return Err(HuffmanError::MalformedTree(format!("symbol {:#04x} has an empty code", leaf.symbol)));
            }
            entries.push((code, leaf));
        }

        if let [(code, leaf)] = entries.as_slice() {
            if code.to_string() != "0" {
                return Err(HuffmanError::MalformedTree(format!(
                    "the only symbol must have code 0, found {}",
                    code
                )));
            }
            return Ok(Self::from_root(Node::Leaf {
                symbol: leaf.symbol,
                frequency: leaf.frequency,
            }));
        }

        let entries: Vec<&(Code, &LeafDescription)> = entries.iter().collect();
        Ok(Self::from_root(assemble(&entries, 0)?))
    }
}

/// Builds the subtree holding every entry whose code continues below `depth`.
///
/// Each level splits a non-empty set of at most 256 entries in two non-empty halves,
/// so recursion is bounded by the alphabet size.
fn assemble(entries: &[&(Code, &LeafDescription)], depth: usize) -> Result<Node, HuffmanError> {
    if entries.is_empty() {
        return Err(HuffmanError::MalformedTree("code set is incomplete".to_string()));
    }
    if let [(code, leaf)] = entries {
        if code.len() == depth {
            return Ok(Node::Leaf {
                symbol: leaf.symbol,
                frequency: leaf.frequency,
            });
        }
    }
    if let Some((code, _)) = entries.iter().find(|(code, _)| code.len() <= depth) {
        return Err(HuffmanError::MalformedTree(format!("code {} is a prefix of another code", code)));
    }

    let (left, right): (Vec<&(Code, &LeafDescription)>, Vec<&(Code, &LeafDescription)>) =
        entries.iter().copied().partition(|(code, _)| !code.bit(depth));
    let left = assemble(&left, depth + 1)?;
    let right = assemble(&right, depth + 1)?;
    Node::merge(left, right)
}

impl fmt::Display for HuffmanTree {
    /// Nested rendering: leaves as `symbol:frequency(code)`, internal nodes as
    /// `:frequency(code) {left, right}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn render(f: &mut fmt::Formatter<'_>, node: &Node, path: Code) -> fmt::Result {
            match node {
                Node::Leaf { symbol, frequency } => {
                    write_symbol(f, *symbol)?;
                    write!(f, ":{}({})", frequency, path)
                }
                Node::Internal { frequency, left, right } => {
                    write!(f, ":{}({}) {{", frequency, path)?;
                    render(f, left, path.appended(false))?;
                    f.write_str(", ")?;
                    render(f, right, path.appended(true))?;
                    f.write_str("}")
                }
            }
        }

        match &self.root {
            Node::Leaf { symbol, frequency } => {
                write_symbol(f, *symbol)?;
                write!(f, ":{}(0)", frequency)
            }
            root => render(f, root, Code::new()),
        }
    }
}

/// Printable ascii as itself, anything else as hex.
pub(crate) fn write_symbol(f: &mut impl fmt::Write, symbol: u8) -> fmt::Result {
    if symbol.is_ascii_graphic() {
        write!(f, "{}", symbol as char)
    } else {
        write!(f, "{:#04x}", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{SCENARIO_DATA, TEST_CASES};

    fn tree_of(data: &[u8]) -> HuffmanTree {
        HuffmanTree::build(&FrequencyTable::count(data)).unwrap()
    }

    fn leaf_sum(node: &Node) -> u64 {
        match node {
            Node::Leaf { frequency, .. } => *frequency,
            Node::Internal { frequency, left, right } => {
                let sum = leaf_sum(left) + leaf_sum(right);
                assert_eq!(*frequency, left.frequency() + right.frequency());
                sum
            }
        }
    }

    #[test]
    fn empty_alphabet_is_rejected() {
        assert_eq!(HuffmanTree::build(&FrequencyTable::new()), Err(HuffmanError::EmptyAlphabet));
    }

    #[test]
    fn frequencies_are_conserved() {
        for &(data, name) in TEST_CASES {
            if data.is_empty() {
                continue;
            }
            let tree = tree_of(data);
            assert_eq!(leaf_sum(tree.root()), data.len() as u64, "leaf sum for {}", name);
            assert_eq!(tree.frequency(), data.len() as u64, "root frequency for {}", name);
        }
    }

    #[test]
    fn scenario_shape() {
        let tree = tree_of(SCENARIO_DATA);
        assert_eq!(
            tree.to_string(),
            ":59() {:24(0) {:12(00) {e:4(000), a:8(001)}, d:12(01)}, :35(1) {b:15(10), :20(11) {f:9(110), c:11(111)}}}"
        );
        assert_eq!(tree.leaf_count(), 6);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.shortest_code_len(), 2);
    }

    #[test]
    fn build_is_deterministic() {
        let first = tree_of(SCENARIO_DATA);
        for _ in 0..8 {
            assert_eq!(tree_of(SCENARIO_DATA), first);
        }
    }

    #[test]
    fn equal_frequencies_break_ties_by_symbol() {
        let tree = tree_of(b"dcba");
        let codes: Vec<(u8, String)> = tree.describe().into_iter().map(|leaf| (leaf.symbol, leaf.code)).collect();
        assert_eq!(
            codes,
            vec![
                (b'a', "00".to_string()),
                (b'b', "01".to_string()),
                (b'c', "10".to_string()),
                (b'd', "11".to_string()),
            ]
        );
    }

    #[test]
    fn single_symbol_gets_one_bit_code() {
        let tree = tree_of(b"zzzz");
        assert_eq!(tree.root(), &Node::Leaf { symbol: b'z', frequency: 4 });
        assert_eq!(
            tree.describe(),
            vec![LeafDescription {
                symbol: b'z',
                frequency: 4,
                code: "0".to_string()
            }]
        );
        assert_eq!(tree.shortest_code_len(), 1);
        assert_eq!(tree.to_string(), "z:4(0)");
    }

    #[test]
    fn non_printable_symbols_render_as_hex() {
        let tree = tree_of(&[0x00, 0x0a, 0x0a]);
        assert_eq!(tree.to_string(), ":3() {0x00:1(0), 0x0a:2(1)}");
    }

    #[test]
    fn descriptions_rebuild_the_same_tree() {
        for &(data, name) in TEST_CASES {
            if data.is_empty() {
                continue;
            }
            let tree = tree_of(data);
            let mut leaves = tree.describe();
            leaves.reverse();
            assert_eq!(HuffmanTree::from_descriptions(&leaves).unwrap(), tree, "rebuild for {}", name);
        }
    }

    #[test]
    fn malformed_descriptions_are_rejected() {
        let leaf = |symbol: u8, code: &str| LeafDescription {
            symbol,
            frequency: 1,
            code: code.to_string(),
        };

        assert_eq!(HuffmanTree::from_descriptions(&[]), Err(HuffmanError::EmptyAlphabet));
        // prefix
        assert!(matches!(
            HuffmanTree::from_descriptions(&[leaf(b'a', "0"), leaf(b'b', "01"), leaf(b'c', "1")]),
            Err(HuffmanError::MalformedTree(_))
        ));
        // incomplete
        assert!(matches!(
            HuffmanTree::from_descriptions(&[leaf(b'a', "0"), leaf(b'b', "10")]),
            Err(HuffmanError::MalformedTree(_))
        ));
        // duplicate
        assert!(matches!(
            HuffmanTree::from_descriptions(&[leaf(b'a', "0"), leaf(b'a', "1")]),
            Err(HuffmanError::MalformedTree(_))
        ));
        // lone symbol
        assert!(matches!(
            HuffmanTree::from_descriptions(&[leaf(b'a', "1")]),
            Err(HuffmanError::MalformedTree(_))
        ));
        assert!(matches!(
            HuffmanTree::from_descriptions(&[leaf(b'a', "0"), leaf(b'b', "x")]),
            Err(HuffmanError::InvalidBitCharacter { character: 'x', offset: 0 })
        ));
    }
}

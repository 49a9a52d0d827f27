use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use bitvec::prelude::*;

use crate::algorithms::bits::{Bits, parse_bits, write_bits};
use crate::algorithms::frequency::FrequencyTable;
use crate::algorithms::tree::HuffmanTree;
use crate::compressor::HuffmanError;

if_tracing! {
    use tracing::debug;
}

/// The bits of one root-to-leaf path, left = `0`, right = `1`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Bits,
}

impl Code {
    pub fn new() -> Self {
        Self { bits: Bits::new() }
    }

    /// A new code one bit longer than `self`. `self` is left untouched.
    pub fn appended(&self, bit: bool) -> Self {
        let mut bits = Bits::with_capacity(self.bits.len() + 1);
        bits.extend_from_bitslice(self.bits.as_bitslice());
        bits.push(bit);
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// # Panics
    ///
    /// If `index` is not below [`len`](Code::len).
    pub fn bit(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    /// Whether `self` is a prefix of `other`. Every code is a prefix of itself.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(self.bits.as_bitslice())
    }
}

impl FromStr for Code {
    type Err = HuffmanError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_bits(text).map(|bits| Self { bits })
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bits(f, &self.bits)
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Code(")?;
        write_bits(f, &self.bits)?;
        f.write_str(")")
    }
}

/// Symbol to code mapping derived from one tree. Immutable once generated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    /// The table of an empty alphabet. Only the empty input can be encoded with it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assigns every leaf of `tree` the code spelled by its path from the root.
    pub fn generate(tree: &HuffmanTree) -> Self {
        let mut codes = BTreeMap::new();
        tree.for_each_leaf(|symbol, _, code| {
            codes.insert(symbol, code.clone());
        });

        if_tracing! {
            debug!(target: "code_table", symbols = codes.len(), max_len = tree.depth(), "code table generated");
        }

        Self { codes }
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// Bits needed to encode an input with the given frequencies, or `None` if the
    /// input uses a symbol this table has no code for.
    pub fn encoded_bit_len(&self, frequencies: &FrequencyTable) -> Option<u64> {
        frequencies.iter().try_fold(0u64, |total, (symbol, count)| {
            let code = self.get(symbol)?;
            total.checked_add(count.checked_mul(code.len() as u64)?)
        })
    }
}

use core::fmt;

use bitvec::prelude::*;

use crate::compressor::HuffmanError;

/// Packed bit storage, most significant bit of each byte first.
pub type Bits = BitVec<u8, Msb0>;

/// An encoded bit sequence.
///
/// Bits are packed eight to a byte, MSB first. The `'0'`/`'1'` character form is
/// available through [`to_bit_string`](BitSequence::to_bit_string) and the
/// [`Display`](fmt::Display) impl for debugging and tests.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitSequence {
    bits: Bits,
}

impl BitSequence {
    pub fn new() -> Self {
        Self { bits: Bits::new() }
    }

    /// `len` zero bits, with the backing storage reserved fallibly.
    pub(crate) fn zeroed(len: usize) -> Result<Self, HuffmanError> {
        let storage = try_zeroed_bytes(len.div_ceil(8))?;
        let mut bits = Bits::from_vec(storage);
        bits.truncate(len);
        Ok(Self { bits })
    }

    /// Reassembles a sequence from packed bytes and its exact bit length.
    ///
    /// `bytes` must hold exactly `ceil(bit_len / 8)` bytes and every padding bit after
    /// `bit_len` must be zero.
    pub fn from_packed(bytes: &[u8], bit_len: usize) -> Result<Self, HuffmanError> {
        if bytes.len() != bit_len.div_ceil(8) {
            return Err(HuffmanError::MalformedContainer(format!(
                "{} payload bytes cannot hold exactly {} bits",
                bytes.len(),
                bit_len
            )));
        }

        let mut storage = try_zeroed_bytes(bytes.len())?;
        storage.copy_from_slice(bytes);
        let mut bits = Bits::from_vec(storage);
        if bits[bit_len..].any() {
            return Err(HuffmanError::MalformedContainer("non-zero padding bits".to_string()));
        }
        bits.truncate(bit_len);
        Ok(Self { bits })
    }

    /// Parses the `'0'`/`'1'` character form. Any other character is rejected.
    pub fn from_bit_string(text: &str) -> Result<Self, HuffmanError> {
        parse_bits(text).map(|bits| Self { bits })
    }

    /// The `'0'`/`'1'` character form.
    pub fn to_bit_string(&self) -> String {
        self.to_string()
    }

    /// Number of bits, not bytes.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).map(|bit| *bit)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    /// Packed bytes. The final byte is zero padded.
    pub fn as_packed(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    pub(crate) fn as_mut_bitslice(&mut self) -> &mut BitSlice<u8, Msb0> {
        &mut self.bits
    }

    /// Drops the last bit, if any.
    pub fn pop(&mut self) -> Option<bool> {
        let bit = self.bits.pop();
        // keep the padding of the packed form zeroed
        self.bits.set_uninitialized(false);
        bit
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }
}

impl From<Bits> for BitSequence {
    fn from(bits: Bits) -> Self {
        Self { bits }
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bits(f, &self.bits)
    }
}

impl fmt::Debug for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSequence({} bits: ", self.len())?;
        write_bits(f, &self.bits)?;
        f.write_str(")")
    }
}

pub(crate) fn write_bits(f: &mut fmt::Formatter<'_>, bits: &BitSlice<u8, Msb0>) -> fmt::Result {
    for bit in bits.iter().by_vals() {
        f.write_str(if bit { "1" } else { "0" })?;
    }
    Ok(())
}

/// Parses a string of `'0'`/`'1'` characters.
pub(crate) fn parse_bits(text: &str) -> Result<Bits, HuffmanError> {
    let mut bits = Bits::with_capacity(text.len());
    for (offset, character) in text.chars().enumerate() {
        match character {
            '0' => bits.push(false),
            '1' => bits.push(true),
            _ => return Err(HuffmanError::InvalidBitCharacter { character, offset }),
        }
    }
    Ok(bits)
}

/// `len` zero bytes, or [`HuffmanError::AllocationFailure`] instead of aborting.
pub(crate) fn try_zeroed_bytes(len: usize) -> Result<Vec<u8>, HuffmanError> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(len)
        .map_err(|_| HuffmanError::AllocationFailure { bytes: len })?;
    storage.resize(len, 0);
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_string_view() {
        let bits = BitSequence::from_bit_string("1011001").unwrap();
        assert_eq!(bits.len(), 7);
        assert_eq!(bits.to_bit_string(), "1011001");
        assert_eq!(bits.as_packed(), &[0b1011_0010]);
        assert_eq!(bits.get(0), Some(true));
        assert_eq!(bits.get(1), Some(false));
        assert_eq!(bits.get(7), None);
    }

    #[test]
    fn rejects_non_bit_characters() {
        let err = BitSequence::from_bit_string("0102").unwrap_err();
        assert_eq!(err, HuffmanError::InvalidBitCharacter { character: '2', offset: 3 });
    }

    #[test]
    fn packed_form_keeps_exact_length() {
        let bits = BitSequence::from_bit_string("111100001").unwrap();
        let restored = BitSequence::from_packed(bits.as_packed(), bits.len()).unwrap();
        assert_eq!(restored, bits);
        assert_eq!(restored.len(), 9);
    }

    #[test]
    fn packed_form_rejects_bad_padding_and_length() {
        assert!(matches!(
            BitSequence::from_packed(&[0b1000_0001], 4),
            Err(HuffmanError::MalformedContainer(_))
        ));
        assert!(matches!(
            BitSequence::from_packed(&[0xff, 0x00], 8),
            Err(HuffmanError::MalformedContainer(_))
        ));
        assert!(BitSequence::from_packed(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn zeroed_has_requested_length() {
        let bits = BitSequence::zeroed(13).unwrap();
        assert_eq!(bits.len(), 13);
        assert_eq!(bits.as_packed().len(), 2);
        assert!(bits.iter().all(|bit| !bit));
    }
}

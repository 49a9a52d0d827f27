use crate::algorithms::bits::BitSequence;
use crate::algorithms::codebook::Codebook;
use crate::algorithms::tree_format::{read_tree, write_tree};
use crate::algorithms::decoder;
use crate::compressor::{Compressor, HuffmanError, Result};

if_tracing! {
    use tracing::{debug, warn};
}

const MAGIC: &[u8; 4] = b"HUFF";
const VERSION: u8 = 1;
/// magic, version, count, bits, treelen
const HEADER_LEN: usize = 4 + 1 + 8 + 8 + 4;

/// Static Huffman coding in a self-describing frame.
///
/// ```text
/// magic   b"HUFF"
/// version u8
/// count   u64 LE   original length in bytes
/// bits    u64 LE   encoded length in bits
/// treelen u32 LE   length of the serialized tree, 0 for empty input
/// tree    [u8; treelen]
/// payload [u8; ceil(bits / 8)]
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct HuffmanCoding;

impl Compressor for HuffmanCoding {
    fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.huffman_encode(data)?)
    }

    fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.huffman_decode(data)?)
    }

    fn compressor_name(&self) -> String {
        "Huffman Coding".into()
    }
}

impl HuffmanCoding {
    pub fn huffman_encode(&self, data: &[u8]) -> Result<Vec<u8>, HuffmanError> {
        if data.is_empty() {
            let mut output = Vec::with_capacity(HEADER_LEN);
            write_header(&mut output, 0, 0, 0);
            return Ok(output);
        }

        let codebook = Codebook::from_data(data)?;
        let bits = codebook.encode(data)?;

        let mut tree = Vec::new();
        write_tree(codebook.tree(), &mut tree);
        let payload = bits.as_packed();

        let total = HEADER_LEN + tree.len() + payload.len();
        let mut output = Vec::new();
        output
            .try_reserve_exact(total)
            .map_err(|_| HuffmanError::AllocationFailure { bytes: total })?;

        // a serialized tree holds at most 256 leaves and 255 internal nodes
        write_header(&mut output, data.len() as u64, bits.len() as u64, tree.len() as u32);
        output.extend_from_slice(&tree);
        output.extend_from_slice(payload);

        if_tracing! {
            debug!(
                target: "huffman",
                input_len = data.len(),
                tree_len = tree.len(),
                bits = bits.len(),
                output_len = output.len(),
                "compressed"
            );
        }

        Ok(output)
    }

    pub fn huffman_decode(&self, data: &[u8]) -> Result<Vec<u8>, HuffmanError> {
        let result = decode_frame(data);

        if_tracing! {
            match &result {
                Ok(out) => debug!(target: "huffman", input_len = data.len(), output_len = out.len(), "decompressed"),
                Err(err) => warn!(target: "huffman", input_len = data.len(), error = %err, "decompression failed"),
            }
        }

        result
    }
}

fn write_header(output: &mut Vec<u8>, count: u64, bits: u64, tree_len: u32) {
    output.extend_from_slice(MAGIC);
    output.push(VERSION);
    output.extend_from_slice(&count.to_le_bytes());
    output.extend_from_slice(&bits.to_le_bytes());
    output.extend_from_slice(&tree_len.to_le_bytes());
}

fn decode_frame(data: &[u8]) -> Result<Vec<u8>, HuffmanError> {
    let mut frame = Frame { rest: data };

    if frame.take(MAGIC.len(), "magic")? != MAGIC {
        return Err(malformed("bad magic"));
    }
    let version = frame.take_array::<1>("version")?[0];
    if version != VERSION {
        return Err(malformed(format!("unsupported version {}", version)));
    }
    let count = u64::from_le_bytes(frame.take_array("byte count")?);
    let bit_len = u64::from_le_bytes(frame.take_array("bit count")?);
    let tree_len = u32::from_le_bytes(frame.take_array("tree length")?);

    if count == 0 {
        if bit_len != 0 || tree_len != 0 || !frame.rest.is_empty() {
            return Err(malformed("empty frame carries a tree or payload"));
        }
        return Ok(Vec::new());
    }

    let count = usize::try_from(count).map_err(|_| malformed("byte count does not fit in memory"))?;
    let bit_len = usize::try_from(bit_len).map_err(|_| malformed("bit count does not fit in memory"))?;

    let tree = read_tree(frame.take(tree_len as usize, "tree")?)?;

    let payload_len = bit_len.div_ceil(8);
    if frame.rest.len() != payload_len {
        return Err(malformed(format!(
            "expected {} payload bytes, found {}",
            payload_len,
            frame.rest.len()
        )));
    }
    let bits = BitSequence::from_packed(frame.rest, bit_len)?;

    let out = decoder::decode(&bits, &tree)?;
    if out.len() != count {
        return Err(malformed(format!("decoded {} bytes, header says {}", out.len(), count)));
    }
    Ok(out)
}

fn malformed(message: impl Into<String>) -> HuffmanError {
    HuffmanError::MalformedContainer(message.into())
}

struct Frame<'a> {
    rest: &'a [u8],
}

impl<'a> Frame<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], HuffmanError> {
        if self.rest.len() < len {
            return Err(malformed(format!("frame ends inside the {}", what)));
        }
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head)
    }

    fn take_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], HuffmanError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N, what)?);
        Ok(array)
    }
}

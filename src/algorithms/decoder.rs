use crate::algorithms::bits::BitSequence;
use crate::algorithms::tree::{HuffmanTree, Node};
use crate::compressor::HuffmanError;

if_tracing! {
    use tracing::{Level, debug, span, warn};
}

/// Walks `tree` bit by bit, emitting a symbol at every leaf and restarting at the root.
///
/// `0` steps left, `1` steps right. A tree that is a single leaf decodes each `0` bit to
/// its symbol.
///
/// # Errors
///
/// - [`HuffmanError::TruncatedCode`] if the bits run out in the middle of a code.
/// - [`HuffmanError::InvalidCode`] for a `1` bit under a single-leaf tree.
/// - [`HuffmanError::AllocationFailure`] if the output buffer cannot be reserved.
///
/// Nothing is returned on error, not even the symbols decoded before it.
pub fn decode(bits: &BitSequence, tree: &HuffmanTree) -> Result<Vec<u8>, HuffmanError> {
    if_tracing! {
        let span = span!(Level::DEBUG, "decode", input_bits = bits.len(), depth = tree.depth());
        let _enter = span.enter();
    }

    // every code is at least this long, so this bounds the number of symbols
    let capacity = bits.len() / tree.shortest_code_len();
    let mut out = Vec::new();
    out.try_reserve_exact(capacity)
        .map_err(|_| HuffmanError::AllocationFailure { bytes: capacity })?;

    let root = tree.root();
    if let Node::Leaf { symbol, .. } = root {
        if let Some(offset) = bits.iter().position(|bit| bit) {
            if_tracing! {
                warn!(target: "decoder", offset, "set bit under a single-leaf tree");
            }
            return Err(HuffmanError::InvalidCode { offset });
        }
        out.resize(bits.len(), *symbol);
        return Ok(out);
    }

    let mut current = root;
    let mut pending = 0;
    for bit in bits.iter() {
        let Node::Internal { left, right, .. } = current else {
            unreachable!("the walk restarts at the root after every leaf");
        };
        current = if bit { right } else { left };
        pending += 1;

        if let Node::Leaf { symbol, .. } = current {
            out.push(*symbol);
            current = root;
            pending = 0;
        }
    }

    if pending != 0 {
        if_tracing! {
            warn!(target: "decoder", bit_len = bits.len(), pending, "bit sequence ends inside a code");
        }
        return Err(HuffmanError::TruncatedCode {
            bit_len: bits.len(),
            pending,
        });
    }

    if_tracing! {
        debug!(target: "decoder", input_bits = bits.len(), output_len = out.len(), "decode complete");
    }

    Ok(out)
}

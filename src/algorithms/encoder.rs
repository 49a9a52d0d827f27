use crate::algorithms::bits::BitSequence;
use crate::algorithms::code_table::{Code, CodeTable};
use crate::compressor::HuffmanError;

if_tracing! {
    use tracing::{Level, debug, span, warn};
}

/// Replaces every byte of `data` with its code from `table`.
///
/// The whole input is checked against the table before any bit is written, so a
/// failure never leaves a partial sequence behind. The output holds exactly
/// `sum(code_len(byte))` bits.
///
/// # Errors
///
/// - [`HuffmanError::UnknownSymbol`] for the first byte without a code.
/// - [`HuffmanError::AllocationFailure`] if the output buffer cannot be reserved.
pub fn encode(data: &[u8], table: &CodeTable) -> Result<BitSequence, HuffmanError> {
    if_tracing! {
        let span = span!(Level::DEBUG, "encode", input_len = data.len(), symbols = table.len());
        let _enter = span.enter();
    }

    // at most 2^64 symbols of at most 255 bits each
    let mut total_bits: u128 = 0;
    for (offset, &symbol) in data.iter().enumerate() {
        let code = lookup(table, symbol, offset)?;
        total_bits += code.len() as u128;
    }
    let bit_len = addressable_bits(total_bits)?;

    let mut bits = BitSequence::zeroed(bit_len)?;
    let out = bits.as_mut_bitslice();
    let mut cursor = 0;
    for (offset, &symbol) in data.iter().enumerate() {
        let code = lookup(table, symbol, offset)?;
        out[cursor..cursor + code.len()].clone_from_bitslice(code.bits());
        cursor += code.len();
    }

    if_tracing! {
        debug!(target: "encoder", input_len = data.len(), output_bits = bits.len(), "encode complete");
    }

    Ok(bits)
}

fn addressable_bits(bits: u128) -> Result<usize, HuffmanError> {
    usize::try_from(bits).map_err(|_| HuffmanError::OutputTooLarge { bits })
}

fn lookup(table: &CodeTable, symbol: u8, offset: usize) -> Result<&Code, HuffmanError> {
    table.get(symbol).ok_or_else(|| {
        if_tracing! {
            warn!(target: "encoder", symbol, offset, "symbol missing from code table");
        }
        HuffmanError::UnknownSymbol { symbol, offset }
    })
}

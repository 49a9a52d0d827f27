use std::path::Path;

use huffpack::{BitSequence, Codebook, HuffmanCoding};

if_tracing! {
    use voxell_timer::time_fn;
}

use crate::cli::{BitFormat, CodesFile, EncodeArgs, Result, read_file, save_codes, sidecar_path, write_file};

pub fn encode(args: EncodeArgs) -> Result<()> {
    let input_path = &args.input_path;
    let output_path = &args.output_path;

    let input_data = read_file(input_path)?;
    let encoded;
    if_tracing! {{
        let (result, comp_dur) = time_fn(|| encode_data(&input_data, args.format, output_path));
        encoded = result?;
        tracing::info!(event = "encode_complete", input = %input_path.display(), output = %output_path.display(), format = ?args.format, elapsed_us = comp_dur.as_micros() as u64, input_len = input_data.len(), encoded_len = encoded.len(), "encode finished");
    }}
    if_not_tracing! {{
        encoded = encode_data(&input_data, args.format, output_path)?;
    }}

    write_file(output_path, encoded)
}

/// Encodes `data` in `format`. The `bits` format also writes the code file next to
/// `output_path`.
pub fn encode_data(data: &[u8], format: BitFormat, output_path: &Path) -> Result<Vec<u8>> {
    match format {
        BitFormat::Packed => Ok(HuffmanCoding.huffman_encode(data)?),
        BitFormat::Bits => {
            let (bits, codes) = encode_bits(data)?;
            let codes_path = sidecar_path(output_path)?;
            save_codes(&codes, &codes_path)?;
            if_tracing! {
                tracing::debug!(event = "codes_written", path = %codes_path.display(), leaves = codes.leaves.len(), "code file written");
            }
            Ok(bits.to_bit_string().into_bytes())
        }
    }
}

/// The bit stream of `data` and the code file needed to decode it.
pub fn encode_bits(data: &[u8]) -> Result<(BitSequence, CodesFile)> {
    if data.is_empty() {
        return Ok((BitSequence::new(), CodesFile::new(0, Vec::new())));
    }

    let codebook = Codebook::from_data(data)?;
    let bits = codebook.encode(data)?;
    Ok((bits, CodesFile::new(data.len() as u64, codebook.describe())))
}

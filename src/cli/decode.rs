use huffpack::{BitSequence, Codebook, HuffmanCoding};

if_tracing! {
    use voxell_timer::time_fn;
}

use crate::cli::{BitFormat, CliError, CodesFile, DecodeArgs, Result, load_codes, read_file, sidecar_path, write_file};

pub fn decode(args: DecodeArgs) -> Result<()> {
    let input_path = &args.input_path;
    let output_path = &args.output_path;

    let encoded = read_file(input_path)?;
    let decoded;
    if_tracing! {{
        let (result, decomp_dur) = time_fn(|| decode_data(&encoded, &args));
        decoded = result?;
        tracing::info!(event = "decode_complete", input = %input_path.display(), output = %output_path.display(), format = ?args.format, elapsed_us = decomp_dur.as_micros() as u64, decoded_len = decoded.len(), "decode finished");
    }}
    if_not_tracing! {{
        decoded = decode_data(&encoded, &args)?;
    }}

    write_file(output_path, decoded)
}

fn decode_data(encoded: &[u8], args: &DecodeArgs) -> Result<Vec<u8>> {
    match args.format {
        BitFormat::Packed => Ok(HuffmanCoding.huffman_decode(encoded)?),
        BitFormat::Bits => {
            let codes_path = match &args.codes {
                Some(path) => path.clone(),
                None => sidecar_path(&args.input_path)?,
            };
            let codes = load_codes(&codes_path)?;
            let text = String::from_utf8_lossy(encoded);
            decode_bits(text.trim_end(), &codes)
        }
    }
}

/// Decodes `'0'`/`'1'` text with the tree stored in `codes`.
pub fn decode_bits(text: &str, codes: &CodesFile) -> Result<Vec<u8>> {
    let bits = BitSequence::from_bit_string(text)?;
    let decoded = if codes.leaves.is_empty() && bits.is_empty() {
        Vec::new()
    } else {
        Codebook::from_descriptions(&codes.leaves)?.decode(&bits)?
    };

    if decoded.len() as u64 != codes.count {
        return Err(CliError::LengthMismatch {
            expected: codes.count,
            found: decoded.len(),
        });
    }
    Ok(decoded)
}

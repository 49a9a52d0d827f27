use std::ascii;

use huffpack::{Codebook, FrequencyTable, HuffmanCoding, LeafDescription};
use serde::Serialize;

use crate::cli::{DescribeArgs, Result, read_file};

#[derive(Serialize, Debug)]
pub struct Description {
    pub input_len: u64,
    pub alphabet_len: usize,
    pub encoded_bits: u64,
    pub container_len: usize,
    pub leaves: Vec<LeafDescription>,
    /// Nested rendering of the tree, absent for empty input
    pub tree: Option<String>,
}

pub fn describe(args: DescribeArgs) -> Result<()> {
    let data = read_file(&args.input_path)?;
    let description = build_description(&data)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&description)?);
    } else {
        print!("{}", render_text(&description));
    }
    Ok(())
}

pub fn build_description(data: &[u8]) -> Result<Description> {
    let frequencies = FrequencyTable::count(data);
    let container_len = HuffmanCoding.huffman_encode(data)?.len();

    let (encoded_bits, leaves, tree) = if frequencies.is_empty() {
        (0, Vec::new(), None)
    } else {
        let codebook = Codebook::from_frequencies(&frequencies)?;
        let encoded_bits = codebook.table().encoded_bit_len(&frequencies).unwrap_or_default();
        (encoded_bits, codebook.describe(), Some(codebook.tree().to_string()))
    };

    Ok(Description {
        input_len: data.len() as u64,
        alphabet_len: frequencies.alphabet_len(),
        encoded_bits,
        container_len,
        leaves,
        tree,
    })
}

pub fn render_text(description: &Description) -> String {
    let mut out = format!(
        "input: {} bytes, {} distinct symbols\n",
        description.input_len, description.alphabet_len
    );

    if !description.leaves.is_empty() {
        out.push_str("\nsymbol  frequency  code\n");
        let mut leaves: Vec<&LeafDescription> = description.leaves.iter().collect();
        leaves.sort_by_key(|leaf| leaf.symbol);
        for leaf in leaves {
            let symbol = ascii::escape_default(leaf.symbol).to_string();
            out.push_str(&format!("{:<6}  {:>9}  {}\n", symbol, leaf.frequency, leaf.code));
        }
    }

    if let Some(tree) = &description.tree {
        out.push_str(&format!("\ntree: {}\n", tree));
    }

    out.push_str(&format!(
        "\nencoded: {} bits ({} bytes), container: {} bytes\n",
        description.encoded_bits,
        description.encoded_bits.div_ceil(8),
        description.container_len
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"aabbccddbbeaebdddfffdbffddabbbbbcdefaabbcccccaabbddfffdcecc";

    #[test]
    fn sample_description() {
        let description = build_description(SAMPLE).unwrap();
        assert_eq!(description.input_len, 59);
        assert_eq!(description.alphabet_len, 6);
        assert_eq!(description.encoded_bits, 150);
        assert_eq!(description.container_len, 25 + 23 + 19);
        assert_eq!(description.leaves.len(), 6);

        let text = render_text(&description);
        assert!(text.contains("input: 59 bytes, 6 distinct symbols"));
        assert!(text.contains("e               4  000"));
        assert!(text.contains("encoded: 150 bits (19 bytes), container: 67 bytes"));
    }

    #[test]
    fn empty_description() {
        let description = build_description(&[]).unwrap();
        assert_eq!(description.input_len, 0);
        assert!(description.leaves.is_empty());
        assert!(description.tree.is_none());
        assert!(!render_text(&description).contains("tree:"));
    }

    #[test]
    fn json_lists_leaves() {
        let json = serde_json::to_value(build_description(b"aab").unwrap()).unwrap();
        assert_eq!(json["encoded_bits"], 3);
        assert_eq!(json["leaves"].as_array().map(Vec::len), Some(2));
    }
}

//! cli component of huffpack.
//!
//! `<description>` denotes a required argument, `[description]` an optional one.
//!
//! > `huffpack enc <input> <output> [--format packed|bits]`
//!
//! `packed` (the default) writes the self-describing container. `bits` writes the code
//! stream as `'0'`/`'1'` text and puts the tree next to it in `{output stem}.codes.json`,
//! which is handy for inspecting small inputs by eye.
//!
//! > `huffpack dec <input> <output> [--format packed|bits] [--codes <path>]`
//!
//! reverses `enc`. in `bits` mode the tree is read from `--codes`, or from
//! `{input stem}.codes.json` next to the input when the flag is left out.
//!
//! > `huffpack describe <input> [--json]`
//!
//! prints the frequencies, codes and tree shape for a file without writing anything.
//!
//! > `huffpack test <input>`
//!
//! compresses and decompresses the file in memory and reports the ratio.
use clap::{Args, Parser, Subcommand, ValueEnum};
use huffpack::{HuffmanError, LeafDescription};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod decode;
pub mod describe;
pub mod encode;

/// Error types for CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Huffman(#[from] HuffmanError),

    #[error("{0:#}")]
    Compressor(anyhow::Error),

    #[error("cannot derive a sidecar path from {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("decoded {found} bytes, but the code file expects {expected}")]
    LengthMismatch { expected: u64, found: usize },

    #[error("roundtrip of {} did not reproduce the input", .0.display())]
    RoundTripMismatch(PathBuf),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// CLI arguments for the huffpack application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands for huffpack
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode (compress) a file
    #[command(alias = "enc")]
    Encode(EncodeArgs),

    /// Decode (decompress) a file
    #[command(alias = "dec")]
    Decode(DecodeArgs),

    /// Print the frequency table, codes and tree of a file
    Describe(DescribeArgs),

    /// Test compression/decompression roundtrip
    Test(TestArgs),
}

/// On-disk representation of the encoded bits
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BitFormat {
    /// The framed binary container
    #[default]
    Packed,
    /// '0'/'1' text with a JSON code file alongside
    Bits,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Path to the input file
    pub input_path: PathBuf,

    /// Path for the output file
    pub output_path: PathBuf,

    #[arg(long, value_enum, default_value_t = BitFormat::Packed)]
    pub format: BitFormat,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Path to the encoded file
    pub input_path: PathBuf,

    /// Path for the decoded file
    pub output_path: PathBuf,

    #[arg(long, value_enum, default_value_t = BitFormat::Packed)]
    pub format: BitFormat,

    /// Code file written by `encode --format bits`
    #[arg(long)]
    pub codes: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Path to the input file
    pub input_path: PathBuf,

    /// Print the description as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the input file
    pub input_path: PathBuf,
}

/// Sidecar written next to a `bits` format output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CodesFile {
    /// Version of huffpack that wrote the file
    pub version: String,

    /// Length of the original input in bytes
    pub count: u64,

    /// Every leaf of the tree, left to right. Empty for empty input.
    pub leaves: Vec<LeafDescription>,
}

impl CodesFile {
    pub fn new(count: u64, leaves: Vec<LeafDescription>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            count,
            leaves,
        }
    }
}

/// `{stem}.codes.json` in the directory of `base_path`.
pub fn sidecar_path(base_path: &Path) -> Result<PathBuf> {
    let file_name = base_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CliError::InvalidPath(base_path.to_path_buf()))?;

    Ok(base_path.with_file_name(format!("{}.codes.json", file_name)))
}

pub fn save_codes(codes: &CodesFile, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(codes)?;
    write_file(path, json)
}

pub fn load_codes(path: &Path) -> Result<CodesFile> {
    let json = read_file(path)?;
    Ok(serde_json::from_slice(&json)?)
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encode(args) => encode::encode(args),
        Command::Decode(args) => decode::decode(args),
        Command::Describe(args) => describe::describe(args),
        Command::Test(args) => test::test(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_sits_next_to_the_output() {
        let path = sidecar_path(Path::new("out/data.bits")).unwrap();
        assert_eq!(path, Path::new("out/data.codes.json"));

        let path = sidecar_path(Path::new("plain")).unwrap();
        assert_eq!(path, Path::new("plain.codes.json"));
    }

    #[test]
    fn sidecar_needs_a_file_name() {
        assert!(matches!(sidecar_path(Path::new("/")), Err(CliError::InvalidPath(_))));
    }

    #[test]
    fn parses_format_flag() {
        let cli = Cli::try_parse_from(["huffpack", "enc", "in", "out", "--format", "bits"]).unwrap();
        match cli.command {
            Command::Encode(args) => assert_eq!(args.format, BitFormat::Bits),
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["huffpack", "dec", "in", "out"]).unwrap();
        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.format, BitFormat::Packed);
                assert!(args.codes.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn codes_file_json_shape() {
        let codes = CodesFile::new(
            3,
            vec![LeafDescription {
                symbol: b'a',
                frequency: 3,
                code: "0".to_string(),
            }],
        );
        let json = serde_json::to_value(&codes).unwrap();
        assert_eq!(json["count"], 3);
        assert_eq!(json["leaves"][0]["symbol"], 97);
        assert_eq!(json["leaves"][0]["code"], "0");

        let back: CodesFile = serde_json::from_value(json).unwrap();
        assert_eq!(back, codes);
    }
}

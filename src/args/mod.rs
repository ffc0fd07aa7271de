//! CLI argument surface (`spec.md` §6). `demux_inline`/`demux_barcode` flags,
//! the barcode-spec mini-language, and validated conversion into the
//! construction-time types the pipeline actually needs.

use crate::Cli;
use crate::error::DemuxError;
use clap::{Args, error::ErrorKind};
use std::path::PathBuf;

/// Aborts clap with a given error `message` due to a custom parsing error.
///
/// The subcommand should be specified as a lowercase string with `subcommand`
/// if available. This ensures the help message is as informative as possible.
/// If an invalid subcommand is passed, it will be ignored.
pub(crate) fn abort_clap(kind: ErrorKind, message: impl std::fmt::Display, subcommand: Option<&str>) -> ! {
    use clap::CommandFactory;
    let mut command = Cli::command();

    if let Some(subcommand) = subcommand
        && let Some(c) = command.get_subcommands_mut().find(|c| c.get_name() == subcommand)
    {
        c.error(kind, message).exit();
    } else {
        command.error(kind, message).exit()
    }
}

/// One `--barcode` entry after parsing: the barcodes it aliases, and the
/// prefix they should be routed to (`None` for a bare `TOKEN` in
/// `demux_barcode`, where the prefix is implied by the token itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BarcodeEntry {
    pub(crate) barcodes: Vec<String>,
    pub(crate) prefix: String,
}

/// Parses one `--barcode` value: either `TOKEN(S)=PREFIX` (whitespace inside
/// the token list maps multiple barcodes to the same prefix) or bare
/// `TOKEN`, which maps to itself (`spec.md` §6).
pub(crate) fn parse_barcode_spec(raw: &str) -> Result<BarcodeEntry, DemuxError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DemuxError::ConfigError("empty --barcode value".into()));
    }

    let entry = match raw.split_once('=') {
        Some((tokens, prefix)) => {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                return Err(DemuxError::ConfigError(format!("--barcode '{raw}' has an empty prefix")));
            }
            let barcodes: Vec<String> = tokens.split_whitespace().map(str::to_owned).collect();
            if barcodes.is_empty() {
                return Err(DemuxError::ConfigError(format!("--barcode '{raw}' names no tokens")));
            }
            BarcodeEntry { barcodes, prefix: prefix.to_owned() }
        }
        None => BarcodeEntry { barcodes: vec![raw.to_owned()], prefix: raw.to_owned() },
    };

    Ok(entry)
}

/// Shared flags between `demux_inline` and `demux_barcode` (`spec.md` §6).
#[derive(Args, Debug)]
pub(crate) struct CommonArgs {
    /// R1 input FASTQ file(s), gzip-compressed.
    #[arg(long, num_args = 1.., required = true)]
    pub(crate) r1: Vec<PathBuf>,

    /// R2 input FASTQ file(s), gzip-compressed, paired positionally with `--r1`.
    #[arg(long, num_args = 1.., required = true)]
    pub(crate) r2: Vec<PathBuf>,

    /// `TOKEN(S)=PREFIX` or bare `TOKEN`; repeatable.
    #[arg(long = "barcode")]
    pub(crate) barcode: Vec<String>,

    #[arg(long, default_value_t = 1)]
    pub(crate) score: i32,

    #[arg(long, default_value_t = 10)]
    pub(crate) penalty: i32,

    /// Number of worker threads; defaults to the available parallelism.
    #[arg(long)]
    pub(crate) workers: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct DemuxInlineArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Prefix for reads that match no adapter; omit to discard them.
    #[arg(long)]
    pub(crate) unmatched: Option<String>,

    /// Path to write the statistics CSV; omit to skip stats.
    #[arg(long)]
    pub(crate) stats: Option<PathBuf>,

    /// Sample name recorded in the statistics CSV.
    #[arg(long, default_value = "sample")]
    pub(crate) name: String,

    #[arg(long, default_value_t = 0.2)]
    pub(crate) error_rate: f64,
}

#[derive(Args, Debug)]
pub(crate) struct DemuxBarcodeArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Directory final output pairs are written into.
    #[arg(long)]
    pub(crate) output: PathBuf,

    #[arg(long, default_value_t = 0.1)]
    pub(crate) error_rate: f64,
}

/// Expands a list of raw `--barcode` values into the `(barcodes, prefix)`
/// entries `BarcodeTable::new` expects.
pub(crate) fn parse_barcode_specs(raw: &[String]) -> Result<Vec<(Vec<String>, String)>, DemuxError> {
    raw.iter().map(|s| parse_barcode_spec(s)).map(|r| r.map(|e| (e.barcodes, e.prefix))).collect()
}

/// Aborts with clap's own error formatting if `--r1`/`--r2` name different
/// numbers of files — a shape problem in the arguments themselves, not a
/// runtime `ConfigError` (`spec.md` §6 "Paired files must have identical
/// record counts and matched headers").
pub(crate) fn check_paired_input_counts(common: &CommonArgs, subcommand: &str) {
    if common.r1.len() != common.r2.len() {
        abort_clap(
            ErrorKind::ValueValidation,
            format!("--r1 names {} file(s) but --r2 names {}", common.r1.len(), common.r2.len()),
            Some(subcommand),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_token_maps_to_itself() {
        let entry = parse_barcode_spec("AAAA").unwrap();
        assert_eq!(entry.barcodes, vec!["AAAA".to_owned()]);
        assert_eq!(entry.prefix, "AAAA");
    }

    #[test]
    fn token_equals_prefix_assigns_explicit_prefix() {
        let entry = parse_barcode_spec("AAAA=sampleA").unwrap();
        assert_eq!(entry.barcodes, vec!["AAAA".to_owned()]);
        assert_eq!(entry.prefix, "sampleA");
    }

    #[test]
    fn multiple_whitespace_separated_tokens_share_a_prefix() {
        let entry = parse_barcode_spec("AAAA TTTT=sampleA").unwrap();
        assert_eq!(entry.barcodes, vec!["AAAA".to_owned(), "TTTT".to_owned()]);
        assert_eq!(entry.prefix, "sampleA");
    }

    #[test]
    fn empty_prefix_is_a_config_error() {
        assert!(matches!(parse_barcode_spec("AAAA="), Err(DemuxError::ConfigError(_))));
    }

    #[test]
    fn empty_value_is_a_config_error() {
        assert!(matches!(parse_barcode_spec(""), Err(DemuxError::ConfigError(_))));
    }
}

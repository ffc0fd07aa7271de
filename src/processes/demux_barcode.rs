//! `demux_barcode` sub-command (`spec.md` §4.4, §6), including the
//! major-barcode inference used when `--barcode` is omitted (`spec.md` §6,
//! §9 Open Question; rule adopted in DESIGN.md).

use crate::align::{AlignConfig, DualIndexAligner};
use crate::args::{DemuxBarcodeArgs, parse_barcode_specs};
use crate::data::barcode::{BarcodeTable, canonicalise};
use crate::error::DemuxError;
use crate::io::reject_cloud_blobs;
use crate::io::readers::open_fastq_file;
use crate::pipeline::worker::dual_index::extract_barcode;
use crate::pipeline::{self, MatchMode, PipelineConfig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

static MODULE: &str = module_path!();

/// Number of leading R1 headers sampled for major-barcode inference.
const SAMPLE_SIZE: usize = 3_000;

/// A barcode is "major" once its sampled frequency reaches this fraction of
/// the sample (DESIGN.md Open Question decision 3).
const MAJOR_FREQUENCY_THRESHOLD: f64 = 0.01;

pub(crate) fn run(args: DemuxBarcodeArgs) -> Result<(), DemuxError> {
    reject_cloud_blobs(&args.common.r1)?;
    reject_cloud_blobs(&args.common.r2)?;
    let inputs: Vec<_> = args.common.r1.clone().into_iter().zip(args.common.r2.clone()).collect();

    let entries = if args.common.barcode.is_empty() {
        let first_r1 = args.common.r1.first().ok_or_else(|| DemuxError::ConfigError("no --r1 files given".into()))?;
        let major = infer_major_barcodes(first_r1)?;
        eprintln!("{MODULE} inferred {} major barcode(s) from {}", major.len(), first_r1.display());
        major.into_iter().map(|barcode| (vec![barcode.clone()], barcode)).collect()
    } else {
        parse_barcode_specs(&args.common.barcode)?
    };
    if entries.is_empty() {
        return Err(DemuxError::ConfigError(
            "demux_barcode requires at least one --barcode, or a sample from which to infer major barcodes".into(),
        ));
    }
    let adapters: Vec<String> = entries.iter().flat_map(|(barcodes, _)| barcodes.iter().cloned()).collect();
    let table = Arc::new(BarcodeTable::new(&entries, None));

    // `demux_barcode` only scores matches by edit distance, but `penalty`
    // is shared construction-time configuration across both modes
    // (spec.md §7 `ConfigError`): the original raises it in the shared
    // `DemultiplexWorker.__init__` regardless of which worker subclass is
    // used, so `--penalty 0` must be rejected here too even though the
    // dual-index aligner itself never reads it.
    let _ = AlignConfig::new(args.common.score, args.common.penalty, args.error_rate)?;

    let aligner = DualIndexAligner::new(&adapters, args.error_rate)?;
    let mode = Arc::new(MatchMode::DualIndex(aligner));

    let workspace = args.output.join(".fastq-demux-shards");

    eprintln!("{MODULE} starting demux_barcode over {} input pair(s)", inputs.len());
    let pipeline_config = PipelineConfig::new(args.common.workers);
    pipeline::run(&inputs, table, mode, &workspace, &args.output, pipeline_config)?;

    let _ = std::fs::remove_dir(&workspace);
    Ok(())
}

/// Reads up to [`SAMPLE_SIZE`] R1 headers from `path`, canonicalises each
/// header's barcode, and returns the ones at or above
/// [`MAJOR_FREQUENCY_THRESHOLD`] of the sample, ordered by descending
/// frequency with ties broken by first-seen order.
fn infer_major_barcodes(path: &Path) -> Result<Vec<String>, DemuxError> {
    let (reader, io_thread) =
        open_fastq_file(path).map_err(|e| DemuxError::InputNotFound(path.display().to_string(), e.to_string()))?;

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    let mut sampled: u64 = 0;

    for record in reader.take(SAMPLE_SIZE) {
        let record = record?;
        let barcode = canonicalise(extract_barcode(&record.header));
        if !counts.contains_key(&barcode) {
            first_seen.push(barcode.clone());
        }
        *counts.entry(barcode).or_insert(0) += 1;
        sampled += 1;
    }

    // `reader` is dropped above, closing the pipe's read end; the decoder thread's
    // next write fails with a broken pipe and it exits on its own, so the handle
    // is simply detached rather than joined (we only sampled a prefix of the file).
    drop(io_thread);

    if sampled == 0 {
        return Err(DemuxError::ConfigError(format!("{} contains no reads to infer barcodes from", path.display())));
    }

    let mut major: Vec<String> = first_seen
        .into_iter()
        .filter(|barcode| (counts[barcode] as f64) / (sampled as f64) >= MAJOR_FREQUENCY_THRESHOLD)
        .collect();
    major.sort_by(|a, b| counts[b].cmp(&counts[a]));

    Ok(major)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::CommonArgs;

    #[test]
    fn zero_penalty_is_rejected_before_any_file_is_opened() {
        let args = DemuxBarcodeArgs {
            common: CommonArgs {
                r1: vec!["does-not-exist.R1.fastq.gz".into()],
                r2: vec!["does-not-exist.R2.fastq.gz".into()],
                barcode: vec!["AAAAAAAA+GGGGGGGG".into()],
                score: 1,
                penalty: 0,
                workers: Some(1),
            },
            output: "does-not-exist-dir".into(),
            error_rate: 0.1,
        };

        assert!(matches!(run(args), Err(DemuxError::ConfigError(_))));
    }
}

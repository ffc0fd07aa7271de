//! `demux_inline` sub-command (`spec.md` §4.3, §6).

use crate::align::{AlignConfig, InlineAligner};
use crate::args::{DemuxInlineArgs, parse_barcode_specs};
use crate::data::barcode::BarcodeTable;
use crate::error::DemuxError;
use crate::io::reject_cloud_blobs;
use crate::pipeline::{self, MatchMode, PipelineConfig};
use crate::stats;
use std::sync::Arc;

static MODULE: &str = module_path!();

pub(crate) fn run(args: DemuxInlineArgs) -> Result<(), DemuxError> {
    reject_cloud_blobs(&args.common.r1)?;
    reject_cloud_blobs(&args.common.r2)?;
    let inputs: Vec<_> = args.common.r1.into_iter().zip(args.common.r2).collect();

    let entries = parse_barcode_specs(&args.common.barcode)?;
    if entries.is_empty() {
        return Err(DemuxError::ConfigError("demux_inline requires at least one --barcode".into()));
    }
    let adapters: Vec<String> = entries.iter().flat_map(|(barcodes, _)| barcodes.iter().cloned()).collect();
    let table = Arc::new(BarcodeTable::new(&entries, args.unmatched.clone()));

    let config = AlignConfig::new(args.common.score, args.common.penalty, args.error_rate)?;
    let aligner = InlineAligner::new(&adapters, config)?;
    let mode = Arc::new(MatchMode::Inline(aligner));

    // `demux_inline` has no `--output` flag (spec.md §6): prefixes are
    // written relative to the current directory, same as the original.
    let output_dir: std::path::PathBuf = ".".into();
    let workspace = output_dir.join(".fastq-demux-shards");

    eprintln!("{MODULE} starting demux_inline over {} input pair(s)", inputs.len());
    let pipeline_config = PipelineConfig::new(args.common.workers);
    let outcome = pipeline::run(&inputs, table, mode, &workspace, &output_dir, pipeline_config)?;

    if let Some(stats_path) = &args.stats {
        let wrote = stats::write_csv(stats_path, &args.name, &outcome.counters, &adapters)?;
        if !wrote {
            eprintln!("{MODULE} no reads processed; skipping stats output");
        }
    }

    let _ = std::fs::remove_dir(&workspace);
    Ok(())
}

#![feature(let_chains)]

pub(crate) mod align;
pub(crate) mod args;
pub(crate) mod data;
pub(crate) mod error;
pub(crate) mod io;
pub(crate) mod pipeline;
pub(crate) mod processes;
pub(crate) mod stats;

use args::{DemuxBarcodeArgs, DemuxInlineArgs};
use clap::{Parser, Subcommand};
pub use error::DemuxError;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(rename_all = "snake_case")]
enum Commands {
    /// Inline adapter trimming + demultiplexing (spec.md §4.3).
    DemuxInline(DemuxInlineArgs),
    /// Dual-index barcode demultiplexing (spec.md §4.4).
    DemuxBarcode(DemuxBarcodeArgs),
}

impl Cli {
    pub fn run() -> Result<(), DemuxError> {
        let cli = Cli::parse();
        match cli.command {
            Commands::DemuxInline(args) => {
                args::check_paired_input_counts(&args.common, "demux_inline");
                processes::demux_inline::run(args)
            }
            Commands::DemuxBarcode(args) => {
                args::check_paired_input_counts(&args.common, "demux_barcode");
                processes::demux_barcode::run(args)
            }
        }
    }
}

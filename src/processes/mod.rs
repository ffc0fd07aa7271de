//! Top-level orchestration: argument validation, aligner/table construction,
//! pipeline invocation, and the optional statistics report. One module per
//! sub-command, mirroring the teacher's `processes::{standalone,integrated}`
//! layout for its own sub-commands.

pub(crate) mod demux_barcode;
pub(crate) mod demux_inline;

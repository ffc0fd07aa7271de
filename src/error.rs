//! The crate-level error type. Grounded on `irma-core/src/io/mod.rs`'s
//! `OpenFastqError` (a `#[non_exhaustive]` `Display`/`Error` enum) and the
//! teacher's `GetCode` exit-code pattern, reimplemented locally since this
//! crate drops the `zoe` dependency that defines `GetCode` (see DESIGN.md).

use std::fmt;

/// One variant per error kind named in `spec.md` §7.
#[non_exhaustive]
#[derive(Debug)]
pub enum DemuxError {
    /// A named input path/URI does not exist.
    InputNotFound(String, String),
    /// R1/R2 headers disagree, or record counts diverge.
    PairMismatch(String),
    /// Malformed FASTQ or gzip.
    CodecError(String),
    /// Invalid construction-time configuration (`penalty < 1`, `error_rate`
    /// out of range, empty adapter list with no inference source, ...).
    ConfigError(String),
    /// Stats requested but a required counter is absent.
    MissingCounter(String),
    /// Fatal I/O error, typically on write.
    IoError(String, std::io::Error),
}

static MODULE: &str = module_path!();

impl fmt::Display for DemuxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemuxError::InputNotFound(path, cause) => write!(f, "{MODULE}: input not found: {path} ({cause})"),
            DemuxError::PairMismatch(cause) => write!(f, "{MODULE}: read pair mismatch: {cause}"),
            DemuxError::CodecError(cause) => write!(f, "{MODULE}: codec error: {cause}"),
            DemuxError::ConfigError(cause) => write!(f, "{MODULE}: invalid configuration: {cause}"),
            DemuxError::MissingCounter(name) => write!(f, "{MODULE}: missing required counter: {name}"),
            DemuxError::IoError(component, cause) => write!(f, "{MODULE}: I/O error in {component}: {cause}"),
        }
    }
}

impl std::error::Error for DemuxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DemuxError::IoError(_, cause) => Some(cause),
            _ => None,
        }
    }
}

impl DemuxError {
    /// The process exit code this error should produce, per `spec.md` §6
    /// ("non-zero on any fatal error").
    pub fn exit_code(&self) -> i32 {
        match self {
            DemuxError::InputNotFound(..) => 2,
            DemuxError::PairMismatch(_) => 3,
            DemuxError::CodecError(_) => 4,
            DemuxError::ConfigError(_) => 5,
            DemuxError::MissingCounter(_) => 6,
            DemuxError::IoError(..) => 7,
        }
    }
}

impl From<std::io::Error> for DemuxError {
    fn from(e: std::io::Error) -> Self {
        DemuxError::IoError("io".into(), e)
    }
}

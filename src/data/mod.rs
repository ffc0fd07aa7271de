//! The data model: read pairs, barcode tables, and per-worker counters
//! (`spec.md` §3).

pub(crate) mod barcode;
pub(crate) mod counters;

use crate::error::DemuxError;
use crate::io::record::FastQ;

/// Returns the mate designator of a FASTQ header: the segment preceding the
/// first whitespace, with a terminal `/1` or `/2` stripped.
fn mate_designator(header: &str) -> &str {
    let head = header.split_whitespace().next().unwrap_or(header);
    head.strip_suffix("/1").or_else(|| head.strip_suffix("/2")).unwrap_or(head)
}

/// Validates that `r1` and `r2` form a valid [`ReadPair`] per `spec.md` §3:
/// they must share the same header up to the mate designator.
pub(crate) fn pair_headers_match(r1: &FastQ, r2: &FastQ) -> Result<(), DemuxError> {
    let d1 = mate_designator(&r1.header);
    let d2 = mate_designator(&r2.header);
    if d1 == d2 {
        Ok(())
    } else {
        Err(DemuxError::PairMismatch(format!("R1 header '{}' and R2 header '{}' disagree", r1.header, r2.header)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fq(header: &str) -> FastQ {
        FastQ { header: header.to_owned(), sequence: b"ACGT".to_vec(), quality: b"IIII".to_vec() }
    }

    #[test]
    fn identical_headers_match() {
        assert!(pair_headers_match(&fq("read1"), &fq("read1")).is_ok());
    }

    #[test]
    fn mate_suffix_is_ignored() {
        assert!(pair_headers_match(&fq("read1/1"), &fq("read1/2")).is_ok());
    }

    #[test]
    fn trailing_description_is_ignored() {
        assert!(pair_headers_match(&fq("read1 1:N:0:1"), &fq("read1 2:N:0:1")).is_ok());
    }

    #[test]
    fn mismatched_headers_are_rejected() {
        assert!(pair_headers_match(&fq("read1"), &fq("read2")).is_err());
    }
}

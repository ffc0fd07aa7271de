//! Worker — dual-index mode (`spec.md` §4.4).

use crate::align::DualIndexAligner;
use crate::data::barcode::{NO_MATCH, canonicalise};
use crate::data::counters::Counters;
use crate::io::record::FastQ;

/// The barcode substring following the final `:` of a header, per
/// `spec.md` §4.4.
pub(crate) fn extract_barcode(header: &str) -> &str {
    header.rsplit(':').next().unwrap_or(header)
}

/// Processes one validated read pair: extracts the header barcode from R1,
/// canonicalises it if it's a dual-index string, matches it against the
/// adapter list by edit distance, and updates `counters`. Returns the
/// barcode the pair should be written under.
pub(crate) fn process_pair(r1: &FastQ, aligner: &DualIndexAligner, counters: &mut Counters) -> String {
    let raw = extract_barcode(&r1.header);
    let canonical = canonicalise(raw);

    match aligner.find_adapter(&canonical) {
        Some(adapter) => {
            counters.add(adapter, 1);
            counters.add("matched", 1);
            adapter.to_owned()
        }
        None => {
            counters.add("unmatched", 1);
            NO_MATCH.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fq_with_header(header: &str) -> FastQ {
        FastQ { header: header.to_owned(), sequence: b"ACGT".to_vec(), quality: b"IIII".to_vec() }
    }

    #[test]
    fn scenario_4_canonicalisation_matches() {
        let aligner = DualIndexAligner::new(&["AAAAAAAA+GGGGGGGG".to_owned()], 0.1).unwrap();
        let mut counters = Counters::new();
        let r1 = fq_with_header("INSTRUMENT:RUN:FLOWCELL:1:1:1:1:AAAAAAAA+CCCCCCCC");
        let barcode = process_pair(&r1, &aligner, &mut counters);

        assert_eq!(barcode, "AAAAAAAA+GGGGGGGG");
        assert_eq!(counters.get("matched"), Some(1));
        assert_eq!(counters.get("AAAAAAAA+GGGGGGGG"), Some(1));
    }

    #[test]
    fn non_matching_regex_barcode_is_compared_verbatim() {
        // "SAMPLE1EXTRA" doesn't match the dual-index pattern, so it's
        // compared verbatim rather than canonicalised. At error_rate=0.1 the
        // adapter must be at least 10 characters long for even an exact
        // match to clear the strict `edit < floor(|a| * error_rate)`
        // threshold (a 7-character adapter like "SAMPLE1" would have
        // floor(7*0.1) == 0, rejecting distance 0 outright).
        let aligner = DualIndexAligner::new(&["SAMPLE1EXTRA".to_owned()], 0.1).unwrap();
        let mut counters = Counters::new();
        let r1 = fq_with_header("INSTRUMENT:RUN:FLOWCELL:1:1:1:1:SAMPLE1EXTRA");
        let barcode = process_pair(&r1, &aligner, &mut counters);

        assert_eq!(barcode, "SAMPLE1EXTRA");
    }

    #[test]
    fn unmatched_barcode_falls_back_to_no_match() {
        let aligner = DualIndexAligner::new(&["AAAAAAAA+GGGGGGGG".to_owned()], 0.1).unwrap();
        let mut counters = Counters::new();
        let r1 = fq_with_header("INSTRUMENT:RUN:FLOWCELL:1:1:1:1:TTTTTTTT+TTTTTTTT");
        let barcode = process_pair(&r1, &aligner, &mut counters);

        assert_eq!(barcode, NO_MATCH);
        assert_eq!(counters.get("unmatched"), Some(1));
    }
}

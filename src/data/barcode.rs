//! Barcode canonicalisation and the barcode → output-prefix table
//! (`spec.md` §3, §4.2).
//!
//! Grounded on `examples/original_source/fastq.py::IlluminaFASTQ`
//! (`dual_index_pattern`, `convert_barcode`) for the exact dual-index
//! semantics. No `regex` crate appears anywhere in the retrieved pack, so
//! the pattern `[ACGTN]{8}\+[ACGTN]{8}` is validated by hand, in the same
//! plain byte-matching style the teacher uses for header parsing
//! (`utils/paired_reads.rs::get_molecular_id_side`).

use std::collections::HashMap;

/// The sentinel barcode for reads that matched no adapter.
pub(crate) const NO_MATCH: &str = "NO_MATCH";

/// Returns the reverse complement of an ACGTN nucleotide string, pairing
/// A↔T, C↔G, N↔N.
pub(crate) fn reverse_complement(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| match b {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            other => other,
        } as char)
        .collect()
}

/// True iff `s` matches `[ACGTN]{8}\+[ACGTN]{8}`.
pub(crate) fn is_dual_index(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 17 || bytes[8] != b'+' {
        return false;
    }
    let is_acgtn = |b: u8| matches!(b, b'A' | b'C' | b'G' | b'T' | b'N');
    bytes[..8].iter().all(|&b| is_acgtn(b)) && bytes[9..].iter().all(|&b| is_acgtn(b))
}

/// Canonicalises a dual-index barcode as `i7 + "+" + revcomp(i5)`. Strings
/// that don't match the dual-index pattern are returned unchanged ("treated
/// as untransformed barcodes and compared verbatim", `spec.md` §8).
///
/// Idempotent on already-canonical input only when `i5` is a palindrome
/// under the pairing or the caller never re-applies it to an already
/// reverse-complemented i5 — matching `spec.md` invariant 5, canonicalising
/// twice from the *original* representation is not meaningful; canonicalise
/// exactly once per observed barcode.
pub(crate) fn canonicalise(barcode: &str) -> String {
    if !is_dual_index(barcode) {
        return barcode.to_owned();
    }
    let (i7, rest) = barcode.split_at(8);
    let i5 = &rest[1..];
    format!("{i7}+{}", reverse_complement(i5))
}

/// Maps barcodes to output prefixes. Multiple barcodes may alias the same
/// prefix (`spec.md` §3): their reads are multiplexed into one output pair.
/// `NO_MATCH` is always present, defaulting to an empty (discard) prefix.
pub(crate) struct BarcodeTable {
    prefixes: HashMap<String, String>,
    /// Adapters in insertion order — "first match wins" (`spec.md` §9).
    order: Vec<String>,
}

impl BarcodeTable {
    /// Builds a table from an ordered `(barcode_or_group, prefix)` list,
    /// expanding whitespace-separated groups into aliases of one prefix.
    /// `unmatched_prefix` is the explicit `NO_MATCH` sink, if any.
    pub(crate) fn new(entries: &[(Vec<String>, String)], unmatched_prefix: Option<String>) -> BarcodeTable {
        let mut prefixes = HashMap::new();
        let mut order = Vec::new();

        for (barcodes, prefix) in entries {
            for barcode in barcodes {
                prefixes.insert(barcode.clone(), prefix.clone());
                order.push(barcode.clone());
            }
        }

        prefixes.insert(NO_MATCH.to_owned(), unmatched_prefix.unwrap_or_default());

        BarcodeTable { prefixes, order }
    }

    /// Adapters in the order they should be tested ("first match wins").
    pub(crate) fn adapters_in_order(&self) -> &[String] {
        &self.order
    }

    /// The output prefix for `barcode`, or `None` if the barcode is unknown
    /// (callers should fall back to `NO_MATCH`).
    pub(crate) fn prefix_for(&self, barcode: &str) -> Option<&str> {
        self.prefixes.get(barcode).map(String::as_str)
    }

    /// All unique, non-empty prefixes this table will ever write to (used to
    /// pre-open shard writers before the hot loop, per `spec.md` §9's
    /// "alias set must be constructed before the hot loop" design note).
    pub(crate) fn unique_prefixes(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for prefix in self.prefixes.values() {
            if !prefix.is_empty() && seen.insert(prefix.as_str()) {
                out.push(prefix.as_str());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_complement_pairs_bases() {
        assert_eq!(reverse_complement("ACGTN"), "NACGT");
    }

    #[test]
    fn dual_index_pattern_recognised() {
        assert!(is_dual_index("AAAAAAAA+CCCCCCCC"));
        assert!(!is_dual_index("AAAAAAAA"));
        assert!(!is_dual_index("AAAAAAAAX+CCCCCCCC"));
    }

    #[test]
    fn canonicalisation_matches_scenario_4() {
        // header barcode AAAAAAAA+CCCCCCCC, adapter AAAAAAAA+GGGGGGGG
        // since revcomp(CCCCCCCC) = GGGGGGGG.
        assert_eq!(canonicalise("AAAAAAAA+CCCCCCCC"), "AAAAAAAA+GGGGGGGG");
    }

    #[test]
    fn non_dual_index_is_passed_through() {
        assert_eq!(canonicalise("ACGTACGT"), "ACGTACGT");
    }

    #[test]
    fn canonicalisation_is_idempotent_on_palindromic_i5() {
        // i5 = "ACGTACGT" reverse-complements to itself under A<->T, C<->G.
        let b = "AAAAAAAA+ACGTACGT";
        assert_eq!(canonicalise(&canonicalise(b)), canonicalise(b));
    }

    #[test]
    fn barcode_table_expands_groups_and_has_no_match() {
        let table = BarcodeTable::new(&[(vec!["AAAA".into(), "TTTT".into()], "sampleA".into())], Some("unmatched".into()));
        assert_eq!(table.prefix_for("AAAA"), Some("sampleA"));
        assert_eq!(table.prefix_for("TTTT"), Some("sampleA"));
        assert_eq!(table.prefix_for(NO_MATCH), Some("unmatched"));
        assert_eq!(table.adapters_in_order(), ["AAAA", "TTTT"]);
    }

    #[test]
    fn unique_prefixes_are_deduplicated() {
        let table = BarcodeTable::new(
            &[(vec!["AAAA".into()], "sampleA".into()), (vec!["TTTT".into()], "sampleA".into())],
            None,
        );
        assert_eq!(table.unique_prefixes(), vec!["sampleA"]);
    }
}

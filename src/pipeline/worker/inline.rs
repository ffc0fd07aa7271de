//! Worker — inline mode (`spec.md` §4.3).

use crate::align::InlineAligner;
use crate::data::barcode::NO_MATCH;
use crate::data::counters::Counters;
use crate::io::record::FastQ;

/// Processes one validated read pair: locates and trims adapters on both
/// ends, picks the effective barcode, and updates `counters`. Returns the
/// barcode the pair should be written under.
pub(crate) fn process_pair(r1: &mut FastQ, r2: &mut FastQ, aligner: &InlineAligner, counters: &mut Counters) -> String {
    let a1 = aligner.find_adapter(&r1.sequence).map(|(name, trim)| (name.to_owned(), trim));
    let a2 = aligner.find_adapter(&r2.sequence).map(|(name, trim)| (name.to_owned(), trim));

    if let Some((name, trim)) = &a1 {
        r1.trim_left(*trim);
        counters.add(&format!("{name}_1"), 1);
    }
    if let Some((name, trim)) = &a2 {
        r2.trim_left(*trim);
        counters.add(&format!("{name}_2"), 1);
    }

    let name1 = a1.map(|(name, _)| name).unwrap_or_default();
    let name2 = a2.map(|(name, _)| name).unwrap_or_default();

    // effective barcode: longer adapter wins; ties (including both empty)
    // resolve to the empty string, which becomes NO_MATCH below.
    let winner = if name1.len() > name2.len() { name1 } else { name2 };

    if winner.is_empty() {
        counters.add("unmatched", 1);
        NO_MATCH.to_owned()
    } else {
        counters.add(&winner, 1);
        counters.add("matched", 1);
        winner
    }
}

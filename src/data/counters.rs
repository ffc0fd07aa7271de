//! Per-worker counters (`spec.md` §3, §4.5, §4.7). Grounded on the teacher's
//! `utils::SeedableFoldHashMap` construction (a `foldhash`-backed map,
//! seedable via `IRMA_SEED` for reproducible runs); this crate reuses the
//! same hasher but doesn't need the seedable-vs-random split since counter
//! maps have no adversarial-input surface, so a single `foldhash` map
//! suffices.

use foldhash::fast::RandomState;
use std::collections::HashMap;

/// `string -> u64` counts, merged across workers by summation at shutdown
/// (`spec.md` §3, §9 "Counter aggregation across workers").
#[derive(Debug, Default, Clone)]
pub(crate) struct Counters {
    counts: HashMap<String, u64, RandomState>,
}

impl Counters {
    pub(crate) fn new() -> Counters {
        Counters { counts: HashMap::with_hasher(RandomState::default()) }
    }

    #[inline]
    pub(crate) fn add(&mut self, key: &str, delta: u64) {
        *self.counts.entry(key.to_owned()).or_insert(0) += delta;
    }

    #[inline]
    pub(crate) fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    /// Sums all per-worker counter maps into one, key by key. Pure
    /// summation performed after every worker has exited — no locks on the
    /// hot path (`spec.md` §5).
    pub(crate) fn merge_all(workers: impl IntoIterator<Item = Counters>) -> Counters {
        let mut merged = Counters::new();
        for worker in workers {
            for (key, value) in worker.counts {
                merged.add(&key, value);
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates() {
        let mut c = Counters::new();
        c.add("total", 3);
        c.add("total", 4);
        assert_eq!(c.get("total"), Some(7));
    }

    #[test]
    fn merge_all_sums_across_workers() {
        let mut a = Counters::new();
        a.add("total", 5);
        a.add("matched", 2);
        let mut b = Counters::new();
        b.add("total", 10);
        b.add("matched", 1);

        let merged = Counters::merge_all([a, b]);
        assert_eq!(merged.get("total"), Some(15));
        assert_eq!(merged.get("matched"), Some(3));
    }

    #[test]
    fn conservation_invariant() {
        // invariant 1: total = matched + unmatched
        let mut c = Counters::new();
        c.add("matched", 7);
        c.add("unmatched", 3);
        c.add("total", 10);
        assert_eq!(c.get("total"), Some(c.get("matched").unwrap() + c.get("unmatched").unwrap()));
    }
}

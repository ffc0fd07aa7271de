//! The two worker flavours (`spec.md` §4.3, §4.4). Both share the same
//! shard-writing and counter contract; only the per-pair matching algorithm
//! differs, so each lives in its own small module rather than behind a
//! shared trait object — mirrors the teacher's preference for a concrete
//! `match` over the mode enum at the one call site that needs it
//! (`pipeline::MatchMode`, `pipeline::mod.rs`).

pub(crate) mod dual_index;
pub(crate) mod inline;

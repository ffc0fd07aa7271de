//! The Writer component (`spec.md` §4.2): one gzip output pair per unique
//! prefix, owned exclusively by a single worker, created lazily on first
//! write, guaranteed to be released (flushed and have its gzip trailer
//! written) on any exit path including a panic.
//!
//! Grounded on the teacher's scoped-writer idiom in
//! `processes/standalone/aligner/writers.rs::AlignmentWriterThreaded` (own
//! the handle for the worker's lifetime, release explicitly at the end, but
//! also rely on `Drop` as the panic-safety net) and `io/writers.rs`'s
//! `PairedWriters` for the R1/R2 pairing.

use crate::data::barcode::BarcodeTable;
use crate::error::DemuxError;
use crate::io::record::FastQ;
use crate::io::writers::PairedWriters;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct ShardEntry {
    paired: PairedWriters,
    path1: PathBuf,
    path2: PathBuf,
}

/// Builds the two shard file paths for a worker's output under `prefix`,
/// per `spec.md` §3: `(p_i.R1.fastq.gz, p_i.R2.fastq.gz)`.
fn shard_paths(workspace: &Path, prefix: &str, worker_id: usize) -> (PathBuf, PathBuf) {
    (
        workspace.join(format!("{prefix}_{worker_id}.R1.fastq.gz")),
        workspace.join(format!("{prefix}_{worker_id}.R2.fastq.gz")),
    )
}

/// A single worker's private shard set: one lazily-opened `(R1, R2)` output
/// pair per prefix it has written to.
pub(crate) struct ShardWriter {
    table: Arc<BarcodeTable>,
    workspace: PathBuf,
    worker_id: usize,
    open: HashMap<String, ShardEntry>,
}

impl ShardWriter {
    /// Creates `workspace` (a worker-unique subdirectory under the run's
    /// shard workspace) before any shard file is opened under it —
    /// `PairedWriters::create` → `File::create` does not create parent
    /// directories on its own.
    pub(crate) fn new(table: Arc<BarcodeTable>, workspace: PathBuf, worker_id: usize) -> Result<ShardWriter, DemuxError> {
        std::fs::create_dir_all(&workspace)
            .map_err(|e| DemuxError::IoError(format!("creating shard workspace {}", workspace.display()), e))?;
        Ok(ShardWriter { table, workspace, worker_id, open: HashMap::new() })
    }

    /// Writes `(r1, r2)` under `barcode`'s output prefix. A missing or empty
    /// prefix (including a discard-configured `NO_MATCH`) silently drops the
    /// pair, per `spec.md` §4.2.
    pub(crate) fn write(&mut self, barcode: &str, r1: &FastQ, r2: &FastQ) -> Result<(), DemuxError> {
        let Some(prefix) = self.table.prefix_for(barcode) else {
            return Ok(());
        };
        if prefix.is_empty() {
            return Ok(());
        }
        let prefix = prefix.to_owned();

        if !self.open.contains_key(&prefix) {
            let (path1, path2) = shard_paths(&self.workspace, &prefix, self.worker_id);
            let paired = PairedWriters::create(&path1, &path2)
                .map_err(|e| DemuxError::IoError(format!("shard writer for prefix '{prefix}'"), e))?;
            self.open.insert(prefix.clone(), ShardEntry { paired, path1, path2 });
        }

        let entry = self.open.get_mut(&prefix).unwrap();
        r1.write_to(&mut entry.paired.writer1)
            .and_then(|()| r2.write_to(&mut entry.paired.writer2))
            .map_err(|e| DemuxError::IoError(format!("shard writer for prefix '{prefix}'"), e))
    }

    /// Flushes and finishes every open shard, returning the
    /// `(prefix, r1_path, r2_path)` list for the Concatenator. Scoped
    /// release: called on every normal worker exit path.
    pub(crate) fn finish(mut self) -> Result<Vec<(String, PathBuf, PathBuf)>, DemuxError> {
        let mut shards = Vec::with_capacity(self.open.len());
        for (prefix, entry) in self.open.drain() {
            entry.paired.finish().map_err(|e| DemuxError::IoError(format!("closing shard for prefix '{prefix}'"), e))?;
            shards.push((prefix, entry.path1, entry.path2));
        }
        Ok(shards)
    }
}

impl Drop for ShardWriter {
    /// Best-effort flush on any exit path, including unwinding from a
    /// panic. `finish` is the normal release path; this is the safety net
    /// `spec.md` §4.2 requires ("guaranteed to be released on any worker
    /// exit path, including panics").
    fn drop(&mut self) {
        for entry in self.open.values_mut() {
            let _ = entry.paired.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::barcode::NO_MATCH;
    use tempfile::tempdir;

    fn fq() -> FastQ {
        FastQ { header: "r".into(), sequence: b"ACGT".to_vec(), quality: b"IIII".to_vec() }
    }

    #[test]
    fn new_creates_a_nonexistent_worker_subdirectory() {
        let dir = tempdir().unwrap();
        let worker_dir = dir.path().join("worker-0");
        assert!(!worker_dir.exists());

        let table = Arc::new(BarcodeTable::new(&[(vec!["AAAA".into()], "sampleA".into())], None));
        let mut writer = ShardWriter::new(table, worker_dir.clone(), 0).expect("workspace should be created");
        assert!(worker_dir.exists());

        writer.write("AAAA", &fq(), &fq()).expect("write should succeed once the workspace exists");
        let shards = writer.finish().unwrap();
        assert_eq!(shards.len(), 1);
        assert!(shards[0].1.exists());
    }

    #[test]
    fn discarded_barcodes_never_touch_the_filesystem() {
        let dir = tempdir().unwrap();
        let worker_dir = dir.path().join("worker-1");
        let table = Arc::new(BarcodeTable::new(&[(vec!["AAAA".into()], "sampleA".into())], None));
        let mut writer = ShardWriter::new(table, worker_dir, 0).unwrap();
        writer.write(NO_MATCH, &fq(), &fq()).unwrap();
        assert!(writer.finish().unwrap().is_empty());
    }
}

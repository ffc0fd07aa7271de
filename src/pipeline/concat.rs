//! The Concatenator (`spec.md` §4.6): after all workers exit, stitch
//! per-worker shards into one final output pair per prefix, then remove the
//! shards. gzip is concatenative at member boundaries, so the shards'
//! bytes are copied as-is — no re-encoding.
//!
//! Grounded on `examples/original_source/fastq/demux.py
//! ::DemultiplexProcess.prepare_concatenation`/`concatenate_fastq` for the
//! dedup-then-append-in-worker-order behaviour (the original shells out to
//! `cat`; this does the equivalent with `std::io::copy`).

use crate::error::DemuxError;
use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// `(worker_id, shards)` pairs, where each shard is
/// `(prefix, r1_path, r2_path)`. Worker order matters: output preserves the
/// order in which workers are enumerated here (`spec.md` §4.6 "preserving
/// worker order").
pub(crate) fn concatenate(
    shards_by_worker: Vec<(usize, Vec<(String, PathBuf, PathBuf)>)>, output_dir: &Path,
) -> Result<(), DemuxError> {
    let mut by_prefix: HashMap<String, Vec<(PathBuf, PathBuf)>> = HashMap::new();
    let mut order = Vec::new();

    let mut shards_by_worker = shards_by_worker;
    shards_by_worker.sort_by_key(|(worker_id, _)| *worker_id);

    for (_, shards) in shards_by_worker {
        for (prefix, path1, path2) in shards {
            if !by_prefix.contains_key(&prefix) {
                order.push(prefix.clone());
            }
            by_prefix.entry(prefix).or_default().push((path1, path2));
        }
    }

    for prefix in order {
        let mut paths = by_prefix.remove(&prefix).unwrap_or_default();
        // dedup while preserving the first occurrence's position (spec.md §4.6).
        let mut seen = HashSet::new();
        paths.retain(|(p1, p2)| seen.insert((p1.clone(), p2.clone())));

        let out1 = output_dir.join(format!("{prefix}.R1.fastq.gz"));
        let out2 = output_dir.join(format!("{prefix}.R2.fastq.gz"));
        concat_into(paths.iter().map(|(p, _)| p.as_path()), &out1)?;
        concat_into(paths.iter().map(|(_, p)| p.as_path()), &out2)?;

        for (p1, p2) in &paths {
            std::fs::remove_file(p1).map_err(|e| DemuxError::IoError(format!("removing shard {}", p1.display()), e))?;
            std::fs::remove_file(p2).map_err(|e| DemuxError::IoError(format!("removing shard {}", p2.display()), e))?;
        }
    }

    Ok(())
}

fn concat_into<'a>(shard_paths: impl Iterator<Item = &'a Path>, out_path: &Path) -> Result<(), DemuxError> {
    let out_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(out_path)
        .map_err(|e| DemuxError::IoError(format!("creating {}", out_path.display()), e))?;
    let mut out = BufWriter::new(out_file);

    for shard_path in shard_paths {
        let mut shard = File::open(shard_path).map_err(|e| DemuxError::IoError(format!("opening shard {}", shard_path.display()), e))?;
        std::io::copy(&mut shard, &mut out)
            .map_err(|e| DemuxError::IoError(format!("appending shard {}", shard_path.display()), e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn concatenates_shards_in_worker_order_and_dedupes() {
        let dir = tempdir().unwrap();
        let w0_1 = dir.path().join("sampleA_0.R1.fastq.gz");
        let w0_2 = dir.path().join("sampleA_0.R2.fastq.gz");
        let w1_1 = dir.path().join("sampleA_1.R1.fastq.gz");
        let w1_2 = dir.path().join("sampleA_1.R2.fastq.gz");

        File::create(&w0_1).unwrap().write_all(b"first").unwrap();
        File::create(&w0_2).unwrap().write_all(b"first-r2").unwrap();
        File::create(&w1_1).unwrap().write_all(b"second").unwrap();
        File::create(&w1_2).unwrap().write_all(b"second-r2").unwrap();

        let shards = vec![
            (1, vec![("sampleA".to_owned(), w1_1.clone(), w1_2.clone())]),
            (0, vec![("sampleA".to_owned(), w0_1.clone(), w0_2.clone())]),
        ];

        concatenate(shards, dir.path()).unwrap();

        let out1 = std::fs::read(dir.path().join("sampleA.R1.fastq.gz")).unwrap();
        let out2 = std::fs::read(dir.path().join("sampleA.R2.fastq.gz")).unwrap();
        assert_eq!(out1, b"firstsecond");
        assert_eq!(out2, b"first-r2second-r2");
        assert!(!w0_1.exists());
        assert!(!w1_1.exists());
    }
}

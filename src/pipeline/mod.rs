//! The Pipeline (`spec.md` §4.5): one reader task, a bounded input queue, a
//! worker pool, a progress reporter, and poison-pill shutdown.
//!
//! Grounded on the teacher's own thread+channel idioms rather than
//! `rayon` (see DESIGN.md): `io/readers.rs::spawn_decoder` for the
//! dedicated-thread-plus-channel shape, and
//! `processes/standalone/aligner/writers.rs::AlignmentWriterThreaded` for
//! the "one thread owns the resource, release it explicitly, `Drop` is the
//! safety net" pattern reused by [`shard_writer::ShardWriter`].

pub(crate) mod concat;
pub(crate) mod shard_writer;
pub(crate) mod worker;

use crate::align::{DualIndexAligner, InlineAligner};
use crate::data::barcode::BarcodeTable;
use crate::data::counters::Counters;
use crate::data::pair_headers_match;
use crate::error::DemuxError;
use crate::io::record::FastQ;
use crate::io::readers::open_fastq_files;
use shard_writer::ShardWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

static MODULE: &str = module_path!();

/// Which matching algorithm this run uses (`spec.md` §4.3/§4.4).
pub(crate) enum MatchMode {
    Inline(InlineAligner),
    DualIndex(DualIndexAligner),
}

/// Tunables from `spec.md` §4.5 ("Reader... batches of `B` pairs
/// (configurable, default 5,000)... bounded input queue of capacity `Q`
/// (default `2W`)").
#[derive(Debug, Clone, Copy)]
pub(crate) struct PipelineConfig {
    pub(crate) batch_size: usize,
    pub(crate) num_workers: usize,
    pub(crate) queue_capacity: usize,
}

impl PipelineConfig {
    pub(crate) fn new(num_workers: Option<usize>) -> PipelineConfig {
        let num_workers = num_workers.unwrap_or_else(num_cpus::get).max(1);
        PipelineConfig { batch_size: 5_000, num_workers, queue_capacity: 2 * num_workers }
    }
}

pub(crate) struct PipelineOutcome {
    pub(crate) counters: Counters,
}

enum Job {
    Batch(Vec<(FastQ, FastQ)>),
    Poison,
}

/// Records the first fatal error seen by any thread and flips `aborted` so
/// the rest of the pipeline winds down without deadlocking on the bounded
/// queue (`spec.md` §5 "Cancellation").
fn report_error(first_error: &Mutex<Option<DemuxError>>, aborted: &AtomicBool, err: DemuxError) {
    aborted.store(true, Ordering::SeqCst);
    let mut slot = first_error.lock().unwrap();
    if slot.is_none() {
        *slot = Some(err);
    }
}

/// Runs the full demultiplexing pipeline over `inputs` (a sequential list of
/// R1/R2 path pairs) and returns the merged counters on success. On a fatal
/// error, shards from the failed run are left on disk under `workspace` and
/// the Concatenator is never invoked (`spec.md` §7).
pub(crate) fn run(
    inputs: &[(PathBuf, PathBuf)], table: Arc<BarcodeTable>, mode: Arc<MatchMode>, workspace: &Path, output_dir: &Path,
    config: PipelineConfig,
) -> Result<PipelineOutcome, DemuxError> {
    std::fs::create_dir_all(workspace)?;
    std::fs::create_dir_all(output_dir)?;

    let (batch_tx, batch_rx) = mpsc::sync_channel::<Job>(config.queue_capacity);
    let batch_rx = Arc::new(Mutex::new(batch_rx));
    let (progress_tx, progress_rx) = mpsc::channel::<usize>();
    let (shard_tx, shard_rx) = mpsc::channel::<(usize, Vec<(String, PathBuf, PathBuf)>)>();

    let aborted = Arc::new(AtomicBool::new(false));
    let first_error: Arc<Mutex<Option<DemuxError>>> = Arc::new(Mutex::new(None));

    let reader_handle = spawn_reader(inputs.to_vec(), batch_tx, config, Arc::clone(&aborted));

    let mut worker_handles = Vec::with_capacity(config.num_workers);
    for worker_id in 0..config.num_workers {
        worker_handles.push(spawn_worker(
            worker_id,
            Arc::clone(&batch_rx),
            progress_tx.clone(),
            shard_tx.clone(),
            Arc::clone(&table),
            Arc::clone(&mode),
            workspace.join(format!("worker-{worker_id}")),
            Arc::clone(&aborted),
            Arc::clone(&first_error),
        ));
    }
    drop(progress_tx);
    drop(shard_tx);

    let progress_handle = thread::spawn(move || {
        let mut total: u64 = 0;
        let mut last_logged: u64 = 0;
        while let Ok(batch_len) = progress_rx.recv() {
            total += batch_len as u64;
            if total - last_logged >= 10_000 {
                eprintln!("{MODULE} processed {total} read pairs");
                last_logged = total;
            }
        }
    });

    if let Err(e) = reader_handle.join().unwrap() {
        report_error(&first_error, &aborted, e);
    }

    let mut worker_counters = Vec::with_capacity(worker_handles.len());
    for handle in worker_handles {
        worker_counters.push(handle.join().unwrap());
    }
    progress_handle.join().unwrap();

    let mut shards_by_worker = Vec::new();
    while let Ok(entry) = shard_rx.recv() {
        shards_by_worker.push(entry);
    }

    let merged = Counters::merge_all(worker_counters);

    if let Some(err) = first_error.lock().unwrap().take() {
        return Err(err);
    }

    concat::concatenate(shards_by_worker, output_dir)?;

    Ok(PipelineOutcome { counters: merged })
}

/// Reads every input pair sequentially in batches of `config.batch_size`,
/// pushing each onto the bounded queue. On EOF (or abort), enqueues one
/// poison per worker so every worker observes exactly one shutdown signal.
fn spawn_reader(
    inputs: Vec<(PathBuf, PathBuf)>, batch_tx: mpsc::SyncSender<Job>, config: PipelineConfig, aborted: Arc<AtomicBool>,
) -> thread::JoinHandle<Result<(), DemuxError>> {
    thread::spawn(move || -> Result<(), DemuxError> {
        'inputs: for (path1, path2) in inputs {
            let (reader1, reader2, io_threads) = open_fastq_files(&path1, &path2)?;

            let mut paired = reader1.zip(reader2);
            loop {
                if aborted.load(Ordering::SeqCst) {
                    break 'inputs;
                }

                let mut batch = Vec::with_capacity(config.batch_size);
                while batch.len() < config.batch_size {
                    match paired.next() {
                        Some((r1, r2)) => {
                            let r1 = r1?;
                            let r2 = r2?;
                            pair_headers_match(&r1, &r2)?;
                            batch.push((r1, r2));
                        }
                        None => break,
                    }
                }

                if batch.is_empty() {
                    break;
                }
                if batch_tx.send(Job::Batch(batch)).is_err() {
                    break 'inputs;
                }
            }

            io_threads.finalize()?;
        }

        for _ in 0..config.num_workers {
            let _ = batch_tx.send(Job::Poison);
        }
        Ok(())
    })
}

#[allow(clippy::too_many_arguments)]
fn spawn_worker(
    worker_id: usize, batch_rx: Arc<Mutex<mpsc::Receiver<Job>>>, progress_tx: mpsc::Sender<usize>,
    shard_tx: mpsc::Sender<(usize, Vec<(String, PathBuf, PathBuf)>)>, table: Arc<BarcodeTable>, mode: Arc<MatchMode>,
    shard_workspace: PathBuf, aborted: Arc<AtomicBool>, first_error: Arc<Mutex<Option<DemuxError>>>,
) -> thread::JoinHandle<Counters> {
    thread::spawn(move || -> Counters {
        let mut counters = Counters::new();
        let mut shard_writer = match ShardWriter::new(Arc::clone(&table), shard_workspace, worker_id) {
            Ok(writer) => writer,
            Err(e) => {
                report_error(&first_error, &aborted, e);
                return counters;
            }
        };

        loop {
            let job = {
                let receiver = batch_rx.lock().unwrap();
                receiver.recv()
            };

            let batch = match job {
                Ok(Job::Batch(batch)) => batch,
                Ok(Job::Poison) | Err(_) => break,
            };

            if aborted.load(Ordering::SeqCst) {
                continue;
            }

            let batch_len = batch.len();
            counters.add("total", batch_len as u64);

            for (mut r1, mut r2) in batch {
                let barcode = match mode.as_ref() {
                    MatchMode::Inline(aligner) => worker::inline::process_pair(&mut r1, &mut r2, aligner, &mut counters),
                    MatchMode::DualIndex(aligner) => worker::dual_index::process_pair(&r1, aligner, &mut counters),
                };

                if let Err(e) = shard_writer.write(&barcode, &r1, &r2) {
                    report_error(&first_error, &aborted, e);
                    break;
                }
            }

            let _ = progress_tx.send(batch_len);
        }

        if first_error.lock().unwrap().is_none() {
            match shard_writer.finish() {
                Ok(shards) => {
                    let _ = shard_tx.send((worker_id, shards));
                }
                Err(e) => report_error(&first_error, &aborted, e),
            }
        }

        counters
    })
}

//! Opening paired FASTQ input, gzip-aware. Adapted from `irma-core`'s
//! `io/readers.rs`: the same "decode on a dedicated thread, hand the reader
//! side of an OS pipe to the parser" trick (`GzipReaderPiped`), without the
//! `define_whichever!` macro — only two variants are needed here, so a
//! hand-written enum reads just as clearly.

use super::{is_gz, record::FastQReader};
use crate::error::DemuxError;
use flate2::read::MultiGzDecoder;
use std::{
    fs::File,
    io::{BufReader, PipeReader, Read},
    path::Path,
    thread::{self, JoinHandle},
};

/// Either a plain file or the read end of a pipe fed by a decoder thread.
pub(crate) enum ReadFileZip {
    File(File),
    Zipped(PipeReader),
}

impl Read for ReadFileZip {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            ReadFileZip::File(f) => f.read(buf),
            ReadFileZip::Zipped(p) => p.read(buf),
        }
    }
}

pub(crate) type FastQReaderDx = FastQReader<BufReader<ReadFileZip>>;

/// The handle for a thread used purely for gzip decoding.
pub(crate) type IoThread = JoinHandle<std::io::Result<()>>;

/// Optional join handles for the decoder threads backing a pair of inputs.
pub(crate) struct IoThreads(Option<IoThread>, Option<IoThread>);

impl IoThreads {
    pub(crate) fn finalize(self) -> std::io::Result<()> {
        if let Some(thread1) = self.0 {
            thread1.join().unwrap()?;
        }
        if let Some(thread2) = self.1 {
            thread2.join().unwrap()?;
        }
        Ok(())
    }
}

/// Opens a single FASTQ file, spawning a decoder thread if it ends in `.gz`.
pub(crate) fn open_fastq_file(path: impl AsRef<Path>) -> std::io::Result<(FastQReaderDx, Option<IoThread>)> {
    if is_gz(&path) {
        let (pipe, thread) = spawn_decoder(&path)?;
        Ok((FastQReader::new(BufReader::new(ReadFileZip::Zipped(pipe))), Some(thread)))
    } else {
        let file = File::open(&path)?;
        Ok((FastQReader::new(BufReader::new(ReadFileZip::File(file))), None))
    }
}

/// Opens a paired-end input: both R1 and R2 are required (this spec only
/// ever demultiplexes paired reads).
pub(crate) fn open_fastq_files(
    path1: impl AsRef<Path>, path2: impl AsRef<Path>,
) -> Result<(FastQReaderDx, FastQReaderDx, IoThreads), DemuxError> {
    let (reader1, thread1) = open_fastq_file(&path1)
        .map_err(|e| DemuxError::InputNotFound(path1.as_ref().display().to_string(), e.to_string()))?;
    let (reader2, thread2) = open_fastq_file(&path2)
        .map_err(|e| DemuxError::InputNotFound(path2.as_ref().display().to_string(), e.to_string()))?;
    Ok((reader1, reader2, IoThreads(thread1, thread2)))
}

/// Spawns a thread decoding `file_path` with [`MultiGzDecoder`], writing the
/// decompressed bytes into the write end of an anonymous pipe.
fn spawn_decoder(file_path: impl AsRef<Path>) -> std::io::Result<(PipeReader, IoThread)> {
    let (reader, mut writer) = std::io::pipe()?;
    let mut decoder = MultiGzDecoder::new(File::open(file_path)?);

    let thread = thread::spawn(move || -> std::io::Result<()> {
        std::io::copy(&mut decoder, &mut writer)?;
        Ok(())
    });

    Ok((reader, thread))
}

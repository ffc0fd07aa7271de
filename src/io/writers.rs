//! Output file handles. Adapted from `irma-core`'s `io/writers.rs`
//! (`WriteFileZipStdout`, `PairedWriters`), trimmed to the two variants this
//! spec actually produces: plain file and gzip file. Output prefixes are
//! never optional here (unlike the teacher's stdout-as-default CLI tools),
//! so the `Stdout` variant and `Default` impl are dropped.

use flate2::{Compression, write::GzEncoder};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use super::is_gz;

/// A writer for either a regular or gzip-compressed file. A [`BufWriter`] is
/// used for both variants.
pub(crate) enum WriteFileZip {
    File(BufWriter<File>),
    Zipped(GzEncoder<BufWriter<File>>),
}

impl Write for WriteFileZip {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            WriteFileZip::File(w) => w.write(buf),
            WriteFileZip::Zipped(w) => w.write(buf),
        }
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            WriteFileZip::File(w) => w.flush(),
            WriteFileZip::Zipped(w) => w.flush(),
        }
    }
}

impl WriteFileZip {
    pub(crate) fn create(path: impl AsRef<Path>) -> std::io::Result<WriteFileZip> {
        let file = File::create(&path)?;
        let buf_writer = BufWriter::new(file);

        Ok(if is_gz(&path) {
            WriteFileZip::Zipped(GzEncoder::new(buf_writer, Compression::default()))
        } else {
            WriteFileZip::File(buf_writer)
        })
    }

    /// Consumes the writer, flushing and finishing the gzip stream if
    /// applicable. Every shard and final output is closed this way so that
    /// gzip members are properly terminated before concatenation.
    pub(crate) fn finish(self) -> std::io::Result<()> {
        match self {
            WriteFileZip::File(mut w) => w.flush(),
            WriteFileZip::Zipped(w) => w.finish().map(|_| ()),
        }
    }
}

pub(crate) fn create_writer(path: impl AsRef<Path>) -> std::io::Result<WriteFileZip> {
    WriteFileZip::create(path)
}

/// A pair of writers for R1/R2 output.
pub(crate) struct PairedWriters {
    pub(crate) writer1: WriteFileZip,
    pub(crate) writer2: WriteFileZip,
}

impl PairedWriters {
    pub(crate) fn create(path1: impl AsRef<Path>, path2: impl AsRef<Path>) -> std::io::Result<PairedWriters> {
        Ok(PairedWriters { writer1: WriteFileZip::create(path1)?, writer2: WriteFileZip::create(path2)? })
    }

    pub(crate) fn flush(&mut self) -> std::io::Result<()> {
        self.writer1.flush()?;
        self.writer2.flush()
    }

    pub(crate) fn finish(self) -> std::io::Result<()> {
        self.writer1.finish()?;
        self.writer2.finish()
    }
}

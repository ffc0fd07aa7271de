//! The FASTQ record codec. `spec.md` treats this as an external collaborator;
//! this build implements it directly since the teacher's record types
//! (`zoe::data::types::fastq::FastQ`) aren't carried over (see DESIGN.md).

use crate::error::DemuxError;
use std::io::{BufRead, Write};

/// A single FASTQ record: header (without the leading `@`), sequence, and
/// quality string. `spec.md` §3 requires `|sequence| == |quality|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FastQ {
    pub(crate) header: String,
    pub(crate) sequence: Vec<u8>,
    pub(crate) quality: Vec<u8>,
}

impl FastQ {
    /// Truncates sequence and quality on the left, keeping bytes from `start`
    /// onward. Used by inline-mode adapter trimming.
    pub(crate) fn trim_left(&mut self, start: usize) {
        self.sequence.drain(..start);
        self.quality.drain(..start);
    }

    pub(crate) fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(b"@")?;
        w.write_all(self.header.as_bytes())?;
        w.write_all(b"\n")?;
        w.write_all(&self.sequence)?;
        w.write_all(b"\n+\n")?;
        w.write_all(&self.quality)?;
        w.write_all(b"\n")
    }
}

/// Iterator over 4-line FASTQ records read from any [`BufRead`].
pub(crate) struct FastQReader<R> {
    inner: R,
    line: String,
}

impl<R: BufRead> FastQReader<R> {
    pub(crate) fn new(inner: R) -> FastQReader<R> {
        FastQReader { inner, line: String::new() }
    }

    fn read_line(&mut self) -> std::io::Result<Option<&str>> {
        self.line.clear();
        let bytes_read = self.inner.read_line(&mut self.line)?;
        if bytes_read == 0 {
            Ok(None)
        } else {
            let trimmed_len = self.line.trim_end_matches(['\n', '\r']).len();
            self.line.truncate(trimmed_len);
            Ok(Some(&self.line))
        }
    }
}

impl<R: BufRead> Iterator for FastQReader<R> {
    type Item = Result<FastQ, DemuxError>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = match self.read_line() {
            Ok(Some(line)) => line.to_owned(),
            Ok(None) => return None,
            Err(e) => return Some(Err(DemuxError::CodecError(e.to_string()))),
        };

        let Some(header) = header.strip_prefix('@') else {
            return Some(Err(DemuxError::CodecError(format!("expected a header line starting with '@', got: {header}"))));
        };
        let header = header.to_owned();

        let sequence = match self.read_line() {
            Ok(Some(line)) => line.as_bytes().to_vec(),
            Ok(None) => return Some(Err(DemuxError::CodecError("truncated record: missing sequence line".into()))),
            Err(e) => return Some(Err(DemuxError::CodecError(e.to_string()))),
        };

        let plus_line = match self.read_line() {
            Ok(Some(line)) => line.to_owned(),
            Ok(None) => return Some(Err(DemuxError::CodecError("truncated record: missing '+' line".into()))),
            Err(e) => return Some(Err(DemuxError::CodecError(e.to_string()))),
        };
        if !plus_line.starts_with('+') {
            return Some(Err(DemuxError::CodecError(format!("expected a '+' separator line, got: {plus_line}"))));
        }

        let quality = match self.read_line() {
            Ok(Some(line)) => line.as_bytes().to_vec(),
            Ok(None) => return Some(Err(DemuxError::CodecError("truncated record: missing quality line".into()))),
            Err(e) => return Some(Err(DemuxError::CodecError(e.to_string()))),
        };

        if sequence.len() != quality.len() {
            return Some(Err(DemuxError::CodecError(format!(
                "sequence/quality length mismatch in record '{header}': {} vs {}",
                sequence.len(),
                quality.len()
            ))));
        }

        Some(Ok(FastQ { header, sequence, quality }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_a_single_record() {
        let data = b"@read1\nACGT\n+\nIIII\n";
        let mut reader = FastQReader::new(Cursor::new(&data[..]));
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.header, "read1");
        assert_eq!(record.sequence, b"ACGT");
        assert_eq!(record.quality, b"IIII");
        assert!(reader.next().is_none());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let data = b"@read1\nACGT\n+\nII\n";
        let mut reader = FastQReader::new(Cursor::new(&data[..]));
        assert!(matches!(reader.next(), Some(Err(DemuxError::CodecError(_)))));
    }

    #[test]
    fn trim_left_shortens_both_strands() {
        let mut record = FastQ { header: "r".into(), sequence: b"AAACGT".to_vec(), quality: b"IIIIII".to_vec() };
        record.trim_left(3);
        assert_eq!(record.sequence, b"CGT");
        assert_eq!(record.quality, b"III");
    }
}

//! A small, purpose-built FASTA reader and writer.
//!
//! Grounded on `lib/Fasta.cpp`'s `getNextSequence`/`write`: not a general
//! FASTA-parsing crate, because the original format here is narrower and
//! stricter than the FASTA dialects such crates target — CRLF is
//! stripped, bases are upper-cased, and `_` is rewritten to `-` as a gap
//! character on read; the writer wraps at a fixed column with no
//! line-folding heuristics. A record with an empty label or no bases
//! between two headers is malformed and the reader skips it silently.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use crate::error::GenefindError;
use crate::types::Sequence;

fn trim_crlf(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn normalize(line: &str) -> Vec<u8> {
    line.bytes()
        .map(|b| if b == b'_' { b'-' } else { b.to_ascii_uppercase() })
        .collect()
}

/// Streams `Sequence` records out of a FASTA file, one label-lookahead
/// ahead of what it returns (mirroring the original's single-buffered
/// `label` field).
pub struct FastaReader<R> {
    lines: Lines<R>,
    pending_label: String,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        let mut lines = reader.lines();
        let mut pending_label = String::new();
        for line in &mut lines {
            let Ok(line) = line else { break };
            let trimmed = trim_crlf(&line);
            if let Some(rest) = trimmed.strip_prefix('>') {
                pending_label = rest.to_string();
                break;
            }
        }
        FastaReader {
            lines,
            pending_label,
            done: false,
        }
    }

    /// The next record, or [`Sequence::invalid`] once the file is exhausted.
    ///
    /// A record with an empty label or no bases between two headers is
    /// malformed and is skipped silently rather than returned.
    pub fn next_sequence(&mut self) -> Sequence {
        loop {
            let seq = self.read_one();
            if !seq.valid || (!seq.label.is_empty() && !seq.bases.is_empty()) {
                return seq;
            }
        }
    }

    fn read_one(&mut self) -> Sequence {
        if self.done {
            return Sequence::invalid();
        }

        let mut bases = Vec::new();
        while let Some(line) = self.lines.next() {
            let Ok(line) = line else {
                self.done = true;
                return self.finish(bases);
            };
            let trimmed = trim_crlf(&line);
            if let Some(rest) = trimmed.strip_prefix('>') {
                let label = std::mem::replace(&mut self.pending_label, rest.to_string());
                return Sequence::new(label, bases);
            }
            bases.extend(normalize(trimmed));
        }

        self.done = true;
        self.finish(bases)
    }

    fn finish(&mut self, bases: Vec<u8>) -> Sequence {
        if bases.is_empty() && self.pending_label.is_empty() {
            Sequence::invalid()
        } else {
            Sequence::new(std::mem::take(&mut self.pending_label), bases)
        }
    }
}

impl FastaReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, GenefindError> {
        let file = File::open(path).map_err(|source| GenefindError::InputOpen {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(FastaReader::new(BufReader::new(file)))
    }
}

/// Writes `Sequence` records wrapped at a fixed column, mirroring
/// `Fasta::write`.
pub struct FastaWriter<W> {
    writer: W,
    line_width: usize,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(writer: W, line_width: usize) -> Self {
        FastaWriter {
            writer,
            line_width: line_width.max(1),
        }
    }

    pub fn write_sequence(&mut self, seq: &Sequence) -> std::io::Result<()> {
        writeln!(self.writer, ">{}", seq.label)?;
        for chunk in seq.bases.chunks(self.line_width) {
            self.writer.write_all(chunk)?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl FastaWriter<BufWriter<File>> {
    pub fn create(path: &Path, line_width: usize) -> Result<Self, GenefindError> {
        let file = File::create(path).map_err(|source| GenefindError::OutputOpen {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(FastaWriter::new(BufWriter::new(file), line_width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> FastaReader<Cursor<&[u8]>> {
        FastaReader::new(Cursor::new(text.as_bytes()))
    }

    #[test]
    fn reads_a_single_record() {
        let mut r = reader(">chr1\nacgt\n");
        let s = r.next_sequence();
        assert_eq!(s.label, "chr1");
        assert_eq!(s.bases, b"ACGT".to_vec());
        assert!(!r.next_sequence().valid);
    }

    #[test]
    fn reads_multiple_records_split_across_lines() {
        let mut r = reader(">a\nacgt\nacgt\n>b\ntttt\n");
        let a = r.next_sequence();
        assert_eq!(a.label, "a");
        assert_eq!(a.bases, b"ACGTACGT".to_vec());
        let b = r.next_sequence();
        assert_eq!(b.label, "b");
        assert_eq!(b.bases, b"TTTT".to_vec());
        assert!(!r.next_sequence().valid);
    }

    #[test]
    fn strips_crlf_line_endings() {
        let mut r = reader(">a\r\nacgt\r\n");
        let s = r.next_sequence();
        assert_eq!(s.label, "a");
        assert_eq!(s.bases, b"ACGT".to_vec());
    }

    #[test]
    fn rewrites_underscore_gap_and_uppercases() {
        let mut r = reader(">a\nac_gt\n");
        let s = r.next_sequence();
        assert_eq!(s.bases, b"AC-GT".to_vec());
    }

    #[test]
    fn leading_junk_before_first_header_is_skipped() {
        let mut r = reader("; a comment\n>a\nacgt\n");
        let s = r.next_sequence();
        assert_eq!(s.label, "a");
        assert_eq!(s.bases, b"ACGT".to_vec());
    }

    #[test]
    fn empty_input_yields_invalid_sentinel() {
        let mut r = reader("");
        assert!(!r.next_sequence().valid);
    }

    #[test]
    fn skips_records_with_empty_bases_between_headers() {
        let mut r = reader(">a\n>b\nacgt\n");
        let s = r.next_sequence();
        assert_eq!(s.label, "b");
        assert_eq!(s.bases, b"ACGT".to_vec());
        assert!(!r.next_sequence().valid);
    }

    #[test]
    fn skips_records_with_an_empty_label() {
        let mut r = reader(">\nacgt\n>b\ntttt\n");
        let s = r.next_sequence();
        assert_eq!(s.label, "b");
        assert_eq!(s.bases, b"TTTT".to_vec());
        assert!(!r.next_sequence().valid);
    }

    #[test]
    fn write_wraps_at_fixed_width() {
        let mut buf = Vec::new();
        {
            let mut w = FastaWriter::new(&mut buf, 4);
            let seq = Sequence::new("g".to_string(), b"ACGTACGTAC".to_vec());
            w.write_sequence(&seq).unwrap();
        }
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            ">g\nACGT\nACGT\nAC\n"
        );
    }

    #[test]
    fn write_empty_bases_emits_only_the_header() {
        let mut buf = Vec::new();
        {
            let mut w = FastaWriter::new(&mut buf, 70);
            let seq = Sequence::new("g".to_string(), Vec::new());
            w.write_sequence(&seq).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), ">g\n");
    }
}

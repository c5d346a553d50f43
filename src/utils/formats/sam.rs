//! Utilities related to opening and reading Sequence Alignment Map (SAM) text.

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use flate2::read::MultiGzDecoder;
use tracing::debug;

use super::AlignmentFileFormat;
use super::STDIO;
use crate::utils::records::RecordView;

/// The prefix which marks a header line.
pub const HEADER_PREFIX: char = '@';

/// Opens a SAM source for reading: a plain or gzipped file, or standard input
/// when the path is `-`.
pub fn open<P>(src: P) -> anyhow::Result<Box<dyn BufRead>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();

    if path == Path::new(STDIO) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = || {
        File::open(path).with_context(|| format!("could not open {}", path.display()))
    };

    let format = AlignmentFileFormat::try_detect(path);

    if let Some(format) = format {
        debug!("Reading {} as {}.", path.display(), format);
    }

    match format {
        Some(AlignmentFileFormat::SAM) => Ok(Box::new(BufReader::new(file()?))),
        Some(AlignmentFileFormat::SAM_GZ) => {
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(file()?))))
        }
        None => bail!(
            "Not able to determine the file type of {} (expected .sam or .sam.gz)",
            path.display()
        ),
    }
}

/// Opens a destination for writing: a file, or standard output when the path
/// is `-`.
pub fn writer<P>(dst: P) -> anyhow::Result<Box<dyn Write>>
where
    P: AsRef<Path>,
{
    let path = dst.as_ref();

    if path == Path::new(STDIO) {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }

    let file =
        File::create(path).with_context(|| format!("could not create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// A line of SAM text.
#[derive(Debug)]
pub enum SamLine {
    /// A header line, kept verbatim (without its terminator).
    Header(String),

    /// An alignment record.
    Record(RecordView),
}

/// Iterates over the lines of SAM text, parsing alignment records as it goes.
/// Empty lines are skipped.
pub struct SamLines<R> {
    reader: R,
    buffer: String,
    line_number: usize,
}

impl<R: BufRead> SamLines<R> {
    /// Creates a new [`SamLines`] over a reader.
    pub fn new(reader: R) -> Self {
        SamLines {
            reader,
            buffer: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for SamLines<R> {
    type Item = anyhow::Result<SamLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();

            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => return Some(Err(e.into())),
            }

            let line = self.buffer.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                continue;
            }

            if line.starts_with(HEADER_PREFIX) {
                return Some(Ok(SamLine::Header(line.to_string())));
            }

            return Some(
                RecordView::parse(line, self.line_number)
                    .map(SamLine::Record)
                    .map_err(anyhow::Error::from),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_sam_lines() {
        let sam = "@HD\tVN:1.6\tSO:queryname\n\
                   r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tIIII\n\
                   \n\
                   r2\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tIIII\r\n";

        let lines: Vec<SamLine> = SamLines::new(sam.as_bytes())
            .collect::<anyhow::Result<_>>()
            .unwrap();

        assert_eq!(lines.len(), 3);
        assert!(matches!(&lines[0], SamLine::Header(h) if h == "@HD\tVN:1.6\tSO:queryname"));
        assert!(matches!(&lines[1], SamLine::Record(r) if r.read_id() == "r1"));
        assert!(matches!(&lines[2], SamLine::Record(r) if r.flags().unmapped));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let sam = "@HD\tVN:1.6\nr1\t0\tchr1\n";
        let mut lines = SamLines::new(sam.as_bytes());

        assert!(lines.next().unwrap().is_ok());
        let err = lines.next().unwrap().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MalformedRecord { line: 2, .. })
        ));
    }
}

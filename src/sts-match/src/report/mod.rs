//! Hit reporter: recover the descriptive columns of each hit's STS line
//! from the still-open STS file and emit one tab-delimited row per hit.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use anyhow::{Context, Result};

use epcr_io::write::GenericWriter;

use crate::catalog::StsCatalog;
use crate::scan::Hit;

pub mod error;
pub use error::ReportError;

/// Single-threaded back end of the pipeline: owns the output sink, the
/// STS file handle kept open since the catalog build, and the global hit
/// counter.
pub struct HitReporter<'w> {
    sts_file: BufReader<File>,
    writer: GenericWriter<'w>,
    line_cap: usize,
    total_hits: u64,
}

impl<'w> HitReporter<'w> {
    pub fn new(sts_file: File, writer: GenericWriter<'w>, line_cap: usize) -> Self {
        Self { sts_file: BufReader::new(sts_file), writer, line_cap, total_hits: 0 }
    }

    /// Emit every hit of one sequence record, in the given order.
    /// Positions are translated to 1-based inclusive coordinates.
    pub fn report_record(
        &mut self,
        seq_label: &str,
        hits: &[Hit],
        catalog: &StsCatalog,
    ) -> Result<()> {
        for hit in hits {
            let sts = catalog.get(hit.sts);
            let (id, tail) = self.recover_line(sts.file_offset)?;
            let row = match tail {
                Some(tail) => format!(
                    "{seq_label}\t{}..{}\t{id}\t{tail}\t({})",
                    hit.pos1 + 1,
                    hit.pos2 + 1,
                    sts.strand
                ),
                None => format!(
                    "{seq_label}\t{}..{}\t{id}\t({})",
                    hit.pos1 + 1,
                    hit.pos2 + 1,
                    sts.strand
                ),
            };
            self.writer.write_row(&row).context("while writing a hit")?;
            self.total_hits += 1;
        }
        self.writer.flush()
    }

    /// Seek back to the originating STS line and split out the id (first
    /// field) and the descriptive tail (fields five onward, verbatim).
    fn recover_line(&mut self, offset: u64) -> Result<(String, Option<String>), ReportError> {
        self.sts_file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| ReportError::RecoverLine(offset, e))?;

        let mut line: Vec<u8> = Vec::with_capacity(self.line_cap + 2);
        (&mut self.sts_file)
            .take(self.line_cap as u64 + 2)
            .read_until(b'\n', &mut line)
            .map_err(|e| ReportError::RecoverLine(offset, e))?;
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }

        let mut tabs = line
            .iter()
            .enumerate()
            .filter_map(|(i, &byte)| (byte == b'\t').then_some(i));
        let id_end = tabs.next().ok_or(ReportError::MalformedLine(offset))?;
        let id = String::from_utf8_lossy(&line[..id_end]).into_owned();
        // Fields 2 to 4 are the primers and the size; everything after the
        // fourth tab is carried through untouched.
        let tail = tabs
            .nth(2)
            .map(|fourth_tab| String::from_utf8_lossy(&line[fourth_tab + 1..]).into_owned());
        Ok((id, tail))
    }

    /// Hits emitted so far, across all sequence records.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }
}

//! Overlap report output.
//!
//! Uses itoa for coordinate formatting to avoid allocation in the row loop.

use crate::gff::{GffError, Result};
use crate::matcher::{Overlap, OverlapRecord};
use crate::store::FeatureStore;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Buffer size for OverlapWriter (1MB default).
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Column names of the report, in output order.
pub const REPORT_COLUMNS: [&str; 19] = [
    "chr",
    "overlap_beg",
    "overlap_end",
    "beg1",
    "end1",
    "beg2",
    "end2",
    "source1",
    "source2",
    "feature_type1",
    "feature_type2",
    "score1",
    "score2",
    "strand1",
    "strand2",
    "frame1",
    "frame2",
    "attribute1",
    "attribute2",
];

/// Stable sort by `(overlap start, overlap end)`; discovery order breaks ties.
pub fn sort_overlaps(overlaps: &mut [Overlap]) {
    overlaps.sort_by_key(|o| (o.start, o.end));
}

/// Tab-separated overlap report writer.
pub struct OverlapWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    rows: usize,
}

impl<W: Write> OverlapWriter<W> {
    /// Create a new OverlapWriter with default 1MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    /// Create a new OverlapWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            rows: 0,
        }
    }

    /// Write the header line.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(REPORT_COLUMNS.join("\t").as_bytes())?;
        self.writer.write_all(b"\n")
    }

    #[inline]
    fn write_field(&mut self, value: &str) -> io::Result<()> {
        self.writer.write_all(b"\t")?;
        self.writer.write_all(value.as_bytes())
    }

    #[inline]
    fn write_coord(&mut self, value: u64) -> io::Result<()> {
        self.writer.write_all(b"\t")?;
        self.writer.write_all(self.itoa_buf.format(value).as_bytes())
    }

    /// Write one overlap row.
    pub fn write_record(&mut self, record: &OverlapRecord<'_>) -> io::Result<()> {
        let (a, b) = (record.a, record.b);
        self.writer.write_all(record.chrom.as_bytes())?;
        self.write_coord(record.start)?;
        self.write_coord(record.end)?;
        self.write_coord(a.start)?;
        self.write_coord(a.end)?;
        self.write_coord(b.start)?;
        self.write_coord(b.end)?;
        self.write_field(&a.source)?;
        self.write_field(&b.source)?;
        self.write_field(&a.feature_type)?;
        self.write_field(&b.feature_type)?;
        self.write_field(&a.score)?;
        self.write_field(&b.score)?;
        self.write_field(&a.strand)?;
        self.write_field(&b.strand)?;
        self.write_field(&a.frame)?;
        self.write_field(&b.frame)?;
        self.write_field(&a.attribute)?;
        self.write_field(&b.attribute)?;
        self.writer.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    /// Write the header followed by every overlap, resolved against its stores.
    pub fn write_report(
        &mut self,
        overlaps: &[Overlap],
        a: &FeatureStore,
        b: &FeatureStore,
    ) -> io::Result<()> {
        self.write_header()?;
        for overlap in overlaps {
            let record = overlap.resolve(a, b).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("overlap {:?} does not refer to the given features", overlap),
                )
            })?;
            self.write_record(&record)?;
        }
        Ok(())
    }

    /// Number of rows written so far (header excluded).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Create `path` and write the full report to it.
pub fn write_report_to_path<P: AsRef<Path>>(
    path: P,
    overlaps: &[Overlap],
    a: &FeatureStore,
    b: &FeatureStore,
) -> Result<usize> {
    let path = path.as_ref();
    let to_error = |source| GffError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_error)?;
    let mut writer = OverlapWriter::new(file);
    writer.write_report(overlaps, a, b).map_err(to_error)?;
    writer.flush().map_err(to_error)?;
    Ok(writer.rows())
}

//! Streaming GFF file parser.

use crate::feature::Feature;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of columns a GFF line must carry to be read as a feature.
pub const GFF_COLUMNS: usize = 9;

/// Errors that can occur while loading features or writing a report.
#[derive(Error, Debug)]
pub enum GffError {
    #[error("Input file {} does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("Error opening file {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GffError>;

/// True if the path carries one of the accepted GFF suffixes (`.gff`, `.gff.gz`).
pub fn has_gff_extension<P: AsRef<Path>>(path: P) -> bool {
    let name = path.as_ref().to_string_lossy();
    name.ends_with(".gff") || name.ends_with(".gff.gz")
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

/// A streaming GFF file reader.
pub struct GffReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl GffReader<Box<dyn Read>> {
    /// Open a GFF file from a path, decompressing when it ends in `.gz`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GffError::InputNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(GffError::InputUnreadable {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }
        let file = File::open(path).map_err(|source| GffError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let inner: Box<dyn Read> = if is_gzipped(path) {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::with_capacity(inner, 64 * 1024))
    }
}

impl<R: Read> GffReader<R> {
    /// Create a new GFF reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(1024),
        }
    }

    /// Create a GFF reader with custom buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            buffer: String::with_capacity(1024),
        }
    }

    /// Read the next feature, skipping comments, blank lines and short lines.
    pub fn read_feature(&mut self) -> Result<Option<Feature>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(feature) = self.parse_line(line)? {
                return Ok(Some(feature));
            }
        }
    }

    /// Parse a single GFF line. Returns `Ok(None)` for lines with too few columns.
    fn parse_line(&self, line: &str) -> Result<Option<Feature>> {
        let fields = split_columns(line);
        if fields.len() < GFF_COLUMNS {
            return Ok(None);
        }

        let start = self.parse_position(fields[3], "start")?;
        let end = self.parse_position(fields[4], "end")?;

        Ok(Some(Feature {
            chrom: fields[0].to_string(),
            source: fields[1].to_string(),
            feature_type: fields[2].to_string(),
            start,
            end,
            score: fields[5].to_string(),
            strand: fields[6].to_string(),
            frame: fields[7].to_string(),
            attribute: fields[8..].join(" "),
        }))
    }

    /// Coordinates are unsigned: a negative integer is rejected with its own message.
    fn parse_position(&self, s: &str, field_name: &str) -> Result<u64> {
        s.parse().map_err(|_| {
            let message = match s.parse::<i64>() {
                Ok(n) if n < 0 => format!("Negative {} position: '{}'", field_name, s),
                _ => format!("Invalid {} position: '{}'", field_name, s),
            };
            GffError::Parse {
                line: self.line_number,
                message,
            }
        })
    }

    /// Current line number (1-based, counts skipped lines too).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Get an iterator over all features.
    pub fn features(self) -> GffFeatureIter<R> {
        GffFeatureIter { reader: self }
    }
}

/// Split a GFF line into columns.
///
/// Tab-delimited lines keep the attribute column whole (it may contain spaces).
/// Lines without tabs fall back to whitespace splitting; the attribute then
/// spans every token from the ninth onward.
fn split_columns(line: &str) -> Vec<&str> {
    if memchr::memchr(b'\t', line.as_bytes()).is_some() {
        let mut fields: Vec<&str> = line.splitn(GFF_COLUMNS, '\t').map(str::trim).collect();
        // Runs of tabs between the leading columns are tolerated like whitespace.
        if fields.iter().take(GFF_COLUMNS - 1).any(|f| f.is_empty()) {
            fields = line.split_whitespace().collect();
        }
        fields
    } else {
        line.split_whitespace().collect()
    }
}

/// Iterator over GFF features.
pub struct GffFeatureIter<R: Read> {
    reader: GffReader<R>,
}

impl<R: Read> Iterator for GffFeatureIter<R> {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_feature() {
            Ok(Some(feature)) => Some(Ok(feature)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read all features from a GFF file (plain or gzip).
pub fn read_features<P: AsRef<Path>>(path: P) -> Result<Vec<Feature>> {
    GffReader::from_path(path)?.features().collect()
}

/// Parse features from a string (useful for testing).
pub fn parse_features(content: &str) -> Result<Vec<Feature>> {
    GffReader::new(content.as_bytes()).features().collect()
}

//! Core feature type for GFF annotation records.

use std::fmt;

/// One annotated genomic interval from a GFF file.
/// Uses 1-based, closed coordinates (GFF convention).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Feature {
    pub chrom: String,
    pub source: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub score: String,
    pub strand: String,
    pub frame: String,
    pub attribute: String,
}

impl Feature {
    /// Create a feature with placeholder metadata (`.` in every text column).
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            source: ".".to_string(),
            feature_type: ".".to_string(),
            start,
            end,
            score: ".".to_string(),
            strand: ".".to_string(),
            frame: ".".to_string(),
            attribute: ".".to_string(),
        }
    }

    /// Set the source and feature type columns.
    pub fn with_kind(mut self, source: impl Into<String>, feature_type: impl Into<String>) -> Self {
        self.source = source.into();
        self.feature_type = feature_type.into();
        self
    }

    /// Set the attribute column.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    /// Number of bases covered (closed interval).
    #[inline]
    pub fn len(&self) -> u64 {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    /// True if `end < start`, which a well-formed GFF line never produces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Closed-interval intersection test. Chromosomes are not compared:
    /// callers only ever test features from the same chromosome bucket.
    #[inline]
    pub fn overlaps(&self, other: &Feature) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The shared coordinate range, if any.
    #[inline]
    pub fn overlap_range(&self, other: &Feature) -> Option<(u64, u64)> {
        if !self.overlaps(other) {
            return None;
        }
        Some((self.start.max(other.start), self.end.min(other.end)))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.source,
            self.feature_type,
            self.start,
            self.end,
            self.score,
            self.strand,
            self.frame,
            self.attribute
        )
    }
}

//! Zone partitioning and zone assignment.
//!
//! Each chromosome's coordinate span is split into `n` equal-width zones.
//! Both collections share the same zone boundaries, so two features can only
//! overlap if they were bucketed into at least one common zone.
//!
//! Zone `i` covers the closed range `(marks[i-1] + 1, marks[i])`, with zone 0
//! starting at coordinate 1. Because marks increase monotonically, the zones a
//! feature touches form a contiguous run found with two binary searches.

use crate::feature::Feature;
use crate::gff::{GffError, Result};
use crate::store::FeatureStore;
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::Range;

/// Default number of zones per chromosome.
pub const DEFAULT_ZONES: usize = 10;

/// A validated, strictly positive zone count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneCount(usize);

impl ZoneCount {
    /// Validate a user-supplied zone count. Zero and negative values are rejected.
    pub fn new(zones: i64) -> Result<Self> {
        if zones <= 0 {
            return Err(GffError::Configuration(format!(
                "The number of zones must be a non-zero positive integer (got {})",
                zones
            )));
        }
        usize::try_from(zones)
            .map(Self)
            .map_err(|_| GffError::Configuration(format!("Zone count {} is too large", zones)))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ZoneCount {
    fn default() -> Self {
        Self(DEFAULT_ZONES)
    }
}

impl fmt::Display for ZoneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the chromosome extent used for zone width is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneWidthPolicy {
    /// Largest end coordinate in either collection. Every feature lands in a zone.
    #[default]
    MaxEnd,
    /// End coordinate of the last listed feature of each collection.
    ///
    /// Only safe for position-sorted input: features ending past the final
    /// mark are clamped into the last zone, and features starting past it
    /// are not bucketed at all.
    LastFeature,
}

impl ZoneWidthPolicy {
    fn extent(self, features: &[Feature]) -> u64 {
        match self {
            Self::MaxEnd => features.iter().map(|f| f.end).max().unwrap_or(0),
            Self::LastFeature => features.last().map_or(0, |f| f.end),
        }
    }
}

/// Zone boundaries for one chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMarks {
    width: u64,
    marks: Vec<u64>,
}

impl ZoneMarks {
    /// Build marks covering `extent` with `zones` equal-width zones.
    ///
    /// `width = extent / zones + 1`, so the last mark always exceeds `extent`.
    /// Near `u64::MAX` the marks saturate: trailing marks all equal `u64::MAX`,
    /// the sequence stays non-decreasing and the last mark still covers `extent`.
    pub fn from_extent(extent: u64, zones: ZoneCount) -> Self {
        let n = zones.get() as u64;
        let width = (extent / n).saturating_add(1);
        let marks = (1..=n).map(|i| width.saturating_mul(i)).collect();
        Self { width, marks }
    }

    /// Marks shared by both collections of one chromosome.
    pub fn compute(
        a: &[Feature],
        b: &[Feature],
        zones: ZoneCount,
        policy: ZoneWidthPolicy,
    ) -> Self {
        let extent = policy.extent(a).max(policy.extent(b));
        Self::from_extent(extent, zones)
    }

    /// Width of every zone.
    #[inline]
    pub fn width(&self) -> u64 {
        self.width
    }

    /// Inclusive upper bound of each zone.
    #[inline]
    pub fn marks(&self) -> &[u64] {
        &self.marks
    }

    /// Number of zones.
    #[inline]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Closed coordinate range of zone `i`.
    pub fn zone_range(&self, i: usize) -> (u64, u64) {
        let start = if i == 0 {
            1
        } else {
            self.marks[i - 1].saturating_add(1)
        };
        (start, self.marks[i])
    }

    /// Indices of all zones intersecting the closed interval `[start, end]`.
    ///
    /// Features extending beyond the last mark are clamped into the last zone;
    /// a feature starting beyond it touches no zone.
    #[inline]
    pub fn zones_for(&self, start: u64, end: u64) -> Range<usize> {
        let first = self.marks.partition_point(|&m| m < start);
        if first >= self.marks.len() {
            return 0..0;
        }
        let last = self
            .marks
            .partition_point(|&m| m < end)
            .min(self.marks.len() - 1);
        first..last + 1
    }
}

/// Compute zone marks for every chromosome present in both collections.
pub fn compute_zone_marks(
    a: &FeatureStore,
    b: &FeatureStore,
    zones: ZoneCount,
    policy: ZoneWidthPolicy,
) -> FxHashMap<String, ZoneMarks> {
    let mut result = FxHashMap::default();
    for (chrom, a_features) in a.iter() {
        if let Some(b_features) = b.get(chrom) {
            let marks = ZoneMarks::compute(a_features, b_features, zones, policy);
            log::debug!("{}: {} zones of width {}", chrom, marks.len(), marks.width());
            result.insert(chrom.to_string(), marks);
        }
    }
    result
}

/// Per-zone lists of feature indices for one chromosome.
///
/// Indices refer to positions in the chromosome's feature slice. A feature
/// appears once in every zone it intersects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneBuckets {
    zones: Vec<Vec<usize>>,
    unassigned: usize,
}

/// Bucket size summary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoneOccupancy {
    pub max: usize,
    pub mean: f64,
    pub empty: usize,
}

impl ZoneBuckets {
    /// Assign each feature to every zone it intersects.
    pub fn assign(features: &[Feature], marks: &ZoneMarks) -> Self {
        let mut zones = vec![Vec::new(); marks.len()];
        let mut unassigned = 0;

        for (idx, feature) in features.iter().enumerate() {
            let range = marks.zones_for(feature.start, feature.end);
            if range.is_empty() {
                unassigned += 1;
                continue;
            }
            for zone in &mut zones[range] {
                zone.push(idx);
            }
        }

        Self { zones, unassigned }
    }

    /// Feature indices bucketed into zone `i`.
    #[inline]
    pub fn zone(&self, i: usize) -> &[usize] {
        &self.zones[i]
    }

    /// Number of zones.
    #[inline]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Features that fell beyond the last zone mark.
    pub fn unassigned(&self) -> usize {
        self.unassigned
    }

    /// Iterate `(zone index, feature indices)`, skipping empty zones.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| !z.is_empty())
            .map(|(i, z)| (i, z.as_slice()))
    }

    /// Summary of bucket sizes.
    pub fn occupancy(&self) -> ZoneOccupancy {
        if self.zones.is_empty() {
            return ZoneOccupancy::default();
        }
        let total: usize = self.zones.iter().map(Vec::len).sum();
        ZoneOccupancy {
            max: self.zones.iter().map(Vec::len).max().unwrap_or(0),
            mean: total as f64 / self.zones.len() as f64,
            empty: self.zones.iter().filter(|z| z.is_empty()).count(),
        }
    }
}

/// Assign the features of every chromosome that has marks.
///
/// Whole-store convenience over [`ZoneBuckets::assign`]. The matcher buckets
/// each chromosome inside its own task instead, so assignment runs in
/// parallel with matching.
pub fn assign_to_zones(
    store: &FeatureStore,
    marks: &FxHashMap<String, ZoneMarks>,
) -> FxHashMap<String, ZoneBuckets> {
    store
        .iter()
        .filter_map(|(chrom, features)| {
            marks
                .get(chrom)
                .map(|m| (chrom.to_string(), ZoneBuckets::assign(features, m)))
        })
        .collect()
}

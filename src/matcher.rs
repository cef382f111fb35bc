//! Zone-based overlap matching.
//!
//! For every chromosome shared by both collections, features are bucketed
//! into zones and only features sharing a zone are compared. A pair that
//! co-occurs in several zones (one of them straddles a boundary) is reported
//! once: pairs are deduplicated on their feature indices before any output
//! record is built.
//!
//! Chromosomes are independent, so they are matched in parallel with Rayon
//! once the input is large enough to pay for the thread overhead. Results
//! are always merged in chromosome registry order.

use crate::feature::Feature;
use crate::store::FeatureStore;
use crate::zones::{compute_zone_marks, ZoneBuckets, ZoneCount, ZoneMarks, ZoneWidthPolicy};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::fmt;

/// Minimum number of features before enabling parallelization.
/// Below this threshold, sequential processing is faster due to
/// thread spawn overhead.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// How chromosomes are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One chromosome after another on the calling thread
    Sequential,
    /// One Rayon task per chromosome
    Parallel,
}

impl ExecutionMode {
    /// Pick a mode from the total input size.
    pub fn select(total_features: usize) -> Self {
        if total_features < PARALLEL_THRESHOLD {
            Self::Sequential
        } else {
            Self::Parallel
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Some(Self::Sequential),
            "parallel" | "par" => Some(Self::Parallel),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "Sequential"),
            Self::Parallel => write!(f, "Parallel"),
        }
    }
}

/// One intersecting feature pair.
///
/// `chrom` indexes the first collection's chromosome registry; `a` and `b`
/// index that chromosome's feature lists in the first and second collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Overlap {
    pub chrom: usize,
    pub start: u64,
    pub end: u64,
    pub a: usize,
    pub b: usize,
}

impl Overlap {
    /// Build the record for two features, if they intersect.
    #[inline]
    fn between(chrom: usize, a_idx: usize, fa: &Feature, b_idx: usize, fb: &Feature) -> Option<Self> {
        fa.overlap_range(fb).map(|(start, end)| Self {
            chrom,
            start,
            end,
            a: a_idx,
            b: b_idx,
        })
    }

    /// Look up the chromosome name and both source features.
    ///
    /// Returns `None` if the overlap does not belong to these stores.
    pub fn resolve<'s>(
        &self,
        a: &'s FeatureStore,
        b: &'s FeatureStore,
    ) -> Option<OverlapRecord<'s>> {
        let chrom = a.chromosomes().get(self.chrom)?;
        Some(OverlapRecord {
            chrom: chrom.as_str(),
            start: self.start,
            end: self.end,
            a: a.get(chrom)?.get(self.a)?,
            b: b.get(chrom)?.get(self.b)?,
        })
    }
}

/// An overlap with borrowed source features, ready for output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapRecord<'s> {
    pub chrom: &'s str,
    pub start: u64,
    pub end: u64,
    pub a: &'s Feature,
    pub b: &'s Feature,
}

/// Result of matching one chromosome.
#[derive(Debug, Clone, Default)]
pub struct ChromosomeMatch {
    pub overlaps: Vec<Overlap>,
    pub comparisons: u64,
    pub unassigned: usize,
}

/// Cross-compare the features sharing each zone.
///
/// Every distinct intersecting `(a, b)` pair is emitted exactly once, in
/// the order it is first discovered (zone, then A index, then B index).
pub fn match_buckets(
    chrom: usize,
    a: &[Feature],
    b: &[Feature],
    a_buckets: &ZoneBuckets,
    b_buckets: &ZoneBuckets,
) -> ChromosomeMatch {
    let mut result = ChromosomeMatch {
        unassigned: a_buckets.unassigned() + b_buckets.unassigned(),
        ..Default::default()
    };
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();

    for (zone, a_zone) in a_buckets.iter() {
        if zone >= b_buckets.len() {
            break;
        }
        let b_zone = b_buckets.zone(zone);
        if b_zone.is_empty() {
            continue;
        }
        for &i in a_zone {
            let fa = &a[i];
            for &j in b_zone {
                result.comparisons += 1;
                if let Some(overlap) = Overlap::between(chrom, i, fa, j, &b[j]) {
                    if seen.insert((i, j)) {
                        result.overlaps.push(overlap);
                    }
                }
            }
        }
    }

    result
}

/// Bucket one chromosome's features on `marks` and match them.
pub fn match_chromosome(
    chrom: usize,
    a: &[Feature],
    b: &[Feature],
    marks: &ZoneMarks,
) -> ChromosomeMatch {
    let a_buckets = ZoneBuckets::assign(a, marks);
    let b_buckets = ZoneBuckets::assign(b, marks);

    if log::log_enabled!(log::Level::Trace) {
        let occ = a_buckets.occupancy();
        log::trace!(
            "chrom #{}: width {}, A buckets max {} mean {:.1} empty {}",
            chrom,
            marks.width(),
            occ.max,
            occ.mean,
            occ.empty
        );
    }

    match_buckets(chrom, a, b, &a_buckets, &b_buckets)
}

/// Statistics from a matching run.
#[derive(Debug, Clone, Default)]
pub struct MatchStats {
    pub mode_used: String,
    pub a_features: usize,
    pub b_features: usize,
    pub chromosomes: usize,
    pub comparisons: u64,
    pub overlaps: usize,
    pub unassigned: usize,
}

impl fmt::Display for MatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mode: {}, A: {}, B: {}, Chroms: {}, Comparisons: {}, Overlaps: {}",
            self.mode_used,
            self.a_features,
            self.b_features,
            self.chromosomes,
            self.comparisons,
            self.overlaps
        )?;
        if self.unassigned > 0 {
            write!(f, ", Unzoned: {}", self.unassigned)?;
        }
        Ok(())
    }
}

/// The zone matcher.
#[derive(Debug, Clone, Default)]
pub struct ZoneMatcher {
    zones: ZoneCount,
    policy: ZoneWidthPolicy,
    mode: Option<ExecutionMode>,
}

impl ZoneMatcher {
    pub fn new(zones: ZoneCount) -> Self {
        Self {
            zones,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: ZoneWidthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Force an execution mode instead of choosing by input size.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Find every intersecting pair across the chromosomes both stores share.
    pub fn find_overlaps(&self, a: &FeatureStore, b: &FeatureStore) -> (Vec<Overlap>, MatchStats) {
        let mode = self
            .mode
            .unwrap_or_else(|| ExecutionMode::select(a.len() + b.len()));

        let marks_by_chrom = compute_zone_marks(a, b, self.zones, self.policy);
        let shared: Vec<(usize, &[Feature], &[Feature], &ZoneMarks)> = a
            .iter()
            .enumerate()
            .filter_map(|(idx, (chrom, a_features))| {
                let b_features = b.get(chrom)?;
                let marks = marks_by_chrom.get(chrom)?;
                Some((idx, a_features, b_features, marks))
            })
            .collect();

        let per_chrom: Vec<ChromosomeMatch> = match mode {
            ExecutionMode::Sequential => shared
                .iter()
                .map(|&(idx, fa, fb, marks)| match_chromosome(idx, fa, fb, marks))
                .collect(),
            ExecutionMode::Parallel => shared
                .par_iter()
                .map(|&(idx, fa, fb, marks)| match_chromosome(idx, fa, fb, marks))
                .collect(),
        };

        let mut stats = MatchStats {
            mode_used: mode.to_string(),
            a_features: a.len(),
            b_features: b.len(),
            chromosomes: shared.len(),
            ..Default::default()
        };

        let mut overlaps = Vec::with_capacity(per_chrom.iter().map(|m| m.overlaps.len()).sum());
        for chrom_match in per_chrom {
            stats.comparisons += chrom_match.comparisons;
            stats.unassigned += chrom_match.unassigned;
            overlaps.extend(chrom_match.overlaps);
        }
        stats.overlaps = overlaps.len();

        if stats.unassigned > 0 {
            log::warn!(
                "{} features fell beyond the last zone mark and were not compared",
                stats.unassigned
            );
        }

        (overlaps, stats)
    }
}

/// All-pairs comparison per chromosome.
///
/// Quadratic in the features of each chromosome; serves as the reference
/// the zone matcher is checked against.
pub fn naive_overlaps(a: &FeatureStore, b: &FeatureStore) -> Vec<Overlap> {
    let mut overlaps = Vec::new();
    for (idx, (chrom, a_features)) in a.iter().enumerate() {
        let Some(b_features) = b.get(chrom) else {
            continue;
        };
        for (i, fa) in a_features.iter().enumerate() {
            for (j, fb) in b_features.iter().enumerate() {
                if let Some(overlap) = Overlap::between(idx, i, fa, j, fb) {
                    overlaps.push(overlap);
                }
            }
        }
    }
    overlaps
}

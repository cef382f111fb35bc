//! End-to-end overlap run: load, zone, match, report.

use crate::gff::{has_gff_extension, GffError, Result};
use crate::matcher::{naive_overlaps, ExecutionMode, MatchStats, Overlap, ZoneMatcher};
use crate::report::{sort_overlaps, write_report_to_path};
use crate::store::{retain_shared, FeatureStore};
use crate::zones::{ZoneCount, ZoneWidthPolicy};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything one overlap run needs.
#[derive(Debug, Clone)]
pub struct OverlapConfig {
    /// First GFF input (collection A)
    pub gff1: PathBuf,
    /// Second GFF input (collection B)
    pub gff2: PathBuf,
    /// Zones per chromosome
    pub zones: ZoneCount,
    /// Report path; derived from the input names when absent
    pub output: Option<PathBuf>,
    /// How the zone width is derived from the features
    pub width_policy: ZoneWidthPolicy,
    /// Force an execution mode
    pub mode: Option<ExecutionMode>,
    /// Compare all pairs instead of using zones
    pub naive: bool,
    /// Reject inputs without a `.gff`/`.gff.gz` suffix
    pub check_extensions: bool,
}

impl OverlapConfig {
    pub fn new(gff1: impl Into<PathBuf>, gff2: impl Into<PathBuf>) -> Self {
        Self {
            gff1: gff1.into(),
            gff2: gff2.into(),
            zones: ZoneCount::default(),
            output: None,
            width_policy: ZoneWidthPolicy::default(),
            mode: None,
            naive: false,
            check_extensions: true,
        }
    }

    pub fn with_zones(mut self, zones: ZoneCount) -> Self {
        self.zones = zones;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_width_policy(mut self, policy: ZoneWidthPolicy) -> Self {
        self.width_policy = policy;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_naive(mut self, naive: bool) -> Self {
        self.naive = naive;
        self
    }

    pub fn with_extension_check(mut self, check: bool) -> Self {
        self.check_extensions = check;
        self
    }

    /// Report path: the explicit output, or `<base1>.<base2>.overlap.tsv`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.gff1, &self.gff2))
    }

    /// Check the inputs exist and carry GFF suffixes. Performs no reads.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.gff1, &self.gff2] {
            if !path.exists() {
                return Err(GffError::InputNotFound(path.clone()));
            }
            if self.check_extensions && !has_gff_extension(path) {
                return Err(GffError::InvalidInput(format!(
                    "{}: file type gff/gff.gz expected",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Default report name built from both input file names, each with its
/// last extension removed (`a.gff.gz` contributes `a.gff`).
pub fn default_output_path<P: AsRef<Path>>(gff1: P, gff2: P) -> PathBuf {
    let stem = |p: &Path| {
        p.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    PathBuf::from(format!(
        "{}.{}.overlap.tsv",
        stem(gff1.as_ref()),
        stem(gff2.as_ref())
    ))
}

/// Statistics from a full run.
#[derive(Debug, Clone, Default)]
pub struct OverlapStats {
    pub zones: usize,
    pub matching: MatchStats,
    pub dropped_chromosomes: usize,
    pub rows_written: usize,
    pub elapsed_secs: f64,
}

impl fmt::Display for OverlapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zones: {}, {}, Dropped chroms: {}, Rows: {} ({:.3}s)",
            self.zones, self.matching, self.dropped_chromosomes, self.rows_written, self.elapsed_secs
        )
    }
}

/// The overlap engine.
pub struct OverlapEngine {
    config: OverlapConfig,
}

impl OverlapEngine {
    pub fn new(config: OverlapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OverlapConfig {
        &self.config
    }

    /// Match two in-memory collections. Chromosomes absent from either side
    /// are ignored. Overlaps come back sorted by `(start, end)`.
    pub fn compute(&self, a: &FeatureStore, b: &FeatureStore) -> (Vec<Overlap>, MatchStats) {
        let (mut overlaps, stats) = if self.config.naive {
            let overlaps = naive_overlaps(a, b);
            let stats = MatchStats {
                mode_used: "Naive".to_string(),
                a_features: a.len(),
                b_features: b.len(),
                chromosomes: a.chromosomes().iter().filter(|c| b.contains(c)).count(),
                comparisons: a
                    .iter()
                    .map(|(chrom, fa)| (fa.len() * b.get(chrom).map_or(0, <[_]>::len)) as u64)
                    .sum(),
                overlaps: overlaps.len(),
                unassigned: 0,
            };
            (overlaps, stats)
        } else {
            let mut matcher = ZoneMatcher::new(self.config.zones).with_policy(self.config.width_policy);
            if let Some(mode) = self.config.mode {
                matcher = matcher.with_mode(mode);
            }
            matcher.find_overlaps(a, b)
        };
        sort_overlaps(&mut overlaps);
        (overlaps, stats)
    }

    /// Run the configured comparison and write the report.
    ///
    /// Nothing is written unless both inputs load and matching completes.
    pub fn run(&self) -> Result<OverlapStats> {
        let start = Instant::now();
        self.config.validate()?;

        let a = FeatureStore::load(&self.config.gff1)?;
        let b = FeatureStore::load(&self.config.gff2)?;
        let total_chroms = {
            let mut names: Vec<&String> = a.chromosomes().iter().chain(b.chromosomes()).collect();
            names.sort();
            names.dedup();
            names.len()
        };

        let (a, b) = retain_shared(a, b);
        let (overlaps, matching) = self.compute(&a, &b);
        log::info!("{}", matching);

        let output = self.config.output_path();
        let rows_written = write_report_to_path(&output, &overlaps, &a, &b)?;
        log::debug!("Wrote {} rows to {}", rows_written, output.display());

        Ok(OverlapStats {
            zones: self.config.zones.get(),
            dropped_chromosomes: total_chroms - a.num_chromosomes(),
            matching,
            rows_written,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}

/// Timing of one zone count in a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub zones: usize,
    pub seconds: f64,
    pub comparisons: u64,
    pub overlaps: usize,
}

/// Time the matcher for each zone count on the same pair of inputs.
///
/// Inputs are loaded once; only zoning and matching are timed. Every row
/// must find the same overlaps, so a differing count is reported as an error.
pub fn scan_zone_counts(
    a: &FeatureStore,
    b: &FeatureStore,
    zone_counts: &[ZoneCount],
    policy: ZoneWidthPolicy,
) -> Result<Vec<ScanRow>> {
    let mut rows: Vec<ScanRow> = Vec::with_capacity(zone_counts.len());
    for &zones in zone_counts {
        let start = Instant::now();
        let (overlaps, stats) = ZoneMatcher::new(zones).with_policy(policy).find_overlaps(a, b);
        let seconds = start.elapsed().as_secs_f64();
        log::info!("Overlap gff features with {} zones completed in {} seconds", zones, seconds);

        if let Some(first) = rows.first() {
            if first.overlaps != overlaps.len() {
                return Err(GffError::InvalidInput(format!(
                    "{} zones found {} overlaps but {} zones found {}",
                    zones,
                    overlaps.len(),
                    first.zones,
                    first.overlaps
                )));
            }
        }
        rows.push(ScanRow {
            zones: zones.get(),
            seconds,
            comparisons: stats.comparisons,
            overlaps: overlaps.len(),
        });
    }
    Ok(rows)
}

//! Generate synthetic GFF pairs for benchmarking zone counts.
//!
//! Features are placed on a small chromosome model, either uniformly or with
//! most of them packed into a few hotspots. Clustered data is the worst case
//! for equal-width zones and is useful for picking a zone count.
//!
//! Generation is deterministic for a given seed.

use crate::gff::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Buffer size for output files.
const BUF_SIZE: usize = 1024 * 1024;

/// Feature types cycled through the generated records.
const FEATURE_TYPES: [&str; 4] = ["gene", "mRNA", "exon", "CDS"];

/// Configuration for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub output_dir: PathBuf,
    pub a_count: u64,
    pub b_count: u64,
    pub seed: u64,
    pub clustered: bool,
    /// Fraction of features placed inside hotspots when clustered
    pub hotspot_weight: f64,
    pub len_min: u64,
    pub len_max: u64,
    /// Sort each chromosome's features by start before writing
    pub sorted: bool,
    pub force: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./olgff_bench_data"),
            a_count: 100_000,
            b_count: 100_000,
            seed: 42,
            clustered: false,
            hotspot_weight: 0.80,
            len_min: 50,
            len_max: 5000,
            sorted: true,
            force: false,
        }
    }
}

/// Statistics from generate operation.
#[derive(Debug, Default, Clone)]
pub struct GenerateStats {
    pub total_features: u64,
    pub total_files: usize,
    pub elapsed_secs: f64,
}

impl fmt::Display for GenerateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} features in {} files ({:.1}s)",
            self.total_features, self.total_files, self.elapsed_secs
        )
    }
}

/// Chromosome model, sampled in proportion to length.
struct GenomeModel {
    chromosomes: Vec<(&'static str, u64)>,
    cumulative: Vec<u64>,
    total_size: u64,
}

impl GenomeModel {
    fn new() -> Self {
        let chromosomes: Vec<(&'static str, u64)> = vec![
            ("chr1", 2_489_564),
            ("chr2", 2_421_935),
            ("chr3", 1_982_955),
            ("chr4", 1_902_145),
            ("chrX", 1_560_408),
        ];

        let mut cumulative = Vec::with_capacity(chromosomes.len());
        let mut running_total = 0u64;
        for (_, size) in &chromosomes {
            running_total += size;
            cumulative.push(running_total);
        }

        Self {
            chromosomes,
            cumulative,
            total_size: running_total,
        }
    }

    /// Sample a chromosome weighted by size.
    #[inline]
    fn sample_chromosome(&self, rng: &mut SmallRng) -> usize {
        let target = rng.gen_range(0..self.total_size);
        self.cumulative.partition_point(|&x| x <= target)
    }
}

/// Compact feature used during generation.
#[derive(Clone, Copy, Debug)]
struct RawFeature {
    chrom_idx: usize,
    start: u64,
    end: u64,
    kind: usize,
}

/// Generate command.
pub struct GenerateCommand {
    config: GenerateConfig,
    genome: GenomeModel,
}

impl GenerateCommand {
    pub fn new(config: GenerateConfig) -> Self {
        Self {
            config,
            genome: GenomeModel::new(),
        }
    }

    /// Write `a.gff` and `b.gff` into the output directory.
    pub fn run(&self) -> Result<GenerateStats> {
        let start = Instant::now();
        let mut stats = GenerateStats::default();

        fs::create_dir_all(&self.config.output_dir)?;
        let a_path = self.config.output_dir.join("a.gff");
        let b_path = self.config.output_dir.join("b.gff");

        if !self.config.force && a_path.exists() && b_path.exists() {
            log::warn!("Skipping (files exist, use --force to overwrite)");
            return Ok(stats);
        }

        let mut rng_a = SmallRng::seed_from_u64(self.config.seed);
        self.generate_file(&a_path, "olgffA", self.config.a_count, &mut rng_a)?;
        log::info!("Saved: {}", a_path.display());

        let mut rng_b = SmallRng::seed_from_u64(self.config.seed.wrapping_add(1));
        self.generate_file(&b_path, "olgffB", self.config.b_count, &mut rng_b)?;
        log::info!("Saved: {}", b_path.display());

        stats.total_features = self.config.a_count + self.config.b_count;
        stats.total_files = 2;
        stats.elapsed_secs = start.elapsed().as_secs_f64();
        Ok(stats)
    }

    fn generate_file(&self, path: &Path, source: &str, count: u64, rng: &mut SmallRng) -> Result<()> {
        let mut features = self.generate_features(count, rng);
        if self.config.sorted {
            features.sort_by_key(|f| (f.chrom_idx, f.start, f.end));
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(BUF_SIZE, file);
        writeln!(writer, "##gff-version 3")?;

        for (i, f) in features.iter().enumerate() {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t.\t{}\t.\tID={}{}",
                self.genome.chromosomes[f.chrom_idx].0,
                source,
                FEATURE_TYPES[f.kind],
                f.start,
                f.end,
                if i % 2 == 0 { '+' } else { '-' },
                source,
                i
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    fn generate_features(&self, count: u64, rng: &mut SmallRng) -> Vec<RawFeature> {
        let mut features = Vec::with_capacity(count as usize);

        let in_hotspot = if self.config.clustered {
            (count as f64 * self.config.hotspot_weight) as u64
        } else {
            0
        };

        if in_hotspot > 0 {
            // A handful of 20kb hotspots, one chromosome each
            let hotspots: Vec<(usize, u64)> = (0..4)
                .map(|_| {
                    let chrom_idx = self.genome.sample_chromosome(rng);
                    let size = self.genome.chromosomes[chrom_idx].1;
                    (chrom_idx, rng.gen_range(1..size.saturating_sub(20_000).max(2)))
                })
                .collect();

            for _ in 0..in_hotspot {
                let (chrom_idx, origin) = hotspots[rng.gen_range(0..hotspots.len())];
                let start = origin + rng.gen_range(0..20_000);
                features.push(self.feature_at(chrom_idx, start, rng));
            }
        }

        for _ in in_hotspot..count {
            let chrom_idx = self.genome.sample_chromosome(rng);
            let size = self.genome.chromosomes[chrom_idx].1;
            let start = rng.gen_range(1..size.saturating_sub(self.config.len_max).max(2));
            features.push(self.feature_at(chrom_idx, start, rng));
        }

        features
    }

    #[inline]
    fn feature_at(&self, chrom_idx: usize, start: u64, rng: &mut SmallRng) -> RawFeature {
        let len_min = self.config.len_min.max(1);
        let len = rng.gen_range(len_min..=self.config.len_max.max(len_min));
        RawFeature {
            chrom_idx,
            start,
            end: start + len - 1,
            kind: rng.gen_range(0..FEATURE_TYPES.len()),
        }
    }
}

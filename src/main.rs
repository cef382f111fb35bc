//! OLGFF: zone-based overlap detection between two GFF files
//!
//! Usage: olgff <COMMAND> [OPTIONS]

use clap::{ArgAction, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use olgff::engine::{scan_zone_counts, OverlapConfig, OverlapEngine};
use olgff::generate::{GenerateCommand, GenerateConfig};
use olgff::gff::{has_gff_extension, GffError};
use olgff::matcher::ExecutionMode;
use olgff::store::{retain_shared, FeatureStore};
use olgff::zones::{ZoneCount, ZoneWidthPolicy, DEFAULT_ZONES};

#[derive(Parser)]
#[command(name = "olgff")]
#[command(version)]
#[command(about = "Find overlapped features between two GFF files using a zone-based approach", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report every overlapping feature pair between two GFF files
    Overlap {
        /// First input GFF file (.gff or .gff.gz)
        gff1: PathBuf,

        /// Second input GFF file (.gff or .gff.gz)
        gff2: PathBuf,

        /// Number of zones to divide each chromosome into
        #[arg(short, long, default_value_t = DEFAULT_ZONES as i64, allow_negative_numbers = true)]
        zones: i64,

        /// Output TSV file [default: <gff1_basename>.<gff2_basename>.overlap.tsv]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compare all feature pairs instead of using zones
        #[arg(long)]
        naive: bool,

        /// Size zones from the last listed feature of each chromosome
        /// instead of the largest end coordinate (position-sorted input only)
        #[arg(long)]
        legacy_zone_width: bool,

        /// Execution mode: sequential|parallel (default: chosen by input size)
        #[arg(long)]
        mode: Option<String>,
    },

    /// Time the matcher across several zone counts
    Scan {
        /// First input GFF file (.gff or .gff.gz)
        gff1: PathBuf,

        /// Second input GFF file (.gff or .gff.gz)
        gff2: PathBuf,

        /// Zone counts to try (comma-separated)
        #[arg(short, long, value_delimiter = ',', default_value = "1,5,10,50,100", allow_negative_numbers = true)]
        zones: Vec<i64>,

        /// Output TSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Size zones from the last listed feature of each chromosome
        #[arg(long)]
        legacy_zone_width: bool,
    },

    /// Generate a synthetic pair of GFF files for benchmarking
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "./olgff_bench_data")]
        output: PathBuf,

        /// Features in the first file
        #[arg(short = 'a', long, default_value_t = 100_000)]
        a_count: u64,

        /// Features in the second file
        #[arg(short = 'b', long, default_value_t = 100_000)]
        b_count: u64,

        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pack most features into a few hotspots
        #[arg(long)]
        clustered: bool,

        /// Minimum feature length
        #[arg(long, default_value_t = 50)]
        len_min: u64,

        /// Maximum feature length
        #[arg(long, default_value_t = 5000)]
        len_max: u64,

        /// Leave features in generation order instead of sorting by position
        #[arg(long)]
        no_sort: bool,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn width_policy(legacy: bool) -> ZoneWidthPolicy {
    if legacy {
        ZoneWidthPolicy::LastFeature
    } else {
        ZoneWidthPolicy::MaxEnd
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // Configure thread pool if --threads specified
    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            log::warn!("Failed to initialize thread pool: {}", e);
        }
    }

    let result = match cli.command {
        Commands::Overlap {
            gff1,
            gff2,
            zones,
            output,
            naive,
            legacy_zone_width,
            mode,
        } => run_overlap(gff1, gff2, zones, output, naive, legacy_zone_width, mode),

        Commands::Scan {
            gff1,
            gff2,
            zones,
            output,
            legacy_zone_width,
        } => run_scan(gff1, gff2, zones, output, legacy_zone_width),

        Commands::Generate {
            output,
            a_count,
            b_count,
            seed,
            clustered,
            len_min,
            len_max,
            no_sort,
            force,
        } => run_generate(GenerateConfig {
            output_dir: output,
            a_count,
            b_count,
            seed,
            clustered,
            len_min,
            len_max,
            sorted: !no_sort,
            force,
            ..Default::default()
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_overlap(
    gff1: PathBuf,
    gff2: PathBuf,
    zones: i64,
    output: Option<PathBuf>,
    naive: bool,
    legacy_zone_width: bool,
    mode: Option<String>,
) -> Result<(), GffError> {
    // Configuration is checked before any file is touched
    let zones = ZoneCount::new(zones)?;
    let mode = mode
        .map(|m| {
            ExecutionMode::from_str(&m).ok_or_else(|| {
                GffError::Configuration(format!("Unknown mode '{}' (sequential|parallel)", m))
            })
        })
        .transpose()?;

    let mut config = OverlapConfig::new(gff1, gff2)
        .with_zones(zones)
        .with_width_policy(width_policy(legacy_zone_width))
        .with_naive(naive);
    if let Some(output) = output {
        config = config.with_output(output);
    }
    if let Some(mode) = mode {
        config = config.with_mode(mode);
    }

    let stats = OverlapEngine::new(config).run()?;
    log::debug!("{}", stats);
    println!(
        "Overlap gff features with {} zones completed in {} seconds",
        stats.zones, stats.elapsed_secs
    );
    Ok(())
}

fn run_scan(
    gff1: PathBuf,
    gff2: PathBuf,
    zones: Vec<i64>,
    output: Option<PathBuf>,
    legacy_zone_width: bool,
) -> Result<(), GffError> {
    let zone_counts = zones
        .into_iter()
        .map(ZoneCount::new)
        .collect::<Result<Vec<_>, _>>()?;

    for path in [&gff1, &gff2] {
        if !has_gff_extension(path) {
            return Err(GffError::InvalidInput(format!(
                "{}: file type gff/gff.gz expected",
                path.display()
            )));
        }
    }

    let a = FeatureStore::load(&gff1)?;
    let b = FeatureStore::load(&gff2)?;
    let (a, b) = retain_shared(a, b);
    let rows = scan_zone_counts(&a, &b, &zone_counts, width_policy(legacy_zone_width))?;

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|source| {
            GffError::OutputWrite {
                path: path.clone(),
                source,
            }
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let write_rows = |writer: &mut dyn Write| -> io::Result<()> {
        writeln!(writer, "zones\tseconds\tcomparisons\toverlaps")?;
        for row in &rows {
            writeln!(
                writer,
                "{}\t{:.6}\t{}\t{}",
                row.zones, row.seconds, row.comparisons, row.overlaps
            )?;
        }
        writer.flush()
    };
    write_rows(writer.as_mut()).map_err(|source| GffError::OutputWrite {
        path: output.unwrap_or_else(|| PathBuf::from("-")),
        source,
    })
}

fn run_generate(config: GenerateConfig) -> Result<(), GffError> {
    let stats = GenerateCommand::new(config).run()?;
    log::info!("Complete: {}", stats);
    Ok(())
}

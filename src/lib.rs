// Clippy allows for the whole crate
#![allow(clippy::should_implement_trait)]
#![allow(clippy::type_complexity)]

//! OLGFF: zone-based overlap detection between two GFF files
//!
//! Finds every pair of features, one from each input, whose coordinates
//! intersect on the same chromosome. Instead of comparing all pairs, each
//! chromosome is split into equal-width zones and only features sharing a
//! zone are compared.
//!
//! # Features
//!
//! - **Zone partitioning**: shared zone boundaries per chromosome
//! - **Parallel processing**: chromosomes are matched concurrently with Rayon
//! - **Exact output**: each intersecting pair is reported once, whatever the zone count
//!
//! # Example
//!
//! ```rust,no_run
//! use olgff::{FeatureStore, ZoneCount, ZoneMatcher};
//!
//! let a = FeatureStore::load("a.gff").unwrap();
//! let b = FeatureStore::load("b.gff.gz").unwrap();
//!
//! let matcher = ZoneMatcher::new(ZoneCount::new(10).unwrap());
//! let (overlaps, stats) = matcher.find_overlaps(&a, &b);
//! println!("{} overlaps ({})", overlaps.len(), stats);
//! ```

pub mod engine;
pub mod feature;
pub mod generate;
pub mod gff;
pub mod matcher;
pub mod report;
pub mod store;
pub mod zones;

// Re-export commonly used types
pub use engine::{OverlapConfig, OverlapEngine, OverlapStats};
pub use feature::Feature;
pub use gff::{parse_features, read_features, GffError, GffReader};
pub use matcher::{naive_overlaps, ExecutionMode, Overlap, OverlapRecord, ZoneMatcher};
pub use store::{retain_shared, FeatureStore};
pub use zones::{ZoneBuckets, ZoneCount, ZoneMarks, ZoneWidthPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{OverlapConfig, OverlapEngine};
    pub use crate::feature::Feature;
    pub use crate::gff::{read_features, GffError};
    pub use crate::matcher::{naive_overlaps, Overlap, ZoneMatcher};
    pub use crate::report::OverlapWriter;
    pub use crate::store::{retain_shared, FeatureStore};
    pub use crate::zones::{ZoneCount, ZoneWidthPolicy};
}

//! Features grouped by chromosome.

use crate::feature::Feature;
use crate::gff::{GffReader, Result};
use rustc_hash::FxHashMap;
use std::path::Path;

/// A feature collection organized by chromosome.
///
/// Chromosomes are kept in order of first appearance; each chromosome's
/// features are stored contiguously in input order, so a feature is
/// identified within its chromosome by a dense index.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    chroms: Vec<String>,
    lookup: FxHashMap<String, usize>,
    features: Vec<Vec<Feature>>,
}

impl FeatureStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every feature of a GFF file (plain or gzip).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut store = Self::new();
        for feature in GffReader::from_path(path)?.features() {
            store.push(feature?);
        }
        log::debug!(
            "Loaded {} features on {} chromosomes from {}",
            store.len(),
            store.num_chromosomes(),
            path.display()
        );
        Ok(store)
    }

    /// Build a store from features, preserving their order within each chromosome.
    pub fn from_features<I: IntoIterator<Item = Feature>>(features: I) -> Self {
        let mut store = Self::new();
        for feature in features {
            store.push(feature);
        }
        store
    }

    /// Append a feature to its chromosome.
    pub fn push(&mut self, feature: Feature) {
        let slot = match self.lookup.get(&feature.chrom) {
            Some(&slot) => slot,
            None => {
                let slot = self.chroms.len();
                self.chroms.push(feature.chrom.clone());
                self.lookup.insert(feature.chrom.clone(), slot);
                self.features.push(Vec::new());
                slot
            }
        };
        self.features[slot].push(feature);
    }

    /// Chromosome names in order of first appearance.
    pub fn chromosomes(&self) -> &[String] {
        &self.chroms
    }

    /// Features of one chromosome, in input order.
    pub fn get(&self, chrom: &str) -> Option<&[Feature]> {
        self.lookup
            .get(chrom)
            .map(|&slot| self.features[slot].as_slice())
    }

    /// True if the chromosome has at least one feature.
    pub fn contains(&self, chrom: &str) -> bool {
        self.lookup.contains_key(chrom)
    }

    /// Iterate `(chromosome, features)` in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Feature])> {
        self.chroms
            .iter()
            .zip(self.features.iter())
            .map(|(chrom, features)| (chrom.as_str(), features.as_slice()))
    }

    /// Total number of features.
    pub fn len(&self) -> usize {
        self.features.iter().map(Vec::len).sum()
    }

    /// True if no features are stored.
    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }

    /// Number of chromosomes.
    pub fn num_chromosomes(&self) -> usize {
        self.chroms.len()
    }

    fn insert_chromosome(&mut self, chrom: String, features: Vec<Feature>) {
        self.lookup.insert(chrom.clone(), self.chroms.len());
        self.chroms.push(chrom);
        self.features.push(features);
    }

    /// Consume the store, yielding `(chromosome, features)` in registry order.
    fn into_parts(self) -> impl Iterator<Item = (String, Vec<Feature>)> {
        self.chroms.into_iter().zip(self.features)
    }
}

/// Restrict both collections to the chromosomes they share.
///
/// Chromosomes found on one side only cannot produce overlaps and are dropped
/// without error. The result follows A's chromosome order.
pub fn retain_shared(a: FeatureStore, b: FeatureStore) -> (FeatureStore, FeatureStore) {
    let mut b_parts: FxHashMap<String, Vec<Feature>> = FxHashMap::default();
    for (chrom, features) in b.into_parts() {
        b_parts.insert(chrom, features);
    }

    let mut a_kept = FeatureStore::new();
    let mut b_kept = FeatureStore::new();

    for (chrom, a_features) in a.into_parts() {
        match b_parts.remove(&chrom) {
            Some(b_features) => {
                a_kept.insert_chromosome(chrom.clone(), a_features);
                b_kept.insert_chromosome(chrom, b_features);
            }
            None => log::debug!("Dropping {}: absent from second input", chrom),
        }
    }

    for chrom in b_parts.keys() {
        log::debug!("Dropping {}: absent from first input", chrom);
    }

    (a_kept, b_kept)
}

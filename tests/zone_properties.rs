//! Property tests for the zone matcher.
//!
//! The zone matcher must report exactly the pairs an all-pairs comparison
//! finds, for any input and any zone count, and never report a pair twice.

use olgff::feature::Feature;
use olgff::matcher::{naive_overlaps, ExecutionMode, Overlap, ZoneMatcher};
use olgff::store::FeatureStore;
use olgff::zones::{ZoneCount, ZoneMarks, ZoneWidthPolicy};
use proptest::prelude::*;
use std::collections::HashSet;

const CHROMS: [&str; 3] = ["chr1", "chr2", "chrM"];

/// A feature on one of a few chromosomes, with start <= end.
fn feature_strategy() -> impl Strategy<Value = Feature> {
    (0..CHROMS.len(), 1u64..5_000, 0u64..800).prop_map(|(chrom, start, len)| {
        Feature::new(CHROMS[chrom], start, start + len)
    })
}

fn store_strategy() -> impl Strategy<Value = FeatureStore> {
    prop::collection::vec(feature_strategy(), 0..60).prop_map(FeatureStore::from_features)
}

fn sorted(mut overlaps: Vec<Overlap>) -> Vec<Overlap> {
    overlaps.sort();
    overlaps
}

proptest! {
    #[test]
    fn zone_matcher_equals_naive(a in store_strategy(), b in store_strategy(), zones in 1i64..64) {
        let matcher = ZoneMatcher::new(ZoneCount::new(zones).unwrap());
        let (got, _) = matcher.find_overlaps(&a, &b);
        prop_assert_eq!(sorted(got), sorted(naive_overlaps(&a, &b)));
    }

    #[test]
    fn no_pair_reported_twice(a in store_strategy(), b in store_strategy(), zones in 1i64..64) {
        let (got, _) = ZoneMatcher::new(ZoneCount::new(zones).unwrap()).find_overlaps(&a, &b);
        let pairs: HashSet<(usize, usize, usize)> = got.iter().map(|o| (o.chrom, o.a, o.b)).collect();
        prop_assert_eq!(pairs.len(), got.len());
    }

    #[test]
    fn single_zone_has_no_duplicates(a in store_strategy(), b in store_strategy()) {
        let (got, stats) = ZoneMatcher::new(ZoneCount::new(1).unwrap()).find_overlaps(&a, &b);
        let pairs: HashSet<(usize, usize, usize)> = got.iter().map(|o| (o.chrom, o.a, o.b)).collect();
        prop_assert_eq!(pairs.len(), got.len());
        // One zone compares every pair on every shared chromosome
        let all_pairs: u64 = a
            .iter()
            .map(|(chrom, fa)| (fa.len() * b.get(chrom).map_or(0, |fb| fb.len())) as u64)
            .sum();
        prop_assert_eq!(stats.comparisons, all_pairs);
    }

    #[test]
    fn intersection_is_symmetric(f1 in feature_strategy(), f2 in feature_strategy()) {
        prop_assert_eq!(f1.overlaps(&f2), f2.overlaps(&f1));
        prop_assert_eq!(f1.overlap_range(&f2), f2.overlap_range(&f1));
        if let Some((start, end)) = f1.overlap_range(&f2) {
            prop_assert!(start <= end);
        }
    }

    #[test]
    fn swapping_collections_mirrors_pairs(a in store_strategy(), b in store_strategy(), zones in 1i64..32) {
        let matcher = ZoneMatcher::new(ZoneCount::new(zones).unwrap());
        let (ab, _) = matcher.find_overlaps(&a, &b);
        let (ba, _) = matcher.find_overlaps(&b, &a);

        let forward: HashSet<(String, usize, usize, u64, u64)> = ab
            .iter()
            .map(|o| (a.chromosomes()[o.chrom].clone(), o.a, o.b, o.start, o.end))
            .collect();
        let backward: HashSet<(String, usize, usize, u64, u64)> = ba
            .iter()
            .map(|o| (b.chromosomes()[o.chrom].clone(), o.b, o.a, o.start, o.end))
            .collect();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn zone_marks_increase_and_cover(a in store_strategy(), b in store_strategy(), zones in 1i64..128) {
        let zones = ZoneCount::new(zones).unwrap();
        for (chrom, fa) in a.iter() {
            let Some(fb) = b.get(chrom) else { continue };
            let marks = ZoneMarks::compute(fa, fb, zones, ZoneWidthPolicy::MaxEnd);
            let max_end = fa.iter().chain(fb).map(|f| f.end).max().unwrap();

            prop_assert_eq!(marks.len(), zones.get());
            prop_assert!(marks.marks().windows(2).all(|w| w[0] < w[1]));
            prop_assert!(*marks.marks().last().unwrap() >= max_end);
        }
    }

    #[test]
    fn matching_is_idempotent(a in store_strategy(), b in store_strategy(), zones in 1i64..64) {
        let matcher = ZoneMatcher::new(ZoneCount::new(zones).unwrap());
        let (first, _) = matcher.clone().with_mode(ExecutionMode::Parallel).find_overlaps(&a, &b);
        let (second, _) = matcher.with_mode(ExecutionMode::Sequential).find_overlaps(&a, &b);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn sorted_input_legacy_width_is_complete(a in store_strategy(), b in store_strategy(), zones in 1i64..64) {
        // With features sorted by end the last listed feature bounds the chromosome.
        let sort_by_end = |store: &FeatureStore| {
            let mut features: Vec<Feature> = store.iter().flat_map(|(_, f)| f.iter().cloned()).collect();
            features.sort_by_key(|f| f.end);
            FeatureStore::from_features(features)
        };
        let a = sort_by_end(&a);
        let b = sort_by_end(&b);

        let (got, stats) = ZoneMatcher::new(ZoneCount::new(zones).unwrap())
            .with_policy(ZoneWidthPolicy::LastFeature)
            .find_overlaps(&a, &b);
        prop_assert_eq!(stats.unassigned, 0);
        prop_assert_eq!(sorted(got), sorted(naive_overlaps(&a, &b)));
    }
}

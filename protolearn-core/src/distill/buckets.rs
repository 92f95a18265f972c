//! Equal-probability bucket maps for the chi-squared distribution-fit test
//! (`SPEC_FULL.md` §4.3 step 6).
//!
//! A [`Buckets`] maps a z-scored sample onto one of `num_buckets`
//! equal-probability bins under a candidate [`Distribution`]; comparing
//! observed against expected counts yields the chi-squared statistic that
//! [`crate::distill::chisquare`] tests against a critical value. Bucket
//! maps are expensive to build (each requires integrating a density
//! function over 1024 slots) and are reused across clusters sharing a
//! `(distribution, num_buckets)` pair via a [`BucketCache`].

use std::num::NonZeroUsize;
use std::rc::Rc;

use lru::LruCache;

use super::prototype::Distribution;

/// Quantisation resolution for the z-score-to-bucket lookup table.
pub const BUCKET_TABLE_SIZE: usize = 1024;
/// Half-width, in standard deviations, of the z-score domain the bucket
/// map covers.
pub const NORMAL_EXTENT: f64 = 3.0;

const ANCHORS: [(u32, u32); 8] = [
    (5, 5),
    (200, 16),
    (400, 20),
    (600, 24),
    (800, 27),
    (1000, 30),
    (1500, 35),
    (2000, 39),
];

/// Picks a bucket count for `num_samples`, interpolating piecewise
/// linearly between the historical anchor points so that small clusters
/// get coarse, stable bins and large clusters get finer ones.
#[expect(clippy::cast_possible_truncation, reason = "rounded bucket count fits comfortably in usize")]
#[must_use]
pub fn optimum_num_buckets(num_samples: u32) -> usize {
    let first = ANCHORS[0];
    let last = ANCHORS[ANCHORS.len() - 1];
    if num_samples <= first.0 {
        return first.1 as usize;
    }
    if num_samples >= last.0 {
        return last.1 as usize;
    }

    let mut result = last.1 as usize;
    for pair in ANCHORS.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if num_samples >= x0 && num_samples <= x1 {
            let t = f64::from(num_samples - x0) / f64::from(x1 - x0);
            result = (f64::from(y0) + t * f64::from(y1 - y0)).round() as usize;
            break;
        }
    }
    result
}

/// A z-score-to-bucket lookup table for one `(distribution, num_buckets)`
/// pair, with buckets chosen so each holds equal probability mass under
/// that distribution.
#[derive(Debug, Clone)]
pub struct Buckets {
    distribution: Distribution,
    num_buckets: usize,
    bucket_of: Vec<u16>,
}

impl Buckets {
    /// Builds the bucket map for `distribution` with `num_buckets` bins.
    ///
    /// # Panics
    /// Panics in debug builds if `num_buckets` is zero.
    #[must_use]
    pub fn build(distribution: Distribution, num_buckets: usize) -> Self {
        debug_assert!(num_buckets > 0, "num_buckets must be positive");
        let bucket_of = match distribution {
            Distribution::Normal => build_normal_table(num_buckets),
            Distribution::Uniform | Distribution::Random => build_uniform_table(num_buckets),
        };
        Self {
            distribution,
            num_buckets,
            bucket_of,
        }
    }

    /// The distribution this bucket map was built for.
    #[rustfmt::skip]
    #[must_use]
    pub const fn distribution(&self) -> Distribution { self.distribution }

    /// Number of bins.
    #[rustfmt::skip]
    #[must_use]
    pub const fn num_buckets(&self) -> usize { self.num_buckets }

    /// Maps a z-score to its bucket index, clamping to the covered domain.
    #[expect(clippy::float_arithmetic, reason = "quantising a z-score into a lookup index")]
    #[expect(clippy::cast_possible_truncation, reason = "quantised index is bounded by BUCKET_TABLE_SIZE")]
    #[expect(clippy::cast_sign_loss, reason = "value is clamped non-negative before the cast")]
    #[must_use]
    pub fn bucket_for(&self, z: f64) -> usize {
        let normalised = (z + NORMAL_EXTENT) / (2.0 * NORMAL_EXTENT);
        let clamped = normalised.clamp(0.0, 1.0);
        let idx = ((clamped * BUCKET_TABLE_SIZE as f64) as usize).min(BUCKET_TABLE_SIZE - 1);
        self.bucket_of.get(idx).copied().unwrap_or(0) as usize
    }
}

#[expect(clippy::float_arithmetic, reason = "numeric integration of the normal density")]
#[expect(clippy::cast_possible_truncation, reason = "bucket index is bounded by num_buckets")]
#[expect(clippy::cast_sign_loss, reason = "cumulative fraction is non-negative by construction")]
fn build_normal_table(num_buckets: usize) -> Vec<u16> {
    let step = 2.0 * NORMAL_EXTENT / BUCKET_TABLE_SIZE as f64;
    let density: Vec<f64> = (0..BUCKET_TABLE_SIZE)
        .map(|i| {
            let z = -NORMAL_EXTENT + step * (i as f64 + 0.5);
            (-z * z / 2.0).exp()
        })
        .collect();
    let total: f64 = density.iter().sum();

    let mut table = vec![0_u16; BUCKET_TABLE_SIZE];
    let mut cumulative = 0.0;
    for (i, mass) in density.iter().enumerate() {
        cumulative += mass;
        let fraction = cumulative / total;
        let bucket = ((fraction * num_buckets as f64) as usize).min(num_buckets - 1);
        table[i] = bucket as u16;
    }
    table
}

#[expect(clippy::float_arithmetic, reason = "equal-width bucket assignment")]
#[expect(clippy::cast_possible_truncation, reason = "bucket index is bounded by num_buckets")]
#[expect(clippy::cast_sign_loss, reason = "fraction is non-negative by construction")]
fn build_uniform_table(num_buckets: usize) -> Vec<u16> {
    (0..BUCKET_TABLE_SIZE)
        .map(|i| {
            let fraction = (i as f64 + 0.5) / BUCKET_TABLE_SIZE as f64;
            let bucket = ((fraction * num_buckets as f64) as usize).min(num_buckets - 1);
            bucket as u16
        })
        .collect()
}

/// Fills bucket counts for a sample set, handling the degenerate
/// zero-variance case by distributing samples round-robin across buckets
/// rather than dividing by a zero standard deviation.
#[expect(clippy::float_arithmetic, reason = "z-scoring samples against mean/std_dev")]
#[must_use]
pub fn fill_buckets(buckets: &Buckets, samples: &[f32], mean: f32, std_dev: f32) -> Vec<u32> {
    let mut counts = vec![0_u32; buckets.num_buckets()];
    if std_dev <= f32::EPSILON {
        for (i, _) in samples.iter().enumerate() {
            if let Some(count) = counts.get_mut(i % buckets.num_buckets().max(1)) {
                *count += 1;
            }
        }
        return counts;
    }
    for &sample in samples {
        let z = f64::from((sample - mean) / std_dev);
        let bucket = buckets.bucket_for(z);
        if let Some(count) = counts.get_mut(bucket) {
            *count += 1;
        }
    }
    counts
}

/// Chi-squared goodness-of-fit statistic for equal-probability bins:
/// `sum((observed - expected)^2 / expected)`.
#[expect(clippy::float_arithmetic, reason = "chi-squared statistic accumulation")]
#[must_use]
pub fn chi_squared_statistic(observed: &[u32], total_samples: u32) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    let expected = f64::from(total_samples) / observed.len() as f64;
    if expected <= 0.0 {
        return 0.0;
    }
    observed
        .iter()
        .map(|&count| {
            let diff = f64::from(count) - expected;
            diff * diff / expected
        })
        .sum()
}

/// Degrees of freedom for a distribution fit with `num_buckets` bins:
/// `num_buckets` minus the distribution's parameter-count offset, rounded
/// up to the next even number (matching the historical implementation's
/// asymmetric treatment of Normal/Uniform versus Random).
#[must_use]
pub const fn degrees_of_freedom(distribution: Distribution, num_buckets: usize) -> u32 {
    let offset = match distribution {
        Distribution::Normal | Distribution::Uniform => 3,
        Distribution::Random => 1,
    };
    let adjusted = if num_buckets > offset { num_buckets - offset } else { 2 };
    let adjusted = if adjusted < 2 { 2 } else { adjusted };
    if adjusted % 2 == 0 { adjusted as u32 } else { (adjusted + 1) as u32 }
}

/// Caches built [`Buckets`] by `(distribution, num_buckets)`, owned by
/// whichever [`crate::distill::ProtoDistiller`] constructs it — not a
/// process-wide global (`SPEC_FULL.md` §9 redesign flag).
pub struct BucketCache {
    cache: LruCache<(Distribution, usize), Rc<Buckets>>,
}

impl BucketCache {
    /// Creates a cache holding at most `capacity` bucket maps.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Returns the bucket map for `(distribution, num_buckets)`, building
    /// and caching it on first use.
    pub fn get_or_build(&mut self, distribution: Distribution, num_buckets: usize) -> Rc<Buckets> {
        if let Some(existing) = self.cache.get(&(distribution, num_buckets)) {
            return Rc::clone(existing);
        }
        let built = Rc::new(Buckets::build(distribution, num_buckets));
        self.cache.put((distribution, num_buckets), Rc::clone(&built));
        built
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 5)]
    #[case(5, 5)]
    #[case(200, 16)]
    #[case(1000, 30)]
    #[case(5000, 39)]
    fn optimum_num_buckets_matches_anchor_table(#[case] samples: u32, #[case] expected: usize) {
        assert_eq!(optimum_num_buckets(samples), expected);
    }

    #[test]
    fn normal_bucket_map_is_roughly_equal_probability() {
        let buckets = Buckets::build(Distribution::Normal, 10);
        let mut counts = [0_u32; 10];
        let step = 0.01;
        let mut z = -NORMAL_EXTENT;
        while z <= NORMAL_EXTENT {
            counts[buckets.bucket_for(z)] += 1;
            z += step;
        }
        let max = *counts.iter().max().unwrap_or(&0);
        let min = *counts.iter().min().unwrap_or(&0);
        assert!(max - min < max / 2 + 5, "bucket occupancy too skewed: {counts:?}");
    }

    #[test]
    fn fill_buckets_handles_zero_variance_round_robin() {
        let buckets = Buckets::build(Distribution::Normal, 4);
        let samples = vec![1.0_f32; 9];
        let counts = fill_buckets(&buckets, &samples, 1.0, 0.0);
        assert_eq!(counts.iter().sum::<u32>(), 9);
        assert!(counts.iter().all(|&c| c == 2 || c == 3));
    }

    #[test]
    fn chi_squared_statistic_is_zero_for_uniform_counts() {
        let observed = vec![10_u32; 5];
        assert_eq!(chi_squared_statistic(&observed, 50), 0.0);
    }

    #[test]
    fn bucket_cache_reuses_built_maps() {
        let mut cache = BucketCache::new(4);
        let a = cache.get_or_build(Distribution::Normal, 10);
        let b = cache.get_or_build(Distribution::Normal, 10);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[rstest]
    #[case(Distribution::Normal, 10, 8)]
    #[case(Distribution::Uniform, 10, 8)]
    #[case(Distribution::Random, 10, 10)]
    fn degrees_of_freedom_applies_offset_and_rounds_up(#[case] distribution: Distribution, #[case] num_buckets: usize, #[case] expected: u32) {
        assert_eq!(degrees_of_freedom(distribution, num_buckets), expected);
    }
}

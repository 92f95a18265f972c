//! Statistical prototype distillation: turns a [`ClusterForest`] into a
//! set of [`Prototype`]s, fitting each candidate cluster to the
//! configured [`ProtoStyle`] and rejecting clusters that fail a
//! significance, independence, Hotelling, or distribution-fit gate in
//! favour of re-examining their children (`SPEC_FULL.md` §4.3).
//!
//! Traversal is root-first, left-before-right, via an explicit work
//! stack rather than recursion, so a deeply unbalanced cluster tree
//! cannot blow the call stack (`SPEC_FULL.md` §5).

pub mod buckets;
pub mod chisquare;
mod ftable;
pub mod hotelling;
mod linalg;
pub mod prototype;

pub use prototype::{Distribution, ProtoShape, Prototype};

use std::collections::HashSet;

use crate::cluster::{Cluster, ClusterForest};
use crate::config::{ClusterConfig, ProtoStyle};
use crate::param::ParamDesc;
use buckets::{BucketCache, chi_squared_statistic, degrees_of_freedom, fill_buckets, optimum_num_buckets};
use chisquare::ChiSquaredTable;
use hotelling::HotellingTest;

/// Floor applied to every variance estimate, guarding the reciprocal
/// magnitude formulas against division by (near-)zero.
pub const MIN_VARIANCE: f32 = 0.0004;
const BUCKET_CACHE_CAPACITY: usize = 64;

/// Saturating `usize -> u32` conversion for sample/dimension counts,
/// used in place of `as u32` so the workspace's truncation lint has
/// nothing to flag; counts in this domain never approach `u32::MAX`.
fn len_as_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Fits prototypes from a cluster forest, owning the per-run chi-squared
/// memo and bucket-map cache (`SPEC_FULL.md` §9 redesign flag: these are
/// owned by the distiller, not process-wide globals).
pub struct ProtoDistiller {
    params: Vec<ParamDesc>,
    config: ClusterConfig,
    chi_table: ChiSquaredTable,
    bucket_cache: BucketCache,
    hotelling: HotellingTest,
}

impl ProtoDistiller {
    /// Creates a distiller over the given per-dimension descriptors and
    /// tuning configuration.
    #[must_use]
    pub fn new(params: Vec<ParamDesc>, config: ClusterConfig) -> Self {
        Self {
            params,
            config,
            chi_table: ChiSquaredTable::new(),
            bucket_cache: BucketCache::new(BUCKET_CACHE_CAPACITY),
            hotelling: HotellingTest::new(),
        }
    }

    /// Distills every cluster in `forest` into a prototype: clusters
    /// passing every gate in `make_prototype` (multi-character filter,
    /// significance, independence, distribution fit) contribute a
    /// significant prototype; clusters too small to trust contribute an
    /// insignificant one rather than splitting further; clusters failing
    /// the multi-character filter or a fit test are split into their two
    /// children instead (`SPEC_FULL.md` §4.3). `samples` must be the
    /// exact slice that was passed to the [`crate::cluster::ClusterBuilder`]
    /// that produced `forest`: leaf cluster arena indices correspond 1:1
    /// to `samples` indices.
    #[must_use]
    pub fn distill(&mut self, forest: &ClusterForest, samples: &[(Vec<f32>, i32)]) -> Vec<Prototype> {
        let total_chars = len_as_u32(samples.len());
        let mut prototypes = Vec::new();
        let mut stack: Vec<usize> = forest.roots().to_vec();

        while let Some(idx) = stack.pop() {
            let cluster = &forest.clusters()[idx];
            let leaf_indices = collect_leaf_indices(forest, idx);

            let char_ids: Vec<i32> = leaf_indices.iter().map(|&leaf| samples[leaf].1).collect();
            if multiple_char_samples(&char_ids, self.config.max_illegal()) {
                push_children(cluster, &mut stack);
                continue;
            }
            let composed_from_char_fragments = any_repeated_char(&char_ids);

            let raw: Vec<&[f32]> = leaf_indices.iter().map(|&leaf| samples[leaf].0.as_slice()).collect();
            let mean = cluster.mean().to_vec();

            if !is_significant(cluster.sample_count(), total_chars, self.config.min_samples()) {
                let shape = self.best_effort_shape(&raw, &mean);
                prototypes.push(
                    Prototype::new(mean, cluster.sample_count(), false, shape)
                        .with_char_fragments(composed_from_char_fragments),
                );
                continue;
            }

            match self.try_fit(forest, cluster, &raw, &mean) {
                Some((fitted_mean, shape)) => prototypes.push(
                    Prototype::new(fitted_mean, cluster.sample_count(), true, shape)
                        .with_char_fragments(composed_from_char_fragments),
                ),
                None => push_children(cluster, &mut stack),
            }
        }

        prototypes
    }

    /// Builds a best-effort shape for a degenerate cluster (too few
    /// samples to trust), skipping the independence, Hotelling, and
    /// distribution-fit gates entirely (`SPEC_FULL.md` §4.3 step 3).
    /// `Automatic` falls back to `Spherical`, the simplest shape, since
    /// there is no fit outcome to fall through on.
    fn best_effort_shape(&self, raw: &[&[f32]], mean: &[f32]) -> ProtoShape {
        match self.config.proto_style() {
            ProtoStyle::Elliptical => {
                let variance = compute_variance(raw, mean, &self.params);
                let magnitude = variance.iter().map(|&v| spherical_magnitude(v)).collect();
                ProtoShape::Elliptical { variance, magnitude }
            }
            ProtoStyle::Mixed => {
                let variance = compute_variance(raw, mean, &self.params);
                let magnitude = variance.iter().map(|&v| spherical_magnitude(v)).collect();
                let distribution = vec![Distribution::Normal; variance.len()];
                ProtoShape::Mixed { distribution, variance, magnitude }
            }
            ProtoStyle::Spherical | ProtoStyle::Automatic => {
                let variance = compute_variance(raw, mean, &self.params);
                let avg_variance = average(&variance).max(MIN_VARIANCE);
                ProtoShape::Spherical {
                    variance: avg_variance,
                    magnitude: spherical_magnitude(avg_variance),
                }
            }
        }
    }

    fn try_fit(&mut self, forest: &ClusterForest, cluster: &Cluster, raw: &[&[f32]], mean: &[f32]) -> Option<(Vec<f32>, ProtoShape)> {
        match self.config.proto_style() {
            ProtoStyle::Spherical => self.try_spherical(raw, mean).map(|shape| (mean.to_vec(), shape)),
            ProtoStyle::Elliptical => self.try_elliptical(forest, cluster, raw, mean).map(|shape| (mean.to_vec(), shape)),
            ProtoStyle::Mixed => self.try_mixed(raw, mean),
            ProtoStyle::Automatic => self
                .try_spherical(raw, mean)
                .or_else(|| self.try_elliptical(forest, cluster, raw, mean))
                .map(|shape| (mean.to_vec(), shape))
                .or_else(|| self.try_mixed(raw, mean)),
        }
    }

    /// Fits a single shared variance across every essential dimension,
    /// accepting only if every essential dimension's mean-centred offsets
    /// pass a normal-distribution chi-squared fit against that variance's
    /// square root (`cluster.cpp`'s `MakeSphericalProto`).
    fn try_spherical(&mut self, raw: &[&[f32]], mean: &[f32]) -> Option<ProtoShape> {
        let variance = compute_variance(raw, mean, &self.params);
        if !self.passes_independence(raw, mean, &variance) {
            return None;
        }
        let avg_variance = average(&variance).max(MIN_VARIANCE);
        let std_dev = avg_variance.sqrt();
        let fits = self.essential_dims_fit_normal(raw, mean, |_| std_dev);
        fits.then(|| ProtoShape::Spherical {
            variance: avg_variance,
            magnitude: spherical_magnitude(avg_variance),
        })
    }

    /// Fits an independent variance per essential dimension. If `cluster`
    /// has exactly two children, first tries the Hotelling's T² shortcut
    /// (`cluster.cpp`'s `TestEllipticalProto`): accepts immediately from
    /// the children's mean separation without a per-dimension distribution
    /// pass. Otherwise — or if the shortcut does not fire — falls through
    /// to a per-dimension normal-distribution chi-squared fit, exactly as
    /// `try_spherical` does but with each dimension's own variance
    /// (`cluster.cpp`'s `MakeEllipticalProto`).
    fn try_elliptical(&mut self, forest: &ClusterForest, cluster: &Cluster, raw: &[&[f32]], mean: &[f32]) -> Option<ProtoShape> {
        let variance = compute_variance(raw, mean, &self.params);
        if !self.passes_independence(raw, mean, &variance) {
            return None;
        }

        if let (Some(l), Some(r)) = (cluster.left(), cluster.right()) {
            let left_mean = forest.clusters()[l].mean();
            let right_mean = forest.clusters()[r].mean();
            if self.hotelling.accept(raw, mean, left_mean, right_mean, &self.params, self.config.magic_samples()) {
                let magnitude = variance.iter().map(|&v| spherical_magnitude(v)).collect();
                return Some(ProtoShape::Elliptical { variance, magnitude });
            }
        }

        let fits = self.essential_dims_fit_normal(raw, mean, |dim| variance[dim].sqrt());
        fits.then(|| {
            let magnitude = variance.iter().map(|&v| spherical_magnitude(v)).collect();
            ProtoShape::Elliptical { variance, magnitude }
        })
    }

    /// `true` if every essential dimension's mean-centred, circular-wrap
    /// adjusted offsets pass a normal-distribution chi-squared fit against
    /// `std_dev(dim)` (`cluster.cpp`'s shared `FillBuckets` +
    /// `DistributionOK` loop used by both `MakeSphericalProto` and
    /// `MakeEllipticalProto`).
    fn essential_dims_fit_normal(&mut self, raw: &[&[f32]], mean: &[f32], std_dev: impl Fn(usize) -> f32) -> bool {
        for dim in 0..mean.len() {
            if !self.params[dim].essential() {
                continue;
            }
            let offsets: Vec<f32> = raw.iter().map(|sample| self.params[dim].wrap_delta(sample[dim] - mean[dim])).collect();
            if !self.distribution_fits(Distribution::Normal, &offsets, 0.0, std_dev(dim)) {
                return false;
            }
        }
        true
    }

    /// Fits each essential dimension independently, trying normal then
    /// uniform then random in turn (`SPEC_FULL.md` §4.3 step 6). A
    /// dimension that settles on `Uniform` has its mean component
    /// recentred to the midpoint of the observed offset range, matching
    /// `cluster.cpp`'s `MakeDimUniform` (`SPEC_FULL.md` §4.3 recovered
    /// detail) — so the returned mean may differ per-dimension from the
    /// cluster centroid passed in.
    fn try_mixed(&mut self, raw: &[&[f32]], mean: &[f32]) -> Option<(Vec<f32>, ProtoShape)> {
        if raw.is_empty() {
            return None;
        }
        let dims = mean.len();
        let mut distribution = Vec::with_capacity(dims);
        let mut variance = Vec::with_capacity(dims);
        let mut magnitude = Vec::with_capacity(dims);
        let mut adjusted_mean = mean.to_vec();

        for dim in 0..dims {
            let per_dim: Vec<f32> = raw.iter().map(|sample| sample[dim]).collect();
            let param = self.params[dim];
            let (dist, var, mean_offset) = self.fit_dimension(&per_dim, mean[dim], &param);
            #[expect(clippy::float_arithmetic, reason = "recentring a dimension's mean by its fitted offset")]
            {
                adjusted_mean[dim] += mean_offset;
            }
            magnitude.push(mixed_magnitude(dist, var, &param));
            variance.push(var);
            distribution.push(dist);
        }

        Some((adjusted_mean, ProtoShape::Mixed { distribution, variance, magnitude }))
    }

    /// Returns `(distribution, variance, mean_offset)` for one essential
    /// dimension. `mean_offset` is non-zero only for `Uniform`, where the
    /// fitted mean is recentred to the midpoint of the observed offset
    /// range rather than the cluster centroid.
    fn fit_dimension(&mut self, per_dim: &[f32], mean: f32, param: &ParamDesc) -> (Distribution, f32, f32) {
        let offsets: Vec<f32> = per_dim.iter().map(|&v| param.wrap_delta(v - mean)).collect();
        let variance = dimension_variance(&offsets).max(MIN_VARIANCE);
        let std_dev = variance.sqrt();
        if self.distribution_fits(Distribution::Normal, &offsets, 0.0, std_dev) {
            return (Distribution::Normal, variance, 0.0);
        }
        if self.distribution_fits(Distribution::Uniform, &offsets, 0.0, std_dev) {
            let (min_offset, max_offset) = dimension_extrema(&offsets);
            #[expect(clippy::float_arithmetic, reason = "recentring and half-width of the observed offset range")]
            let (recentre, uniform_variance) = {
                let recentre = (min_offset + max_offset) / 2.0;
                let half_width = (max_offset - min_offset) / 2.0;
                (recentre, half_width.max(MIN_VARIANCE))
            };
            return (Distribution::Uniform, uniform_variance, recentre);
        }
        (Distribution::Random, param.half_range().max(MIN_VARIANCE), 0.0)
    }

    fn distribution_fits(&mut self, distribution: Distribution, per_dim: &[f32], mean: f32, std_dev: f32) -> bool {
        let num_buckets = optimum_num_buckets(len_as_u32(per_dim.len()));
        let bucket_map = self.bucket_cache.get_or_build(distribution, num_buckets);
        let observed = fill_buckets(&bucket_map, per_dim, mean, std_dev);
        let statistic = chi_squared_statistic(&observed, len_as_u32(per_dim.len()));
        let dof = degrees_of_freedom(distribution, num_buckets);
        let critical = self.chi_table.critical_value(dof, self.config.confidence());
        statistic <= critical
    }

    /// Rejects a spherical/elliptical fit when any pair of essential
    /// dimensions is more correlated than `config.independence()` allows,
    /// via a fourth-root-scaled normalised covariance — deliberately not
    /// the textbook Pearson coefficient (`SPEC_FULL.md` §9 Open
    /// Questions: preserved as historical behaviour).
    #[expect(clippy::float_arithmetic, reason = "pairwise correlation over feature dimensions")]
    fn passes_independence(&self, raw: &[&[f32]], mean: &[f32], variance: &[f32]) -> bool {
        let dims = mean.len();
        for i in 0..dims {
            if variance[i] <= MIN_VARIANCE {
                continue;
            }
            for j in (i + 1)..dims {
                if variance[j] <= MIN_VARIANCE {
                    continue;
                }
                let covariance = pairwise_covariance(raw, mean, &self.params, i, j);
                let normalised = covariance.abs() / (variance[i] * variance[j]).sqrt();
                let correlation = normalised.powf(0.25);
                if correlation > self.config.independence() {
                    return false;
                }
            }
        }
        true
    }
}

fn collect_leaf_indices(forest: &ClusterForest, root: usize) -> Vec<usize> {
    let mut stack = vec![root];
    let mut leaves = Vec::new();
    while let Some(idx) = stack.pop() {
        let cluster = &forest.clusters()[idx];
        match (cluster.left(), cluster.right()) {
            (None, None) => leaves.push(idx),
            (left, right) => {
                if let Some(r) = right {
                    stack.push(r);
                }
                if let Some(l) = left {
                    stack.push(l);
                }
            }
        }
    }
    leaves
}

fn push_children(cluster: &Cluster, stack: &mut Vec<usize>) {
    if let Some(r) = cluster.right() {
        stack.push(r);
    }
    if let Some(l) = cluster.left() {
        stack.push(l);
    }
}

#[expect(clippy::float_arithmetic, reason = "fraction-of-total significance check")]
fn is_significant(sample_count: u32, total_chars: u32, min_samples: f32) -> bool {
    if total_chars == 0 {
        return false;
    }
    f64::from(sample_count) / f64::from(total_chars) >= f64::from(min_samples)
}

fn multiple_char_samples(char_ids: &[i32], max_illegal: f32) -> bool {
    if char_ids.is_empty() {
        return false;
    }
    let mut seen = HashSet::new();
    let mut illegal = 0_u32;
    for &id in char_ids {
        if !seen.insert(id) {
            illegal += 1;
        }
    }
    #[expect(clippy::float_arithmetic, reason = "illegal-sample fraction check")]
    let fraction = f64::from(illegal) / f64::from(len_as_u32(char_ids.len()));
    fraction > f64::from(max_illegal)
}

#[expect(clippy::float_arithmetic, reason = "per-dimension unbiased variance over raw samples")]
#[expect(clippy::cast_precision_loss, reason = "sample counts stay well within f32's exact integer range")]
fn compute_variance(raw: &[&[f32]], mean: &[f32], params: &[ParamDesc]) -> Vec<f32> {
    let denom = (raw.len().saturating_sub(1)).max(1) as f32;
    mean.iter()
        .enumerate()
        .map(|(dim, &m)| {
            let sum_sq: f32 = raw
                .iter()
                .map(|sample| {
                    let delta = params[dim].wrap_delta(sample[dim] - m);
                    delta * delta
                })
                .sum();
            (sum_sq / denom).max(MIN_VARIANCE)
        })
        .collect()
}

/// Unbiased variance of a dimension's already mean-centred, circular-wrap
/// adjusted offsets.
#[expect(clippy::float_arithmetic, reason = "per-dimension unbiased variance over offset samples")]
#[expect(clippy::cast_precision_loss, reason = "sample counts stay well within f32's exact integer range")]
fn dimension_variance(offsets: &[f32]) -> f32 {
    let denom = (offsets.len().saturating_sub(1)).max(1) as f32;
    let sum_sq: f32 = offsets.iter().map(|&v| v * v).sum();
    sum_sq / denom
}

/// Smallest and largest of a dimension's mean-centred offsets, used to
/// recentre a `Uniform` fit to the midpoint of its observed range.
fn dimension_extrema(offsets: &[f32]) -> (f32, f32) {
    let min = offsets.iter().copied().fold(f32::INFINITY, f32::min);
    let max = offsets.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if min.is_finite() && max.is_finite() { (min, max) } else { (0.0, 0.0) }
}

#[expect(clippy::float_arithmetic, reason = "pairwise covariance over raw samples")]
fn pairwise_covariance(raw: &[&[f32]], mean: &[f32], params: &[ParamDesc], i: usize, j: usize) -> f32 {
    let denom = (raw.len().saturating_sub(1)).max(1) as f32;
    let sum: f32 = raw
        .iter()
        .map(|sample| {
            let di = params[i].wrap_delta(sample[i] - mean[i]);
            let dj = params[j].wrap_delta(sample[j] - mean[j]);
            di * dj
        })
        .sum();
    sum / denom
}

#[expect(clippy::float_arithmetic, reason = "arithmetic mean over per-dimension variances")]
fn average(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Gaussian density-normalising magnitude for one variance value; reused by
/// [`crate::merge`] when recombining per-dimension magnitudes on merge.
#[expect(clippy::float_arithmetic, reason = "normal-density magnitude normalisation")]
pub(crate) fn spherical_magnitude(variance: f32) -> f32 {
    1.0 / (2.0 * std::f32::consts::PI * variance).sqrt()
}

/// Density-normalising magnitude for one `Mixed`-style dimension. `Normal`
/// uses the usual Gaussian normalisation; `Uniform` uses the reciprocal of
/// its fitted half-width-derived variance; `Random` uses the reciprocal of
/// the dimension's full declared range rather than a fitted variance, since
/// a `Random` fit carries no meaningful spread estimate of its own.
#[expect(clippy::float_arithmetic, reason = "per-distribution density magnitude normalisation")]
pub(crate) fn mixed_magnitude(distribution: Distribution, variance: f32, param: &ParamDesc) -> f32 {
    match distribution {
        Distribution::Normal => spherical_magnitude(variance),
        Distribution::Uniform => 1.0 / (2.0 * variance),
        Distribution::Random => 1.0 / param.range().max(MIN_VARIANCE),
    }
}

/// Whether any character id in the cluster's leaves repeats another,
/// marking the resulting prototype as composed from character fragments
/// rather than one character's whole samples (`SPEC_FULL.md` §3).
fn any_repeated_char(char_ids: &[i32]) -> bool {
    let mut seen = HashSet::new();
    char_ids.iter().any(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterBuilder;

    fn linear_params(n: usize) -> Vec<ParamDesc> {
        (0..n).map(|_| ParamDesc::new(false, false, -10.0, 10.0)).collect()
    }

    fn config() -> ClusterConfig {
        crate::config::ClusterConfigBuilder::new()
            .with_min_samples(0.0)
            .with_max_illegal(1.0)
            .with_independence(1.0)
            .build()
            .expect("valid")
    }

    #[test]
    fn tight_cluster_is_distilled_into_a_significant_prototype() {
        let params = linear_params(1);
        let samples: Vec<(Vec<f32>, i32)> = (0..20).map(|i| (vec![f32::from(i % 3) * 0.01], i)).collect();
        let forest = ClusterBuilder::new(params.clone(), f32::MAX).build(&samples);

        let mut distiller = ProtoDistiller::new(params, config());
        let prototypes = distiller.distill(&forest, &samples);

        assert!(!prototypes.is_empty());
        assert!(prototypes.iter().all(Prototype::significant));
    }

    #[test]
    fn multiple_char_samples_flags_heavy_repetition() {
        let char_ids = vec![1, 1, 1, 1, 2];
        assert!(multiple_char_samples(&char_ids, 0.5));
        assert!(!multiple_char_samples(&char_ids, 0.9));
    }

    #[test]
    fn is_significant_respects_fraction_threshold() {
        assert!(is_significant(5, 10, 0.5));
        assert!(!is_significant(4, 10, 0.5));
    }

    #[test]
    fn mixed_style_assigns_a_distribution_per_dimension() {
        let params = linear_params(2);
        let samples: Vec<(Vec<f32>, i32)> = (0..30).map(|i| (vec![f32::from(i % 5) * 0.01, f32::from(i % 7) * 0.01], i)).collect();
        let forest = ClusterBuilder::new(params.clone(), f32::MAX).build(&samples);

        let cfg = crate::config::ClusterConfigBuilder::new()
            .with_proto_style(ProtoStyle::Mixed)
            .with_min_samples(0.0)
            .with_max_illegal(1.0)
            .build()
            .expect("valid");
        let mut distiller = ProtoDistiller::new(params, cfg);
        let prototypes = distiller.distill(&forest, &samples);

        for proto in &prototypes {
            if let ProtoShape::Mixed { distribution, .. } = proto.shape() {
                assert_eq!(distribution.len(), 2);
            }
        }
    }

    #[test]
    fn degenerate_cluster_emits_an_insignificant_prototype_instead_of_being_dropped() {
        let params = linear_params(1);
        let samples: Vec<(Vec<f32>, i32)> = vec![(vec![0.0], 0), (vec![0.01], 1), (vec![50.0], 2)];
        let forest = ClusterBuilder::new(params.clone(), f32::MAX).build(&samples);

        let cfg = crate::config::ClusterConfigBuilder::new()
            .with_min_samples(0.9)
            .with_max_illegal(1.0)
            .build()
            .expect("valid");
        let mut distiller = ProtoDistiller::new(params, cfg);
        let prototypes = distiller.distill(&forest, &samples);

        assert!(!prototypes.is_empty());
        assert!(prototypes.iter().any(|p| !p.significant()));
    }

    #[test]
    fn mixed_style_recentres_a_uniform_dimensions_mean_to_its_offset_midpoint() {
        let params = linear_params(1);
        let samples_owned: Vec<Vec<f32>> = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]];
        let raw: Vec<&[f32]> = samples_owned.iter().map(Vec::as_slice).collect();
        let mean = vec![3.0];

        let cfg = crate::config::ClusterConfigBuilder::new()
            .with_proto_style(ProtoStyle::Mixed)
            .build()
            .expect("valid");
        let mut distiller = ProtoDistiller::new(params, cfg);
        let (adjusted_mean, shape) = distiller.try_mixed(&raw, &mean).expect("try_mixed only fails on empty input");

        assert!((adjusted_mean[0] - 3.0).abs() < 1e-3, "midpoint of 1..=5 is already 3.0: {adjusted_mean:?}");
        match shape {
            ProtoShape::Mixed { distribution, .. } => assert_eq!(distribution.len(), 1),
            other => panic!("expected a Mixed shape, got {other:?}"),
        }
    }

    #[test]
    fn random_dimension_magnitude_uses_the_declared_range_not_a_fitted_variance() {
        let param = ParamDesc::new(false, false, -10.0, 10.0);
        let random_magnitude = mixed_magnitude(Distribution::Random, 1.0, &param);
        assert!((random_magnitude - 1.0 / 20.0).abs() < 1e-6);
    }
}

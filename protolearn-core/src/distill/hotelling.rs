//! Hotelling's T²-based elliptical-style shortcut (`SPEC_FULL.md` §4.3
//! step 4).
//!
//! Grounded on `classify/cluster.cpp`'s `TestEllipticalProto`: applies only
//! to a cluster with exactly two children, and only when the configured
//! style is [`crate::config::ProtoStyle::Elliptical`]. Builds the
//! essential-dimension covariance of the cluster's full sample set, inverts
//! it, takes the quadratic form of the two children's mean delta against
//! the inverse, converts the result to an F statistic, and accepts the fit
//! directly — skipping the per-dimension bucket/chi-squared pass entirely —
//! when that statistic falls under the literal [`super::ftable::F_TABLE`]
//! critical value (`SPEC_FULL.md` §9 Open Questions: the real historical
//! 100×10 table, not an approximation, looked up at the fixed
//! [`HOTELLING_ALPHA`] regardless of the run's configured `confidence`).

use super::ftable::{F_TABLE, FTABLE_COLS, FTABLE_ROWS};
use super::linalg::{essential_covariance, invert, quadratic_form};
use crate::param::ParamDesc;

/// Significance level baked into [`F_TABLE`], independent of the run's
/// configured `confidence`.
pub const HOTELLING_ALPHA: f64 = 0.01;

const MAGIC_SAMPLES_WINDOW_FRACTION: f64 = 0.0625;
const F_TABLE_BOOST_MARGIN: f64 = 2.0;

#[expect(clippy::cast_precision_loss, reason = "sample/dimension counts stay well within f64's exact integer range")]
fn as_f64(n: usize) -> f64 {
    n as f64
}

/// Evaluates the elliptical-style shortcut for a cluster with exactly two
/// children.
#[derive(Debug, Clone, Copy, Default)]
pub struct HotellingTest;

impl HotellingTest {
    /// Creates the test at the historical fixed alpha.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns `true` if the elliptical fit is accepted without a full
    /// distribution-fit pass.
    ///
    /// `raw`/`mean` are the cluster's full (not per-child) samples and
    /// centroid, used to build the essential-dimension covariance;
    /// `left_mean`/`right_mean` are the two children's centroids, used only
    /// for the mean-delta `Tsq` term. Returns `false` if the cluster's
    /// sample count is too small relative to its essential dimensionality
    /// for the F approximation to apply (`TotalDims >= EssentialN + 1` and
    /// `TotalDims >= 2`, per `TestEllipticalProto`).
    #[expect(clippy::float_arithmetic, reason = "Hotelling T²-to-F conversion")]
    #[must_use]
    pub fn accept(&self, raw: &[&[f32]], mean: &[f32], left_mean: &[f32], right_mean: &[f32], params: &[ParamDesc], magic_samples: u32) -> bool {
        let total_dims = raw.len();
        let essential_n = params.iter().filter(|p| p.essential()).count();
        if essential_n == 0 || total_dims < essential_n + 1 || total_dims < 2 {
            return false;
        }

        let dims = mean.len();
        let cov = essential_covariance(raw, mean, params);
        let (inverse, _error_sum) = invert(&cov, dims);
        let delta: Vec<f32> = (0..dims)
            .map(|i| if params[i].essential() { params[i].wrap_delta(left_mean[i] - right_mean[i]) } else { 0.0 })
            .collect();
        let t_squared = quadratic_form(&delta, &inverse, dims);

        let n = as_f64(total_dims);
        let p = as_f64(essential_n);
        let f_statistic = t_squared * (n - p - 1.0) / ((n - 2.0) * p);

        let fx = essential_n.min(FTABLE_COLS) - 1;
        let fy = (total_dims - essential_n - 1).min(FTABLE_ROWS) - 1;
        let mut target = F_TABLE[fy][fx];
        if Self::in_magic_window(total_dims, magic_samples) {
            target += F_TABLE_BOOST_MARGIN;
        }
        f_statistic < target
    }

    #[expect(clippy::float_arithmetic, reason = "proportional window comparison")]
    fn in_magic_window(sample_count: usize, magic_samples: u32) -> bool {
        if magic_samples == 0 {
            return false;
        }
        let target = f64::from(magic_samples);
        let window = target * MAGIC_SAMPLES_WINDOW_FRACTION;
        (as_f64(sample_count) - target).abs() <= window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(n: usize) -> Vec<ParamDesc> {
        (0..n).map(|_| ParamDesc::new(false, false, -10.0, 10.0)).collect()
    }

    #[test]
    fn identical_children_means_are_accepted() {
        let params = params(2);
        let samples: Vec<Vec<f32>> = (0..10).map(|i| vec![f32::from(i % 3) * 0.01, f32::from(i % 2) * 0.01]).collect();
        let raw: Vec<&[f32]> = samples.iter().map(Vec::as_slice).collect();
        let mean = vec![0.0, 0.0];
        let test = HotellingTest::new();
        assert!(test.accept(&raw, &mean, &[0.0, 0.0], &[0.0, 0.0], &params, 0));
    }

    #[test]
    fn widely_separated_children_means_are_rejected() {
        let params = params(2);
        let samples: Vec<Vec<f32>> = (0..10).map(|i| vec![f32::from(i % 3) * 0.01, f32::from(i % 2) * 0.01]).collect();
        let raw: Vec<&[f32]> = samples.iter().map(Vec::as_slice).collect();
        let mean = vec![0.0, 0.0];
        let test = HotellingTest::new();
        assert!(!test.accept(&raw, &mean, &[-5.0, -5.0], &[5.0, 5.0], &params, 0));
    }

    #[test]
    fn too_few_samples_for_dimensionality_is_rejected() {
        let params = params(3);
        let samples: Vec<Vec<f32>> = vec![vec![0.0, 0.0, 0.0], vec![0.01, 0.0, 0.0]];
        let raw: Vec<&[f32]> = samples.iter().map(Vec::as_slice).collect();
        let mean = vec![0.0, 0.0, 0.0];
        let test = HotellingTest::new();
        assert!(!test.accept(&raw, &mean, &[0.0, 0.0, 0.0], &[0.0, 0.0, 0.0], &params, 0));
    }
}

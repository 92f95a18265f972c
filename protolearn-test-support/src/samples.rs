//! Synthetic Gaussian cluster generation for exercising the pipeline
//! against known statistical ground truth.

use protolearn_core::ParamDesc;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution as _, Normal};

/// Draws `count` feature vectors from an independent per-dimension
/// Gaussian described by `means`/`std_devs`, wrapping circular dimensions
/// back into their declared range via `params`.
///
/// # Panics
/// Panics if `means`, `std_devs`, and `params` are not all the same
/// length, or if a `std_dev` is not positive — both are caller
/// programming errors, not data the generator can recover from.
#[must_use]
pub fn gaussian_cluster(seed: u64, params: &[ParamDesc], means: &[f32], std_devs: &[f32], count: usize) -> Vec<Vec<f32>> {
    assert_eq!(params.len(), means.len(), "params and means must have matching dimensionality");
    assert_eq!(params.len(), std_devs.len(), "params and std_devs must have matching dimensionality");

    let normals: Vec<Normal<f32>> = means
        .iter()
        .zip(std_devs)
        .map(|(&mean, &std_dev)| Normal::new(mean, std_dev).expect("positive std_dev"))
        .collect();

    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            normals
                .iter()
                .zip(params)
                .map(|(normal, param)| wrap_into_range(normal.sample(&mut rng), param))
                .collect()
        })
        .collect()
}

/// Draws `count` feature vectors uniformly at random within `params`'
/// declared `[min, max]` range per dimension.
#[must_use]
pub fn uniform_cluster(seed: u64, params: &[ParamDesc], count: usize) -> Vec<Vec<f32>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count).map(|_| params.iter().map(|param| rng.gen_range(param.min()..=param.max())).collect()).collect()
}

/// Labels every sample in `samples` with `char_id`, the shape
/// [`protolearn_core::cluster::ClusterBuilder::build`] expects.
#[must_use]
pub fn labelled(samples: Vec<Vec<f32>>, char_id: i32) -> Vec<(Vec<f32>, i32)> {
    samples.into_iter().map(|sample| (sample, char_id)).collect()
}

#[expect(clippy::float_arithmetic, reason = "modular wraparound into a circular dimension's declared range")]
fn wrap_into_range(value: f32, param: &ParamDesc) -> f32 {
    if !param.circular() {
        return value;
    }
    let span = param.range();
    if span <= 0.0 {
        return value;
    }
    let mut offset = (value - param.min()) % span;
    if offset < 0.0 {
        offset += span;
    }
    param.min() + offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_cluster_draws_the_requested_count() {
        let params = vec![ParamDesc::new(false, false, -10.0, 10.0)];
        let samples = gaussian_cluster(42, &params, &[0.0], &[0.1], 20);
        assert_eq!(samples.len(), 20);
        assert!(samples.iter().all(|sample| sample.len() == 1));
    }

    #[test]
    fn gaussian_cluster_is_deterministic_for_a_fixed_seed() {
        let params = vec![ParamDesc::new(false, false, -10.0, 10.0)];
        let first = gaussian_cluster(7, &params, &[0.0], &[1.0], 5);
        let second = gaussian_cluster(7, &params, &[0.0], &[1.0], 5);
        assert_eq!(first, second);
    }

    #[test]
    fn circular_samples_stay_within_the_declared_range() {
        let params = vec![ParamDesc::new(true, false, 0.0, 360.0)];
        let samples = gaussian_cluster(3, &params, &[359.0], &[5.0], 50);
        assert!(samples.iter().all(|sample| (0.0..360.0).contains(&sample[0])));
    }
}

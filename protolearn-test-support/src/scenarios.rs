//! The concrete scenario fixtures from `spec.md` §8, reusable across
//! `protolearn-core` integration tests and `protolearn-cli` end-to-end
//! tests.
//!
//! Scenarios D (bucket-count interpolation), E (chi-squared critical
//! value), and F (F-table lookup) are pure lookups against constants that
//! live inside `protolearn-core` itself, so they are tested as unit tests
//! next to those tables rather than duplicated here; this module covers
//! A–C, which need the full cluster-then-distill pipeline.

use protolearn_core::{ClusterConfig, ClusterConfigBuilder, ParamDesc, ProtoStyle};

/// One labelled feature-space sample, ready for
/// [`protolearn_core::cluster::ClusterBuilder::build`].
pub type LabelledSample = (Vec<f32>, i32);

/// Scenario A: one essential linear dimension, four samples straddling
/// two well-separated clusters with alternating character ids. Expects
/// two significant elliptical prototypes centred near ±0.495.
#[must_use]
pub fn scenario_a() -> (Vec<ParamDesc>, Vec<LabelledSample>, ClusterConfig) {
    let params = vec![ParamDesc::new(false, false, -1.0, 1.0)];
    let samples = vec![
        (vec![-0.5], 0),
        (vec![-0.49], 1),
        (vec![0.48], 0),
        (vec![0.51], 1),
    ];
    let config = ClusterConfigBuilder::new()
        .with_proto_style(ProtoStyle::Elliptical)
        .with_min_samples(0.1)
        .with_max_illegal(0.5)
        .with_independence(0.9)
        .with_confidence(0.01)
        .build()
        .expect("scenario A's tuning values are all in range");
    (params, samples, config)
}

/// Scenario B: Scenario A's samples, but every leaf shares `char_id = 0`.
/// Expects zero significant prototypes: the multi-character filter trips
/// at the root and every resulting leaf is too small to be significant on
/// its own.
#[must_use]
pub fn scenario_b() -> (Vec<ParamDesc>, Vec<LabelledSample>, ClusterConfig) {
    let (params, samples, config) = scenario_a();
    let samples = samples.into_iter().map(|(mean, _)| (mean, 0)).collect();
    (params, samples, config)
}

/// Scenario C: two essential linear dimensions, samples arranged along
/// `y = 2x + 0.01 * noise`. Expects the independence gate to reject a
/// fit at the root (the dimensions are strongly correlated) and accept
/// once the tree has split into sub-clusters that are each effectively
/// one-dimensional along the line.
#[must_use]
pub fn scenario_c() -> (Vec<ParamDesc>, Vec<LabelledSample>, ClusterConfig) {
    let params = vec![ParamDesc::new(false, false, -10.0, 10.0), ParamDesc::new(false, false, -10.0, 10.0)];
    let noise = [0.003, -0.004, 0.002, -0.001, 0.004, -0.002, 0.001, -0.003];
    let samples: Vec<LabelledSample> = (0..8)
        .map(|i| {
            #[expect(clippy::float_arithmetic, reason = "synthetic point placement along a fixed line")]
            let x = -2.0 + f32::from(i) * 0.5;
            #[expect(clippy::float_arithmetic, reason = "synthetic point placement along a fixed line")]
            let y = 2.0 * x + noise[i as usize];
            (vec![x, y], i % 2)
        })
        .collect();
    let config = ClusterConfigBuilder::new()
        .with_proto_style(ProtoStyle::Elliptical)
        .with_min_samples(0.1)
        .with_max_illegal(0.5)
        .with_independence(0.9)
        .with_confidence(0.01)
        .build()
        .expect("scenario C's tuning values are all in range");
    (params, samples, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_a_has_two_clusters_of_two_samples() {
        let (params, samples, _config) = scenario_a();
        assert_eq!(params.len(), 1);
        assert_eq!(samples.len(), 4);
    }

    #[test]
    fn scenario_b_collapses_every_sample_to_one_char_id() {
        let (_params, samples, _config) = scenario_b();
        assert!(samples.iter().all(|(_, char_id)| *char_id == 0));
    }

    #[test]
    fn scenario_c_lies_on_the_line_y_equals_2x() {
        let (_params, samples, _config) = scenario_c();
        for (mean, _) in &samples {
            let predicted = 2.0 * mean[0];
            assert!((mean[1] - predicted).abs() < 0.05);
        }
    }
}

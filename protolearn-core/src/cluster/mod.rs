//! Agglomerative single-linkage clustering over sample feature vectors
//! (`SPEC_FULL.md` §4.2).
//!
//! Candidate nearest-neighbour pairs are seeded into a min-heap from a
//! [`crate::kdtree::KdIndex`] and merged in ascending distance order. A
//! heap entry may go stale once one of its endpoints has already been
//! merged away; stale entries are detected via each [`Cluster`]'s
//! `clustered` flag and replaced with a fresh nearest-neighbour query for
//! the surviving endpoint, rather than discarded outright.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::kdtree::KdIndex;
use crate::param::ParamDesc;

/// A node in the agglomerative clustering tree: either a leaf sample
/// (`left`/`right` both `None`, `char_id >= 0`) or a merge of two earlier
/// clusters (`char_id == -1`).
#[derive(Debug, Clone)]
pub struct Cluster {
    mean: Vec<f32>,
    sample_count: u32,
    char_id: i32,
    clustered: bool,
    left: Option<usize>,
    right: Option<usize>,
}

impl Cluster {
    /// Feature-space mean of every sample folded into this cluster.
    #[must_use]
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Number of leaf samples folded into this cluster.
    #[rustfmt::skip]
    #[must_use]
    pub const fn sample_count(&self) -> u32 { self.sample_count }

    /// Character id for a leaf sample, or `-1` for a merged cluster.
    #[rustfmt::skip]
    #[must_use]
    pub const fn char_id(&self) -> i32 { self.char_id }

    /// Whether this cluster has already been folded into a parent.
    #[rustfmt::skip]
    #[must_use]
    pub const fn is_clustered(&self) -> bool { self.clustered }

    /// Index of the left child, or `None` for a leaf.
    #[rustfmt::skip]
    #[must_use]
    pub const fn left(&self) -> Option<usize> { self.left }

    /// Index of the right child, or `None` for a leaf.
    #[rustfmt::skip]
    #[must_use]
    pub const fn right(&self) -> Option<usize> { self.right }
}

/// The arena of clusters produced by one [`ClusterBuilder::build`] run,
/// plus the indices of every tree root (more than one root means the
/// forest did not fully coalesce under `max_distance`).
#[derive(Debug, Clone)]
pub struct ClusterForest {
    clusters: Vec<Cluster>,
    roots: Vec<usize>,
}

impl ClusterForest {
    /// All clusters, leaves and merges alike, indexed by arena slot.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Arena indices of every cluster with no parent.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }
}

#[derive(Debug)]
struct HeapEntry {
    dist: f32,
    a: usize,
    b: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the smallest distance.
        other.dist.total_cmp(&self.dist)
    }
}

/// Builds a [`ClusterForest`] from a set of labelled feature-space samples.
///
/// # Examples
/// ```
/// use protolearn_core::{ParamDesc, cluster::ClusterBuilder};
///
/// let params = vec![ParamDesc::new(false, false, -10.0, 10.0)];
/// let builder = ClusterBuilder::new(params, f32::MAX);
/// let forest = builder.build(&[(vec![0.0], 0), (vec![0.2], 0), (vec![9.0], 1)]);
/// assert_eq!(forest.clusters().len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    params: Vec<ParamDesc>,
    max_distance: f32,
}

impl ClusterBuilder {
    /// Creates a builder over the given per-dimension descriptors, merging
    /// only pairs within `max_distance` of each other.
    #[must_use]
    pub fn new(params: Vec<ParamDesc>, max_distance: f32) -> Self {
        Self { params, max_distance }
    }

    /// Clusters `samples`, each a `(feature vector, character id)` pair,
    /// via repeated nearest-neighbour merges until at most one cluster
    /// remains per connected component under `max_distance`.
    #[must_use]
    pub fn build(&self, samples: &[(Vec<f32>, i32)]) -> ClusterForest {
        let mut clusters: Vec<Cluster> = samples
            .iter()
            .map(|(mean, char_id)| Cluster {
                mean: mean.clone(),
                sample_count: 1,
                char_id: *char_id,
                clustered: false,
                left: None,
                right: None,
            })
            .collect();

        let mut index = KdIndex::new(self.params.clone());
        for (i, cluster) in clusters.iter().enumerate() {
            index.insert(cluster.mean.clone(), i);
        }

        let mut heap = BinaryHeap::new();
        for i in 0..clusters.len() {
            if let Some((j, dist)) = Self::nearest_excluding(&index, &clusters, i, self.max_distance) {
                heap.push(HeapEntry { dist, a: i, b: j });
            }
        }

        let mut remaining = clusters.len();
        while let Some(HeapEntry { a, b, .. }) = heap.pop() {
            if remaining <= 1 {
                break;
            }
            let a_alive = !clusters[a].clustered;
            let b_alive = !clusters[b].clustered;
            match (a_alive, b_alive) {
                (false, false) => {}
                (true, false) => {
                    if let Some((j, d)) = Self::nearest_excluding(&index, &clusters, a, self.max_distance) {
                        heap.push(HeapEntry { dist: d, a, b: j });
                    }
                }
                (false, true) => {
                    if let Some((j, d)) = Self::nearest_excluding(&index, &clusters, b, self.max_distance) {
                        heap.push(HeapEntry { dist: d, a: b, b: j });
                    }
                }
                (true, true) => {
                    let merged_mean =
                        weighted_mean(&self.params, &clusters[a].mean, &clusters[b].mean, clusters[a].sample_count, clusters[b].sample_count);
                    let merged = Cluster {
                        mean: merged_mean,
                        sample_count: clusters[a].sample_count + clusters[b].sample_count,
                        char_id: -1,
                        clustered: false,
                        left: Some(a),
                        right: Some(b),
                    };

                    let a_key = clusters[a].mean.clone();
                    let b_key = clusters[b].mean.clone();
                    index.delete(&a_key, &a).unwrap_or_else(|_| unreachable!("a was indexed at insertion"));
                    index.delete(&b_key, &b).unwrap_or_else(|_| unreachable!("b was indexed at insertion"));
                    clusters[a].clustered = true;
                    clusters[b].clustered = true;

                    let new_idx = clusters.len();
                    clusters.push(merged);
                    index.insert(clusters[new_idx].mean.clone(), new_idx);
                    remaining -= 1;

                    if let Some((j, d)) = Self::nearest_excluding(&index, &clusters, new_idx, self.max_distance) {
                        heap.push(HeapEntry { dist: d, a: new_idx, b: j });
                    }
                }
            }
        }

        let roots = clusters
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.clustered)
            .map(|(i, _)| i)
            .collect();

        ClusterForest { clusters, roots }
    }

    fn nearest_excluding(index: &KdIndex<usize>, clusters: &[Cluster], idx: usize, max_distance: f32) -> Option<(usize, f32)> {
        index
            .k_nearest(&clusters[idx].mean, 2, max_distance)
            .into_iter()
            .find(|(other, _)| *other != idx)
    }
}

#[expect(clippy::float_arithmetic, reason = "weighted circular-safe mean over feature coordinates")]
#[expect(clippy::cast_precision_loss, reason = "sample counts stay well within f32's exact integer range")]
fn weighted_mean(params: &[ParamDesc], a: &[f32], b: &[f32], weight_a: u32, weight_b: u32) -> Vec<f32> {
    let weight_a = weight_a as f32;
    let weight_b = weight_b as f32;
    let total = weight_a + weight_b;
    a.iter()
        .zip(b.iter())
        .zip(params.iter())
        .map(|((&av, &bv), param)| {
            let delta = param.wrap_delta(bv - av);
            let merged = av + delta * (weight_b / total);
            if param.circular() {
                wrap_into_range(merged, param)
            } else {
                merged
            }
        })
        .collect()
}

#[expect(clippy::float_arithmetic, reason = "modular wraparound into a dimension's canonical range")]
fn wrap_into_range(value: f32, param: &ParamDesc) -> f32 {
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

    fn linear_params(n: usize) -> Vec<ParamDesc> {
        (0..n).map(|_| ParamDesc::new(false, false, -100.0, 100.0)).collect()
    }

    #[test]
    fn close_samples_merge_into_a_shared_root() {
        let builder = ClusterBuilder::new(linear_params(1), f32::MAX);
        let forest = builder.build(&[(vec![0.0], 0), (vec![0.2], 0), (vec![50.0], 1)]);

        assert_eq!(forest.clusters().len(), 5);
        let root_sample_counts: Vec<u32> = forest.roots().iter().map(|&i| forest.clusters()[i].sample_count()).collect();
        assert_eq!(root_sample_counts.iter().sum::<u32>(), 3);
    }

    #[test]
    fn max_distance_prevents_distant_clusters_from_merging() {
        let builder = ClusterBuilder::new(linear_params(1), 1.0);
        let forest = builder.build(&[(vec![0.0], 0), (vec![0.1], 0), (vec![50.0], 1)]);

        assert_eq!(forest.roots().len(), 2);
    }

    #[test]
    fn circular_weighted_mean_wraps_correctly() {
        let params = vec![ParamDesc::new(true, false, 0.0, 360.0)];
        let merged = weighted_mean(&params, &[350.0], &[10.0], 1, 1);
        assert!((merged[0] - 0.0).abs() < 1e-3 || (merged[0] - 360.0).abs() < 1e-3);
    }

    #[test]
    fn merge_preserves_total_sample_count() {
        let builder = ClusterBuilder::new(linear_params(1), f32::MAX);
        let forest = builder.build(&[(vec![0.0], 0), (vec![1.0], 0), (vec![2.0], 0), (vec![3.0], 0)]);
        let root = forest.roots().first().copied().expect("single connected component");
        assert_eq!(forest.clusters()[root].sample_count(), 4);
    }
}

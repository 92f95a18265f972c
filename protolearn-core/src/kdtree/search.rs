//! Nearest-neighbour search over a [`super::KdIndex`]: depth-first descent
//! with near-child-first recursion and branch-bound pruning on the
//! split-dimension boundary (`SPEC_FULL.md` §4.1).

use super::KdIndex;

/// One result from [`KdIndex::k_nearest`]: the stored payload and its
/// Euclidean (circular-aware) distance to the query point.
pub type SearchHit<T> = (T, f32);

struct BoundedCollector<T> {
    capacity: usize,
    /// Ascending by squared distance.
    items: Vec<(f32, T)>,
}

impl<T: Clone> BoundedCollector<T> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    fn worst(&self) -> Option<f32> {
        self.items.last().map(|(dist, _)| *dist)
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    #[expect(clippy::float_arithmetic, reason = "ordering comparisons over squared distances")]
    fn try_insert(&mut self, dist_sq: f32, data: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() < self.capacity {
            let pos = self.items.partition_point(|(d, _)| *d <= dist_sq);
            self.items.insert(pos, (dist_sq, data));
        } else if self.worst().is_none_or(|worst| dist_sq < worst) {
            self.items.pop();
            let pos = self.items.partition_point(|(d, _)| *d <= dist_sq);
            self.items.insert(pos, (dist_sq, data));
        }
    }

    fn into_sorted_hits(self) -> Vec<SearchHit<T>> {
        self.items
            .into_iter()
            .map(|(dist_sq, data)| (data, dist_sq.sqrt()))
            .collect()
    }
}

impl<T: Clone + PartialEq> KdIndex<T> {
    /// Returns up to `k` points nearest to `query`, sorted ascending by
    /// distance, restricted to points within `max_distance`.
    ///
    /// Distance is Euclidean over the essential dimensions only, with
    /// circular dimensions contributing their wraparound-shortened delta
    /// (`SPEC_FULL.md` §4.1).
    #[must_use]
    pub fn k_nearest(&self, query: &[f32], k: usize, max_distance: f32) -> Vec<SearchHit<T>> {
        let mut collector = BoundedCollector::new(k);
        let max_distance_sq = max_distance.powi(2);
        if let Some(root) = self.root {
            self.search_rec(root, query, 0, &mut collector, max_distance_sq);
        }
        collector.into_sorted_hits()
    }

    #[expect(clippy::float_arithmetic, reason = "distance and pruning-boundary arithmetic")]
    fn search_rec(
        &self,
        idx: usize,
        query: &[f32],
        depth: usize,
        collector: &mut BoundedCollector<T>,
        max_distance_sq: f32,
    ) {
        let node = &self.nodes[idx];
        let dist_sq = self.distance_squared(query, &node.key);
        if dist_sq <= max_distance_sq {
            collector.try_insert(dist_sq, node.data.clone());
        }

        let dim = self.dim_for(node.dim_index);
        let param = self.params[dim];
        let boundary_delta = query[dim] - node.branch_point;
        let go_left = boundary_delta < 0.0;
        let (near, far) = if go_left {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(n) = near {
            self.search_rec(n, query, depth + 1, collector, max_distance_sq);
        }

        let boundary_dist = param.circular_abs(boundary_delta);
        let boundary_dist_sq = boundary_dist * boundary_dist;
        let worst = collector.worst().unwrap_or(max_distance_sq);
        let far_could_win = boundary_dist_sq <= worst.min(max_distance_sq) || !collector.is_full();
        if far_could_win {
            if let Some(f) = far {
                self.search_rec(f, query, depth + 1, collector, max_distance_sq);
            }
        }
    }

    #[expect(clippy::float_arithmetic, reason = "Euclidean distance over essential dimensions")]
    fn distance_squared(&self, query: &[f32], key: &[f32]) -> f32 {
        self.essential_dims
            .iter()
            .map(|&dim| {
                let delta = query[dim] - key[dim];
                let adjusted = self.params[dim].circular_abs(delta);
                adjusted * adjusted
            })
            .sum()
    }
}

//! K-d tree indexing over a feature space with linear or circular
//! dimensions (`SPEC_FULL.md` §4.1).
//!
//! Reimplemented from the original pointer-graph design as an arena +
//! index: nodes live in a `Vec`, and the tree references them by `usize`
//! slot rather than raw pointer (`SPEC_FULL.md` §9 redesign flag).
//! Deletion is lazy: the target node is detached and every node in its
//! subtree is collected and re-inserted from the root, exactly as the
//! original `KDDelete`/`InsertNodes` pair does.

mod search;

use crate::error::KdTreeError;
use crate::param::ParamDesc;

#[derive(Debug, Clone)]
struct KdNode<T> {
    key: Vec<f32>,
    data: T,
    /// Index into `essential_dims` identifying which essential dimension
    /// this node splits on.
    dim_index: usize,
    branch_point: f32,
    left: Option<usize>,
    right: Option<usize>,
    parent: Option<usize>,
    /// Maximum key value (in the split dimension) seen descending left.
    left_branch: f32,
    /// Minimum key value (in the split dimension) seen descending right.
    right_branch: f32,
}

/// A k-d tree over `D`-dimensional feature vectors, storing an opaque
/// payload `T` at each point.
///
/// # Examples
/// ```
/// use protolearn_core::{ParamDesc, kdtree::KdIndex};
///
/// let params = vec![ParamDesc::new(false, false, -1.0, 1.0)];
/// let mut index = KdIndex::new(params);
/// index.insert(vec![0.1], 42_usize);
/// let neighbours = index.k_nearest(&[0.0], 1, f32::MAX);
/// assert_eq!(neighbours.len(), 1);
/// assert_eq!(neighbours[0].0, 42);
/// ```
#[derive(Debug, Clone)]
pub struct KdIndex<T> {
    params: Vec<ParamDesc>,
    essential_dims: Vec<usize>,
    nodes: Vec<KdNode<T>>,
    root: Option<usize>,
    len: usize,
}

impl<T: Clone + PartialEq> KdIndex<T> {
    /// Builds an empty index over the given per-dimension descriptors.
    /// Non-essential dimensions are skipped when cycling split
    /// dimensions level-by-level.
    #[must_use]
    pub fn new(params: Vec<ParamDesc>) -> Self {
        let essential_dims: Vec<usize> = params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.essential())
            .map(|(i, _)| i)
            .collect();
        Self {
            params,
            essential_dims,
            nodes: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Number of points currently stored (excludes detached subtrees mid
    /// re-insertion).
    #[rustfmt::skip]
    #[must_use]
    pub const fn len(&self) -> usize { self.len }

    /// Whether the index holds no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `key` with payload `data`.
    ///
    /// # Panics
    /// Panics in debug builds if `key.len()` does not match the number of
    /// dimensions supplied at construction.
    pub fn insert(&mut self, key: Vec<f32>, data: T) {
        debug_assert_eq!(key.len(), self.params.len(), "key dimensionality mismatch");
        self.insert_at(key, data);
    }

    #[expect(clippy::float_arithmetic, reason = "descent comparisons over feature coordinates")]
    fn insert_at(&mut self, key: Vec<f32>, data: T) -> usize {
        let slot = self.nodes.len();
        let essential_len = self.essential_dims.len().max(1);
        let mut parent_link: Option<(usize, bool)> = None;
        let mut cur = self.root;
        let mut depth = 0_usize;

        while let Some(idx) = cur {
            let dim_index = depth % essential_len;
            let dim = self.dim_for(dim_index);
            let branch_point = self.nodes[idx].branch_point;
            let go_left = key[dim] < branch_point;
            if go_left {
                self.nodes[idx].left_branch = self.nodes[idx].left_branch.max(key[dim]);
                parent_link = Some((idx, true));
                cur = self.nodes[idx].left;
            } else {
                self.nodes[idx].right_branch = self.nodes[idx].right_branch.min(key[dim]);
                parent_link = Some((idx, false));
                cur = self.nodes[idx].right;
            }
            depth += 1;
        }

        let dim_index = depth % essential_len;
        let dim = self.dim_for(dim_index);
        let branch_point = key[dim];
        let param = self.params[dim];
        let (left_branch, right_branch) = initial_bounds(&param);

        self.nodes.push(KdNode {
            key,
            data,
            dim_index,
            branch_point,
            left: None,
            right: None,
            parent: parent_link.map(|(idx, _)| idx),
            left_branch,
            right_branch,
        });

        match parent_link {
            None => self.root = Some(slot),
            Some((pidx, true)) => self.nodes[pidx].left = Some(slot),
            Some((pidx, false)) => self.nodes[pidx].right = Some(slot),
        }
        self.len += 1;
        slot
    }

    /// Deletes the node matching both `key` (value equality) and `data`
    /// (equality), re-inserting every descendant of the detached subtree.
    ///
    /// # Errors
    /// Returns [`KdTreeError::KeyNotFound`] if no stored node matches both
    /// `key` and `data`.
    #[expect(clippy::float_arithmetic, reason = "descent comparisons over feature coordinates")]
    pub fn delete(&mut self, key: &[f32], data: &T) -> Result<(), KdTreeError> {
        let slot = self.find_slot(key, data).ok_or(KdTreeError::KeyNotFound { slot: 0 })?;
        self.detach(slot);

        let left = self.nodes[slot].left;
        let right = self.nodes[slot].right;
        self.nodes[slot].left = None;
        self.nodes[slot].right = None;
        self.len -= 1;

        if let Some(l) = left {
            self.reinsert_subtree(l);
        }
        if let Some(r) = right {
            self.reinsert_subtree(r);
        }
        Ok(())
    }

    #[expect(clippy::float_arithmetic, reason = "descent comparisons over feature coordinates")]
    fn find_slot(&self, key: &[f32], data: &T) -> Option<usize> {
        let essential_len = self.essential_dims.len().max(1);
        let mut cur = self.root;
        let mut depth = 0_usize;
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            if node.key == key && node.data == *data {
                return Some(idx);
            }
            let dim = self.dim_for(depth % essential_len);
            cur = if key[dim] < node.branch_point { node.left } else { node.right };
            depth += 1;
        }
        None
    }

    fn detach(&mut self, slot: usize) {
        let parent = self.nodes[slot].parent;
        match parent {
            None => self.root = None,
            Some(pidx) => {
                let parent_dim = self.dim_for(self.nodes[pidx].dim_index);
                let param = self.params[parent_dim];
                let (left_extreme, right_extreme) = initial_bounds(&param);
                if self.nodes[pidx].left == Some(slot) {
                    self.nodes[pidx].left = None;
                    self.nodes[pidx].left_branch = left_extreme;
                } else {
                    self.nodes[pidx].right = None;
                    self.nodes[pidx].right_branch = right_extreme;
                }
            }
        }
        self.nodes[slot].parent = None;
    }

    fn reinsert_subtree(&mut self, slot: usize) {
        let mut stack = vec![slot];
        let mut items = Vec::new();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            items.push((node.key.clone(), node.data.clone()));
            if let Some(l) = node.left {
                stack.push(l);
            }
            if let Some(r) = node.right {
                stack.push(r);
            }
        }
        for (key, data) in items {
            self.insert_at(key, data);
        }
    }

    /// Pre-order traversal, invoking `visitor(data, level)` for every
    /// stored point.
    pub fn walk(&self, mut visitor: impl FnMut(&T, usize)) {
        let Some(root) = self.root else { return };
        let mut stack = vec![(root, 0_usize)];
        while let Some((idx, level)) = stack.pop() {
            let node = &self.nodes[idx];
            visitor(&node.data, level);
            if let Some(r) = node.right {
                stack.push((r, level + 1));
            }
            if let Some(l) = node.left {
                stack.push((l, level + 1));
            }
        }
    }

    fn dim_for(&self, dim_index: usize) -> usize {
        self.essential_dims.get(dim_index).copied().unwrap_or(0)
    }
}

#[expect(clippy::float_arithmetic, reason = "sentinel bound arithmetic")]
fn initial_bounds(param: &ParamDesc) -> (f32, f32) {
    if param.circular() {
        (param.min(), param.max())
    } else {
        (-f32::MAX, f32::MAX)
    }
}

pub use search::SearchHit;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamDesc;

    fn linear_params(n: usize) -> Vec<ParamDesc> {
        (0..n).map(|_| ParamDesc::new(false, false, -10.0, 10.0)).collect()
    }

    #[test]
    fn insert_then_k_nearest_finds_closest_point() {
        let mut index = KdIndex::new(linear_params(2));
        index.insert(vec![0.0, 0.0], 0_usize);
        index.insert(vec![5.0, 5.0], 1_usize);
        index.insert(vec![-5.0, -5.0], 2_usize);

        let hits = index.k_nearest(&[0.4, 0.4], 1, f32::MAX);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 0);
    }

    #[test]
    fn delete_removes_point_and_reinserts_descendants() {
        let mut index = KdIndex::new(linear_params(1));
        index.insert(vec![0.0], 0_usize);
        index.insert(vec![1.0], 1_usize);
        index.insert(vec![2.0], 2_usize);
        assert_eq!(index.len(), 3);

        index.delete(&[0.0], &0_usize).expect("point exists");
        assert_eq!(index.len(), 2);

        let hits = index.k_nearest(&[0.9], 2, f32::MAX);
        let ids: Vec<usize> = hits.iter().map(|(id, _)| *id).collect();
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(!ids.contains(&0));
    }

    #[test]
    fn delete_missing_point_reports_error() {
        let mut index = KdIndex::new(linear_params(1));
        index.insert(vec![0.0], 0_usize);
        let err = index.delete(&[9.0], &99_usize).expect_err("point does not exist");
        assert_eq!(err.code().as_str(), "key_not_found");
    }

    #[test]
    fn circular_distance_wraps_around() {
        let params = vec![ParamDesc::new(true, false, 0.0, 360.0)];
        let mut index = KdIndex::new(params);
        index.insert(vec![350.0], 0_usize);

        let hits = index.k_nearest(&[10.0], 1, f32::MAX);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].1 - 20.0).abs() < 1e-4);
    }

    #[test]
    fn non_essential_dimension_does_not_affect_distance() {
        let params = vec![
            ParamDesc::new(false, false, -10.0, 10.0),
            ParamDesc::new(false, true, -10.0, 10.0),
        ];
        let mut index = KdIndex::new(params);
        index.insert(vec![0.0, 100.0], 0_usize);
        index.insert(vec![5.0, -100.0], 1_usize);

        let hits = index.k_nearest(&[0.0, 0.0], 1, f32::MAX);
        assert_eq!(hits[0].0, 0);
    }

    #[test]
    fn walk_visits_every_point() {
        let mut index = KdIndex::new(linear_params(1));
        index.insert(vec![0.0], 0_usize);
        index.insert(vec![1.0], 1_usize);
        index.insert(vec![2.0], 2_usize);

        let mut seen = Vec::new();
        index.walk(|data, _level| seen.push(*data));
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}

//! Approximate k-nearest-neighbor search with a bounded number of leaf visits.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::trace;

use crate::error::{KdTreeError, Result};
use crate::kdtree::bounds::Bounds;
use crate::kdtree::distance::DistanceMetric;
use crate::kdtree::element::Neighbor;
use crate::kdtree::nearest::Candidates;
use crate::kdtree::node::Node;
use crate::kdtree::KdTree;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, D, M: DistanceMetric<N>> KdTree<N, D, M> {
    /// Find `k` elements close to `key`, visiting about `emax` leaves.
    ///
    /// Leaves are visited in order of their distance to `key` ("best bin first"). The search
    /// stops early when the `k` elements found so far are provably the nearest, and otherwise once
    /// `k` elements have been found and `emax` leaves visited. The result is sorted closest first
    /// and may differ from [`search_nearest_k`][Self::search_nearest_k] when `emax` is smaller
    /// than the number of leaves.
    pub fn search_best_bin_first(
        &self,
        k: usize,
        key: &[N],
        emax: usize,
    ) -> Result<Vec<Neighbor<'_, N, D, M::Distance>>> {
        self.best_bin_first(k, key, emax).map(|(found, _)| found)
    }

    /// Best-bin-first search, also returning the number of leaves visited.
    pub(crate) fn best_bin_first(
        &self,
        k: usize,
        key: &[N],
        emax: usize,
    ) -> Result<(Vec<Neighbor<'_, N, D, M::Distance>>, usize)> {
        self.check_key(key)?;
        if emax == 0 {
            return Err(KdTreeError::InvalidConfiguration(
                "emax must be at least 1".to_string(),
            ));
        }
        if k == 0 {
            return Ok((vec![], 0));
        }
        let root = self.built_root()?;
        self.check_k(k)?;

        let max_visits = emax.min(self.num_leaves);
        let mut best = Candidates::new(k);
        let mut queue = BinaryHeap::new();
        let mut seq = 0;
        let mut visits = 0;

        let mut next = Some((root, self.bounds.clone()));
        while let Some((mut node, mut bounds)) = next.take() {
            // descend to the leaf holding the key, queueing the other halves on the way
            while let Node::Internal {
                axis,
                value,
                left,
                right,
            } = node
            {
                let (axis, value) = (*axis, *value);
                let mut far_bounds = bounds.clone();
                let (near, far) = if key[axis] <= value {
                    bounds.set_max(axis, value);
                    far_bounds.set_min(axis, value);
                    (&**left, &**right)
                } else {
                    bounds.set_min(axis, value);
                    far_bounds.set_max(axis, value);
                    (&**right, &**left)
                };

                let lower = far_bounds.min_distance(&self.metric, key);
                if !best.bound().is_some_and(|bound| lower > bound) {
                    queue.push(Reverse(Pending {
                        lower,
                        seq,
                        node: far,
                        bounds: far_bounds,
                    }));
                    seq += 1;
                }
                node = near;
            }

            visits += 1;
            for element in node.bucket() {
                best.offer(self.metric.distance(key, &element.point), element);
            }

            if best
                .bound()
                .is_some_and(|bound| bounds.contains_hypersphere(&self.metric, key, bound))
            {
                break;
            }
            if best.len() >= k && visits >= max_visits {
                break;
            }

            // queued halves further away than the k-th best cannot improve the result
            next = queue
                .pop()
                .filter(|Reverse(p)| !best.bound().is_some_and(|bound| p.lower > bound))
                .map(|Reverse(p)| (p.node, p.bounds));
        }

        trace!(visits, queued = queue.len(), "best-bin-first search finished");
        Ok((best.into_neighbors(), visits))
    }
}

/// A subtree waiting to be visited, with a lower bound of its distance to the key.
struct Pending<'a, N: IndexableNum, D, T> {
    lower: T,
    seq: usize,
    node: &'a Node<N, D>,
    bounds: Bounds<N>,
}

impl<N: IndexableNum, D, T: PartialOrd> PartialEq for Pending<'_, N, D, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: IndexableNum, D, T: PartialOrd> Eq for Pending<'_, N, D, T> {}

impl<N: IndexableNum, D, T: PartialOrd> Ord for Pending<'_, N, D, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Distances are never NaN, since non-finite coordinates are rejected.
        self.lower
            .partial_cmp(&other.lower)
            .unwrap_or(Ordering::Equal)
            .then(self.seq.cmp(&other.seq))
    }
}

impl<N: IndexableNum, D, T: PartialOrd> PartialOrd for Pending<'_, N, D, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn spiral() -> KdTree<f64, usize> {
        let mut tree = KdTree::new();
        for i in 0..200 {
            let t = i as f64 * 0.3;
            tree.add([t * t.cos(), t * t.sin()], i).unwrap();
        }
        tree.build(4).unwrap();
        tree
    }

    #[test]
    fn rejects_zero_emax() {
        let tree = spiral();
        assert!(matches!(
            tree.search_best_bin_first(1, &[0.0, 0.0], 0),
            Err(KdTreeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn returns_k_sorted() {
        let tree = spiral();
        for emax in [1, 2, 5, 1000] {
            let found = tree.search_best_bin_first(7, &[3.0, -2.0], emax).unwrap();
            assert_eq!(found.len(), 7);
            assert!(found.windows(2).all(|w| w[0].distance <= w[1].distance));
        }
    }

    #[test]
    fn converges_to_exact() {
        let tree = spiral();
        let key = [-10.5, 4.25];
        let exact: Vec<f64> = tree
            .search_nearest_k(5, &key)
            .unwrap()
            .iter()
            .map(|n| n.distance)
            .collect();
        let approx: Vec<f64> = tree
            .search_best_bin_first(5, &key, tree.num_leaves())
            .unwrap()
            .iter()
            .map(|n| n.distance)
            .collect();
        assert_eq!(exact, approx);
    }

    #[test]
    fn leaf_visits_are_capped() {
        let tree = spiral();
        assert!(tree.num_leaves() > 20);
        let keys = [[0.0, 0.0], [3.0, -2.0], [-10.5, 4.25], [40.0, 40.0], [-55.0, 12.0]];
        for key in keys {
            // one leaf already holds the single neighbor asked for
            let (found, visits) = tree.best_bin_first(1, &key, 1).unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(visits, 1);

            for emax in [2, 5, 20] {
                let (found, visits) = tree.best_bin_first(3, &key, emax).unwrap();
                assert_eq!(found.len(), 3);
                assert!(visits <= emax, "{visits} visits with emax {emax}");
            }

            let (_, visits) = tree.best_bin_first(3, &key, usize::MAX).unwrap();
            assert!(visits <= tree.num_leaves());
        }
    }

    #[test]
    fn empty_and_small_trees() {
        let mut tree = KdTree::<i8, ()>::new();
        assert!(matches!(
            tree.search_best_bin_first(1, &[0], 3),
            Err(KdTreeError::EmptyTree)
        ));
        tree.add([1], ()).unwrap();
        tree.build(1).unwrap();
        assert!(tree
            .search_best_bin_first(2, &[0], 3)
            .unwrap_err()
            .is_not_found());
        assert_eq!(tree.search_best_bin_first(1, &[0], 3).unwrap()[0].distance, 1);
    }
}

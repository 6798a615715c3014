//! Exact nearest-neighbor and radius searches.
//!
//! Both searches descend first into the half of space holding the key, and only visit the other
//! half if it can still hold a point within the current search radius. The box of the subtree being
//! visited is narrowed on the way down and restored on the way up; it lives in a per-call context,
//! never in the tree.

use geo_traits::CoordTrait;
use num_traits::Zero;

use crate::error::{KdTreeError, Result};
use crate::kdtree::bounds::Bounds;
use crate::kdtree::distance::{DistanceMetric, Euclidean};
use crate::kdtree::element::{Element, Neighbor};
use crate::kdtree::node::Node;
use crate::kdtree::KdTree;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, D, M: DistanceMetric<N>> KdTree<N, D, M> {
    /// Find the element closest to `key`.
    ///
    /// Fails with [`KdTreeError::EmptyTree`] if nothing has been built.
    pub fn search_nearest(&self, key: &[N]) -> Result<Neighbor<'_, N, D, M::Distance>> {
        self.check_key(key)?;
        let root = self.built_root()?;
        let mut best = Candidates::new(1);
        BranchAndBound::new(key, &self.metric, &self.bounds).nearest(root, &mut best);
        best.into_neighbors()
            .into_iter()
            .next()
            .ok_or(KdTreeError::EmptyTree)
    }

    /// Find the element closest to a two-dimensional `coord`.
    pub fn search_nearest_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
    ) -> Result<Neighbor<'_, N, D, M::Distance>> {
        self.search_nearest(&[coord.x(), coord.y()])
    }

    /// Find the `k` elements closest to `key`, closest first.
    ///
    /// Elements at equal distance are returned in the order they were found. Fails with
    /// [`KdTreeError::InsufficientElements`] if the tree holds fewer than `k` elements.
    pub fn search_nearest_k(
        &self,
        k: usize,
        key: &[N],
    ) -> Result<Vec<Neighbor<'_, N, D, M::Distance>>> {
        self.check_key(key)?;
        if k == 0 {
            return Ok(vec![]);
        }
        let root = self.built_root()?;
        self.check_k(k)?;

        let mut best = Candidates::new(k);
        BranchAndBound::new(key, &self.metric, &self.bounds).nearest(root, &mut best);
        Ok(best.into_neighbors())
    }

    /// Find all elements within Euclidean distance `radius` of `key`, borders included.
    ///
    /// The radius is Euclidean whatever the distance policy of the tree. The order of the result
    /// is unspecified; use [`search_within_sorted`][Self::search_within_sorted] to order it.
    pub fn search_within(&self, key: &[N], radius: f64) -> Result<Vec<&Element<N, D>>> {
        let mut found = vec![];
        self.collect_within(key, radius, |element, _| found.push(element))?;
        Ok(found)
    }

    /// Find all elements within Euclidean distance `radius` of a two-dimensional `coord`.
    pub fn search_within_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        radius: f64,
    ) -> Result<Vec<&Element<N, D>>> {
        self.search_within(&[coord.x(), coord.y()], radius)
    }

    /// Find all elements within Euclidean distance `radius` of `key`, closest first, together with
    /// their Euclidean distance.
    pub fn search_within_sorted(
        &self,
        key: &[N],
        radius: f64,
    ) -> Result<Vec<Neighbor<'_, N, D, f64>>> {
        let mut found = vec![];
        self.collect_within(key, radius, |element, distance| {
            found.push(Neighbor { element, distance })
        })?;
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(found)
    }

    fn collect_within<'a>(
        &'a self,
        key: &[N],
        radius: f64,
        mut emit: impl FnMut(&'a Element<N, D>, f64),
    ) -> Result<()> {
        self.check_key(key)?;
        if radius.is_nan() || radius < 0.0 {
            return Err(KdTreeError::InvalidConfiguration(format!(
                "search radius must be a non-negative number, got {radius}"
            )));
        }
        if let Some(root) = &self.root {
            BranchAndBound::new(key, &Euclidean, &self.bounds).within(root, radius, &mut emit);
        }
        Ok(())
    }

    pub(crate) fn check_k(&self, k: usize) -> Result<()> {
        if k > self.num_elements {
            return Err(KdTreeError::InsufficientElements {
                requested: k,
                available: self.num_elements,
            });
        }
        Ok(())
    }
}

/// The `k` best elements found so far, sorted by distance.
#[derive(Debug)]
pub(crate) struct Candidates<'a, N: IndexableNum, D, T> {
    k: usize,
    entries: Vec<(T, &'a Element<N, D>)>,
}

impl<'a, N: IndexableNum, D, T: PartialOrd + Copy> Candidates<'a, N, D, T> {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            entries: Vec::with_capacity(k + 1),
        }
    }

    /// The distance an element has to beat to be kept, once `k` elements have been found.
    #[inline]
    pub(crate) fn bound(&self) -> Option<T> {
        if self.entries.len() < self.k {
            None
        } else {
            self.entries.last().map(|(d, _)| *d)
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Keep `element` if it is closer than the current bound.
    pub(crate) fn offer(&mut self, distance: T, element: &'a Element<N, D>) {
        if self.bound().is_some_and(|bound| !(distance < bound)) {
            return;
        }
        let pos = self.entries.partition_point(|(d, _)| *d <= distance);
        self.entries.insert(pos, (distance, element));
        self.entries.truncate(self.k);
    }

    pub(crate) fn into_neighbors(self) -> Vec<Neighbor<'a, N, D, T>> {
        self.entries
            .into_iter()
            .map(|(distance, element)| Neighbor { element, distance })
            .collect()
    }
}

/// Per-call state of a branch-and-bound search.
pub(crate) struct BranchAndBound<'k, N: IndexableNum, M> {
    key: &'k [N],
    metric: &'k M,
    bounds: Bounds<N>,
}

impl<'k, N: IndexableNum, M: DistanceMetric<N>> BranchAndBound<'k, N, M> {
    pub(crate) fn new(key: &'k [N], metric: &'k M, bounds: &Bounds<N>) -> Self {
        Self {
            key,
            metric,
            bounds: bounds.clone(),
        }
    }

    #[inline]
    fn overlaps(&self, radius: Option<M::Distance>) -> bool {
        radius.map_or(true, |r| {
            self.bounds.overlaps_hypersphere(self.metric, self.key, r)
        })
    }

    #[inline]
    fn contains(&self, radius: Option<M::Distance>) -> bool {
        radius.is_some_and(|r| {
            self.bounds.contains_hypersphere(self.metric, self.key, r)
        })
    }

    /// Returns `true` once the search ball lies within the box of `node`, which ends the search.
    pub(crate) fn nearest<'a, D>(
        &mut self,
        node: &'a Node<N, D>,
        best: &mut Candidates<'a, N, D, M::Distance>,
    ) -> bool {
        let (axis, value, left, right) = match node {
            Node::Leaf { elements } => {
                for element in elements {
                    let distance = self.metric.distance(self.key, &element.point);
                    best.offer(distance, element);
                }
                return self.contains(best.bound());
            }
            Node::Internal {
                axis,
                value,
                left,
                right,
            } => (*axis, *value, left, right),
        };

        if self.key[axis] <= value {
            let old = self.bounds.set_max(axis, value);
            let done = self.nearest(left, best);
            self.bounds.set_max(axis, old);
            if done {
                return true;
            }

            let old = self.bounds.set_min(axis, value);
            let done = self.overlaps(best.bound()) && self.nearest(right, best);
            self.bounds.set_min(axis, old);
            if done {
                return true;
            }
        } else {
            let old = self.bounds.set_min(axis, value);
            let done = self.nearest(right, best);
            self.bounds.set_min(axis, old);
            if done {
                return true;
            }

            let old = self.bounds.set_max(axis, value);
            let done = self.overlaps(best.bound()) && self.nearest(left, best);
            self.bounds.set_max(axis, old);
            if done {
                return true;
            }
        }

        self.contains(best.bound())
    }

    /// Emit every element of `node` within `radius`, borders included.
    pub(crate) fn within<'a, D>(
        &mut self,
        node: &'a Node<N, D>,
        radius: M::Distance,
        emit: &mut impl FnMut(&'a Element<N, D>, M::Distance),
    ) {
        match node {
            Node::Leaf { elements } => {
                for element in elements {
                    let mut acc = M::Distance::zero();
                    for (&k, &v) in self.key.iter().zip(&element.point) {
                        self.metric.accumulate(k, v, &mut acc);
                    }
                    if !self.metric.acc_greater_than(acc, radius) {
                        emit(element, self.metric.finish(acc));
                    }
                }
            }
            Node::Internal {
                axis,
                value,
                left,
                right,
            } => {
                let (axis, value) = (*axis, *value);

                let old = self.bounds.set_max(axis, value);
                if self.bounds.overlaps_hypersphere(self.metric, self.key, radius) {
                    self.within(left, radius, emit);
                }
                self.bounds.set_max(axis, old);

                let old = self.bounds.set_min(axis, value);
                if self.bounds.overlaps_hypersphere(self.metric, self.key, radius) {
                    self.within(right, radius, emit);
                }
                self.bounds.set_min(axis, old);
            }
        }
    }
}

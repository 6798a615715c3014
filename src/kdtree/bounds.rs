//! Axis-aligned bounding boxes and the box/hypersphere tests used to prune searches.

use num_traits::Zero;
use tinyvec::TinyVec;

use crate::kdtree::distance::DistanceMetric;
use crate::r#type::IndexableNum;

/// Inline capacity of a box; boxes of higher dimension spill to the heap.
type Coords<N> = TinyVec<[N; 8]>;

/// An axis-aligned box, given by its minimum and maximum corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds<N: IndexableNum> {
    min: Coords<N>,
    max: Coords<N>,
}

impl<N: IndexableNum> Bounds<N> {
    /// A box that has not seen any point yet.
    ///
    /// Its minimum is filled with [`IndexableNum::upper_sentinel`] and its maximum with
    /// [`IndexableNum::lower_sentinel`], so that [`extend`][Self::extend] can fold points into it.
    pub fn empty(dim: usize) -> Self {
        Self {
            min: std::iter::repeat(N::upper_sentinel()).take(dim).collect(),
            max: std::iter::repeat(N::lower_sentinel()).take(dim).collect(),
        }
    }

    /// The smallest box containing all given points.
    pub fn enclosing<'a>(dim: usize, points: impl IntoIterator<Item = &'a [N]>) -> Self {
        let mut bounds = Self::empty(dim);
        for point in points {
            bounds.extend(point);
        }
        bounds
    }

    /// Grow the box to contain `point`.
    pub fn extend(&mut self, point: &[N]) {
        for (i, &v) in point.iter().enumerate().take(self.dim()) {
            if v < self.min[i] {
                self.min[i] = v;
            }
            if v > self.max[i] {
                self.max[i] = v;
            }
        }
    }

    /// The dimension of this box.
    #[inline]
    pub fn dim(&self) -> usize {
        self.min.len()
    }

    /// The minimum corner.
    #[inline]
    pub fn min(&self) -> &[N] {
        &self.min
    }

    /// The maximum corner.
    #[inline]
    pub fn max(&self) -> &[N] {
        &self.max
    }

    #[inline]
    pub(crate) fn set_min(&mut self, axis: usize, value: N) -> N {
        std::mem::replace(&mut self.min[axis], value)
    }

    #[inline]
    pub(crate) fn set_max(&mut self, axis: usize, value: N) -> N {
        std::mem::replace(&mut self.max[axis], value)
    }

    /// Whether `point` lies inside the box, borders included.
    pub fn contains_point(&self, point: &[N]) -> bool {
        within_box(&self.min, &self.max, point)
    }

    /// Whether any part of the box lies closer than `dist` to `key` ("bounds overlap ball").
    ///
    /// The distance is accumulated one axis at a time and the test stops as soon as the partial
    /// sum exceeds `dist`.
    pub(crate) fn overlaps_hypersphere<M: DistanceMetric<N>>(
        &self,
        metric: &M,
        key: &[N],
        dist: M::Distance,
    ) -> bool {
        let mut sum = M::Distance::zero();
        for (i, &k) in key.iter().enumerate().rev() {
            if k < self.min[i] {
                metric.accumulate(self.min[i], k, &mut sum);
                if metric.acc_greater_than(sum, dist) {
                    return false;
                }
            } else if k > self.max[i] {
                metric.accumulate(k, self.max[i], &mut sum);
                if metric.acc_greater_than(sum, dist) {
                    return false;
                }
            }
        }
        true
    }

    /// Whether the hypersphere of radius `dist` around `key` lies strictly inside the box
    /// ("ball within bounds").
    pub(crate) fn contains_hypersphere<M: DistanceMetric<N>>(
        &self,
        metric: &M,
        key: &[N],
        dist: M::Distance,
    ) -> bool {
        for (i, &k) in key.iter().enumerate().rev() {
            if metric.component(k, self.min[i]) <= dist || metric.component(self.max[i], k) <= dist
            {
                return false;
            }
        }
        true
    }

    /// The smallest distance between `key` and any point of the box. Zero if `key` is inside.
    pub(crate) fn min_distance<M: DistanceMetric<N>>(&self, metric: &M, key: &[N]) -> M::Distance {
        let mut acc = M::Distance::zero();
        for (i, &k) in key.iter().enumerate().rev() {
            if k > self.max[i] {
                metric.accumulate(k, self.max[i], &mut acc);
            } else if k < self.min[i] {
                metric.accumulate(k, self.min[i], &mut acc);
            }
        }
        metric.finish(acc)
    }
}

/// Whether `point` lies within the box spanned by `min` and `max`, borders included.
#[inline]
pub(crate) fn within_box<N: IndexableNum>(min: &[N], max: &[N], point: &[N]) -> bool {
    point
        .iter()
        .zip(min.iter().zip(max))
        .all(|(v, (lo, hi))| v >= lo && v <= hi)
}

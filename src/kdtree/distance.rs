//! Distance policies for nearest-neighbor queries.
//!
//! A policy computes full distances between points and also exposes the per-axis pieces of a
//! Minkowski-style distance, so that the search can build a distance up axis by axis and stop as
//! soon as the partial sum exceeds a bound.

use num_traits::Zero;

use crate::r#type::{Accumulator, IndexableNum};

/// A trait for calculating distances between points of an index.
pub trait DistanceMetric<N: IndexableNum> {
    /// The type distances are accumulated and reported in.
    type Distance: Accumulator;

    /// Add the contribution of one axis, with coordinates `a` and `b`, to `acc`.
    fn accumulate(&self, a: N, b: N, acc: &mut Self::Distance);

    /// Turn a fully accumulated value into a distance.
    fn finish(&self, acc: Self::Distance) -> Self::Distance;

    /// The distance between two points that only differ on one axis.
    fn component(&self, a: N, b: N) -> Self::Distance;

    /// Whether an accumulated (not yet finished) value is larger than the distance `dist`.
    fn acc_greater_than(&self, acc: Self::Distance, dist: Self::Distance) -> bool;

    /// The distance between two points of the same dimension.
    #[inline]
    fn distance(&self, a: &[N], b: &[N]) -> Self::Distance {
        let mut acc = Self::Distance::zero();
        for (x, y) in a.iter().zip(b) {
            self.accumulate(*x, *y, &mut acc);
        }
        self.finish(acc)
    }
}

/// Square of the Euclidean distance. This is the default policy of
/// [`KdTree`][crate::kdtree::KdTree], since it avoids a square root per visited point.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl<N: IndexableNum> DistanceMetric<N> for SquaredEuclidean {
    type Distance = N::Acc;

    #[inline]
    fn accumulate(&self, a: N, b: N, acc: &mut N::Acc) {
        let d = b.to_acc() - a.to_acc();
        *acc = *acc + d * d;
    }

    #[inline]
    fn finish(&self, acc: N::Acc) -> N::Acc {
        acc
    }

    #[inline]
    fn component(&self, a: N, b: N) -> N::Acc {
        let d = b.to_acc() - a.to_acc();
        d * d
    }

    #[inline]
    fn acc_greater_than(&self, acc: N::Acc, dist: N::Acc) -> bool {
        acc > dist
    }
}

/// Euclidean distance, reported in `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl<N: IndexableNum> DistanceMetric<N> for Euclidean {
    type Distance = f64;

    #[inline]
    fn accumulate(&self, a: N, b: N, acc: &mut f64) {
        let d = b.as_f64() - a.as_f64();
        *acc += d * d;
    }

    #[inline]
    fn finish(&self, acc: f64) -> f64 {
        acc.sqrt()
    }

    #[inline]
    fn component(&self, a: N, b: N) -> f64 {
        (b.as_f64() - a.as_f64()).abs()
    }

    #[inline]
    fn acc_greater_than(&self, acc: f64, dist: f64) -> bool {
        acc > dist * dist
    }
}

/// City block (L1) distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl<N: IndexableNum> DistanceMetric<N> for Manhattan {
    type Distance = N::Acc;

    #[inline]
    fn accumulate(&self, a: N, b: N, acc: &mut N::Acc) {
        *acc = *acc + abs_diff(a, b);
    }

    #[inline]
    fn finish(&self, acc: N::Acc) -> N::Acc {
        acc
    }

    #[inline]
    fn component(&self, a: N, b: N) -> N::Acc {
        abs_diff(a, b)
    }

    #[inline]
    fn acc_greater_than(&self, acc: N::Acc, dist: N::Acc) -> bool {
        acc > dist
    }
}

#[inline]
fn abs_diff<N: IndexableNum>(a: N, b: N) -> N::Acc {
    let (a, b) = (a.to_acc(), b.to_acc());
    if a > b {
        a - b
    } else {
        b - a
    }
}

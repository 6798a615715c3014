use std::cmp::Ordering;

use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::kdtree::DistanceMetric;
use crate::r#type::IndexableNum;

/// `n` random points of dimension `dim` with coordinates in `low..high`, reproducible by `seed`.
pub(crate) fn random_points<N: IndexableNum + SampleUniform>(
    seed: u64,
    n: usize,
    dim: usize,
    low: N,
    high: N,
) -> Vec<Vec<N>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.gen_range(low..high)).collect())
        .collect()
}

pub(crate) fn sq_dist<N: IndexableNum>(a: &[N], b: &[N]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x.as_f64() - y.as_f64();
            d * d
        })
        .sum()
}

/// The squared distances of the `k` points closest to `key`, ascending.
pub(crate) fn brute_force_k<N: IndexableNum>(points: &[Vec<N>], key: &[N], k: usize) -> Vec<f64> {
    let mut distances: Vec<f64> = points.iter().map(|p| sq_dist(p, key)).collect();
    distances.sort_by(|a, b| a.total_cmp(b));
    distances.truncate(k);
    distances
}

/// The distances of the `k` points closest to `key` under `metric`, ascending.
pub(crate) fn brute_force_k_by<N: IndexableNum, M: DistanceMetric<N>>(
    metric: &M,
    points: &[Vec<N>],
    key: &[N],
    k: usize,
) -> Vec<M::Distance> {
    let mut distances: Vec<M::Distance> =
        points.iter().map(|p| metric.distance(key, p)).collect();
    distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    distances.truncate(k);
    distances
}

/// The indices of the points within Euclidean distance `radius` of `key`, ascending.
pub(crate) fn brute_force_within<N: IndexableNum>(
    points: &[Vec<N>],
    key: &[N],
    radius: f64,
) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| sq_dist(p, key) <= radius * radius)
        .map(|(i, _)| i)
        .collect()
}

/// The indices of the points inside the box spanned by `min` and `max`, ascending.
pub(crate) fn brute_force_range<N: IndexableNum>(
    points: &[Vec<N>],
    min: &[N],
    max: &[N],
) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            p.iter()
                .zip(min.iter().zip(max))
                .all(|(v, (lo, hi))| v >= lo && v <= hi)
        })
        .map(|(i, _)| i)
        .collect()
}

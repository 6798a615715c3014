use criterion::{criterion_group, criterion_main, Criterion};
use kd_index::KdTree;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::{RTree, AABB};

fn random_points(n: usize) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| [rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)])
        .collect()
}

fn construct_kdtree(points: &[[f64; 2]], bucket_size: usize) -> KdTree<f64, usize> {
    let mut tree = KdTree::new();
    for (i, p) in points.iter().enumerate() {
        tree.add(*p, i).unwrap();
    }
    tree.build(bucket_size).unwrap();
    tree
}

fn construct_rstar(points: Vec<[f64; 2]>) -> RTree<[f64; 2]> {
    RTree::bulk_load(points)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let points = random_points(100_000);

    c.bench_function("construction (kdtree, bucket 1)", |b| {
        b.iter(|| construct_kdtree(&points, 1))
    });

    c.bench_function("construction (kdtree, bucket 16)", |b| {
        b.iter(|| construct_kdtree(&points, 16))
    });

    c.bench_function("construction (rstar bulk)", |b| {
        b.iter(|| construct_rstar(points.to_vec()))
    });

    let tree = construct_kdtree(&points, 16);
    let rstar_tree = construct_rstar(points.to_vec());
    let key = [12.5, -33.25];

    c.bench_function("nearest (kdtree)", |b| {
        b.iter(|| tree.search_nearest(&key).unwrap())
    });

    c.bench_function("nearest 10 (kdtree)", |b| {
        b.iter(|| tree.search_nearest_k(10, &key).unwrap())
    });

    c.bench_function("nearest 10 (kdtree, best bin first)", |b| {
        b.iter(|| tree.search_best_bin_first(10, &key, 8).unwrap())
    });

    c.bench_function("nearest (rstar)", |b| {
        b.iter(|| rstar_tree.nearest_neighbor(&key).unwrap())
    });

    c.bench_function("nearest 10 (rstar)", |b| {
        b.iter(|| {
            rstar_tree
                .nearest_neighbor_iter(&key)
                .take(10)
                .collect::<Vec<_>>()
        })
    });

    c.bench_function("within (kdtree)", |b| {
        b.iter(|| tree.search_within(&key, 5.0).unwrap())
    });

    let (min, max) = ([0.0, -40.0], [20.0, -20.0]);

    c.bench_function("range (kdtree)", |b| {
        b.iter(|| tree.search_range(&min, &max).unwrap())
    });

    c.bench_function("range (rstar)", |b| {
        let aabb = AABB::from_corners(min, max);
        b.iter(|| rstar_tree.locate_in_envelope(&aabb).collect::<Vec<_>>())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

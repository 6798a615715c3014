use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::Result;
use crate::kdtree::distance::DistanceMetric;
use crate::kdtree::element::Neighbor;
use crate::kdtree::KdTree;
use crate::r#type::IndexableNum;

impl<N, D, M> KdTree<N, D, M>
where
    N: IndexableNum,
    D: Sync,
    M: DistanceMetric<N> + Sync,
{
    /// Find the nearest element of every key, searching in parallel.
    ///
    /// Results are in the order of `keys`. Fails with the first error of any search.
    pub fn search_nearest_batch<K: AsRef<[N]> + Sync>(
        &self,
        keys: &[K],
    ) -> Result<Vec<Neighbor<'_, N, D, M::Distance>>> {
        keys.par_iter()
            .map(|key| self.search_nearest(key.as_ref()))
            .collect()
    }

    /// Find the `k` nearest elements of every key, searching in parallel.
    pub fn search_nearest_k_batch<K: AsRef<[N]> + Sync>(
        &self,
        k: usize,
        keys: &[K],
    ) -> Result<Vec<Vec<Neighbor<'_, N, D, M::Distance>>>> {
        keys.par_iter()
            .map(|key| self.search_nearest_k(k, key.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::kdtree::KdTree;

    #[test]
    fn batch_matches_single_queries() {
        let mut tree = KdTree::<u32, u32>::new();
        for i in 0..500u32 {
            tree.add([i % 23, i / 23, (i * 7) % 11], i).unwrap();
        }
        tree.build(8).unwrap();

        let keys: Vec<[u32; 3]> = (0..50u32).map(|i| [i % 30, i % 17, i % 5]).collect();
        let batch = tree.search_nearest_batch(&keys).unwrap();
        let batch_k = tree.search_nearest_k_batch(3, &keys).unwrap();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(batch[i].distance, tree.search_nearest(key).unwrap().distance);
            let single: Vec<i128> = tree
                .search_nearest_k(3, key)
                .unwrap()
                .iter()
                .map(|n| n.distance)
                .collect();
            let parallel: Vec<i128> = batch_k[i].iter().map(|n| n.distance).collect();
            assert_eq!(single, parallel);
        }

        assert!(tree.search_nearest_batch(&[[0u32, 0]]).is_err());
    }
}

use crate::error::{KdTreeError, Result};
use crate::kdtree::element::Element;
use crate::kdtree::node::Node;
use crate::kdtree::select::select;
use crate::r#type::IndexableNum;

/// A freshly built tree and its bookkeeping.
#[derive(Debug)]
pub(crate) struct BuiltTree<N: IndexableNum, D> {
    pub(crate) root: Node<N, D>,
    pub(crate) num_elements: usize,
    pub(crate) num_leaves: usize,
    pub(crate) levels: usize,
}

/// Turns a flat list of elements into a tree of buckets of at most `bucket_size` elements.
#[derive(Debug)]
pub(crate) struct TreeBuilder {
    bucket_size: usize,
    num_leaves: usize,
}

impl TreeBuilder {
    pub(crate) fn new(bucket_size: usize) -> Result<Self> {
        if bucket_size < 1 {
            return Err(KdTreeError::InvalidConfiguration(format!(
                "bucket size must be at least 1, got {bucket_size}"
            )));
        }
        Ok(Self {
            bucket_size,
            num_leaves: 0,
        })
    }

    /// Consume this builder and the elements, performing the k-d partitioning.
    pub(crate) fn finish<N: IndexableNum, D>(
        mut self,
        elements: Vec<Element<N, D>>,
    ) -> Result<BuiltTree<N, D>> {
        if elements.is_empty() {
            return Err(KdTreeError::EmptyInput);
        }

        let num_elements = elements.len();
        let (root, levels) = self.subdivide(elements);
        Ok(BuiltTree {
            root,
            num_elements,
            num_leaves: self.num_leaves,
            levels,
        })
    }

    /// Returns the subtree for `elements` and its depth.
    fn subdivide<N: IndexableNum, D>(&mut self, elements: Vec<Element<N, D>>) -> (Node<N, D>, usize) {
        let n = elements.len();
        if n <= self.bucket_size {
            self.num_leaves += 1;
            return (Node::Leaf { elements }, 1);
        }

        let axis = max_variance_axis(&elements);

        // the split value is the median along the chosen axis
        let m = n / 2;
        let mut projected: Vec<N> = elements.iter().map(|e| e.point[axis]).collect();
        let value = select(&mut projected, m);
        drop(projected);

        let mut left = Vec::with_capacity(m);
        let mut right = Vec::with_capacity(n - m);
        let mut equal = vec![];
        for element in elements {
            let v = element.point[axis];
            if v < value {
                left.push(element);
            } else if v > value {
                right.push(element);
            } else {
                equal.push(element);
            }
        }

        // fill the lower half with equal elements up to exactly m elements
        let needed = m.saturating_sub(left.len()).min(equal.len());
        let rest = equal.split_off(needed);
        left.extend(equal);
        right.extend(rest);
        debug_assert_eq!(left.len(), m);

        let (left, left_depth) = self.subdivide(left);
        let (right, right_depth) = self.subdivide(right);
        let node = Node::Internal {
            axis,
            value,
            left: Box::new(left),
            right: Box::new(right),
        };
        (node, 1 + left_depth.max(right_depth))
    }
}

/// The axis with the largest spread, measured as `Σx² - (Σx)²/n`. Ties go to the lowest axis.
fn max_variance_axis<N: IndexableNum, D>(elements: &[Element<N, D>]) -> usize {
    let dim = elements.first().map_or(0, |e| e.dim());
    let n = elements.len() as f64;

    let mut best_axis = 0;
    let mut best_variance = f64::NEG_INFINITY;
    for axis in 0..dim {
        let (sum, sum_sq) = elements.iter().fold((0.0, 0.0), |(sum, sum_sq), e| {
            let v = e.point[axis].as_f64();
            (sum + v, sum_sq + v * v)
        });
        let variance = sum_sq - sum * sum / n;
        if variance > best_variance {
            best_axis = axis;
            best_variance = variance;
        }
    }
    best_axis
}

#[cfg(test)]
mod test {
    use super::*;

    fn elements(points: &[[f64; 2]]) -> Vec<Element<f64, usize>> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| Element::new(p.to_vec(), i))
            .collect()
    }

    #[test]
    fn rejects_zero_bucket_size() {
        let err = TreeBuilder::new(0).unwrap_err();
        assert!(matches!(err, KdTreeError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_empty_input() {
        let builder = TreeBuilder::new(1).unwrap();
        let err = builder.finish(Vec::<Element<f64, ()>>::new()).unwrap_err();
        assert!(matches!(err, KdTreeError::EmptyInput));
    }

    #[test]
    fn picks_axis_of_largest_spread() {
        let els = elements(&[[0.0, 0.0], [1.0, 10.0], [2.0, -10.0]]);
        assert_eq!(max_variance_axis(&els), 1);

        // equal spread on both axes goes to the first
        let els = elements(&[[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(max_variance_axis(&els), 0);
    }

    #[test]
    fn single_bucket() {
        let tree = TreeBuilder::new(8)
            .unwrap()
            .finish(elements(&[[0.0, 0.0], [1.0, 1.0]]))
            .unwrap();
        assert!(tree.root.is_leaf());
        assert_eq!(tree.num_elements, 2);
        assert_eq!(tree.num_leaves, 1);
        assert_eq!(tree.levels, 1);
    }

    #[test]
    fn splits_at_the_median() {
        let tree = TreeBuilder::new(1)
            .unwrap()
            .finish(elements(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [10.0, 10.0]]))
            .unwrap();
        assert_eq!(tree.root.split(), Some((0, 2.0)));
        let (left, right) = tree.root.children().unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 3);
        assert_eq!(tree.num_leaves, 5);
        assert_eq!(tree.levels, 4);
    }

    #[test]
    fn duplicates_are_balanced() {
        let points = vec![[5.0, 5.0]; 9];
        let tree = TreeBuilder::new(2).unwrap().finish(elements(&points)).unwrap();
        let (left, right) = tree.root.children().unwrap();
        assert_eq!(left.len(), 4);
        assert_eq!(right.len(), 5);
        assert_eq!(tree.root.len(), 9);
        assert!(tree.root.elements().all(|e| e.point == [5.0, 5.0]));

        let mut data: Vec<usize> = tree.root.elements().map(|e| e.data).collect();
        data.sort_unstable();
        assert_eq!(data, (0..9).collect::<Vec<_>>());
    }
}

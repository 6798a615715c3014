use geo_traits::CoordTrait;
use tracing::debug;

use crate::error::{KdTreeError, Result};
use crate::kdtree::bounds::Bounds;
use crate::kdtree::builder::{BuiltTree, TreeBuilder};
use crate::kdtree::distance::{DistanceMetric, SquaredEuclidean};
use crate::kdtree::element::Element;
use crate::kdtree::node::Node;
use crate::r#type::IndexableNum;

/// A bucketed k-d tree over points of `N` coordinates carrying payloads of type `D`.
///
/// Points are first buffered with [`add`][Self::add] and only become searchable after
/// [`build`][Self::build] or [`rebuild`][Self::rebuild]. Searches take `&self`, so a built tree can
/// be shared between threads and searched concurrently.
///
/// The distance policy `M` orders the results of the nearest-neighbor searches.
#[derive(Debug, Clone)]
pub struct KdTree<N: IndexableNum, D, M = SquaredEuclidean> {
    pub(crate) root: Option<Node<N, D>>,
    pub(crate) pending: Vec<Element<N, D>>,
    pub(crate) num_elements: usize,
    pub(crate) num_added_elements: usize,
    pub(crate) num_leaves: usize,
    pub(crate) levels: usize,
    pub(crate) dimension: Option<usize>,
    pub(crate) bounds: Bounds<N>,
    pub(crate) metric: M,
}

impl<N: IndexableNum, D> KdTree<N, D> {
    /// Create an empty tree using [`SquaredEuclidean`] distances.
    pub fn new() -> Self {
        Self::with_metric(SquaredEuclidean)
    }
}

impl<N: IndexableNum, D, M: DistanceMetric<N> + Default> Default for KdTree<N, D, M> {
    fn default() -> Self {
        Self::with_metric(M::default())
    }
}

impl<N: IndexableNum, D, M: DistanceMetric<N>> KdTree<N, D, M> {
    /// Create an empty tree using the given distance policy.
    pub fn with_metric(metric: M) -> Self {
        Self {
            root: None,
            pending: vec![],
            num_elements: 0,
            num_added_elements: 0,
            num_leaves: 0,
            levels: 0,
            dimension: None,
            bounds: Bounds::empty(0),
            metric,
        }
    }

    /// Buffer a point and its payload for the next build.
    ///
    /// The first point ever added fixes the dimension of the tree. Points of another dimension,
    /// zero-dimensional points and points with a NaN or infinite coordinate are rejected.
    pub fn add(&mut self, point: impl Into<Vec<N>>, data: D) -> Result<()> {
        let point = point.into();
        if point.is_empty() {
            return Err(KdTreeError::InvalidConfiguration(
                "points must have at least one dimension".to_string(),
            ));
        }
        if !is_finite(&point) {
            return Err(KdTreeError::InvalidConfiguration(
                "point coordinates must be finite".to_string(),
            ));
        }
        match self.dimension {
            Some(expected) if expected != point.len() => {
                return Err(KdTreeError::DimensionMismatch {
                    expected,
                    actual: point.len(),
                })
            }
            Some(_) => {}
            None => self.dimension = Some(point.len()),
        }

        self.pending.push(Element::new(point, data));
        self.num_added_elements += 1;
        Ok(())
    }

    /// Buffer a two-dimensional point and its payload for the next build.
    pub fn add_coord(&mut self, coord: &impl CoordTrait<T = N>, data: D) -> Result<()> {
        self.add(vec![coord.x(), coord.y()], data)
    }

    /// Replace the tree with a new one over the buffered points, which are consumed.
    ///
    /// Any previously built tree is dropped. Fails with [`KdTreeError::EmptyInput`] if no point is
    /// buffered, and leaves the index untouched on failure.
    pub fn build(&mut self, bucket_size: usize) -> Result<()> {
        let builder = TreeBuilder::new(bucket_size)?;
        if self.pending.is_empty() {
            return Err(KdTreeError::EmptyInput);
        }

        let elements = std::mem::take(&mut self.pending);
        let tree = builder.finish(elements)?;
        self.install(tree);
        debug!(
            num_elements = self.num_elements,
            num_leaves = self.num_leaves,
            levels = self.levels,
            bucket_size,
            "built k-d tree"
        );
        Ok(())
    }

    /// Build a new tree over the elements of the current tree plus the buffered points.
    ///
    /// Without buffered points an existing tree is kept as is.
    pub fn rebuild(&mut self, bucket_size: usize) -> Result<()> {
        let builder = TreeBuilder::new(bucket_size)?;
        if self.pending.is_empty() {
            return if self.root.is_some() {
                Ok(())
            } else {
                Err(KdTreeError::EmptyInput)
            };
        }

        let mut elements = Vec::with_capacity(self.num_elements + self.pending.len());
        if let Some(root) = self.root.take() {
            root.drain_into(&mut elements);
        }
        elements.append(&mut self.pending);

        let tree = builder.finish(elements)?;
        self.install(tree);
        debug!(
            num_elements = self.num_elements,
            num_leaves = self.num_leaves,
            levels = self.levels,
            bucket_size,
            "rebuilt k-d tree"
        );
        Ok(())
    }

    /// Drop the tree and all buffered points. The dimension of the tree is kept.
    pub fn clear(&mut self) {
        self.root = None;
        self.pending.clear();
        self.num_elements = 0;
        self.num_added_elements = 0;
        self.num_leaves = 0;
        self.levels = 0;
        self.bounds = Bounds::empty(self.dimension.unwrap_or(0));
        debug!("cleared k-d tree");
    }

    pub(crate) fn install(&mut self, tree: BuiltTree<N, D>) {
        let dim = self.dimension.unwrap_or(0);
        self.bounds = Bounds::enclosing(dim, tree.root.elements().map(|e| e.point.as_slice()));
        self.num_elements = tree.num_elements;
        self.num_leaves = tree.num_leaves;
        self.levels = tree.levels;
        self.root = Some(tree.root);
    }

    /// Fails if `key` cannot be compared against the points of this tree.
    pub(crate) fn check_key(&self, key: &[N]) -> Result<()> {
        if let Some(expected) = self.dimension {
            if key.len() != expected {
                return Err(KdTreeError::DimensionMismatch {
                    expected,
                    actual: key.len(),
                });
            }
        }
        if !is_finite(key) {
            return Err(KdTreeError::InvalidConfiguration(
                "query coordinates must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// The built tree, failing with [`KdTreeError::EmptyTree`] if there is none.
    pub(crate) fn built_root(&self) -> Result<&Node<N, D>> {
        self.root.as_ref().ok_or(KdTreeError::EmptyTree)
    }

    /// The number of elements in the built tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_elements
    }

    /// Returns `true` if the built tree holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_elements == 0
    }

    /// The number of points added since the tree was created or last cleared.
    #[inline]
    pub fn num_added_elements(&self) -> usize {
        self.num_added_elements
    }

    /// The number of buffered points not yet part of the tree.
    #[inline]
    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }

    /// The number of leaves of the built tree.
    #[inline]
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// The depth of the built tree.
    #[inline]
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// The dimension of the points, once the first point has been added.
    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// The bounding box of the built tree.
    #[inline]
    pub fn bounds(&self) -> &Bounds<N> {
        &self.bounds
    }

    /// The root node of the built tree.
    #[inline]
    pub fn root(&self) -> Option<&Node<N, D>> {
        self.root.as_ref()
    }

    /// The distance policy of this tree.
    #[inline]
    pub fn metric(&self) -> &M {
        &self.metric
    }
}

#[inline]
fn is_finite<N: IndexableNum>(point: &[N]) -> bool {
    point.iter().all(|v| v.as_f64().is_finite())
}

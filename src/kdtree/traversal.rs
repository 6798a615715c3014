//! Utilities to traverse the KdTree structure.

use crate::kdtree::bounds::Bounds;
use crate::kdtree::distance::DistanceMetric;
use crate::kdtree::element::Element;
use crate::kdtree::node::{Elements, Node};
use crate::kdtree::KdTree;
use crate::r#type::IndexableNum;

/// A node of the tree together with the box of space it covers.
#[derive(Debug, Clone)]
pub struct Cell<'a, N: IndexableNum, D> {
    node: &'a Node<N, D>,
    bounds: Bounds<N>,
}

impl<'a, N: IndexableNum, D> Cell<'a, N, D> {
    /// The child cell representing the "left" half, narrowed to the split value.
    ///
    /// Returns `None` for a leaf.
    pub fn left_child(&self) -> Option<Cell<'a, N, D>> {
        let Node::Internal {
            axis, value, left, ..
        } = self.node
        else {
            return None;
        };
        let mut bounds = self.bounds.clone();
        bounds.set_max(*axis, *value);
        Some(Cell { node: left, bounds })
    }

    /// The child cell representing the "right" half, narrowed to the split value.
    ///
    /// Returns `None` for a leaf.
    pub fn right_child(&self) -> Option<Cell<'a, N, D>> {
        let Node::Internal {
            axis, value, right, ..
        } = self.node
        else {
            return None;
        };
        let mut bounds = self.bounds.clone();
        bounds.set_min(*axis, *value);
        Some(Cell {
            node: right,
            bounds,
        })
    }

    /// Returns `true` if this is a leaf cell without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// Returns `true` if this is an intermediate cell with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The split axis and value of an intermediate cell.
    #[inline]
    pub fn split(&self) -> Option<(usize, N)> {
        self.node.split()
    }

    /// The elements stored directly in this cell. Empty for intermediate cells.
    #[inline]
    pub fn bucket(&self) -> &'a [Element<N, D>] {
        self.node.bucket()
    }

    /// All elements below this cell.
    #[inline]
    pub fn elements(&self) -> Elements<'a, N, D> {
        self.node.elements()
    }

    /// The box of space covered by this cell.
    #[inline]
    pub fn bounds(&self) -> &Bounds<N> {
        &self.bounds
    }

    /// The node behind this cell.
    #[inline]
    pub fn node(&self) -> &'a Node<N, D> {
        self.node
    }
}

impl<N: IndexableNum, D, M: DistanceMetric<N>> KdTree<N, D, M> {
    /// The root cell of the built tree for manual traversal, covering the bounding box of the
    /// tree.
    pub fn root_cell(&self) -> Option<Cell<'_, N, D>> {
        self.root.as_ref().map(|node| Cell {
            node,
            bounds: self.bounds.clone(),
        })
    }
}

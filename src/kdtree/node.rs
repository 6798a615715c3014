//! Tree nodes: leaves own a bucket of elements, internal nodes own their two children.

use crate::kdtree::element::Element;
use crate::r#type::IndexableNum;

/// A node of a [`KdTree`][crate::kdtree::KdTree].
///
/// Cloning a node deep-copies the whole subtree, buckets included.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<N: IndexableNum, D> {
    /// A bucket of elements.
    Leaf {
        /// The elements stored in this leaf.
        elements: Vec<Element<N, D>>,
    },
    /// A split of space along one axis.
    ///
    /// Every element below `left` has `point[axis] <= value` and every element below `right` has
    /// `point[axis] >= value`.
    Internal {
        /// The axis space is split on.
        axis: usize,
        /// The split value on `axis`.
        value: N,
        /// The lower half.
        left: Box<Node<N, D>>,
        /// The upper half.
        right: Box<Node<N, D>>,
    },
}

impl<N: IndexableNum, D> Node<N, D> {
    /// Returns `true` if this node holds a bucket rather than children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// The split axis and value of an internal node.
    #[inline]
    pub fn split(&self) -> Option<(usize, N)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { axis, value, .. } => Some((*axis, *value)),
        }
    }

    /// The children of an internal node.
    #[inline]
    pub fn children(&self) -> Option<(&Node<N, D>, &Node<N, D>)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some((&**left, &**right)),
        }
    }

    /// The bucket of a leaf. Internal nodes hold no elements of their own.
    #[inline]
    pub fn bucket(&self) -> &[Element<N, D>] {
        match self {
            Node::Leaf { elements } => elements,
            Node::Internal { .. } => &[],
        }
    }

    /// The number of elements in this subtree.
    pub fn len(&self) -> usize {
        match self {
            Node::Leaf { elements } => elements.len(),
            Node::Internal { left, right, .. } => left.len() + right.len(),
        }
    }

    /// Returns `true` if no element is stored in this subtree.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of leaves in this subtree.
    pub fn num_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.num_leaves() + right.num_leaves(),
        }
    }

    /// The depth of this subtree. A single leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Iterate over all elements of this subtree, left to right.
    pub fn elements(&self) -> Elements<'_, N, D> {
        Elements {
            stack: vec![self],
            bucket: [].iter(),
        }
    }

    /// Move all elements of this subtree into `out`, consuming the subtree.
    pub(crate) fn drain_into(self, out: &mut Vec<Element<N, D>>) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { elements } => out.extend(elements),
                Node::Internal { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
    }
}

/// Iterator over the elements of a subtree, created by [`Node::elements`].
#[derive(Debug, Clone)]
pub struct Elements<'a, N: IndexableNum, D> {
    stack: Vec<&'a Node<N, D>>,
    bucket: std::slice::Iter<'a, Element<N, D>>,
}

impl<'a, N: IndexableNum, D> Iterator for Elements<'a, N, D> {
    type Item = &'a Element<N, D>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.bucket.next() {
                return Some(element);
            }
            match self.stack.pop()? {
                Node::Leaf { elements } => self.bucket = elements.iter(),
                Node::Internal { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn leaf(values: &[i32]) -> Box<Node<i32, usize>> {
        Box::new(Node::Leaf {
            elements: values
                .iter()
                .map(|&v| Element::new(vec![v], v as usize))
                .collect(),
        })
    }

    fn sample() -> Node<i32, usize> {
        Node::Internal {
            axis: 0,
            value: 2,
            left: leaf(&[0, 1]),
            right: Box::new(Node::Internal {
                axis: 0,
                value: 4,
                left: leaf(&[2, 3]),
                right: leaf(&[4]),
            }),
        }
    }

    #[test]
    fn counts() {
        let node = sample();
        assert!(!node.is_leaf());
        assert_eq!(node.split(), Some((0, 2)));
        assert_eq!(node.len(), 5);
        assert_eq!(node.num_leaves(), 3);
        assert_eq!(node.depth(), 3);
        assert!(node.bucket().is_empty());
    }

    #[test]
    fn elements_in_order() {
        let node = sample();
        let data: Vec<usize> = node.elements().map(|e| e.data).collect();
        assert_eq!(data, vec![0, 1, 2, 3, 4]);

        let mut drained = vec![];
        node.drain_into(&mut drained);
        let data: Vec<usize> = drained.iter().map(|e| e.data).collect();
        assert_eq!(data, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn clone_is_deep() {
        let node = sample();
        let mut copy = node.clone();
        if let Node::Internal { left, .. } = &mut copy {
            *left = leaf(&[9]);
        }
        assert_eq!(node.len(), 5);
        assert_eq!(copy.len(), 4);
        assert_ne!(node, copy);
    }
}

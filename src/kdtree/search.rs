use geo_traits::{CoordTrait, RectTrait};

use crate::error::Result;
use crate::kdtree::bounds::within_box;
use crate::kdtree::distance::DistanceMetric;
use crate::kdtree::element::Element;
use crate::kdtree::node::Node;
use crate::kdtree::KdTree;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, D, M: DistanceMetric<N>> KdTree<N, D, M> {
    /// Find an element whose point equals `key` exactly.
    pub fn search_exactly(&self, key: &[N]) -> Result<Option<&Element<N, D>>> {
        self.check_key(key)?;
        let mut found = None;
        if let Some(root) = &self.root {
            exact_matches(root, key, &mut |element| {
                found = Some(element);
                false
            });
        }
        Ok(found)
    }

    /// Find all elements whose point equals `key` exactly.
    pub fn search_exactly_all(&self, key: &[N]) -> Result<Vec<&Element<N, D>>> {
        self.check_key(key)?;
        let mut found = vec![];
        if let Some(root) = &self.root {
            exact_matches(root, key, &mut |element| {
                found.push(element);
                true
            });
        }
        Ok(found)
    }

    /// Find all elements inside the box spanned by `min` and `max`, borders included.
    pub fn search_range(&self, min: &[N], max: &[N]) -> Result<Vec<&Element<N, D>>> {
        self.check_key(min)?;
        self.check_key(max)?;

        let mut result = vec![];
        let Some(root) = &self.root else {
            return Ok(result);
        };

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { elements } => {
                    result.extend(
                        elements
                            .iter()
                            .filter(|e| within_box(min, max, &e.point)),
                    );
                }
                Node::Internal {
                    axis,
                    value,
                    left,
                    right,
                } => {
                    // pushed in reverse so that the left half is searched first
                    if max[*axis] >= *value {
                        stack.push(&**right);
                    }
                    if min[*axis] <= *value {
                        stack.push(&**left);
                    }
                }
            }
        }

        Ok(result)
    }

    /// Find all elements inside a two-dimensional rectangle, borders included.
    pub fn search_range_rect(&self, rect: &impl RectTrait<T = N>) -> Result<Vec<&Element<N, D>>> {
        self.search_range(
            &[rect.min().x(), rect.min().y()],
            &[rect.max().x(), rect.max().y()],
        )
    }
}

/// Call `visit` with every element below `node` whose point equals `key`, until it returns `false`.
///
/// Points equal to a split value may sit on either side of it, so both halves are searched then.
/// Returns `false` if the search was stopped.
fn exact_matches<'a, N: IndexableNum, D>(
    node: &'a Node<N, D>,
    key: &[N],
    visit: &mut impl FnMut(&'a Element<N, D>) -> bool,
) -> bool {
    match node {
        Node::Leaf { elements } => {
            for element in elements {
                if element.point.as_slice() == key && !visit(element) {
                    return false;
                }
            }
            true
        }
        Node::Internal {
            axis,
            value,
            left,
            right,
        } => {
            let k = key[*axis];
            if k < *value {
                exact_matches(left, key, visit)
            } else if k > *value {
                exact_matches(right, key, visit)
            } else {
                exact_matches(left, key, visit) && exact_matches(right, key, visit)
            }
        }
    }
}

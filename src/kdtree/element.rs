use serde::{Deserialize, Serialize};

use crate::r#type::IndexableNum;

/// A point together with the payload it was added with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "D: Serialize", deserialize = "D: Deserialize<'de>"))]
pub struct Element<N: IndexableNum, D> {
    /// The coordinates of this element.
    pub point: Vec<N>,
    /// The caller's payload.
    pub data: D,
}

impl<N: IndexableNum, D> Element<N, D> {
    /// Create a new element.
    pub fn new(point: Vec<N>, data: D) -> Self {
        Self { point, data }
    }

    /// The dimension of this element's point.
    #[inline]
    pub fn dim(&self) -> usize {
        self.point.len()
    }
}

/// An element found by a nearest-neighbor query, and its distance to the query key.
#[derive(Debug)]
pub struct Neighbor<'a, N: IndexableNum, D, T> {
    /// The element found.
    pub element: &'a Element<N, D>,
    /// Distance between the element and the query key.
    pub distance: T,
}

impl<N: IndexableNum, D, T: Copy> Clone for Neighbor<'_, N, D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: IndexableNum, D, T: Copy> Copy for Neighbor<'_, N, D, T> {}

impl<'a, N: IndexableNum, D, T> Neighbor<'a, N, D, T> {
    /// The payload of the element found.
    #[inline]
    pub fn data(&self) -> &'a D {
        &self.element.data
    }

    /// The point of the element found.
    #[inline]
    pub fn point(&self) -> &'a [N] {
        &self.element.point
    }
}

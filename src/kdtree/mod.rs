//! A bucketed k-d tree over points of any fixed dimension.
//!
//! Points and their payloads are buffered with [`KdTree::add`] and partitioned by
//! [`KdTree::build`]: every internal node splits its points at the median of the axis with the
//! largest spread, and leaves hold buckets of at most `bucket_size` points. The built tree answers
//! exact-match, nearest-neighbor, k-nearest-neighbor, radius, approximate (best-bin-first) and
//! range queries, and can be written to and read from JSON.

#![warn(missing_docs)]

mod best_bin_first;
mod bounds;
mod builder;
mod codec;
pub(crate) mod constants;
mod distance;
mod element;
mod index;
mod nearest;
mod node;
#[cfg(feature = "rayon")]
mod parallel;
mod search;
mod select;
mod traversal;

pub use bounds::Bounds;
pub use constants::DEFAULT_BUCKET_SIZE;
pub use distance::{DistanceMetric, Euclidean, Manhattan, SquaredEuclidean};
pub use element::{Element, Neighbor};
pub use index::KdTree;
pub use node::{Elements, Node};
pub use traversal::Cell;

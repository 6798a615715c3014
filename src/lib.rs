#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod r#type;

pub use error::{KdTreeError, Result};
pub use kdtree::KdTree;
pub use r#type::{Accumulator, IndexableNum};

#[cfg(test)]
pub(crate) mod test;

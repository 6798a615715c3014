//! Reading and writing trees as JSON.
//!
//! ```json
//! { "format": "kd-index", "version": 1, "coordType": "f64",
//!   "numElements": 3, "numLeaves": 2, "levels": 2, "pointDim": 2,
//!   "nodes": { "root": {
//!     "splitDim": 0, "partition": 1.0, "points": [],
//!     "left": { "points": [ { "point": [0.0, 0.0], "data": 0 } ], "left": null, "right": null },
//!     "right": { "points": [ ... ], "left": null, "right": null } } } }
//! ```
//!
//! Buffered points that have not been built yet are not written. The bounding box is not stored
//! either; it is recomputed from the points on read.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{KdTreeError, Result};
use crate::kdtree::bounds::Bounds;
use crate::kdtree::constants::{FORMAT_NAME, FORMAT_VERSION};
use crate::kdtree::distance::DistanceMetric;
use crate::kdtree::element::Element;
use crate::kdtree::node::Node;
use crate::kdtree::KdTree;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, D: Serialize, M: DistanceMetric<N>> KdTree<N, D, M> {
    /// Write the built tree as JSON.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.persisted()).map_err(encode_error)?;
        debug!(
            num_elements = self.num_elements,
            num_leaves = self.num_leaves,
            "wrote k-d tree"
        );
        Ok(())
    }

    /// The built tree as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.persisted()).map_err(encode_error)
    }

    fn persisted(&self) -> PersistedTreeRef<'_, N, D> {
        PersistedTreeRef {
            format: FORMAT_NAME,
            version: FORMAT_VERSION,
            coord_type: N::TYPE_NAME,
            num_elements: self.num_elements,
            num_leaves: self.num_leaves,
            levels: self.levels,
            point_dim: self.dimension.unwrap_or(0),
            nodes: NodesRef {
                root: self.root.as_ref().map(NodeRef),
            },
        }
    }
}

impl<N: IndexableNum, D: DeserializeOwned, M: DistanceMetric<N>> KdTree<N, D, M> {
    /// Replace this index with a tree read from JSON.
    ///
    /// Buffered points are dropped. The dimension recorded in the data replaces the dimension of
    /// this index, unless the data was written by an index that never saw a point. On failure the
    /// index is left as it was.
    pub fn read<R: Read>(&mut self, reader: R) -> Result<()> {
        let decoded = decode(reader)?;
        self.pending.clear();
        self.install_decoded(decoded);
        Ok(())
    }

    /// Read a tree from JSON, searched with the given distance policy.
    pub fn from_reader<R: Read>(reader: R, metric: M) -> Result<Self> {
        let mut tree = Self::with_metric(metric);
        tree.install_decoded(decode(reader)?);
        Ok(tree)
    }

    /// Read a tree from a JSON string.
    pub fn from_json(json: &str) -> Result<Self>
    where
        M: Default,
    {
        Self::from_reader(json.as_bytes(), M::default())
    }

    fn install_decoded(&mut self, decoded: DecodedTree<N, D>) {
        if decoded.point_dim > 0 {
            self.dimension = Some(decoded.point_dim);
        }
        let dim = self.dimension.unwrap_or(0);
        self.bounds = match &decoded.root {
            Some(root) => Bounds::enclosing(dim, root.elements().map(|e| e.point.as_slice())),
            None => Bounds::empty(dim),
        };
        self.num_elements = decoded.num_elements;
        self.num_added_elements = decoded.num_elements;
        self.num_leaves = decoded.num_leaves;
        self.levels = decoded.levels;
        self.root = decoded.root;
        debug!(
            num_elements = self.num_elements,
            num_leaves = self.num_leaves,
            levels = self.levels,
            "read k-d tree"
        );
    }
}

fn encode_error(err: serde_json::Error) -> KdTreeError {
    if err.is_io() {
        KdTreeError::Io(err.into())
    } else {
        KdTreeError::Encode(err.to_string())
    }
}

fn malformed(msg: impl Into<String>) -> KdTreeError {
    KdTreeError::MalformedPersistedData(msg.into())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedTreeRef<'a, N: IndexableNum, D> {
    format: &'static str,
    version: u32,
    coord_type: &'static str,
    num_elements: usize,
    num_leaves: usize,
    levels: usize,
    point_dim: usize,
    nodes: NodesRef<'a, N, D>,
}

#[derive(Serialize)]
struct NodesRef<'a, N: IndexableNum, D> {
    root: Option<NodeRef<'a, N, D>>,
}

struct NodeRef<'a, N: IndexableNum, D>(&'a Node<N, D>);

impl<N: IndexableNum, D: Serialize> Serialize for NodeRef<'_, N, D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Node::Leaf { elements } => {
                let mut state = serializer.serialize_struct("Node", 3)?;
                state.serialize_field("points", elements)?;
                state.serialize_field("left", &None::<NodeRef<N, D>>)?;
                state.serialize_field("right", &None::<NodeRef<N, D>>)?;
                state.end()
            }
            Node::Internal {
                axis,
                value,
                left,
                right,
            } => {
                let no_points: &[Element<N, D>] = &[];
                let mut state = serializer.serialize_struct("Node", 5)?;
                state.serialize_field("splitDim", axis)?;
                state.serialize_field("partition", value)?;
                state.serialize_field("points", no_points)?;
                state.serialize_field("left", &Some(NodeRef(&**left)))?;
                state.serialize_field("right", &Some(NodeRef(&**right)))?;
                state.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "D: Deserialize<'de>"))]
struct PersistedTree<N: IndexableNum, D> {
    format: String,
    version: u32,
    coord_type: String,
    num_elements: usize,
    num_leaves: usize,
    levels: usize,
    point_dim: usize,
    nodes: PersistedNodes<N, D>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "D: Deserialize<'de>"))]
struct PersistedNodes<N: IndexableNum, D> {
    root: Option<PersistedNode<N, D>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "D: Deserialize<'de>"))]
struct PersistedNode<N: IndexableNum, D> {
    split_dim: Option<usize>,
    partition: Option<N>,
    #[serde(default)]
    points: Vec<Element<N, D>>,
    left: Option<Box<PersistedNode<N, D>>>,
    right: Option<Box<PersistedNode<N, D>>>,
}

/// A validated tree, ready to be installed into an index.
struct DecodedTree<N: IndexableNum, D> {
    root: Option<Node<N, D>>,
    num_elements: usize,
    num_leaves: usize,
    levels: usize,
    point_dim: usize,
}

fn decode<N: IndexableNum, D: DeserializeOwned, R: Read>(reader: R) -> Result<DecodedTree<N, D>> {
    let persisted: PersistedTree<N, D> = serde_json::from_reader(reader).map_err(|err| {
        if err.is_io() {
            KdTreeError::Io(err.into())
        } else {
            malformed(err.to_string())
        }
    })?;

    if persisted.format != FORMAT_NAME {
        return Err(malformed(format!(
            "unknown format {:?}",
            persisted.format
        )));
    }
    if persisted.version != FORMAT_VERSION {
        return Err(malformed(format!(
            "got v{} data when expected v{}",
            persisted.version, FORMAT_VERSION
        )));
    }
    if persisted.coord_type != N::TYPE_NAME {
        return Err(malformed(format!(
            "got {} coordinates when expected {}",
            persisted.coord_type,
            N::TYPE_NAME
        )));
    }

    let point_dim = persisted.point_dim;
    let mut decoder = NodeDecoder {
        point_dim,
        num_elements: 0,
        num_leaves: 0,
    };
    let (root, levels) = match persisted.nodes.root {
        Some(node) => {
            if point_dim == 0 {
                return Err(malformed("a non-empty tree needs a point dimension"));
            }
            let (root, levels) = decoder.node(node)?;
            (Some(root), levels)
        }
        None => (None, 0),
    };

    if decoder.num_elements != persisted.num_elements
        || decoder.num_leaves != persisted.num_leaves
        || levels != persisted.levels
    {
        return Err(malformed(format!(
            "header records {} elements, {} leaves and {} levels, found {}, {} and {}",
            persisted.num_elements,
            persisted.num_leaves,
            persisted.levels,
            decoder.num_elements,
            decoder.num_leaves,
            levels
        )));
    }

    Ok(DecodedTree {
        root,
        num_elements: decoder.num_elements,
        num_leaves: decoder.num_leaves,
        levels,
        point_dim,
    })
}

struct NodeDecoder {
    point_dim: usize,
    num_elements: usize,
    num_leaves: usize,
}

impl NodeDecoder {
    /// Validate a persisted subtree and return it with its depth.
    fn node<N: IndexableNum, D>(&mut self, node: PersistedNode<N, D>) -> Result<(Node<N, D>, usize)> {
        match node {
            PersistedNode {
                split_dim: None,
                partition: None,
                points,
                left: None,
                right: None,
            } => {
                if points.is_empty() {
                    return Err(malformed("leaf without points"));
                }
                if let Some(element) = points.iter().find(|e| e.dim() != self.point_dim) {
                    return Err(malformed(format!(
                        "point of dimension {} in a tree of dimension {}",
                        element.dim(),
                        self.point_dim
                    )));
                }
                self.num_elements += points.len();
                self.num_leaves += 1;
                Ok((Node::Leaf { elements: points }, 1))
            }
            PersistedNode {
                split_dim: Some(axis),
                partition: Some(value),
                points,
                left: Some(left),
                right: Some(right),
            } => {
                if !points.is_empty() {
                    return Err(malformed("internal node with points"));
                }
                if axis >= self.point_dim {
                    return Err(malformed(format!(
                        "split on axis {axis} in a tree of dimension {}",
                        self.point_dim
                    )));
                }

                let (left, left_depth) = self.node(*left)?;
                let (right, right_depth) = self.node(*right)?;
                if left.elements().any(|e| e.point[axis] > value)
                    || right.elements().any(|e| e.point[axis] < value)
                {
                    return Err(malformed(format!(
                        "points on the wrong side of the split at {value:?} on axis {axis}"
                    )));
                }

                let node = Node::Internal {
                    axis,
                    value,
                    left: Box::new(left),
                    right: Box::new(right),
                };
                Ok((node, 1 + left_depth.max(right_depth)))
            }
            _ => Err(malformed(
                "a node must either hold points or a split with two children",
            )),
        }
    }
}

use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
pub enum KdTreeError {
    /// A build parameter or query parameter is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `build` was called without any buffered points.
    #[error("No points were added before building the tree")]
    EmptyInput,

    /// The query needs at least one element but the tree holds none.
    #[error("The tree holds no elements")]
    EmptyTree,

    /// More neighbors were requested than the tree holds.
    #[error("Requested {requested} neighbors but the tree holds only {available}")]
    InsufficientElements { requested: usize, available: usize },

    /// A point or query key does not match the dimensionality of the tree.
    #[error("Expected a point of dimension {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persisted data is truncated or structurally inconsistent.
    #[error("Malformed persisted data: {0}")]
    MalformedPersistedData(String),

    /// The tree could not be encoded, typically because a payload cannot be serialized.
    #[error("Failed to encode tree: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KdTreeError {
    /// Returns `true` for the outcomes that mean "nothing to return" rather than a caller error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            KdTreeError::EmptyTree | KdTreeError::InsufficientElements { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, KdTreeError>;

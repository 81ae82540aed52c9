//! Error types for topology derivation.

use thiserror::Error;

/// Errors raised while validating input or deriving a topology.
///
/// All of them abort the build; no partial graph is ever returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Malformed or missing required input.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The zone provider listed fewer zones than the subnet lists need.
    #[error("insufficient availability zones in {region}: required {required}, available {available}")]
    InsufficientZones {
        region: String,
        required: usize,
        available: usize,
    },

    /// A private subnet has no private route table at its index.
    #[error("private subnet index {index} out of range: only {tables} private route tables")]
    IndexOutOfRange { index: usize, tables: usize },

    /// The zone provider itself failed.
    #[error("availability zone lookup failed: {0}")]
    ZoneLookup(String),

    /// A derived graph broke a structural invariant.
    #[error("inconsistent resource graph: {0}")]
    InconsistentGraph(String),

    /// Rendering the graph failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        TopologyError::Serialization(err.to_string())
    }
}

use thiserror::Error;

/// Errors produced while building or parsing document trees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("node is missing its `type` field")]
    MissingType,

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("unknown mark type: {0}")]
    UnknownMarkType(String),

    #[error("invalid {node_type} node: {reason}")]
    InvalidShape { node_type: String, reason: String },

    #[error("invalid document JSON: {0}")]
    InvalidJson(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

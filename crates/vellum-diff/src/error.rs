//! Error types for the diff crate.

use vellum_model::ModelError;

use crate::annotate::DiffType;

/// Errors that abort a diff.
///
/// Every variant is a contract violation or malformed input: a diff either
/// returns a complete merged tree or one of these, never a partial tree.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The patcher was handed two nodes of different types.
    #[error("node type mismatch: old node is `{old}`, new node is `{new}`")]
    NodeTypeMismatch { old: String, new: String },

    /// A diff mark was requested for an annotation that has no mark.
    #[error("invalid diff annotation: {0} (expected Inserted or Deleted)")]
    InvalidDiffAnnotation(DiffType),

    /// The schema does not declare the diff mark type.
    #[error("diff mark `{0}` is not registered in the schema")]
    DiffMarkNotRegistered(String),

    /// More distinct sentences than synthetic symbols are available.
    #[error("sentence symbol space exhausted: more than {limit} distinct sentences")]
    SentenceSymbolsExhausted { limit: usize },

    /// The diff configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// A document failed to parse or a node could not be built.
    #[error("document model error: {0}")]
    Model(#[from] ModelError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;

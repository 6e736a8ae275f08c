//! Structural diff engine for rich-text documents.
//!
//! Merges two versions of a document tree into one tree in which content
//! that only exists in the old version is marked deleted and content that
//! only exists in the new version is marked inserted, so both can be shown
//! inline.
//!
//! # Key Types
//!
//! - [`Differ`] / [`diff`] -- Entry points over interchange JSON or parsed nodes
//! - [`patch_document_node`] -- Recursive tree patcher
//! - [`patch_text_nodes`] -- Sentence-level diff of adjacent text leaves
//! - [`ChildUnit`] / [`MatchResult`] -- Child normalization and best-run matching
//! - [`DiffType`] / [`create_diff_node`] -- Diff annotations
//! - [`DiffConfig`] -- Algorithm, deadline and mark handling

pub mod annotate;
pub mod config;
pub mod engine;
pub mod error;
pub mod matching;
pub mod patch;
pub mod text;

pub use annotate::{create_diff_mark, create_diff_node, diff_type_of, DiffType};
pub use config::{DiffAlgorithm, DiffConfig, TextMarkPolicy};
pub use engine::{diff, DiffContext, Differ};
pub use error::{DiffError, DiffResult};
pub use matching::{
    best_match, compute_child_equality_factor, find_match_node, is_mark_equal, is_node_equal,
    match_node_type, match_nodes, normalize_children, ChildUnit, MatchResult,
};
pub use patch::{assert_node_type_equal, patch_document_node, patch_remaining};
pub use text::{patch_text_nodes, tokenize_sentences, SentenceTable, MAX_SENTENCE_SYMBOLS};

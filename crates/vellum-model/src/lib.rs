//! Document model for Vellum.
//!
//! Provides the tree representation the diff engine works on: typed nodes
//! with attributes, marks and either children or text, a [`Schema`] that
//! defines the allowed vocabulary, and conversion to and from the
//! interchange JSON form `{type, attrs?, content?, marks?, text?}`.
//!
//! # Key Types
//!
//! - [`Node`] / [`NodeBody`]: Immutable document tree node
//! - [`Mark`]: Inline annotation (`{type, attrs}`)
//! - [`Schema`]: Node and mark vocabulary, node construction and parsing
//! - [`RawNode`]: Unvalidated interchange form

pub mod error;
pub mod mark;
pub mod node;
pub mod schema;

pub use error::{ModelError, ModelResult};
pub use mark::{Attrs, Mark};
pub use node::{Node, NodeBody, RawNode};
pub use schema::{MarkSpec, NodeSpec, Schema, DEFAULT_DIFF_MARK, DEFAULT_TEXT_TYPE};

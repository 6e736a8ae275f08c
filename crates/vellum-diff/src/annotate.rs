//! Diff annotations and the annotator that stamps them onto whole subtrees.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use vellum_model::{Attrs, Mark, Node, Schema};

use crate::error::{DiffError, DiffResult};

/// How a piece of content relates to the old and new documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffType {
    /// Present in both documents.
    Unchanged,
    /// Present only in the old document.
    Deleted,
    /// Present only in the new document.
    Inserted,
}

impl DiffType {
    /// The value stored in a diff mark's `type` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "Unchanged",
            Self::Deleted => "Deleted",
            Self::Inserted => "Inserted",
        }
    }

    /// Parse a diff mark's `type` attribute.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Unchanged" => Some(Self::Unchanged),
            "Deleted" => Some(Self::Deleted),
            "Inserted" => Some(Self::Inserted),
            _ => None,
        }
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the diff mark for `diff_type`.
///
/// Only `Inserted` and `Deleted` have a mark; asking for `Unchanged` is a
/// caller bug. The schema must declare its diff mark type.
pub fn create_diff_mark(schema: &Schema, diff_type: DiffType) -> DiffResult<Mark> {
    if diff_type == DiffType::Unchanged {
        return Err(DiffError::InvalidDiffAnnotation(diff_type));
    }
    if !schema.has_mark(&schema.diff_mark) {
        return Err(DiffError::DiffMarkNotRegistered(schema.diff_mark.clone()));
    }
    let attrs = Attrs::from([("type".to_string(), json!(diff_type.as_str()))]);
    Ok(schema.mark(&schema.diff_mark, attrs)?)
}

/// Read the annotation carried by a node's own marks. Nodes without a diff
/// mark are `Unchanged`.
pub fn diff_type_of(schema: &Schema, node: &Node) -> DiffType {
    node.marks()
        .iter()
        .find(|m| m.is(&schema.diff_mark))
        .and_then(|m| m.attr("type"))
        .and_then(|v| v.as_str())
        .and_then(DiffType::from_name)
        .unwrap_or(DiffType::Unchanged)
}

/// Deep-copy `node`, adding a diff mark for `diff_type` to every text leaf
/// in the subtree.
///
/// The mark is appended after the leaf's existing marks. A leaf that already
/// carries a diff mark has it replaced in place.
pub fn create_diff_node(schema: &Schema, node: &Node, diff_type: DiffType) -> DiffResult<Node> {
    let mark = create_diff_mark(schema, diff_type)?;
    annotate(schema, node, &mark)
}

fn annotate(schema: &Schema, node: &Node, mark: &Mark) -> DiffResult<Node> {
    if node.is_text() {
        return Ok(node.with_marks(add_diff_mark(schema, node.marks(), mark)));
    }
    let children = node
        .children()
        .iter()
        .map(|child| annotate(schema, child, mark))
        .collect::<DiffResult<Vec<_>>>()?;
    Ok(node.with_children(children)?)
}

pub(crate) fn add_diff_mark(schema: &Schema, marks: &[Mark], mark: &Mark) -> Vec<Mark> {
    let mut out = marks.to_vec();
    match out.iter().position(|m| m.is(&schema.diff_mark)) {
        Some(i) => out[i] = mark.clone(),
        None => out.push(mark.clone()),
    }
    out
}

//! Document tree nodes.
//!
//! A [`Node`] is an immutable value: a type name, attributes, marks, and a
//! [`NodeBody`] that is either text (for leaf text nodes) or an ordered list
//! of children. The body variant is fixed by the node type, so a node never
//! carries both.
//!
//! Nodes are built through a [`Schema`](crate::Schema), which validates type
//! names and fills default attributes. Once built, a node is only ever copied
//! into new values with [`Node::with_children`] or [`Node::with_marks`].

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::mark::{Attrs, Mark};

/// The payload of a node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeBody {
    /// Text content of a leaf text node.
    Text(String),
    /// Ordered children of a container or atom node.
    Children(Vec<Node>),
}

/// One element of a document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    node_type: String,
    attrs: Attrs,
    marks: Vec<Mark>,
    body: NodeBody,
}

impl Node {
    pub(crate) fn from_parts(
        node_type: String,
        attrs: Attrs,
        marks: Vec<Mark>,
        body: NodeBody,
    ) -> Self {
        Self {
            node_type,
            attrs,
            marks,
            body,
        }
    }

    /// The node's type name.
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// The node's attributes.
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Look up a single attribute.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// The node's marks, in order.
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// The node's body.
    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    /// Returns `true` for leaf text nodes.
    pub fn is_text(&self) -> bool {
        matches!(self.body, NodeBody::Text(_))
    }

    /// The text of a text node, or `None` for other nodes.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            NodeBody::Text(text) => Some(text),
            NodeBody::Children(_) => None,
        }
    }

    /// The children of a non-text node. Text nodes have none.
    pub fn children(&self) -> &[Node] {
        match &self.body {
            NodeBody::Text(_) => &[],
            NodeBody::Children(children) => children,
        }
    }

    /// All text in this subtree, concatenated in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.body {
            NodeBody::Text(text) => out.push_str(text),
            NodeBody::Children(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }

    /// All text leaves in this subtree, in document order.
    pub fn text_leaves(&self) -> Vec<&Node> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Node>) {
        if self.is_text() {
            out.push(self);
        }
        for child in self.children() {
            child.collect_leaves(out);
        }
    }

    /// A copy of this node with its marks replaced.
    pub fn with_marks(&self, marks: Vec<Mark>) -> Node {
        Node {
            node_type: self.node_type.clone(),
            attrs: self.attrs.clone(),
            marks,
            body: self.body.clone(),
        }
    }

    /// A copy of this node with its children replaced. Type, attributes and
    /// marks are kept.
    ///
    /// Fails for text nodes, which cannot hold children.
    pub fn with_children(&self, children: Vec<Node>) -> ModelResult<Node> {
        if self.is_text() {
            return Err(ModelError::InvalidShape {
                node_type: self.node_type.clone(),
                reason: "text nodes cannot hold children".into(),
            });
        }
        Ok(Node {
            node_type: self.node_type.clone(),
            attrs: self.attrs.clone(),
            marks: self.marks.clone(),
            body: NodeBody::Children(children),
        })
    }

    /// Serialize into the interchange JSON form.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(RawNode::from(self)).unwrap_or(Value::Null)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawNode::from(self).serialize(serializer)
    }
}

/// The interchange form: `{type, attrs?, content?, marks?, text?}`.
///
/// Parsing into a [`Node`] goes through
/// [`Schema::node_from_raw`](crate::Schema::node_from_raw), which checks the
/// vocabulary and shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<&Node> for RawNode {
    fn from(node: &Node) -> Self {
        let (content, text) = match &node.body {
            NodeBody::Text(text) => (None, Some(text.clone())),
            NodeBody::Children(children) if children.is_empty() => (None, None),
            NodeBody::Children(children) => {
                (Some(children.iter().map(RawNode::from).collect()), None)
            }
        };
        RawNode {
            node_type: Some(node.node_type.clone()),
            attrs: node.attrs.clone(),
            content,
            marks: node.marks.clone(),
            text,
        }
    }
}

//! The closed vocabulary of node and mark types a document may use.
//!
//! A [`Schema`] is plain data: it can be built in code, taken from
//! [`Schema::basic`], or loaded from JSON or TOML. All node and mark
//! construction goes through it so that every tree handed to the diff engine
//! uses known type names and carries default attributes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ModelError, ModelResult};
use crate::mark::{Attrs, Mark};
use crate::node::{Node, NodeBody, RawNode};

/// Name of the text node type in [`Schema::basic`].
pub const DEFAULT_TEXT_TYPE: &str = "text";

/// Name of the diff annotation mark in [`Schema::basic`].
pub const DEFAULT_DIFF_MARK: &str = "diffMark";

/// Declaration of one node type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Attribute defaults. Missing attributes are filled from here on parse.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
}

/// Declaration of one mark type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkSpec {
    /// Attribute defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
}

/// Node and mark vocabulary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The node type whose instances carry text instead of children.
    #[serde(default = "default_text_type")]
    pub text_type: String,
    /// The mark type used to annotate inserted and deleted content.
    #[serde(default = "default_diff_mark")]
    pub diff_mark: String,
    pub nodes: BTreeMap<String, NodeSpec>,
    #[serde(default)]
    pub marks: BTreeMap<String, MarkSpec>,
}

fn default_text_type() -> String {
    DEFAULT_TEXT_TYPE.to_string()
}

fn default_diff_mark() -> String {
    DEFAULT_DIFF_MARK.to_string()
}

impl Default for Schema {
    fn default() -> Self {
        Self::basic()
    }
}

impl Schema {
    /// An empty schema that only knows its text node type.
    pub fn new(text_type: impl Into<String>, diff_mark: impl Into<String>) -> Self {
        let text_type = text_type.into();
        let mut nodes = BTreeMap::new();
        nodes.insert(text_type.clone(), NodeSpec::default());
        Self {
            text_type,
            diff_mark: diff_mark.into(),
            nodes,
            marks: BTreeMap::new(),
        }
    }

    /// A rich-text vocabulary: paragraphs, headings, lists, quotes, code
    /// blocks, images and the usual inline marks, plus `diffMark`.
    pub fn basic() -> Self {
        Self::new(DEFAULT_TEXT_TYPE, DEFAULT_DIFF_MARK)
            .with_node("doc", NodeSpec::default())
            .with_node("paragraph", NodeSpec::default())
            .with_node("blockquote", NodeSpec::default())
            .with_node("horizontal_rule", NodeSpec::default())
            .with_node("heading", NodeSpec::with_attrs([("level", json!(1))]))
            .with_node(
                "code_block",
                NodeSpec::with_attrs([("language", Value::Null)]),
            )
            .with_node("hard_break", NodeSpec::default())
            .with_node(
                "image",
                NodeSpec::with_attrs([
                    ("src", json!("")),
                    ("alt", Value::Null),
                    ("title", Value::Null),
                ]),
            )
            .with_node("bullet_list", NodeSpec::default())
            .with_node("ordered_list", NodeSpec::with_attrs([("order", json!(1))]))
            .with_node("list_item", NodeSpec::default())
            .with_mark("em", MarkSpec::default())
            .with_mark("strong", MarkSpec::default())
            .with_mark("code", MarkSpec::default())
            .with_mark(
                "link",
                MarkSpec::with_attrs([("href", json!("")), ("title", Value::Null)]),
            )
            .with_mark(DEFAULT_DIFF_MARK, MarkSpec::with_attrs([("type", Value::Null)]))
    }

    /// Register (or replace) a node type.
    pub fn with_node(mut self, name: impl Into<String>, spec: NodeSpec) -> Self {
        self.nodes.insert(name.into(), spec);
        self
    }

    /// Register (or replace) a mark type.
    pub fn with_mark(mut self, name: impl Into<String>, spec: MarkSpec) -> Self {
        self.marks.insert(name.into(), spec);
        self
    }

    /// Load a schema from JSON.
    pub fn from_json_str(s: &str) -> ModelResult<Self> {
        let schema: Schema =
            serde_json::from_str(s).map_err(|e| ModelError::Serialization(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load a schema from TOML.
    pub fn from_toml_str(s: &str) -> ModelResult<Self> {
        let schema: Schema =
            toml::from_str(s).map_err(|e| ModelError::Serialization(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check internal consistency: the text node type must be declared.
    pub fn validate(&self) -> ModelResult<()> {
        if !self.nodes.contains_key(&self.text_type) {
            return Err(ModelError::UnknownNodeType(self.text_type.clone()));
        }
        Ok(())
    }

    /// Returns `true` if `name` is a declared node type.
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Returns `true` if `name` is a declared mark type.
    pub fn has_mark(&self, name: &str) -> bool {
        self.marks.contains_key(name)
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Build a mark, filling default attributes.
    pub fn mark(&self, mark_type: &str, attrs: Attrs) -> ModelResult<Mark> {
        let spec = self
            .marks
            .get(mark_type)
            .ok_or_else(|| ModelError::UnknownMarkType(mark_type.to_string()))?;
        Ok(Mark::new(mark_type, with_defaults(&spec.attrs, attrs)))
    }

    /// Build a text leaf.
    pub fn text(&self, text: impl Into<String>, marks: Vec<Mark>) -> ModelResult<Node> {
        let text = text.into();
        if text.is_empty() {
            return Err(ModelError::InvalidShape {
                node_type: self.text_type.clone(),
                reason: "empty text nodes are not allowed".into(),
            });
        }
        let marks = self.check_marks(marks)?;
        Ok(Node::from_parts(
            self.text_type.clone(),
            Attrs::new(),
            marks,
            NodeBody::Text(text),
        ))
    }

    /// Build a non-text node.
    pub fn node(
        &self,
        node_type: &str,
        attrs: Attrs,
        children: Vec<Node>,
        marks: Vec<Mark>,
    ) -> ModelResult<Node> {
        if node_type == self.text_type {
            return Err(ModelError::InvalidShape {
                node_type: node_type.to_string(),
                reason: "use Schema::text to build text nodes".into(),
            });
        }
        let spec = self
            .nodes
            .get(node_type)
            .ok_or_else(|| ModelError::UnknownNodeType(node_type.to_string()))?;
        let marks = self.check_marks(marks)?;
        Ok(Node::from_parts(
            node_type.to_string(),
            with_defaults(&spec.attrs, attrs),
            marks,
            NodeBody::Children(children),
        ))
    }

    fn check_marks(&self, marks: Vec<Mark>) -> ModelResult<Vec<Mark>> {
        marks
            .into_iter()
            .map(|m| self.mark(&m.mark_type, m.attrs))
            .collect()
    }

    // ---------------------------------------------------------------
    // Parsing
    // ---------------------------------------------------------------

    /// Parse a document from its interchange JSON string.
    pub fn parse_str(&self, s: &str) -> ModelResult<Node> {
        let raw: RawNode =
            serde_json::from_str(s).map_err(|e| ModelError::InvalidJson(e.to_string()))?;
        self.node_from_raw(&raw)
    }

    /// Parse a document from an interchange JSON value.
    pub fn node_from_json(&self, value: &Value) -> ModelResult<Node> {
        let raw = RawNode::deserialize(value).map_err(|e| ModelError::InvalidJson(e.to_string()))?;
        self.node_from_raw(&raw)
    }

    /// Validate and convert one interchange node (recursively).
    pub fn node_from_raw(&self, raw: &RawNode) -> ModelResult<Node> {
        let node_type = raw.node_type.as_deref().ok_or(ModelError::MissingType)?;

        if node_type == self.text_type {
            if raw.content.as_ref().is_some_and(|c| !c.is_empty()) {
                return Err(ModelError::InvalidShape {
                    node_type: node_type.to_string(),
                    reason: "text nodes cannot have content".into(),
                });
            }
            if !raw.attrs.is_empty() {
                return Err(ModelError::InvalidShape {
                    node_type: node_type.to_string(),
                    reason: "text nodes cannot have attrs".into(),
                });
            }
            let text = raw.text.clone().ok_or_else(|| ModelError::InvalidShape {
                node_type: node_type.to_string(),
                reason: "missing text".into(),
            })?;
            return self.text(text, raw.marks.clone());
        }

        if raw.text.is_some() {
            return Err(ModelError::InvalidShape {
                node_type: node_type.to_string(),
                reason: "only text nodes may carry text".into(),
            });
        }
        let children = raw
            .content
            .iter()
            .flatten()
            .map(|child| self.node_from_raw(child))
            .collect::<ModelResult<Vec<_>>>()?;
        self.node(node_type, raw.attrs.clone(), children, raw.marks.clone())
    }
}

impl NodeSpec {
    /// A spec with the given attribute defaults.
    pub fn with_attrs<const N: usize>(attrs: [(&str, Value); N]) -> Self {
        Self {
            attrs: attrs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

impl MarkSpec {
    /// A spec with the given attribute defaults.
    pub fn with_attrs<const N: usize>(attrs: [(&str, Value); N]) -> Self {
        Self {
            attrs: attrs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// Attributes outside the declared set are kept as given.
fn with_defaults(defaults: &Attrs, mut attrs: Attrs) -> Attrs {
    for (name, value) in defaults {
        attrs.entry(name.clone()).or_insert_with(|| value.clone());
    }
    attrs
}

//! Entry points: load two document snapshots and merge them.

use serde_json::Value;
use tracing::debug;
use vellum_model::{Node, Schema};

use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult};
use crate::patch::patch_document_node;

/// Borrowed schema and configuration threaded through one diff.
#[derive(Clone, Copy, Debug)]
pub struct DiffContext<'a> {
    pub schema: &'a Schema,
    pub config: &'a DiffConfig,
}

impl<'a> DiffContext<'a> {
    pub fn new(schema: &'a Schema, config: &'a DiffConfig) -> Self {
        Self { schema, config }
    }
}

/// A reusable differ bound to one schema and configuration.
///
/// `Differ` holds no per-diff state, so a single instance can serve any
/// number of diffs, including from several threads at once.
#[derive(Clone, Debug, Default)]
pub struct Differ {
    schema: Schema,
    config: DiffConfig,
}

impl Differ {
    /// Create a differ. The schema must declare its diff mark type.
    pub fn new(schema: Schema, config: DiffConfig) -> DiffResult<Self> {
        schema.validate()?;
        if !schema.has_mark(&schema.diff_mark) {
            return Err(DiffError::DiffMarkNotRegistered(schema.diff_mark.clone()));
        }
        Ok(Self { schema, config })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn context(&self) -> DiffContext<'_> {
        DiffContext::new(&self.schema, &self.config)
    }

    /// Merge two parsed documents.
    pub fn diff_nodes(&self, old: &Node, new: &Node) -> DiffResult<Node> {
        debug!(
            old_nodes = old.node_count(),
            new_nodes = new.node_count(),
            "diffing documents"
        );
        patch_document_node(&self.context(), old, new)
    }

    /// Parse two interchange JSON documents and merge them.
    pub fn diff_json(&self, old: &Value, new: &Value) -> DiffResult<Node> {
        let old = self.schema.node_from_json(old)?;
        let new = self.schema.node_from_json(new)?;
        self.diff_nodes(&old, &new)
    }

    /// Parse two interchange JSON strings and merge them.
    pub fn diff_str(&self, old: &str, new: &str) -> DiffResult<Node> {
        let old = self.schema.parse_str(old)?;
        let new = self.schema.parse_str(new)?;
        self.diff_nodes(&old, &new)
    }
}

/// Merge two interchange JSON documents using [`Schema::basic`] and the
/// default configuration.
pub fn diff(old: &Value, new: &Value) -> DiffResult<Node> {
    Differ::default().diff_json(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{diff_type_of, DiffType};
    use proptest::prelude::*;
    use serde_json::json;
    use vellum_model::ModelError;

    fn para(text: &str) -> Value {
        json!({"type": "paragraph", "content": [{"type": "text", "text": text}]})
    }

    fn doc(children: Vec<Value>) -> Value {
        json!({"type": "doc", "content": children})
    }

    fn annotations(node: &Node) -> Vec<DiffType> {
        let schema = Schema::basic();
        node.text_leaves()
            .into_iter()
            .map(|n| diff_type_of(&schema, n))
            .collect()
    }

    #[test]
    fn identity_has_no_diff_marks() {
        let d = doc(vec![
            json!({"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Title"}]}),
            para("First. Second."),
            json!({"type": "bullet_list", "content": [
                {"type": "list_item", "content": [para("Item.")]}
            ]}),
        ]);
        let out = diff(&d, &d).unwrap();
        assert_eq!(out, Schema::basic().node_from_json(&d).unwrap());
        assert!(annotations(&out).iter().all(|t| *t == DiffType::Unchanged));
    }

    #[test]
    fn coverage_of_old_and_new_leaves() {
        let out = diff(
            &doc(vec![para("Kept."), para("Gone.")]),
            &doc(vec![para("Kept."), json!({"type": "code_block", "content": [{"type": "text", "text": "fn main() {}"}]})]),
        )
        .unwrap();

        let schema = Schema::basic();
        let leaves: Vec<_> = out
            .text_leaves()
            .into_iter()
            .map(|n| (n.text().unwrap_or_default(), diff_type_of(&schema, n)))
            .collect();
        assert_eq!(
            leaves,
            vec![
                ("Kept.", DiffType::Unchanged),
                ("Gone.", DiffType::Deleted),
                ("fn main() {}", DiffType::Inserted),
            ]
        );
    }

    #[test]
    fn top_level_type_mismatch_is_fatal() {
        let err = diff(&doc(vec![]), &para("x")).unwrap_err();
        assert!(matches!(err, DiffError::NodeTypeMismatch { .. }));
        assert!(err.to_string().contains("doc"));
        assert!(err.to_string().contains("paragraph"));
    }

    #[test]
    fn malformed_input_is_reported() {
        let err = diff(&json!({"content": []}), &doc(vec![])).unwrap_err();
        assert!(matches!(err, DiffError::Model(ModelError::MissingType)));
    }

    #[test]
    fn diff_str_parses_json() {
        let differ = Differ::default();
        let out = differ
            .diff_str(
                r#"{"type": "paragraph", "content": [{"type": "text", "text": "A."}]}"#,
                r#"{"type": "paragraph", "content": [{"type": "text", "text": "A. B."}]}"#,
            )
            .unwrap();
        assert_eq!(
            annotations(&out),
            vec![DiffType::Unchanged, DiffType::Inserted, DiffType::Inserted]
        );
        assert_eq!(out.text_content(), "A. B.");
    }

    #[test]
    fn differ_requires_diff_mark() {
        let schema = Schema::new("text", "diffMark").with_node("doc", Default::default());
        let err = Differ::new(schema, DiffConfig::default()).unwrap_err();
        assert!(matches!(err, DiffError::DiffMarkNotRegistered(_)));
    }

    #[test]
    fn custom_diff_mark_name() {
        let schema = Schema::new("text", "change")
            .with_node("doc", Default::default())
            .with_node("paragraph", Default::default())
            .with_mark("change", Default::default());
        let differ = Differ::new(schema, DiffConfig::default()).unwrap();
        let out = differ
            .diff_json(&doc(vec![para("Old.")]), &doc(vec![]))
            .unwrap();
        let leaf = out.text_leaves()[0];
        assert_eq!(leaf.marks()[0].mark_type, "change");
        assert_eq!(leaf.marks()[0].attr("type"), Some(&json!("Deleted")));
    }

    #[test]
    fn concurrent_diffs_do_not_interfere() {
        let differ = Differ::default();
        let pairs: Vec<(Value, Value)> = (0..8)
            .map(|i| {
                (
                    doc(vec![para(&format!("Shared {i}. Old {i}."))]),
                    doc(vec![para(&format!("Shared {i}. New {i}."))]),
                )
            })
            .collect();
        let expected: Vec<Node> = pairs
            .iter()
            .map(|(old, new)| differ.diff_json(old, new).unwrap())
            .collect();

        let differ = &differ;
        std::thread::scope(|scope| {
            let handles: Vec<_> = pairs
                .iter()
                .map(|(old, new)| scope.spawn(move || differ.diff_json(old, new).unwrap()))
                .collect();
            for (handle, want) in handles.into_iter().zip(&expected) {
                assert_eq!(&handle.join().unwrap(), want);
            }
        });
    }

    fn document() -> impl Strategy<Value = Value> {
        let sentence = "[A-Z][a-z]{0,4}[.!?]";
        let paragraph = prop::collection::vec(sentence, 1..4)
            .prop_map(|s| para(&s.join(" ")));
        prop::collection::vec(paragraph, 0..5).prop_map(doc)
    }

    proptest! {
        #[test]
        fn diff_with_self_is_identity(d in document()) {
            let out = diff(&d, &d).unwrap();
            prop_assert_eq!(out.to_json(), Schema::basic().node_from_json(&d).unwrap().to_json());
            prop_assert!(annotations(&out).iter().all(|t| *t == DiffType::Unchanged));
        }

        #[test]
        fn merged_text_reconstructs_both_sides(old in document(), new in document()) {
            let schema = Schema::basic();
            let out = diff(&old, &new).unwrap();
            let keep = |drop: DiffType| -> String {
                out.text_leaves()
                    .into_iter()
                    .filter(|n| diff_type_of(&schema, n) != drop)
                    .filter_map(Node::text)
                    .collect()
            };
            let old_text = schema.node_from_json(&old).unwrap().text_content();
            let new_text = schema.node_from_json(&new).unwrap().text_content();
            prop_assert_eq!(keep(DiffType::Deleted), new_text);
            prop_assert_eq!(keep(DiffType::Inserted), old_text);
        }
    }
}

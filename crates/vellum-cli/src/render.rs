//! Plain-terminal rendering of a merged document.

use colored::Colorize;
use vellum_diff::{diff_type_of, DiffType};
use vellum_model::{Node, Schema};

/// Leaf counts by annotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub unchanged: usize,
    pub inserted: usize,
    pub deleted: usize,
}

impl DiffStats {
    pub fn of(schema: &Schema, node: &Node) -> Self {
        let mut stats = Self::default();
        for leaf in node.text_leaves() {
            match diff_type_of(schema, leaf) {
                DiffType::Unchanged => stats.unchanged += 1,
                DiffType::Inserted => stats.inserted += 1,
                DiffType::Deleted => stats.deleted += 1,
            }
        }
        stats
    }

    pub fn is_clean(&self) -> bool {
        self.inserted == 0 && self.deleted == 0
    }
}

/// Render blocks one per line, indented by nesting depth. Inserted text is
/// green and underlined, deleted text red and struck through.
pub fn render(schema: &Schema, node: &Node) -> String {
    let mut out = String::new();
    if is_textblock(node) {
        render_block(schema, node, 0, &mut out);
    } else {
        for child in node.children() {
            render_block(schema, child, 0, &mut out);
        }
    }
    out
}

/// A node whose children are all leaves: text or childless atoms.
fn is_textblock(node: &Node) -> bool {
    !node.is_text()
        && !node.children().is_empty()
        && node.children().iter().all(|c| c.children().is_empty())
}

fn render_block(schema: &Schema, node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    if is_textblock(node) {
        out.push_str(&indent);
        out.push_str(&block_prefix(node));
        for child in node.children() {
            out.push_str(&render_inline(schema, child));
        }
        out.push('\n');
        return;
    }
    if node.children().is_empty() {
        out.push_str(&format!("{indent}{}\n", atom_label(node)));
        return;
    }
    let depth = if node.node_type() == "list_item" {
        depth
    } else {
        depth + 1
    };
    for child in node.children() {
        render_block(schema, child, depth, out);
    }
}

fn block_prefix(node: &Node) -> String {
    match node.node_type() {
        "heading" => {
            let level = node.attr("level").and_then(|v| v.as_u64()).unwrap_or(1);
            format!("{} ", "#".repeat(level.clamp(1, 6) as usize))
        }
        "code_block" => "    ".to_string(),
        _ => String::new(),
    }
}

fn atom_label(node: &Node) -> String {
    match node.node_type() {
        "horizontal_rule" => "---".to_string(),
        "hard_break" => "\u{21b5}".to_string(),
        other => format!("[{other}]"),
    }
}

fn render_inline(schema: &Schema, node: &Node) -> String {
    let text = match node.text() {
        Some(text) => text.to_string(),
        None => atom_label(node),
    };
    match diff_type_of(schema, node) {
        DiffType::Unchanged => text,
        DiffType::Inserted => text.green().underline().to_string(),
        DiffType::Deleted => text.red().strikethrough().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vellum_diff::diff;

    #[test]
    fn renders_blocks_and_counts() {
        colored::control::set_override(false);
        let merged = diff(
            &json!({"type": "doc", "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Title"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "Old."}]}
            ]}),
            &json!({"type": "doc", "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Title"}]},
                {"type": "horizontal_rule"},
                {"type": "paragraph", "content": [{"type": "text", "text": "New."}]}
            ]}),
        )
        .unwrap();
        let schema = Schema::basic();

        let text = render(&schema, &merged);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["## Title", "---", "Old.New."]);

        let stats = DiffStats::of(&schema, &merged);
        assert_eq!(stats, DiffStats { unchanged: 1, inserted: 1, deleted: 1 });
        assert!(!stats.is_clean());
    }

    #[test]
    fn heading_level_is_clamped() {
        colored::control::set_override(false);
        let schema = Schema::basic();
        let doc = schema
            .node_from_json(&json!({"type": "doc", "content": [
                {"type": "heading", "attrs": {"level": 1_000_000_000_000_000u64},
                 "content": [{"type": "text", "text": "Deep"}]},
                {"type": "heading", "attrs": {"level": 0},
                 "content": [{"type": "text", "text": "Flat"}]}
            ]}))
            .unwrap();
        assert_eq!(render(&schema, &doc), "###### Deep\n# Flat\n");
    }

    #[test]
    fn nested_lists_indent() {
        colored::control::set_override(false);
        let schema = Schema::basic();
        let list = schema
            .node_from_json(&json!({"type": "bullet_list", "content": [
                {"type": "list_item", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "a"}]},
                    {"type": "bullet_list", "content": [
                        {"type": "list_item", "content": [
                            {"type": "paragraph", "content": [{"type": "text", "text": "b"}]}
                        ]}
                    ]}
                ]}
            ]}))
            .unwrap();
        assert_eq!(render(&schema, &list), "a\n  b\n");
    }
}

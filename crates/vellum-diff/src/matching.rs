//! Structural equality and child-list alignment.
//!
//! Children are compared as [`ChildUnit`]s: each non-text node is its own
//! unit, and each maximal run of adjacent text leaves is collapsed into one
//! unit, since text is diffed by sentence rather than node by node.

use std::slice;

use vellum_model::{Attrs, Mark, Node};

use crate::config::DiffConfig;

/// One comparable entry in a normalized children list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChildUnit<'a> {
    /// A single non-text node.
    Single(&'a Node),
    /// A maximal run of adjacent text leaves.
    TextRun(&'a [Node]),
}

impl<'a> ChildUnit<'a> {
    /// The nodes this unit stands for, in order.
    pub fn nodes(&self) -> &'a [Node] {
        match *self {
            Self::Single(node) => slice::from_ref(node),
            Self::TextRun(run) => run,
        }
    }

    /// Concatenated text of every node in the unit.
    pub fn text_content(&self) -> String {
        self.nodes().iter().map(Node::text_content).collect()
    }
}

/// Split a node's children into units, collapsing runs of text leaves.
pub fn normalize_children(node: &Node) -> Vec<ChildUnit<'_>> {
    let children = node.children();
    let mut units = Vec::with_capacity(children.len());
    let mut run_start = None;

    for (i, child) in children.iter().enumerate() {
        if child.is_text() {
            if run_start.is_none() {
                run_start = Some(i);
            }
            continue;
        }
        if let Some(start) = run_start.take() {
            units.push(ChildUnit::TextRun(&children[start..i]));
        }
        units.push(ChildUnit::Single(child));
    }
    if let Some(start) = run_start {
        units.push(ChildUnit::TextRun(&children[start..]));
    }
    units
}

// ---------------------------------------------------------------
// Equality
// ---------------------------------------------------------------

/// Marks are equal when type and attributes are equal.
pub fn is_mark_equal(a: &Mark, b: &Mark) -> bool {
    a.mark_type == b.mark_type && a.attrs == b.attrs
}

/// Attribute maps are compared over the union of their keys. A key missing
/// on one side only matches a key missing on the other, not a `null`.
pub fn is_attrs_equal(a: &Attrs, b: &Attrs) -> bool {
    a.keys()
        .chain(b.keys())
        .all(|key| a.get(key) == b.get(key))
}

fn is_marks_equal(a: &[Mark], b: &[Mark]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_mark_equal(x, y))
}

fn is_nodes_equal(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_node_equal(x, y))
}

/// Deep structural equality: type, text, attributes, marks (in order) and
/// children (in order). Any difference anywhere in the subtree makes the
/// nodes unequal.
pub fn is_node_equal(a: &Node, b: &Node) -> bool {
    if a.node_type() != b.node_type() {
        return false;
    }
    if a.is_text() && a.text() != b.text() {
        return false;
    }
    is_attrs_equal(a.attrs(), b.attrs())
        && is_marks_equal(a.marks(), b.marks())
        && is_nodes_equal(a.children(), b.children())
}

/// Unit equality: single nodes deeply, text runs element-wise. A single node
/// never equals a text run.
pub fn is_unit_equal(a: &ChildUnit<'_>, b: &ChildUnit<'_>) -> bool {
    match (a, b) {
        (ChildUnit::Single(x), ChildUnit::Single(y)) => is_node_equal(x, y),
        (ChildUnit::TextRun(x), ChildUnit::TextRun(y)) => is_nodes_equal(x, y),
        _ => false,
    }
}

/// Whether two units are "of the same kind": both text runs, or both single
/// nodes of the same type.
pub fn match_node_type(a: &ChildUnit<'_>, b: &ChildUnit<'_>) -> bool {
    match (a, b) {
        (ChildUnit::Single(x), ChildUnit::Single(y)) => x.node_type() == y.node_type(),
        (ChildUnit::TextRun(_), ChildUnit::TextRun(_)) => true,
        _ => false,
    }
}

// ---------------------------------------------------------------
// Best-run matching
// ---------------------------------------------------------------

/// A contiguous run of equal units: `old[old_start..old_end]` equals
/// `new[new_start..new_end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub old_start: usize,
    pub new_start: usize,
    pub old_end: usize,
    pub new_end: usize,
    /// Run length.
    pub count: usize,
}

/// Index of the first unit in `units[start..]` equal to `unit`.
pub fn find_match_node(units: &[ChildUnit<'_>], unit: &ChildUnit<'_>, start: usize) -> Option<usize> {
    units
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, candidate)| is_unit_equal(candidate, unit))
        .map(|(i, _)| i)
}

/// For every old position that has an equal unit somewhere in `new`, the run
/// obtained by extending that first match forward while units stay equal.
///
/// Results are in old-position order.
pub fn match_nodes(old: &[ChildUnit<'_>], new: &[ChildUnit<'_>]) -> Vec<MatchResult> {
    let mut matches = Vec::new();
    for (old_start, unit) in old.iter().enumerate() {
        let Some(new_start) = find_match_node(new, unit, 0) else {
            continue;
        };
        let mut old_end = old_start + 1;
        let mut new_end = new_start + 1;
        while old_end < old.len()
            && new_end < new.len()
            && is_unit_equal(&old[old_end], &new[new_end])
        {
            old_end += 1;
            new_end += 1;
        }
        matches.push(MatchResult {
            old_start,
            new_start,
            old_end,
            new_end,
            count: new_end - new_start,
        });
    }
    matches
}

/// The longest run from [`match_nodes`]; ties go to the first found.
pub fn best_match(old: &[ChildUnit<'_>], new: &[ChildUnit<'_>]) -> Option<MatchResult> {
    match_nodes(old, new)
        .into_iter()
        .fold(None, |best: Option<MatchResult>, m| match best {
            Some(b) if b.count >= m.count => Some(b),
            _ => Some(m),
        })
}

// ---------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------

/// Similarity of two units in `[0.0, 1.0]`, used to decide which of two
/// updatable pairs to patch first.
///
/// Units of different kinds score 0. Equal units score 1. Otherwise the
/// score is the character-level similarity ratio of their text content;
/// textless units that differ score 0.
pub fn compute_child_equality_factor(
    config: &DiffConfig,
    old: &ChildUnit<'_>,
    new: &ChildUnit<'_>,
) -> f64 {
    if !match_node_type(old, new) {
        return 0.0;
    }
    if is_unit_equal(old, new) {
        return 1.0;
    }
    let old_text = old.text_content();
    let new_text = new.text_content();
    if old_text.is_empty() && new_text.is_empty() {
        return 0.0;
    }
    f64::from(
        config
            .text_diff_config()
            .diff_chars(old_text.as_str(), new_text.as_str())
            .ratio(),
    )
}

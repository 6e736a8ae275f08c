//! The recursive tree patcher.
//!
//! [`patch_document_node`] merges an old and a new node of the same type
//! into one node whose children interleave unchanged content, recursively
//! patched children, and subtrees annotated as inserted or deleted.
//!
//! # Algorithm
//!
//! 1. Normalize both children lists into [`ChildUnit`]s.
//! 2. Trim the longest equal prefix, then an equal suffix, always leaving at
//!    least one unit of the shorter list in the middle.
//! 3. Anchor the middle on the longest run of equal units ([`best_match`]),
//!    and resolve what lies before and after it with [`patch_remaining`].
//! 4. [`patch_remaining`] walks from both ends: text runs go to the sentence
//!    diff, same-typed nodes are patched recursively, everything else
//!    becomes a deleted/inserted pair.

use std::collections::VecDeque;

use tracing::debug;
use vellum_model::Node;

use crate::annotate::{create_diff_node, DiffType};
use crate::engine::DiffContext;
use crate::error::{DiffError, DiffResult};
use crate::matching::{
    best_match, compute_child_equality_factor, is_node_equal, is_unit_equal, normalize_children,
    ChildUnit,
};
use crate::text::patch_text_nodes;

/// Fail unless both nodes have the same type.
///
/// The patcher only ever pairs nodes it has already matched by type, so a
/// mismatch here means the caller broke the contract.
pub fn assert_node_type_equal(old: &Node, new: &Node) -> DiffResult<()> {
    if old.node_type() != new.node_type() {
        return Err(DiffError::NodeTypeMismatch {
            old: old.node_type().to_string(),
            new: new.node_type().to_string(),
        });
    }
    Ok(())
}

/// Merge `old` and `new` into a single annotated node.
///
/// The result keeps the old node's type, attributes and marks; only the
/// children are diffed.
pub fn patch_document_node(cx: &DiffContext<'_>, old: &Node, new: &Node) -> DiffResult<Node> {
    assert_node_type_equal(old, new)?;
    if is_node_equal(old, new) {
        return Ok(old.clone());
    }

    let old_units = normalize_children(old);
    let new_units = normalize_children(new);
    let (old_len, new_len) = (old_units.len(), new_units.len());
    let min_len = old_len.min(new_len);

    let mut left_out = Vec::new();
    let mut right_out = VecDeque::new();

    let mut left = 0;
    while left < min_len && is_unit_equal(&old_units[left], &new_units[left]) {
        left_out.extend_from_slice(old_units[left].nodes());
        left += 1;
    }

    let mut right = 0;
    while right + left + 1 < min_len {
        let old_unit = &old_units[old_len - right - 1];
        let new_unit = &new_units[new_len - right - 1];
        if !is_unit_equal(old_unit, new_unit) {
            break;
        }
        prepend(&mut right_out, old_unit.nodes().to_vec());
        right += 1;
    }

    let old_mid = &old_units[left..old_len - right];
    let new_mid = &new_units[left..new_len - right];
    debug!(
        node = old.node_type(),
        prefix = left,
        suffix = right,
        old_mid = old_mid.len(),
        new_mid = new_mid.len(),
        "patching node"
    );

    let anchor = if old_mid.is_empty() || new_mid.is_empty() {
        None
    } else {
        best_match(old_mid, new_mid)
    };

    match anchor {
        Some(m) => {
            debug!(
                old_start = m.old_start,
                new_start = m.new_start,
                count = m.count,
                "anchored on best run"
            );
            left_out.extend(patch_remaining(
                cx,
                &old_mid[..m.old_start],
                &new_mid[..m.new_start],
            )?);
            for unit in &old_mid[m.old_start..m.old_end] {
                left_out.extend_from_slice(unit.nodes());
            }
            let after = patch_remaining(cx, &old_mid[m.old_end..], &new_mid[m.new_end..])?;
            prepend(&mut right_out, after);
        }
        None => left_out.extend(patch_remaining(cx, old_mid, new_mid)?),
    }

    left_out.extend(right_out);
    Ok(old.with_children(left_out)?)
}

/// Align two unit lists that share no anchor.
///
/// Walks from both ends at once. Text runs facing each other on the left go
/// through the sentence diff. A pair of same-typed nodes is "updatable" and
/// patched recursively; when both the left and the right pair are updatable
/// the more similar one goes first (left on ties). A pair that is neither
/// is emitted as a deletion followed by an insertion. Whatever remains on
/// one side once the other runs out is deleted or inserted wholesale.
pub fn patch_remaining(
    cx: &DiffContext<'_>,
    old: &[ChildUnit<'_>],
    new: &[ChildUnit<'_>],
) -> DiffResult<Vec<Node>> {
    let (old_len, new_len) = (old.len(), new.len());
    let mut left_out = Vec::new();
    let mut right_out = VecDeque::new();
    let mut left = 0;
    let mut right = 0;

    while left + right < old_len && left + right < new_len {
        let (left_old, left_new) = (&old[left], &new[left]);
        let (right_old, right_new) = (&old[old_len - right - 1], &new[new_len - right - 1]);

        if let (ChildUnit::TextRun(old_run), ChildUnit::TextRun(new_run)) = (left_old, left_new) {
            left_out.extend(patch_text_nodes(cx, old_run, new_run)?);
            left += 1;
            continue;
        }

        let mut update_left = updatable(left_old, left_new);
        let mut update_right = updatable(right_old, right_new);
        if let (Some(_), Some(_)) = (update_left, update_right) {
            let left_factor = compute_child_equality_factor(cx.config, left_old, left_new);
            let right_factor = compute_child_equality_factor(cx.config, right_old, right_new);
            if left_factor < right_factor {
                update_left = None;
            } else {
                update_right = None;
            }
        }

        if let Some((old_node, new_node)) = update_left {
            left_out.push(patch_document_node(cx, old_node, new_node)?);
            left += 1;
        } else if let Some((old_node, new_node)) = update_right {
            prepend(&mut right_out, vec![patch_document_node(cx, old_node, new_node)?]);
            right += 1;
        } else {
            left_out.extend(annotate_unit(cx, left_old, DiffType::Deleted)?);
            left_out.extend(annotate_unit(cx, left_new, DiffType::Inserted)?);
            left += 1;
        }
    }

    for unit in &old[left..old_len - right] {
        left_out.extend(annotate_unit(cx, unit, DiffType::Deleted)?);
    }
    for unit in &new[left..new_len - right] {
        left_out.extend(annotate_unit(cx, unit, DiffType::Inserted)?);
    }
    left_out.extend(right_out);
    Ok(left_out)
}

/// Two single nodes of the same (non-text) type can be patched in place.
fn updatable<'a>(old: &ChildUnit<'a>, new: &ChildUnit<'a>) -> Option<(&'a Node, &'a Node)> {
    match (*old, *new) {
        (ChildUnit::Single(o), ChildUnit::Single(n))
            if !o.is_text() && o.node_type() == n.node_type() =>
        {
            Some((o, n))
        }
        _ => None,
    }
}

fn annotate_unit(
    cx: &DiffContext<'_>,
    unit: &ChildUnit<'_>,
    diff_type: DiffType,
) -> DiffResult<Vec<Node>> {
    unit.nodes()
        .iter()
        .map(|node| create_diff_node(cx.schema, node, diff_type))
        .collect()
}

fn prepend(out: &mut VecDeque<Node>, nodes: Vec<Node>) {
    for node in nodes.into_iter().rev() {
        out.push_front(node);
    }
}

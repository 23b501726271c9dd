//! Minimal well-formed fragments covering an inner-text range.
//!
//! Extraction is a pure tree-to-tree transform: each node maps to a new node or to
//! nothing, with the running inner-text offset threaded through the walk. Offsets
//! are expected to satisfy `0 <= start <= end <= len`; anything beyond simply
//! selects nothing.

use super::markup::{MarkupNode, ParsedContent};
use crate::models::ContentType;

/// Keep only the parts of `parsed` that overlap `[start, end)`.
pub fn extract_nodes(parsed: &ParsedContent, start: usize, end: usize) -> ParsedContent {
    let mut offset = 0;
    let nodes = parsed
        .nodes()
        .iter()
        .filter_map(|node| extract_node(node, &mut offset, start, end))
        .collect();
    ParsedContent::from_nodes(parsed.kind(), nodes)
}

/// Fragment of raw content covering `[start, end)`, in the same format.
pub fn extract_fragment(content: &str, kind: ContentType, start: usize, end: usize) -> String {
    let parsed = ParsedContent::parse(content, kind);
    extract_nodes(&parsed, start, end).render()
}

fn extract_node(
    node: &MarkupNode,
    offset: &mut usize,
    start: usize,
    end: usize,
) -> Option<MarkupNode> {
    match node {
        MarkupNode::Text(text) => {
            let len = text.chars().count();
            let leaf_start = *offset;
            *offset += len;

            let lo = start.max(leaf_start);
            let hi = end.min(leaf_start + len);
            if lo >= hi {
                return None;
            }
            let kept: String = text.chars().skip(lo - leaf_start).take(hi - lo).collect();
            Some(MarkupNode::Text(kept))
        }
        MarkupNode::Element {
            name,
            namespace,
            attrs,
            children,
        } => {
            let el_start = *offset;
            let kept: Vec<MarkupNode> = children
                .iter()
                .filter_map(|child| extract_node(child, offset, start, end))
                .collect();
            let el_end = *offset;

            if !overlaps(el_start, el_end, start, end) {
                return None;
            }
            Some(MarkupNode::Element {
                name: name.clone(),
                namespace: namespace.clone(),
                attrs: attrs.clone(),
                children: kept,
            })
        }
    }
}

/// Whether an element spanning `[a, b)` belongs to the selection `[start, end)`.
///
/// Empty elements (`<br>`, `<img>`) sit at a single position and are kept when
/// that position falls inside a non-empty selection.
fn overlaps(a: usize, b: usize, start: usize, end: usize) -> bool {
    if start >= end {
        return false;
    }
    if a == b {
        return start <= a && a < end;
    }
    a < end && b > start
}

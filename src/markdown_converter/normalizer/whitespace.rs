//! Whitespace rules for inline content outside `<pre>`
//!
//! Text leaves arrive with HTML whitespace runs already collapsed to a single
//! space. The functions here remove the spaces that would be significant in
//! Markdown: at block edges, around hard breaks, and just inside emphasis
//! delimiters.

use std::borrow::Cow;

use crate::markdown_converter::node::{MdNode, NodeKind};

/// HTML "ASCII whitespace": space, tab, LF, FF, CR
#[inline]
pub(crate) fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{0C}' | '\r')
}

/// Collapse every run of HTML whitespace into one space.
///
/// Borrows when the input already has no runs to collapse.
pub(crate) fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    let needs_work = text
        .as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace())
        || text.chars().any(|c| is_html_whitespace(c) && c != ' ');
    if !needs_work {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if is_html_whitespace(c) {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    Cow::Owned(out)
}

/// Merge adjacent `Text` leaves in place
pub(crate) fn merge_adjacent_text(nodes: &mut Vec<MdNode>) {
    let mut merged: Vec<MdNode> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        if let NodeKind::Text { content } = &node.kind
            && let Some(MdNode {
                kind: NodeKind::Text { content: prev },
                ..
            }) = merged.last_mut()
        {
            prev.push_str(content);
            continue;
        }
        merged.push(node);
    }
    *nodes = merged;
}

/// Split leading and trailing spaces and line breaks off an inline run.
///
/// Returns `(leading, core, trailing)`. Emphasis-like handlers place the edges
/// outside their delimiters so `<b> x </b>` becomes ` **x** `.
pub(crate) fn split_edges(mut children: Vec<MdNode>) -> (Vec<MdNode>, Vec<MdNode>, Vec<MdNode>) {
    merge_adjacent_text(&mut children);
    let mut leading = Vec::new();
    let mut trailing = Vec::new();

    loop {
        match children.first_mut() {
            Some(node) if node.kind == NodeKind::LineBreak => {
                leading.push(children.remove(0));
            }
            Some(MdNode {
                kind: NodeKind::Text { content },
                ..
            }) if content.starts_with(is_html_whitespace) => {
                let rest = content.trim_start_matches(is_html_whitespace).to_string();
                leading.push(MdNode::text(" "));
                if rest.is_empty() {
                    children.remove(0);
                } else {
                    *content = rest;
                }
            }
            _ => break,
        }
    }

    loop {
        match children.last_mut() {
            Some(node) if node.kind == NodeKind::LineBreak => {
                if let Some(node) = children.pop() {
                    trailing.insert(0, node);
                }
            }
            Some(MdNode {
                kind: NodeKind::Text { content },
                ..
            }) if content.ends_with(is_html_whitespace) => {
                let rest = content.trim_end_matches(is_html_whitespace).to_string();
                trailing.insert(0, MdNode::text(" "));
                if rest.is_empty() {
                    children.pop();
                } else {
                    *content = rest;
                }
            }
            _ => break,
        }
    }

    (leading, children, trailing)
}

/// Normalize the inline children of a paragraph or heading.
///
/// Leading spaces are dropped at the start of the block and after every
/// space or hard break; trailing spaces are dropped at the end of the block
/// and before every hard break; hard breaks at the block edges are removed;
/// empty text and empty inline containers are pruned.
pub(crate) fn normalize_inline(mut nodes: Vec<MdNode>) -> Vec<MdNode> {
    merge_adjacent_text(&mut nodes);
    let mut at_space = true;
    trim_forward(&mut nodes, &mut at_space);
    trim_end(&mut nodes);

    let mut nodes = prune(nodes);
    while nodes.first().is_some_and(|n| n.kind == NodeKind::LineBreak) {
        nodes.remove(0);
    }
    while nodes.last().is_some_and(|n| n.kind == NodeKind::LineBreak) {
        nodes.pop();
    }
    // Dropping an edge break can expose spaces that sat beside it
    if let Some(MdNode {
        kind: NodeKind::Text { content },
        ..
    }) = nodes.first_mut()
    {
        *content = content.trim_start_matches(' ').to_string();
    }
    trim_end(&mut nodes);
    prune(nodes)
}

fn trim_forward(nodes: &mut [MdNode], at_space: &mut bool) {
    for i in 0..nodes.len() {
        if nodes[i].kind == NodeKind::LineBreak {
            trim_end(&mut nodes[..i]);
            *at_space = true;
            continue;
        }

        let node = &mut nodes[i];
        let is_container = node.is_inline_container();
        match &mut node.kind {
            NodeKind::Text { content } => {
                if *at_space {
                    let trimmed = content.trim_start_matches(' ');
                    if trimmed.len() != content.len() {
                        *content = trimmed.to_string();
                    }
                }
                if !content.is_empty() {
                    *at_space = content.ends_with(' ');
                }
            }
            _ if is_container => trim_forward(&mut node.children, at_space),
            _ => *at_space = false,
        }
    }
}

/// Strip trailing spaces from the last content of `nodes`.
///
/// Returns `true` once non-space content was found.
fn trim_end(nodes: &mut [MdNode]) -> bool {
    for node in nodes.iter_mut().rev() {
        let is_container = node.is_inline_container();
        match &mut node.kind {
            NodeKind::Text { content } => {
                let trimmed_len = content.trim_end_matches(' ').len();
                content.truncate(trimmed_len);
                if !content.is_empty() {
                    return true;
                }
            }
            _ if is_container => {
                if trim_end(&mut node.children) {
                    return true;
                }
            }
            _ => return true,
        }
    }
    false
}

/// Remove empty text and empty inline containers, merging text runs
fn prune(nodes: Vec<MdNode>) -> Vec<MdNode> {
    let mut out: Vec<MdNode> = nodes
        .into_iter()
        .filter_map(|mut node| {
            if node.is_inline_container() {
                node.children = prune(std::mem::take(&mut node.children));
                if node.children.is_empty() {
                    return None;
                }
            }
            let empty_text = matches!(&node.kind, NodeKind::Text { content } if content.is_empty());
            (!empty_text).then_some(node)
        })
        .collect();
    merge_adjacent_formatting(&mut out);
    merge_adjacent_text(&mut out);
    out
}

/// `<em>a</em><em>b</em>` would emit `*a**b*`; join such siblings instead
fn merge_adjacent_formatting(nodes: &mut Vec<MdNode>) {
    let mut merged: Vec<MdNode> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        let is_formatting = matches!(
            node.kind,
            NodeKind::Emphasis | NodeKind::Strong | NodeKind::Strikethrough
        );
        if is_formatting
            && let Some(prev) = merged.last_mut()
            && prev.kind == node.kind
        {
            prev.children.extend(node.children);
            merge_adjacent_text(&mut prev.children);
            continue;
        }
        merged.push(node);
    }
    *nodes = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(nodes: &[MdNode]) -> Vec<String> {
        nodes.iter().map(MdNode::plain_text).collect()
    }

    #[test]
    fn collapses_runs_and_newlines() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert!(matches!(collapse_whitespace("a b"), Cow::Borrowed(_)));
    }

    #[test]
    fn split_edges_moves_spaces_outside() {
        let (lead, core, trail) = split_edges(vec![MdNode::text(" bold "), MdNode::leaf(NodeKind::LineBreak)]);
        assert_eq!(texts(&lead), vec![" "]);
        assert_eq!(texts(&core), vec!["bold"]);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[1].kind, NodeKind::LineBreak);
    }

    #[test]
    fn normalize_inline_trims_block_edges_and_breaks() {
        let nodes = vec![
            MdNode::text(" a "),
            MdNode::leaf(NodeKind::LineBreak),
            MdNode::text(" b "),
            MdNode::leaf(NodeKind::LineBreak),
        ];
        let out = normalize_inline(nodes);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_text(), Some("a"));
        assert_eq!(out[1].kind, NodeKind::LineBreak);
        assert_eq!(out[2].as_text(), Some("b"));
    }

    #[test]
    fn normalize_inline_collapses_across_containers() {
        let nodes = vec![
            MdNode::text("a "),
            MdNode::new(NodeKind::Strong, vec![MdNode::text(" b")]),
        ];
        let out = normalize_inline(nodes);
        assert_eq!(out[0].as_text(), Some("a "));
        assert_eq!(out[1].children[0].as_text(), Some("b"));
    }
}

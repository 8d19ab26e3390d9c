//! Constructors that keep the normalized tree well-formed
//!
//! Handlers hand over whatever their children produced. These functions
//! regroup it so block containers hold blocks, inline containers hold inline
//! content and lists hold list items.

use crate::markdown_converter::node::{MdNode, NodeKind};

use super::whitespace::{merge_adjacent_text, normalize_inline};

/// Build a block container (`Document`, `Blockquote`, `ListItem`)
pub(crate) fn block_container(kind: NodeKind, children: Vec<MdNode>) -> MdNode {
    MdNode::new(kind, into_blocks(children))
}

/// Group a mixed run of nodes into blocks.
///
/// Inline runs become implicit paragraphs, stray list items are wrapped in a
/// list, and adjacent lists of the same type are merged (Markdown cannot keep
/// them apart).
pub(crate) fn into_blocks(children: Vec<MdNode>) -> Vec<MdNode> {
    let mut blocks: Vec<MdNode> = Vec::new();
    let mut run: Vec<MdNode> = Vec::new();

    for child in children {
        if child.is_inline() {
            run.push(child);
            continue;
        }
        flush_paragraph(&mut run, &mut blocks);

        let child = match child.kind {
            NodeKind::Document => {
                blocks.extend(into_blocks(child.children));
                continue;
            }
            NodeKind::ListItem { ordered } => {
                MdNode::new(NodeKind::List { ordered, start: 1 }, vec![child])
            }
            _ => child,
        };

        if let NodeKind::List { ordered, .. } = child.kind
            && let Some(MdNode {
                kind: NodeKind::List { ordered: prev_ordered, .. },
                children: prev_items,
            }) = blocks.last_mut()
            && *prev_ordered == ordered
        {
            prev_items.extend(child.children);
            continue;
        }
        blocks.push(child);
    }
    flush_paragraph(&mut run, &mut blocks);
    blocks
}

fn flush_paragraph(run: &mut Vec<MdNode>, blocks: &mut Vec<MdNode>) {
    if run.is_empty() {
        return;
    }
    if let Some(paragraph) = paragraph(std::mem::take(run)) {
        blocks.push(paragraph);
    }
}

/// Build a paragraph; `None` when nothing but whitespace remains
pub(crate) fn paragraph(children: Vec<MdNode>) -> Option<MdNode> {
    let inline = normalize_inline(flatten_to_inline(children));
    (!inline.is_empty()).then(|| MdNode::new(NodeKind::Paragraph, inline))
}

/// Build a heading; `None` when empty
pub(crate) fn heading(level: u8, children: Vec<MdNode>) -> Option<MdNode> {
    let inline = normalize_inline(flatten_to_inline(children));
    (!inline.is_empty()).then(|| MdNode::new(NodeKind::Heading { level: level.clamp(1, 6) }, inline))
}

/// Build an inline container (`Emphasis`, `Strong`, `Strikethrough`, `Link`).
///
/// Blocks are flattened and a container of the same kind nested directly
/// inside is unwrapped.
pub(crate) fn inline_container(kind: NodeKind, children: Vec<MdNode>) -> MdNode {
    let mut flat = Vec::with_capacity(children.len());
    for child in flatten_to_inline(children) {
        if same_container_kind(&kind, &child.kind) {
            flat.extend(child.children);
        } else {
            flat.push(child);
        }
    }
    merge_adjacent_text(&mut flat);
    MdNode::new(kind, flat)
}

fn same_container_kind(outer: &NodeKind, inner: &NodeKind) -> bool {
    matches!(
        (outer, inner),
        (NodeKind::Emphasis, NodeKind::Emphasis)
            | (NodeKind::Strong, NodeKind::Strong)
            | (NodeKind::Strikethrough, NodeKind::Strikethrough)
            | (NodeKind::Link { .. }, NodeKind::Link { .. })
    )
}

/// Build a list from the output of its children.
///
/// A list nested directly in a list, or any other stray content, attaches to
/// the preceding item. Returns `None` when there are no items.
pub(crate) fn list(ordered: bool, start: u64, children: Vec<MdNode>) -> Option<MdNode> {
    let mut items: Vec<Vec<MdNode>> = Vec::new();

    for child in children {
        match child.kind {
            NodeKind::ListItem { .. } => items.push(child.children),
            NodeKind::Text { ref content } if content.trim().is_empty() => {}
            _ => match items.last_mut() {
                Some(item) => item.push(child),
                None => items.push(vec![child]),
            },
        }
    }

    if items.is_empty() {
        return None;
    }
    let items = items
        .into_iter()
        .map(|children| block_container(NodeKind::ListItem { ordered }, children))
        .collect();
    Some(MdNode::new(NodeKind::List { ordered, start }, items))
}

/// Build a table from rows of cells, each cell holding whatever its element
/// produced.
///
/// Cells are reduced to inline content and short rows are padded with empty
/// cells. Returns `None` when there is no non-empty cell.
pub(crate) fn table(rows: Vec<Vec<Vec<MdNode>>>) -> Option<MdNode> {
    let rows: Vec<Vec<MdNode>> = rows
        .into_iter()
        .filter(|cells| !cells.is_empty())
        .map(|cells| {
            cells
                .into_iter()
                .map(|cell| MdNode::new(NodeKind::TableCell, normalize_inline(flatten_to_inline(cell))))
                .collect()
        })
        .collect();
    if rows.iter().flatten().all(|cell| cell.children.is_empty()) {
        return None;
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let rows = rows
        .into_iter()
        .map(|mut cells| {
            cells.resize_with(columns, || MdNode::leaf(NodeKind::TableCell));
            MdNode::new(NodeKind::TableRow, cells)
        })
        .collect();
    Some(MdNode::new(NodeKind::Table, rows))
}

/// Reduce any mix of nodes to inline content.
///
/// Paragraphs and headings contribute their inline children, code blocks
/// become inline code, and separate blocks are joined with a space.
pub(crate) fn flatten_to_inline(children: Vec<MdNode>) -> Vec<MdNode> {
    let mut out = Vec::with_capacity(children.len());
    let mut pending_space = false;
    for child in children {
        if child.is_inline() {
            if pending_space {
                out.push(MdNode::text(" "));
                pending_space = false;
            }
            out.push(child);
            continue;
        }
        if !out.is_empty() {
            out.push(MdNode::text(" "));
        }
        flatten_block(child, &mut out);
        pending_space = true;
    }
    out
}

fn flatten_block(block: MdNode, out: &mut Vec<MdNode>) {
    match block.kind {
        NodeKind::CodeBlock { .. } => {
            let code = block.plain_text().split_whitespace().collect::<Vec<_>>().join(" ");
            if !code.is_empty() {
                out.push(MdNode::new(NodeKind::InlineCode, vec![MdNode::text(code)]));
            }
        }
        NodeKind::ThematicBreak => {}
        NodeKind::Paragraph | NodeKind::Heading { .. } => out.extend(block.children),
        _ => out.extend(flatten_to_inline(block.children)),
    }
}

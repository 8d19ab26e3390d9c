//! Block structure: headings, fences, rules, quotes, lists, tables and paragraphs

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::inline::parse_inline;
use super::lines::{Line, lines_from};
use super::tree::{SyntaxKind, SyntaxNode};

/// Widest ordered list number
const MAX_ORDERED_DIGITS: usize = 9;

/// Table delimiter row such as `| --- | :-: |`; at least one pipe is required
static DELIMITER_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|?([ \t]*:?-+:?[ \t]*\|)+([ \t]*:?-+:?[ \t]*)?$")
        .expect("DELIMITER_ROW: hardcoded regex is valid")
});

/// Parse top-level blocks of `doc` starting at the line beginning at `from`
pub(crate) fn parse_document(doc: &str, from: usize) -> Vec<SyntaxNode> {
    let lines = lines_from(doc, from);
    parse_blocks(&lines)
}

pub(crate) fn parse_blocks(lines: &[Line]) -> Vec<SyntaxNode> {
    let mut blocks = Vec::new();
    let mut i = skip_blank(lines, 0);
    while i < lines.len() {
        let (block, next) = parse_block(lines, i);
        blocks.push(block);
        i = skip_blank(lines, next);
    }
    blocks
}

pub(crate) fn skip_blank(lines: &[Line], mut i: usize) -> usize {
    while i < lines.len() && lines[i].is_blank() {
        i += 1;
    }
    i
}

/// Parse the block whose first line is `lines[i]`, which must not be blank.
///
/// Returns the block and the index of the first line after it. The result
/// depends only on `lines[i..]`.
pub(crate) fn parse_block(lines: &[Line], i: usize) -> (SyntaxNode, usize) {
    let line = lines[i];
    let indent = line.indent();
    if indent <= 3 {
        let body = line.advance(indent);
        if let Some(fence) = Fence::open(&body) {
            return fenced_code(lines, i, fence);
        }
        if let Some(level) = atx_level(body.text) {
            return (atx_heading(body, level), i + 1);
        }
        if is_thematic_break(body.text) {
            return (
                SyntaxNode::leaf(SyntaxKind::HorizontalRule, body.trim_end().start..body.trim_end().end()),
                i + 1,
            );
        }
        if body.text.starts_with('>') {
            return blockquote(lines, i);
        }
        if let Some(marker) = ListMarker::parse(&line) {
            return list(lines, i, marker);
        }
        if starts_table(lines, i) {
            return table(lines, i);
        }
    }
    paragraph(lines, i)
}

/// Whether `line` starts a block that ends a running paragraph
fn interrupts_paragraph(line: &Line) -> bool {
    let indent = line.indent();
    if indent > 3 {
        return false;
    }
    let body = line.advance(indent);
    if Fence::open(&body).is_some()
        || atx_level(body.text).is_some()
        || is_thematic_break(body.text)
        || body.text.starts_with('>')
    {
        return true;
    }
    ListMarker::parse(line).is_some_and(|m| !m.empty_item && m.ordered_start.is_none_or(|n| n == 1))
}

/// Whether `line` would be taken as paragraph text: not blank and not the
/// start of another block
fn is_paragraph_text(line: &Line) -> bool {
    !line.is_blank() && !interrupts_paragraph(line)
}

// === Paragraphs ===

fn paragraph(lines: &[Line], i: usize) -> (SyntaxNode, usize) {
    let mut segments = vec![lines[i].trim_start()];
    let mut next = i + 1;
    while next < lines.len() && is_paragraph_text(&lines[next]) && !starts_table(lines, next) {
        segments.push(lines[next].trim_start());
        next += 1;
    }
    if let Some(last) = segments.last_mut() {
        *last = last.trim_end();
    }
    let from = segments[0].start;
    let to = segments.last().map_or(from, Line::end);
    (
        SyntaxNode::new(SyntaxKind::Paragraph, from..to, parse_inline(&segments)),
        next,
    )
}

// === ATX headings ===

fn atx_level(text: &str) -> Option<u8> {
    let hashes = text.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    match text.as_bytes().get(hashes) {
        None | Some(b' ' | b'\t') => u8::try_from(hashes).ok(),
        _ => None,
    }
}

fn atx_heading(body: Line, level: u8) -> SyntaxNode {
    let hashes = usize::from(level);
    // The opening mark takes one following space with it
    let open_len = if body.text.len() > hashes { hashes + 1 } else { hashes };
    let mut children = vec![SyntaxNode::leaf(SyntaxKind::HeaderMark, body.start..body.start + open_len)];

    let line = body.trim_end();
    let content = line.advance(open_len);
    let trimmed = content.text.trim_end_matches('#');
    let closing = content.text.len() - trimmed.len();
    let (content, close) = if closing > 0 && (trimmed.is_empty() || trimmed.ends_with([' ', '\t'])) {
        let close_from = content.start + trimmed.len();
        (
            Line {
                start: content.start,
                text: trimmed,
            },
            Some(SyntaxNode::leaf(SyntaxKind::HeaderMark, close_from..close_from + closing)),
        )
    } else {
        (content, None)
    };

    let content = content.trim_start().trim_end();
    if !content.text.is_empty() {
        children.extend(parse_inline(&[content]));
    }
    children.extend(close);

    let to = line.end().max(body.start + open_len);
    SyntaxNode::new(SyntaxKind::AtxHeading(level), body.start..to, children)
}

// === Thematic breaks ===

fn is_thematic_break(text: &str) -> bool {
    let mut marker = None;
    let mut count = 0;
    for b in text.bytes() {
        match b {
            b' ' | b'\t' => {}
            b'-' | b'*' | b'_' if marker.is_none_or(|m| m == b) => {
                marker = Some(b);
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

// === Fenced code ===

#[derive(Debug, Clone, Copy)]
struct Fence {
    ch: u8,
    len: usize,
}

impl Fence {
    fn open(body: &Line) -> Option<Self> {
        let ch = *body.text.as_bytes().first()?;
        if ch != b'`' && ch != b'~' {
            return None;
        }
        let len = body.text.bytes().take_while(|&b| b == ch).count();
        if len < 3 {
            return None;
        }
        if ch == b'`' && body.text[len..].contains('`') {
            return None;
        }
        Some(Self { ch, len })
    }

    fn closes(&self, line: &Line) -> bool {
        let indent = line.indent();
        if indent > 3 {
            return false;
        }
        let text = &line.text[indent..];
        let run = text.bytes().take_while(|&b| b == self.ch).count();
        run >= self.len && text[run..].bytes().all(|b| b == b' ' || b == b'\t')
    }
}

/// An unclosed fence runs to the end of the enclosing content
fn fenced_code(lines: &[Line], i: usize, fence: Fence) -> (SyntaxNode, usize) {
    let open = lines[i].advance(lines[i].indent());
    let mut children = vec![SyntaxNode::leaf(SyntaxKind::CodeMark, open.start..open.start + fence.len)];

    let info = open.advance(fence.len).trim_start().trim_end();
    if !info.text.is_empty() {
        children.push(SyntaxNode::leaf(SyntaxKind::CodeInfo, info.start..info.end()));
    }

    let mut next = i + 1;
    let mut close = None;
    while next < lines.len() {
        if fence.closes(&lines[next]) {
            close = Some(lines[next]);
            break;
        }
        next += 1;
    }

    let content = &lines[i + 1..next];
    if let (Some(first), Some(last)) = (content.first(), content.last())
        && first.start < last.end()
    {
        children.push(SyntaxNode::leaf(SyntaxKind::CodeText, first.start..last.end()));
    }

    let mut to = open.trim_end().end();
    if let Some(close) = close {
        let mark = close.advance(close.indent());
        let run = mark.text.bytes().take_while(|&b| b == fence.ch).count();
        children.push(SyntaxNode::leaf(SyntaxKind::CodeMark, mark.start..mark.start + run));
        to = mark.start + run;
        next += 1;
    } else if let Some(last) = content.last() {
        to = to.max(last.end());
    }

    (SyntaxNode::new(SyntaxKind::FencedCode, open.start..to, children), next)
}

// === Blockquotes ===

fn blockquote(lines: &[Line], i: usize) -> (SyntaxNode, usize) {
    let mut inner = Vec::new();
    let mut marks = Vec::new();
    let mut next = i;
    while next < lines.len() {
        let line = lines[next];
        let indent = line.indent();
        if indent <= 3 && line.text[indent..].starts_with('>') {
            let mark_from = line.start + indent;
            let after = line.advance(indent + 1);
            let mark_len = if after.text.starts_with(' ') { 2 } else { 1 };
            marks.push(SyntaxNode::leaf(SyntaxKind::QuoteMark, mark_from..mark_from + mark_len));
            inner.push(line.advance(indent + mark_len));
        } else if lazy_continuation(&inner, &line) {
            inner.push(line);
        } else {
            break;
        }
        next += 1;
    }

    let from = lines[i].start + lines[i].indent();
    let to = inner.last().map_or(from, Line::end);
    let mut node = SyntaxNode::new(SyntaxKind::Blockquote, from..to, parse_blocks(&inner));
    for mark in marks {
        insert_node(&mut node.children, mark);
    }
    (node, next)
}

/// A line without its container prefix still continues an open paragraph
fn lazy_continuation(inner: &[Line], line: &Line) -> bool {
    let Some(prev) = inner.last() else {
        return false;
    };
    if !is_paragraph_text(line) || prev.is_blank() || in_open_fence(inner) {
        return false;
    }
    let indent = prev.indent();
    if indent > 3 {
        return false;
    }
    let body = prev.advance(indent);
    atx_level(body.text).is_none() && !is_thematic_break(body.text) && Fence::open(&body).is_none()
}

/// Whether the collected lines end inside an unclosed fence
fn in_open_fence(inner: &[Line]) -> bool {
    let mut open: Option<Fence> = None;
    for line in inner {
        match open {
            Some(fence) if fence.closes(line) => open = None,
            Some(_) => {}
            None if line.indent() <= 3 => open = Fence::open(&line.advance(line.indent())),
            None => {}
        }
    }
    open.is_some()
}

/// Place `node` inside the deepest child that contains it
fn insert_node(children: &mut Vec<SyntaxNode>, node: SyntaxNode) {
    if let Some(parent) = children
        .iter_mut()
        .find(|c| c.range.start <= node.range.start && node.range.end <= c.range.end)
    {
        insert_node(&mut parent.children, node);
        return;
    }
    let at = children.partition_point(|c| c.range.start < node.range.start);
    children.insert(at, node);
}

// === Tables ===

/// A line with a pipe followed by a delimiter row with as many cells.
///
/// This is the only block start that looks at the line after it.
fn starts_table(lines: &[Line], i: usize) -> bool {
    let header = lines[i];
    let Some(delimiter) = lines.get(i + 1) else {
        return false;
    };
    if header.indent() > 3 || delimiter.indent() > 3 || !has_unescaped_pipe(header.text) {
        return false;
    }
    let header = header.trim_start().trim_end();
    let delimiter = delimiter.trim_start().trim_end();
    DELIMITER_ROW.is_match(delimiter.text) && split_row(header).count == split_row(delimiter).count
}

fn has_unescaped_pipe(text: &str) -> bool {
    let mut escaped = false;
    for b in text.bytes() {
        if b == b'|' && !escaped {
            return true;
        }
        escaped = !escaped && b == b'\\';
    }
    false
}

/// Table rows run until a blank line or the start of another block
fn table(lines: &[Line], i: usize) -> (SyntaxNode, usize) {
    let header = lines[i].trim_start().trim_end();
    let delimiter = lines[i + 1].trim_start().trim_end();
    let mut children = vec![
        SyntaxNode::new(SyntaxKind::TableHeader, header.start..header.end(), split_row(header).nodes),
        SyntaxNode::leaf(SyntaxKind::TableDelimiter, delimiter.start..delimiter.end()),
    ];
    let mut next = i + 2;
    while next < lines.len() && is_paragraph_text(&lines[next]) {
        let row = lines[next].trim_start().trim_end();
        children.push(SyntaxNode::new(SyntaxKind::TableRow, row.start..row.end(), split_row(row).nodes));
        next += 1;
    }
    let to = children.last().map_or(header.end(), SyntaxNode::to);
    (SyntaxNode::new(SyntaxKind::Table, header.start..to, children), next)
}

struct Row {
    /// Cells including empty ones; outer pipes do not open a cell
    count: usize,
    /// Pipes and non-empty cells in order
    nodes: Vec<SyntaxNode>,
}

fn split_row(line: Line) -> Row {
    let mut row = Row {
        count: 0,
        nodes: Vec::new(),
    };
    let mut seen_pipe = false;
    let mut cell: Option<Range<usize>> = None;
    let mut escaped = false;
    for (i, b) in line.text.bytes().enumerate() {
        if b == b'|' && !escaped {
            if seen_pipe || cell.is_some() {
                row.count += 1;
            }
            seen_pipe = true;
            if let Some(range) = cell.take() {
                row.nodes.push(table_cell(line, range));
            }
            row.nodes
                .push(SyntaxNode::leaf(SyntaxKind::TableDelimiter, line.start + i..line.start + i + 1));
        } else if escaped || (b != b' ' && b != b'\t') {
            cell.get_or_insert(i..i).end = i + 1;
        }
        escaped = !escaped && b == b'\\';
    }
    if let Some(range) = cell {
        row.count += 1;
        row.nodes.push(table_cell(line, range));
    }
    row
}

fn table_cell(line: Line, range: Range<usize>) -> SyntaxNode {
    let content = Line {
        start: line.start + range.start,
        text: &line.text[range],
    };
    SyntaxNode::new(SyntaxKind::TableCell, content.start..content.end(), parse_inline(&[content]))
}

// === Lists ===

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    /// Offset of the marker within the line
    indent: usize,
    /// Marker width including digits and delimiter
    width: usize,
    /// Column of item content relative to the line
    content_indent: usize,
    /// `-`, `+`, `*`, `.` or `)`
    delimiter: u8,
    ordered_start: Option<u64>,
    empty_item: bool,
}

impl ListMarker {
    fn parse(line: &Line) -> Option<Self> {
        let indent = line.indent();
        if indent > 3 {
            return None;
        }
        let text = &line.text.as_bytes()[indent..];
        let (width, delimiter, ordered_start) = match text.first()? {
            b @ (b'-' | b'+' | b'*') => (1, *b, None),
            b'0'..=b'9' => {
                let digits = text.iter().take_while(|b| b.is_ascii_digit()).count();
                if digits > MAX_ORDERED_DIGITS {
                    return None;
                }
                let delimiter = *text.get(digits).filter(|&&b| b == b'.' || b == b')')?;
                let number = std::str::from_utf8(&text[..digits]).ok()?.parse().ok()?;
                (digits + 1, delimiter, Some(number))
            }
            _ => return None,
        };

        let rest = &text[width..];
        if !matches!(rest.first(), None | Some(b' ' | b'\t')) {
            return None;
        }
        let empty_item = rest.iter().all(|&b| b == b' ' || b == b'\t');
        let spaces = rest.iter().take_while(|&&b| b == b' ').count();
        // Wide gaps mean indented content, which keeps a single space
        let gap = if empty_item || spaces == 0 || spaces > 4 { 1 } else { spaces };

        Some(Self {
            indent,
            width,
            content_indent: indent + width + gap,
            delimiter,
            ordered_start,
            empty_item,
        })
    }

    fn same_list(&self, other: &Self) -> bool {
        self.delimiter == other.delimiter && self.ordered_start.is_some() == other.ordered_start.is_some()
    }
}

fn list(lines: &[Line], i: usize, first: ListMarker) -> (SyntaxNode, usize) {
    let kind = if first.ordered_start.is_some() {
        SyntaxKind::OrderedList
    } else {
        SyntaxKind::BulletList
    };
    let mut items = Vec::new();
    let mut next = i;
    let mut marker = first;
    loop {
        let (item, after) = list_item(lines, next, marker);
        items.push(item);
        next = after;

        let following = skip_blank(lines, next);
        match lines.get(following).and_then(ListMarker::parse) {
            Some(m) if m.same_list(&first) && !is_thematic_break(lines[following].text.trim_start()) => {
                marker = m;
                next = following;
            }
            _ => break,
        }
    }

    let from = items.first().map_or(0, SyntaxNode::from);
    let to = items.last().map_or(from, SyntaxNode::to);
    (SyntaxNode::new(kind, from..to, items), next)
}

fn list_item(lines: &[Line], i: usize, marker: ListMarker) -> (SyntaxNode, usize) {
    let line = lines[i];
    let mark_from = line.start + marker.indent;
    let mark_to = (mark_from + marker.width + 1).min(line.end());
    let mark = SyntaxNode::leaf(SyntaxKind::ListMark, mark_from..mark_to);

    let mut inner = vec![line.advance(marker.content_indent.min(line.text.len()))];
    let mut next = i + 1;
    while next < lines.len() {
        let candidate = lines[next];
        if candidate.is_blank() {
            // A marker-only line followed by a blank line is an empty item
            if marker.empty_item && inner.len() == 1 {
                break;
            }
            inner.push(candidate.advance(candidate.text.len()));
        } else if candidate.indent() >= marker.content_indent {
            inner.push(candidate.advance(marker.content_indent));
        } else if lazy_continuation(&inner, &candidate) {
            inner.push(candidate);
        } else {
            break;
        }
        next += 1;
    }
    // Trailing blank lines belong to whatever follows
    while inner.len() > 1 && inner.last().is_some_and(Line::is_blank) {
        inner.pop();
        next -= 1;
    }

    let mut children = vec![mark];
    children.extend(parse_blocks(&inner));
    let to = children.last().map_or(mark_to, SyntaxNode::to).max(mark_to);
    (SyntaxNode::new(SyntaxKind::ListItem, mark_from..to, children), next)
}

#[cfg(test)]
mod tests {
    use super::super::tree::SyntaxTree;
    use super::*;

    fn kinds(doc: &str) -> Vec<SyntaxKind> {
        SyntaxTree::parse(doc).blocks().iter().map(|b| b.kind).collect()
    }

    #[test]
    fn recognizes_block_starts() {
        assert_eq!(
            kinds("# h\n\npara\n\n---\n\n> q\n\n- a\n\n1. b\n\n```\ncode\n```"),
            vec![
                SyntaxKind::AtxHeading(1),
                SyntaxKind::Paragraph,
                SyntaxKind::HorizontalRule,
                SyntaxKind::Blockquote,
                SyntaxKind::BulletList,
                SyntaxKind::OrderedList,
                SyntaxKind::FencedCode,
            ]
        );
    }

    #[test]
    fn heading_marks_include_trailing_space() {
        let tree = SyntaxTree::parse("## Title ##");
        let heading = &tree.blocks()[0];
        assert_eq!(heading.kind, SyntaxKind::AtxHeading(2));
        assert_eq!(heading.range, 0..11);
        assert_eq!(heading.children[0].range, 0..3);
        assert_eq!(heading.children.last().map(|c| c.range.clone()), Some(9..11));
    }

    #[test]
    fn hash_without_space_is_paragraph() {
        assert_eq!(kinds("#hashtag"), vec![SyntaxKind::Paragraph]);
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let doc = "```rust\nlet x = 1;\n\nmore";
        let tree = SyntaxTree::parse(doc);
        assert_eq!(tree.blocks().len(), 1);
        let code = &tree.blocks()[0];
        assert_eq!(code.kind, SyntaxKind::FencedCode);
        assert_eq!(code.range, 0..doc.len());
        assert_eq!(code.child(SyntaxKind::CodeInfo).map(|c| &doc[c.range.clone()]), Some("rust"));
    }

    #[test]
    fn nested_list_belongs_to_item() {
        let doc = "- a\n    - b\n- c";
        let tree = SyntaxTree::parse(doc);
        assert_eq!(tree.blocks().len(), 1);
        let list = &tree.blocks()[0];
        assert_eq!(list.children.len(), 2);
        let first = &list.children[0];
        assert_eq!(first.children[0].kind, SyntaxKind::ListMark);
        assert_eq!(first.children[0].range, 0..2);
        assert_eq!(first.children[2].kind, SyntaxKind::BulletList);
    }

    #[test]
    fn ordered_list_needs_one_to_interrupt_paragraph() {
        assert_eq!(kinds("text\n2. not a list"), vec![SyntaxKind::Paragraph]);
        assert_eq!(kinds("text\n1. list"), vec![SyntaxKind::Paragraph, SyntaxKind::OrderedList]);
    }

    #[test]
    fn quote_marks_nest_into_paragraph() {
        let doc = "> one\n> two\nlazy";
        let tree = SyntaxTree::parse(doc);
        let quote = &tree.blocks()[0];
        assert_eq!(quote.range, 0..doc.len());
        assert_eq!(quote.children[0].kind, SyntaxKind::QuoteMark);
        let para = &quote.children[1];
        assert_eq!(para.kind, SyntaxKind::Paragraph);
        assert_eq!(para.range, 2..doc.len());
        assert_eq!(para.children[0].kind, SyntaxKind::QuoteMark);
        assert_eq!(para.children[0].range, 6..8);
    }

    #[test]
    fn table_with_header_and_rows() {
        let doc = "| a | b |\n|---|:-:|\n| c | d |\n\npara";
        assert_eq!(kinds(doc), vec![SyntaxKind::Table, SyntaxKind::Paragraph]);

        let tree = SyntaxTree::parse(doc);
        let table = &tree.blocks()[0];
        assert_eq!(table.range, 0..doc.find("\n\n").unwrap_or(0));
        let rows: Vec<_> = table.children.iter().map(|c| c.kind).collect();
        assert_eq!(
            rows,
            vec![SyntaxKind::TableHeader, SyntaxKind::TableDelimiter, SyntaxKind::TableRow]
        );
        let cells: Vec<_> = table.children[2]
            .children
            .iter()
            .filter(|c| c.kind == SyntaxKind::TableCell)
            .map(|c| &doc[c.range.clone()])
            .collect();
        assert_eq!(cells, vec!["c", "d"]);
    }

    #[test]
    fn table_interrupts_paragraph() {
        assert_eq!(
            kinds("intro\na | b\n--- | ---\n1 | 2"),
            vec![SyntaxKind::Paragraph, SyntaxKind::Table]
        );
    }

    #[test]
    fn table_needs_matching_delimiter_row() {
        assert_eq!(kinds("a | b\n--- | --- | ---"), vec![SyntaxKind::Paragraph]);
        assert_eq!(kinds("a | b\nplain"), vec![SyntaxKind::Paragraph]);
        assert_eq!(kinds("a b\n---"), vec![SyntaxKind::Paragraph, SyntaxKind::HorizontalRule]);
    }

    #[test]
    fn escaped_pipe_stays_in_cell() {
        let doc = r"a \| b | `c`
--- | ---";
        let tree = SyntaxTree::parse(doc);
        let header = &tree.blocks()[0].children[0];
        let cells: Vec<_> = header
            .children
            .iter()
            .filter(|c| c.kind == SyntaxKind::TableCell)
            .collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(&doc[cells[0].range.clone()], r"a \| b");
        assert_eq!(cells[1].children[0].kind, SyntaxKind::InlineCode);
    }
}
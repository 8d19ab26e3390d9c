//! Normalized node tree to Markdown text
//!
//! Output is a pure function of the tree and the options: blocks are joined
//! by exactly one blank line and the result carries no trailing newline.

mod escape;
mod inline;

use crate::config::{BulletListMarker, ConversionOptions};
use crate::markdown_converter::node::{MdNode, NodeKind};

use inline::{InlineContext, InlineWriter, longest_run_of};

/// Largest ordered list number; longer markers do not start a list item
const MAX_ORDERED_NUMBER: u64 = 999_999_999;

/// Renders a normalized tree as Markdown
#[derive(Debug, Clone, Copy)]
pub struct MarkdownEmitter<'a> {
    options: &'a ConversionOptions,
}

impl<'a> MarkdownEmitter<'a> {
    #[must_use]
    pub fn new(options: &'a ConversionOptions) -> Self {
        Self { options }
    }

    /// Render `node` and everything below it
    #[must_use]
    pub fn emit(&self, node: &MdNode) -> String {
        if node.is_block() {
            self.block(node)
        } else {
            self.inline(std::slice::from_ref(node), InlineContext::Paragraph)
        }
    }

    fn blocks(&self, blocks: &[MdNode]) -> String {
        let rendered: Vec<String> = blocks
            .iter()
            .map(|block| self.block(block))
            .filter(|text| !text.is_empty())
            .collect();
        rendered.join("\n\n")
    }

    fn block(&self, node: &MdNode) -> String {
        match &node.kind {
            NodeKind::Document => self.blocks(&node.children),
            NodeKind::Paragraph => self.inline(&node.children, InlineContext::Paragraph),
            NodeKind::Heading { level } => self.heading(*level, &node.children),
            NodeKind::List { ordered, start } => self.list(*ordered, *start, &node.children),
            NodeKind::ListItem { ordered } => self.list(*ordered, 1, std::slice::from_ref(node)),
            NodeKind::CodeBlock { lang } => code_block(lang.as_deref(), &node.plain_text()),
            NodeKind::Blockquote => {
                let body = self.blocks(&node.children);
                if body.is_empty() {
                    return ">".to_string();
                }
                body.lines()
                    .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            NodeKind::ThematicBreak => self.thematic_break().to_string(),
            NodeKind::Table => self.table(&node.children),
            NodeKind::TableRow => self.table(std::slice::from_ref(node)),
            _ => self.inline(std::slice::from_ref(node), InlineContext::Paragraph),
        }
    }

    fn inline(&self, nodes: &[MdNode], context: InlineContext) -> String {
        let mut writer = InlineWriter::new(self.options, context);
        writer.write_nodes(nodes);
        writer.finish()
    }

    fn heading(&self, level: u8, children: &[MdNode]) -> String {
        let level = usize::from(level.clamp(1, 6));
        let mut content = self.inline(children, InlineContext::Heading);
        // A trailing `#` run after a space would be read as a closing sequence
        let hashes = content.len() - content.trim_end_matches('#').len();
        if hashes > 0 {
            let run_start = content.len() - hashes;
            if run_start == 0 || content[..run_start].ends_with([' ', '\t']) {
                content.insert(run_start, '\\');
            }
        }
        if content.is_empty() {
            "#".repeat(level)
        } else {
            format!("{} {content}", "#".repeat(level))
        }
    }

    /// Never `---` under a `-` bullet: `- ---` would itself be a thematic break
    fn thematic_break(&self) -> &'static str {
        match self.options.bullet_list_marker() {
            BulletListMarker::Asterisk => "---",
            BulletListMarker::Dash | BulletListMarker::Plus => "***",
        }
    }

    fn list(&self, ordered: bool, start: u64, items: &[MdNode]) -> String {
        let bullet = self.options.bullet_list_marker().as_char();
        let unit = self.options.list_indent_width();
        let last_offset = items.len().saturating_sub(1) as u64;
        let start = start.min(MAX_ORDERED_NUMBER - last_offset.min(MAX_ORDERED_NUMBER));

        let mut rendered = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let marker = if ordered {
                format!("{}.", start.saturating_add(i as u64))
            } else {
                bullet.to_string()
            };
            // Continuation lines must reach the item's content column but stay
            // short of an indented code block
            let content_col = marker.len() + 1;
            let indent = unit.clamp(content_col, content_col + 3);
            rendered.push(self.list_item(&marker, indent, &item.children));
        }
        rendered.join("\n")
    }

    fn list_item(&self, marker: &str, indent: usize, blocks: &[MdNode]) -> String {
        let body = self.item_body(blocks);
        if body.is_empty() {
            return marker.to_string();
        }

        let pad = " ".repeat(indent);
        let mut out = String::with_capacity(body.len() + marker.len() + 8);
        out.push_str(marker);
        // A fence on the marker line would leave its content over-indented
        let starts_with_code = matches!(blocks.first().map(|b| &b.kind), Some(NodeKind::CodeBlock { .. }));
        for (i, line) in body.lines().enumerate() {
            if i == 0 && !starts_with_code {
                out.push(' ');
                out.push_str(line);
                continue;
            }
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&pad);
                out.push_str(line);
            }
        }
        out
    }

    /// Pipe table with the first row as header, columns padded to their
    /// widest cell
    fn table(&self, rows: &[MdNode]) -> String {
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                row.children
                    .iter()
                    .map(|cell| self.inline(&cell.children, InlineContext::TableCell).trim().to_string())
                    .collect()
            })
            .collect();
        let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return String::new();
        }
        let widths: Vec<usize> = (0..columns)
            .map(|col| {
                cells
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(3)
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 1);
        for (i, row) in cells.iter().enumerate() {
            lines.push(table_row(widths.iter().enumerate().map(|(col, &width)| {
                let cell = row.get(col).map_or("", String::as_str);
                format!("{cell}{}", " ".repeat(width.saturating_sub(cell.chars().count())))
            })));
            if i == 0 {
                lines.push(table_row(widths.iter().map(|&width| "-".repeat(width))));
            }
        }
        lines.join("\n")
    }

    /// Item content; a list directly after a paragraph stays tight
    fn item_body(&self, blocks: &[MdNode]) -> String {
        let mut out = String::new();
        for (i, block) in blocks.iter().enumerate() {
            let text = self.block(block);
            if text.is_empty() {
                continue;
            }
            if !out.is_empty() {
                let tight = i > 0
                    && blocks[i - 1].kind == NodeKind::Paragraph
                    && can_interrupt_paragraph(block, &text);
                out.push_str(if tight { "\n" } else { "\n\n" });
            }
            out.push_str(&text);
        }
        out
    }
}

/// Lists may follow a paragraph line directly only when they start at 1 and
/// their first item is not empty
fn can_interrupt_paragraph(block: &MdNode, rendered: &str) -> bool {
    let starts_at_one = match block.kind {
        NodeKind::List { ordered, start } => !ordered || start == 1,
        _ => return false,
    };
    starts_at_one && rendered.lines().next().is_some_and(|line| line.contains(' '))
}

fn table_row(cells: impl Iterator<Item = String>) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push(' ');
        line.push_str(&cell);
        line.push_str(" |");
    }
    line
}

/// Fence longer than any backtick run that opens a line of `content`
fn code_block(lang: Option<&str>, content: &str) -> String {
    let longest = content
        .lines()
        .map(|line| {
            let indent = line.len() - line.trim_start_matches(' ').len();
            if indent > 3 {
                0
            } else {
                line[indent..].bytes().take_while(|&b| b == b'`').count()
            }
        })
        .max()
        .unwrap_or(0);
    let fence = "`".repeat((longest + 1).max(3));
    let info = lang.filter(|l| longest_run_of(l, '`') == 0).unwrap_or("");
    if content.is_empty() {
        format!("{fence}{info}\n{fence}")
    } else {
        format!("{fence}{info}\n{content}\n{fence}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(node: &MdNode) -> String {
        MarkdownEmitter::new(&ConversionOptions::default()).emit(node)
    }

    fn item(children: Vec<MdNode>) -> MdNode {
        MdNode::new(NodeKind::ListItem { ordered: false }, children)
    }

    fn para(text: &str) -> MdNode {
        MdNode::new(NodeKind::Paragraph, vec![MdNode::text(text)])
    }

    #[test]
    fn nested_list_uses_indent_unit() {
        let inner = MdNode::new(NodeKind::List { ordered: false, start: 1 }, vec![item(vec![para("b")])]);
        let outer = MdNode::new(
            NodeKind::List { ordered: false, start: 1 },
            vec![item(vec![para("a"), inner]), item(vec![para("c")])],
        );
        assert_eq!(emit(&outer), "- a\n    - b\n- c");
    }

    #[test]
    fn ordered_list_continues_from_start() {
        let list = MdNode::new(
            NodeKind::List { ordered: true, start: 9 },
            vec![item(vec![para("nine")]), item(vec![para("ten")])],
        );
        assert_eq!(emit(&list), "9. nine\n10. ten");
    }

    #[test]
    fn ordered_markers_stay_within_nine_digits() {
        let list = MdNode::new(
            NodeKind::List {
                ordered: true,
                start: 1_234_567_890,
            },
            vec![item(vec![para("a")]), item(vec![para("b")])],
        );
        assert_eq!(emit(&list), "999999998. a\n999999999. b");
    }

    #[test]
    fn table_pads_columns_under_header() {
        let cell = |text: &str| MdNode::new(NodeKind::TableCell, vec![MdNode::text(text)]);
        let table = MdNode::new(
            NodeKind::Table,
            vec![
                MdNode::new(NodeKind::TableRow, vec![cell("Name"), cell("Qty")]),
                MdNode::new(NodeKind::TableRow, vec![cell("a|b"), MdNode::leaf(NodeKind::TableCell)]),
            ],
        );
        assert_eq!(
            emit(&table),
            "| Name | Qty |\n| ---- | --- |\n| a\\|b |     |"
        );
    }

    #[test]
    fn code_block_fence_outgrows_content() {
        assert_eq!(code_block(Some("rust"), "fn main() {}"), "```rust\nfn main() {}\n```");
        assert_eq!(code_block(None, "```\nnested\n```"), "````\n```\nnested\n```\n````");
    }

    #[test]
    fn heading_escapes_closing_sequence() {
        let heading = MdNode::new(NodeKind::Heading { level: 2 }, vec![MdNode::text("Issue #")]);
        assert_eq!(emit(&heading), r"## Issue \#");
        let csharp = MdNode::new(NodeKind::Heading { level: 1 }, vec![MdNode::text("C#")]);
        assert_eq!(emit(&csharp), "# C#");
    }

    #[test]
    fn blockquote_prefixes_every_line() {
        let quote = MdNode::new(NodeKind::Blockquote, vec![para("one"), para("two")]);
        assert_eq!(emit(&quote), "> one\n>\n> two");
    }

    #[test]
    fn code_block_first_in_item_starts_on_next_line() {
        let code = MdNode::new(NodeKind::CodeBlock { lang: None }, vec![MdNode::text("x")]);
        let list = MdNode::new(NodeKind::List { ordered: false, start: 1 }, vec![item(vec![code])]);
        assert_eq!(emit(&list), "-\n    ```\n    x\n    ```");
    }
}

//! Fold ranges for the line at a position

use std::ops::Range;

use crate::editor::syntax::lines::{line_end, line_start};
use crate::editor::syntax::{SyntaxKind, SyntaxTree};

/// Range hidden when folding the line containing `pos`.
///
/// A heading folds its section, up to the next heading of the same or a
/// higher level. Multi-line paragraphs, quotes, list items, code blocks and
/// tables fold from the end of their first line.
#[must_use]
pub fn fold_range(tree: &SyntaxTree, doc: &str, pos: usize) -> Option<Range<usize>> {
    let pos = floor_char_boundary(doc, pos.min(doc.len()));
    let from = line_start(doc, pos);
    let to = line_end(doc, pos);

    let blocks = tree.blocks();
    for (i, block) in blocks.iter().enumerate() {
        if block.from() > to {
            break;
        }
        let Some(level) = block.kind.heading_level() else {
            continue;
        };
        if block.from() < from {
            continue;
        }
        let section_end = blocks[i + 1..]
            .iter()
            .take_while(|b| b.kind.heading_level().is_none_or(|l| l > level))
            .last()
            .map_or(block.to(), |b| b.to());
        return (section_end > to).then_some(to..section_end);
    }

    let mut found = None;
    tree.iterate(from..to, |node| {
        let foldable = matches!(
            node.kind,
            SyntaxKind::Paragraph
                | SyntaxKind::Blockquote
                | SyntaxKind::ListItem
                | SyntaxKind::FencedCode
                | SyntaxKind::Table
        );
        if found.is_none() && foldable && (from..=to).contains(&node.from()) && node.to() > to {
            found = Some(to..node.to());
        }
    });
    found
}

fn floor_char_boundary(doc: &str, mut pos: usize) -> usize {
    while !doc.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_folds_its_section() {
        let doc = "# A\n\ntext\n\n## B\n\nmore\n\n# C";
        let tree = SyntaxTree::parse(doc);
        assert_eq!(fold_range(&tree, doc, 0), Some(3..doc.find("\n\n# C").unwrap_or(0)));
        let b = doc.find("## B").unwrap_or(0);
        assert_eq!(fold_range(&tree, doc, b + 1), Some(b + 4..b + 10));
        assert_eq!(fold_range(&tree, doc, doc.len()), None);
    }

    #[test]
    fn code_block_folds_after_first_line() {
        let doc = "```\na\nb\n```";
        let tree = SyntaxTree::parse(doc);
        assert_eq!(fold_range(&tree, doc, 1), Some(3..doc.len()));
        assert_eq!(fold_range(&tree, doc, 5), None);
    }

    #[test]
    fn table_folds_below_header() {
        let doc = "| a | b |\n| - | - |\n| 1 | 2 |";
        let tree = SyntaxTree::parse(doc);
        assert_eq!(fold_range(&tree, doc, 2), Some(9..doc.len()));
        assert_eq!(fold_range(&tree, doc, doc.len()), None);
    }
}

use std::ops::Range;

use serde::Serialize;

/// Tag of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    // Blocks
    AtxHeading(u8),
    Paragraph,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    FencedCode,
    HorizontalRule,
    Table,
    TableHeader,
    TableRow,

    // Inline
    Emphasis,
    StrongEmphasis,
    InlineCode,
    Link,
    Image,
    Autolink,
    Escape,
    HardBreak,

    // Markup
    HeaderMark,
    QuoteMark,
    ListMark,
    CodeMark,
    CodeInfo,
    CodeText,
    EmphasisMark,
    LinkMark,
    Url,
    LinkTitle,
    TableCell,
    /// Column pipes and the delimiter row under the header
    TableDelimiter,
}

impl SyntaxKind {
    #[must_use]
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Self::AtxHeading(_)
                | Self::Paragraph
                | Self::Blockquote
                | Self::BulletList
                | Self::OrderedList
                | Self::ListItem
                | Self::FencedCode
                | Self::HorizontalRule
                | Self::Table
        )
    }

    /// Syntax characters rather than content
    #[must_use]
    pub fn is_mark(self) -> bool {
        matches!(
            self,
            Self::HeaderMark
                | Self::QuoteMark
                | Self::ListMark
                | Self::CodeMark
                | Self::EmphasisMark
                | Self::LinkMark
                | Self::TableDelimiter
        )
    }

    /// Heading level, if this is a heading
    #[must_use]
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Self::AtxHeading(level) => Some(level),
            _ => None,
        }
    }
}

/// A tagged span of the document.
///
/// Children are ordered by position, disjoint, and lie inside `range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    #[must_use]
    pub fn leaf(kind: SyntaxKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn new(kind: SyntaxKind, range: Range<usize>, children: Vec<SyntaxNode>) -> Self {
        Self { kind, range, children }
    }

    #[must_use]
    pub fn from(&self) -> usize {
        self.range.start
    }

    #[must_use]
    pub fn to(&self) -> usize {
        self.range.end
    }

    /// First direct child of `kind`
    #[must_use]
    pub fn child(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Move this node and all descendants by `delta` bytes
    pub fn shift(&mut self, delta: isize) {
        self.range = apply_delta(self.range.start, delta)..apply_delta(self.range.end, delta);
        for child in &mut self.children {
            child.shift(delta);
        }
    }

    #[must_use]
    pub fn shifted(mut self, delta: isize) -> Self {
        self.shift(delta);
        self
    }

    /// Depth-first pre-order walk over nodes touching `range`
    pub fn iterate(&self, range: &Range<usize>, visitor: &mut dyn FnMut(&SyntaxNode)) {
        if self.range.end < range.start || self.range.start > range.end {
            return;
        }
        visitor(self);
        for child in &self.children {
            child.iterate(range, visitor);
        }
    }
}

/// Apply a signed delta to an offset, saturating at 0
#[must_use]
pub fn apply_delta(val: usize, delta: isize) -> usize {
    if delta >= 0 {
        val.saturating_add(delta.unsigned_abs())
    } else {
        val.saturating_sub(delta.unsigned_abs())
    }
}

/// Which top-level blocks an edit replaced.
///
/// Blocks before `old_blocks.start` are untouched; blocks from
/// `old_blocks.end` on were reused, moved by `delta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    /// Replaced block indices in the previous tree
    pub old_blocks: Range<usize>,
    /// Freshly parsed block indices in the new tree
    pub new_blocks: Range<usize>,
    /// Length difference introduced by the edit
    pub delta: isize,
}

impl TreeChange {
    /// Change describing a from-scratch parse of every block
    #[must_use]
    pub fn full(old_len: usize, new_len: usize) -> Self {
        Self {
            old_blocks: 0..old_len,
            new_blocks: 0..new_len,
            delta: 0,
        }
    }
}

/// Syntax tree of a Markdown document: its top-level blocks in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    pub(crate) blocks: Vec<SyntaxNode>,
    pub(crate) len: usize,
}

impl SyntaxTree {
    /// Parse `doc` from scratch
    #[must_use]
    pub fn parse(doc: &str) -> Self {
        Self {
            blocks: super::block::parse_document(doc, 0),
            len: doc.len(),
        }
    }

    #[must_use]
    pub fn blocks(&self) -> &[SyntaxNode] {
        &self.blocks
    }

    /// Length of the parsed document in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Visit, depth first, every node touching `range`
    pub fn iterate(&self, range: Range<usize>, mut visitor: impl FnMut(&SyntaxNode)) {
        for block in &self.blocks {
            if block.range.start > range.end {
                break;
            }
            block.iterate(&range, &mut visitor);
        }
    }

    /// Innermost-last chain of nodes containing `pos`
    #[must_use]
    pub fn nodes_at(&self, pos: usize) -> Vec<&SyntaxNode> {
        let mut chain = Vec::new();
        let mut level = self.blocks.as_slice();
        while let Some(node) = level.iter().find(|n| n.range.start <= pos && pos <= n.range.end) {
            chain.push(node);
            level = &node.children;
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_moves_descendants() {
        let node = SyntaxNode::new(
            SyntaxKind::Paragraph,
            2..10,
            vec![SyntaxNode::leaf(SyntaxKind::Escape, 4..6)],
        )
        .shifted(-2);
        assert_eq!(node.range, 0..8);
        assert_eq!(node.children[0].range, 2..4);
    }

    #[test]
    fn iterate_visits_overlapping_nodes_in_order() {
        let tree = SyntaxTree::parse("# Title\n\ntext *em*\n\nlast");
        let mut kinds = Vec::new();
        tree.iterate(9..12, |node| kinds.push(node.kind));
        assert_eq!(kinds, vec![SyntaxKind::Paragraph]);

        let mut kinds = Vec::new();
        tree.iterate(0..tree.len(), |node| kinds.push(node.kind));
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::AtxHeading(1),
                SyntaxKind::HeaderMark,
                SyntaxKind::Paragraph,
                SyntaxKind::Emphasis,
                SyntaxKind::EmphasisMark,
                SyntaxKind::EmphasisMark,
                SyntaxKind::Paragraph,
            ]
        );
    }
}

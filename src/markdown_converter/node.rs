//! Normalized node tree shared by the normalizer and the emitter

use serde::Serialize;

/// Semantic kind of a normalized node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Heading { level: u8 },
    Paragraph,
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: Option<String> },
    /// Alt text is carried as a single `Text` child
    Image { src: String, title: Option<String> },
    List { ordered: bool, start: u64 },
    ListItem { ordered: bool },
    CodeBlock { lang: Option<String> },
    InlineCode,
    Blockquote,
    /// The first row is the header row
    Table,
    TableRow,
    TableCell,
    LineBreak,
    ThematicBreak,
    Text { content: String },
}

/// One node of the normalized tree.
///
/// **INVARIANTS** (upheld by the normalizer's constructors):
/// - `Document`, `Blockquote` and `ListItem` hold only block nodes
/// - `List` holds only `ListItem`s
/// - `Table` holds only `TableRow`s, which hold only `TableCell`s
/// - every other container holds only inline nodes
/// - leaves are `Text`, `LineBreak` or `ThematicBreak`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MdNode {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MdNode>,
}

impl MdNode {
    #[must_use]
    pub fn new(kind: NodeKind, children: Vec<MdNode>) -> Self {
        Self { kind, children }
    }

    #[must_use]
    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Text {
            content: content.into(),
        })
    }

    #[must_use]
    pub fn empty_document() -> Self {
        Self::leaf(NodeKind::Document)
    }

    /// Block-level nodes are separated by blank lines when emitted
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document
                | NodeKind::Heading { .. }
                | NodeKind::Paragraph
                | NodeKind::List { .. }
                | NodeKind::ListItem { .. }
                | NodeKind::CodeBlock { .. }
                | NodeKind::Blockquote
                | NodeKind::ThematicBreak
                | NodeKind::Table
                | NodeKind::TableRow
                | NodeKind::TableCell
        )
    }

    #[must_use]
    pub fn is_inline(&self) -> bool {
        !self.is_block()
    }

    /// Inline nodes whose children are themselves inline content
    #[must_use]
    pub fn is_inline_container(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Emphasis | NodeKind::Strong | NodeKind::Strikethrough | NodeKind::Link { .. }
        )
    }

    /// Text content of a `Text` leaf
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Concatenated text of all descendant `Text` leaves
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &MdNode, out: &mut String) {
    if let Some(text) = node.as_text() {
        out.push_str(text);
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let link = MdNode::new(
            NodeKind::Link {
                href: "https://x.org".into(),
                title: None,
            },
            vec![MdNode::text("docs")],
        );
        let json = serde_json::to_value(MdNode::new(NodeKind::Paragraph, vec![link])).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({
                "kind": { "type": "paragraph" },
                "children": [{
                    "kind": { "type": "link", "href": "https://x.org", "title": null },
                    "children": [{ "kind": { "type": "text", "content": "docs" } }],
                }],
            })
        );
    }

    #[test]
    fn table_parts_are_blocks() {
        for kind in [NodeKind::Table, NodeKind::TableRow, NodeKind::TableCell] {
            assert!(MdNode::leaf(kind).is_block());
        }
    }
}

//! Rendering of inline nodes

use std::borrow::Cow;

use crate::config::{BrStyle, ConversionOptions};
use crate::markdown_converter::node::{MdNode, NodeKind};

use super::escape::escape_text;

/// Where the inline run is placed, which changes how breaks and line starts behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InlineContext {
    Paragraph,
    /// ATX heading content: a single line, line breaks become spaces
    Heading,
    /// Pipe table cell: a single line where `|` must be escaped
    TableCell,
}

/// How a character next to an emphasis delimiter run is classified when
/// deciding whether the run can open or close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flank {
    Space,
    Punctuation,
    Word,
}

impl Flank {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            Self::Space
        } else if c.is_alphanumeric() {
            Self::Word
        } else {
            Self::Punctuation
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

pub(crate) struct InlineWriter<'a> {
    out: String,
    options: &'a ConversionOptions,
    context: InlineContext,
}

impl<'a> InlineWriter<'a> {
    pub(crate) fn new(options: &'a ConversionOptions, context: InlineContext) -> Self {
        Self {
            out: String::new(),
            options,
            context,
        }
    }

    pub(crate) fn finish(self) -> String {
        match self.context {
            InlineContext::TableCell => self.out.replace('|', "\\|"),
            InlineContext::Paragraph | InlineContext::Heading => self.out,
        }
    }

    pub(crate) fn write_nodes(&mut self, nodes: &[MdNode]) {
        self.write_run(nodes, None);
    }

    /// Write sibling nodes; `after` classifies whatever follows the run,
    /// `None` being the end of the line
    fn write_run(&mut self, nodes: &[MdNode], after: Option<Flank>) {
        for (i, node) in nodes.iter().enumerate() {
            let next = nodes[i + 1..]
                .iter()
                .find_map(|sibling| self.outer_flank(sibling, Edge::Start))
                .or(after);
            self.write_node(node, next);
        }
    }

    fn at_line_start(&self) -> bool {
        self.context == InlineContext::Paragraph && (self.out.is_empty() || self.out.ends_with('\n'))
    }

    fn write_text(&mut self, text: &str) {
        let escaped = escape_text(text, self.at_line_start());
        self.out.push_str(&escaped);
    }

    fn write_node(&mut self, node: &MdNode, after: Option<Flank>) {
        match &node.kind {
            NodeKind::Text { content } => self.write_text(content),
            NodeKind::Emphasis | NodeKind::Strong | NodeKind::Strikethrough => {
                if let Some(delimiter) = delimiter_of(&node.kind) {
                    self.write_delimited(delimiter, &node.children, after);
                }
            }
            NodeKind::Link { href, title } => {
                // `!` followed by `[` opens an image
                if ends_with_unescaped(&self.out, '!') {
                    let at = self.out.len() - 1;
                    self.out.insert(at, '\\');
                }
                self.out.push('[');
                self.write_run(&node.children, Some(Flank::Punctuation));
                self.out.push_str("](");
                self.write_destination(href, title.as_deref());
                self.out.push(')');
            }
            NodeKind::Image { src, title } => {
                let alt = node.plain_text();
                self.out.push_str("![");
                self.out.push_str(&escape_text(&alt, false));
                self.out.push_str("](");
                self.write_destination(src, title.as_deref());
                self.out.push(')');
            }
            NodeKind::InlineCode => self.out.push_str(&code_span(&node.plain_text())),
            NodeKind::LineBreak => match (self.context, self.options.br_style()) {
                (InlineContext::Heading | InlineContext::TableCell, _) => self.out.push(' '),
                (InlineContext::Paragraph, BrStyle::Backslash) => self.out.push_str("\\\n"),
                (InlineContext::Paragraph, BrStyle::TwoSpaces) => self.out.push_str("  \n"),
            },
            // Block nodes never appear inline in a normalized tree; keep their text
            _ => {
                let text = node.plain_text();
                self.write_text(&text);
            }
        }
    }

    /// Wrap `children` in `delimiter`.
    ///
    /// A delimiter run only opens when it is not followed by whitespace, and
    /// not followed by punctuation while preceded by a word character (and
    /// the mirror image for closing). Edge punctuation that would break this
    /// is moved outside the delimiters. When the offending edge is not text
    /// the delimiters are dropped and the content is kept.
    fn write_delimited(&mut self, delimiter: &str, children: &[MdNode], after: Option<Flank>) {
        let before = self.out.chars().next_back().map(Flank::of);
        let mut children = Cow::Borrowed(children);
        let mut lead = String::new();
        let mut trail = String::new();

        if !can_open(before, content_flank(&children, delimiter, Edge::Start)) {
            match split_text_edge(children.to_mut(), Edge::Start) {
                Some(moved) => lead = moved,
                None => return self.write_run(&children, after),
            }
        }
        if children.is_empty() {
            self.write_text(&lead);
            return;
        }
        if !can_close(content_flank(&children, delimiter, Edge::End), after) {
            match split_text_edge(children.to_mut(), Edge::End) {
                Some(moved) => trail = moved,
                None => {
                    self.write_text(&lead);
                    return self.write_run(&children, after);
                }
            }
        }

        self.write_text(&lead);
        self.out.push_str(delimiter);
        self.write_run(&children, Some(Flank::Punctuation));
        self.out.push_str(delimiter);
        self.write_text(&trail);
    }

    /// Class of the first (or last) character `node` renders to, `None` when
    /// it renders nothing
    fn outer_flank(&self, node: &MdNode, edge: Edge) -> Option<Flank> {
        match &node.kind {
            NodeKind::Text { content } => edge_char(content, edge).map(Flank::of),
            NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Strikethrough
            | NodeKind::Link { .. }
            | NodeKind::Image { .. }
            | NodeKind::InlineCode => Some(Flank::Punctuation),
            NodeKind::LineBreak => match (edge, self.context, self.options.br_style()) {
                (Edge::Start, InlineContext::Paragraph, BrStyle::Backslash) => Some(Flank::Punctuation),
                _ => Some(Flank::Space),
            },
            _ => edge_char(&node.plain_text(), edge).map(Flank::of),
        }
    }

    fn write_destination(&mut self, url: &str, title: Option<&str>) {
        self.out.push_str(&link_destination(url));
        if let Some(title) = title {
            self.out.push_str(" \"");
            self.out.push_str(&title.replace('\\', "\\\\").replace('"', "\\\""));
            self.out.push('"');
        }
    }
}

fn delimiter_of(kind: &NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::Emphasis => Some("*"),
        NodeKind::Strong => Some("**"),
        NodeKind::Strikethrough => Some("~~"),
        _ => None,
    }
}

fn edge_char(text: &str, edge: Edge) -> Option<char> {
    match edge {
        Edge::Start => text.chars().next(),
        Edge::End => text.chars().next_back(),
    }
}

/// Class of the character next to `delimiter` inside the content.
///
/// A nested container using the same delimiter character joins the outer run,
/// so the character that counts is the one inside it.
fn content_flank(children: &[MdNode], delimiter: &str, edge: Edge) -> Option<Flank> {
    let flank = |node: &MdNode| match (&node.kind, delimiter_of(&node.kind)) {
        (NodeKind::Text { content }, _) => edge_char(content, edge).map(Flank::of),
        (_, Some(inner)) if inner.chars().next() == delimiter.chars().next() => {
            content_flank(&node.children, delimiter, edge)
        }
        (NodeKind::LineBreak, _) => Some(Flank::Space),
        _ => Some(Flank::Punctuation),
    };
    match edge {
        Edge::Start => children.iter().find_map(flank),
        Edge::End => children.iter().rev().find_map(flank),
    }
}

fn can_open(before: Option<Flank>, first: Option<Flank>) -> bool {
    match first {
        None | Some(Flank::Space) => false,
        Some(Flank::Word) => true,
        Some(Flank::Punctuation) => before != Some(Flank::Word),
    }
}

fn can_close(last: Option<Flank>, after: Option<Flank>) -> bool {
    match last {
        None | Some(Flank::Space) => false,
        Some(Flank::Word) => true,
        Some(Flank::Punctuation) => after != Some(Flank::Word),
    }
}

/// Detach the run of punctuation and whitespace at one edge of a leading (or
/// trailing) text child. `None` when that child is not text or has no such run.
fn split_text_edge(children: &mut Vec<MdNode>, edge: Edge) -> Option<String> {
    let index = match edge {
        Edge::Start => 0,
        Edge::End => children.len().checked_sub(1)?,
    };
    let NodeKind::Text { content } = &mut children.get_mut(index)?.kind else {
        return None;
    };
    let movable = |c: char| Flank::of(c) != Flank::Word;
    let moved = match edge {
        Edge::Start => {
            let keep_from = content
                .char_indices()
                .find(|&(_, c)| !movable(c))
                .map_or(content.len(), |(i, _)| i);
            let rest = content.split_off(keep_from);
            std::mem::replace(content, rest)
        }
        Edge::End => {
            let keep_to = content
                .char_indices()
                .rev()
                .find(|&(_, c)| !movable(c))
                .map_or(0, |(i, c)| i + c.len_utf8());
            content.split_off(keep_to)
        }
    };
    if moved.is_empty() {
        return None;
    }
    if content.is_empty() {
        children.remove(index);
    }
    Some(moved)
}

/// `text` ends with `symbol` and that `symbol` is not backslash-escaped
fn ends_with_unescaped(text: &str, symbol: char) -> bool {
    let Some(rest) = text.strip_suffix(symbol) else {
        return false;
    };
    rest.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0
}


/// Format a link destination, using the `<...>` form when the plain form
/// would end early (spaces, unbalanced parentheses, angle brackets).
pub(crate) fn link_destination(url: &str) -> Cow<'_, str> {
    let needs_angle = url.is_empty()
        || url.contains(|c: char| c.is_whitespace() || c.is_control() || c == '<' || c == '>')
        || !parens_balanced(url);

    if !needs_angle {
        return if url.contains('\\') {
            Cow::Owned(url.replace('\\', "\\\\"))
        } else {
            Cow::Borrowed(url)
        };
    }

    let mut out = String::with_capacity(url.len() + 2);
    out.push('<');
    for c in url.chars() {
        match c {
            '\\' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            _ => out.push(c),
        }
    }
    out.push('>');
    Cow::Owned(out)
}

fn parens_balanced(url: &str) -> bool {
    let mut depth: usize = 0;
    for c in url.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Wrap `content` in a backtick run longer than any run inside it.
///
/// Padding spaces are added when the content starts or ends with a backtick,
/// or when it both starts and ends with a space (one of each would otherwise
/// be stripped).
pub(crate) fn code_span(content: &str) -> String {
    let longest_run = longest_run_of(content, '`');
    let fence = "`".repeat(longest_run + 1);
    let pad = content.starts_with('`')
        || content.ends_with('`')
        || (content.len() >= 2
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.bytes().all(|b| b == b' '));
    let space = if pad { " " } else { "" };
    format!("{fence}{space}{content}{space}{fence}")
}

/// Longest consecutive run of `symbol` in `text`
pub(crate) fn longest_run_of(text: &str, symbol: char) -> usize {
    text.chars()
        .fold((0, 0), |(max, current), c| {
            if c == symbol {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}


#[cfg(test)]
mod tests {
    use super::*;

    fn render(nodes: Vec<MdNode>) -> String {
        let options = ConversionOptions::default();
        let mut writer = InlineWriter::new(&options, InlineContext::Paragraph);
        writer.write_nodes(&nodes);
        writer.finish()
    }

    fn wrap(kind: NodeKind, text: &str) -> MdNode {
        MdNode::new(kind, vec![MdNode::text(text)])
    }

    fn link(text: &str) -> MdNode {
        MdNode::new(
            NodeKind::Link {
                href: "https://x.org".into(),
                title: None,
            },
            vec![MdNode::text(text)],
        )
    }

    #[test]
    fn code_span_grows_fence_past_inner_backticks() {
        assert_eq!(code_span("let x"), "`let x`");
        assert_eq!(code_span("a ` b"), "``a ` b``");
        assert_eq!(code_span("`tick"), "`` `tick ``");
        assert_eq!(code_span(" padded "), "`  padded  `");
    }

    #[test]
    fn destination_uses_angle_form_when_needed() {
        assert_eq!(link_destination("https://example.com/a"), "https://example.com/a");
        assert_eq!(link_destination("my file.md"), "<my file.md>");
        assert_eq!(link_destination("a)b"), "<a)b>");
        assert_eq!(link_destination("wiki/Foo_(bar)"), "wiki/Foo_(bar)");
        assert_eq!(link_destination(""), "<>");
    }

    #[test]
    fn bang_before_link_is_escaped() {
        assert_eq!(render(vec![MdNode::text("Wow!"), link("docs")]), r"Wow\![docs](https://x.org)");
        assert_eq!(render(vec![MdNode::text("Wow! "), link("docs")]), "Wow! [docs](https://x.org)");
        // An escaped backslash leaves the `!` bare
        assert_eq!(
            render(vec![MdNode::text("\\!"), link("d")]),
            r"\\\![d](https://x.org)"
        );
    }

    #[test]
    fn edge_punctuation_moves_outside_delimiters() {
        assert_eq!(
            render(vec![MdNode::text("foo"), wrap(NodeKind::Emphasis, "(bar)"), MdNode::text("baz")]),
            "foo(*bar*)baz"
        );
        assert_eq!(
            render(vec![wrap(NodeKind::Strong, "Note:"), MdNode::text("text")]),
            "**Note**:text"
        );
        assert_eq!(
            render(vec![MdNode::text("x"), wrap(NodeKind::Strong, "\"q\""), MdNode::text("y")]),
            "x\"**q**\"y"
        );
    }

    #[test]
    fn edge_punctuation_stays_inside_when_flanking_allows() {
        assert_eq!(render(vec![wrap(NodeKind::Strong, "Note:"), MdNode::text(" text")]), "**Note:** text");
        assert_eq!(render(vec![MdNode::text("a "), wrap(NodeKind::Emphasis, "(b)")]), "a *(b)*");
        assert_eq!(render(vec![MdNode::text("in"), wrap(NodeKind::Emphasis, "word"), MdNode::text("s")]), "in*word*s");
    }

    #[test]
    fn punctuation_only_content_loses_delimiters() {
        assert_eq!(render(vec![MdNode::text("a"), wrap(NodeKind::Strong, ":"), MdNode::text("b")]), "a:b");
    }

    #[test]
    fn delimiters_dropped_when_edge_is_not_text() {
        let strong_link = MdNode::new(NodeKind::Strong, vec![link("x")]);
        assert_eq!(
            render(vec![MdNode::text("a"), strong_link, MdNode::text("b")]),
            "a[x](https://x.org)b"
        );
    }

    #[test]
    fn table_cell_escapes_pipes() {
        let options = ConversionOptions::default();
        let mut writer = InlineWriter::new(&options, InlineContext::TableCell);
        writer.write_nodes(&[
            MdNode::text("a|b"),
            MdNode::leaf(NodeKind::LineBreak),
            MdNode::new(NodeKind::InlineCode, vec![MdNode::text("x|y")]),
        ]);
        assert_eq!(writer.finish(), r"a\|b `x\|y`");
    }
}

//! Decorations derived from the syntax tree
//!
//! Decorations are presentation instructions for the host editor: marks
//! styling a span, widgets inserted at a position or shown in place of a
//! span, and line classes. They
//! hold no state of their own; the same tree and document always derive the
//! same set.

mod cursor;
mod links_and_images;
mod markup;
mod table;

use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;

use crate::editor::syntax::{SyntaxNode, SyntaxTree, TreeChange};

pub use cursor::cursor_decorations;
pub use links_and_images::{decorate_image_with_class, decorate_image_with_rendered, decorate_link};
pub use markup::{decorate_markup, decorate_styles};
pub use table::decorate_table;

/// Styling applied to a span
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkSpec {
    /// Element to wrap the span in, if not the default
    pub tag_name: Option<String>,
    pub class: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl MarkSpec {
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Interactive content rendered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Widget {
    Image { src: String, alt: String },
    /// Cell source text by row; empty cells are kept as empty strings
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetSpec {
    pub widget: Widget,
    /// Positive: the widget sits after the cursor at its position
    pub side: i8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSpec {
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    Mark(MarkSpec),
    Widget(WidgetSpec),
    /// The span is hidden and the widget is shown as a block in its place
    Replace(WidgetSpec),
    Line(LineSpec),
}

/// A decoration over `from..to`; widgets and line decorations have `from == to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecorationRange {
    pub from: usize,
    pub to: usize,
    pub decoration: Decoration,
}

impl DecorationRange {
    #[must_use]
    pub fn new(from: usize, to: usize, decoration: Decoration) -> Self {
        Self { from, to, decoration }
    }

    #[must_use]
    pub fn mark(from: usize, to: usize, spec: MarkSpec) -> Self {
        Self::new(from, to, Decoration::Mark(spec))
    }

    fn shifted(mut self, delta: isize) -> Self {
        self.from = crate::editor::syntax::apply_delta(self.from, delta);
        self.to = crate::editor::syntax::apply_delta(self.to, delta);
        self
    }
}

/// Decorations ordered by start position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecorationSet {
    ranges: Vec<DecorationRange>,
}

impl DecorationSet {
    #[must_use]
    pub fn ranges(&self) -> &[DecorationRange] {
        &self.ranges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecorationRange> {
        self.ranges.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Decorations overlapping `range`
    pub fn in_range(&self, range: Range<usize>) -> impl Iterator<Item = &DecorationRange> {
        self.ranges
            .iter()
            .filter(move |d| d.from <= range.end && d.to >= range.start)
    }
}

impl FromIterator<DecorationRange> for DecorationSet {
    /// Sorts stably by start, keeping emission order for equal starts
    fn from_iter<T: IntoIterator<Item = DecorationRange>>(iter: T) -> Self {
        let mut ranges: Vec<_> = iter.into_iter().collect();
        ranges.sort_by_key(|d| d.from);
        Self { ranges }
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a DecorationRange;
    type IntoIter = std::slice::Iter<'a, DecorationRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

/// Derives decorations for one syntax node.
///
/// Called for every node of the tree in depth-first order; `emit` takes any
/// number of decorations, which must lie within the node's top-level block.
pub trait NodeDecorator: Send + Sync {
    fn decorate(&self, node: &SyntaxNode, doc: &str, emit: &mut dyn FnMut(DecorationRange));
}

impl<F> NodeDecorator for F
where
    F: Fn(&SyntaxNode, &str, &mut dyn FnMut(DecorationRange)) + Send + Sync,
{
    fn decorate(&self, node: &SyntaxNode, doc: &str, emit: &mut dyn FnMut(DecorationRange)) {
        self(node, doc, emit)
    }
}

/// Ordered list of node decorators
pub struct MarkdownDecorators {
    decorators: Vec<Box<dyn NodeDecorator>>,
}

impl Default for MarkdownDecorators {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MarkdownDecorators {
    /// No decorators
    #[must_use]
    pub fn empty() -> Self {
        Self {
            decorators: Vec::new(),
        }
    }

    /// Links, images, tables, syntax marks and styling
    #[must_use]
    pub fn builtin() -> Self {
        let mut decorators = Self::empty();
        decorators.add(decorate_image_with_class);
        decorators.add(decorate_image_with_rendered);
        decorators.add(decorate_link);
        decorators.add(decorate_table);
        decorators.add(decorate_markup);
        decorators.add(decorate_styles);
        decorators
    }

    pub fn add(&mut self, decorator: impl NodeDecorator + 'static) {
        self.decorators.push(Box::new(decorator));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Decorations of every block in `tree`
    #[must_use]
    pub fn derive(&self, tree: &SyntaxTree, doc: &str) -> DecorationSet {
        tree.blocks()
            .iter()
            .flat_map(|block| self.derive_block(block, doc))
            .collect()
    }

    /// Decorations of one top-level block, sorted by start
    #[must_use]
    pub fn derive_block(&self, block: &SyntaxNode, doc: &str) -> Vec<DecorationRange> {
        let mut out = Vec::new();
        let range = block.range.clone();
        block.iterate(&range, &mut |node| {
            for decorator in &self.decorators {
                decorator.decorate(node, doc, &mut |deco| out.push(deco));
            }
        });
        out.sort_by_key(|d| d.from);
        out
    }
}

/// Per-block decorations kept in step with the syntax tree
#[derive(Debug, Clone, Default)]
pub struct DecorationStore {
    blocks: Vec<Vec<DecorationRange>>,
}

impl DecorationStore {
    /// Derive decorations for every block of `tree`
    #[must_use]
    pub fn new(decorators: &MarkdownDecorators, tree: &SyntaxTree, doc: &str) -> Self {
        Self {
            blocks: tree
                .blocks()
                .iter()
                .map(|block| decorators.derive_block(block, doc))
                .collect(),
        }
    }

    /// Bring the store in line with `tree` after `change`.
    ///
    /// Only the re-parsed blocks are derived again; decorations of reused
    /// blocks move by the edit delta.
    pub fn update(&mut self, decorators: &MarkdownDecorators, tree: &SyntaxTree, doc: &str, change: &TreeChange) {
        let old_end = change.old_blocks.end.min(self.blocks.len());
        let start = change.old_blocks.start.min(old_end);
        let tail: Vec<Vec<DecorationRange>> = self
            .blocks
            .drain(old_end..)
            .map(|decos| decos.into_iter().map(|d| d.shifted(change.delta)).collect())
            .collect();
        self.blocks.truncate(start);
        self.blocks.extend(
            tree.blocks()[change.new_blocks.clone()]
                .iter()
                .map(|block| decorators.derive_block(block, doc)),
        );
        self.blocks.extend(tail);
        debug_assert_eq!(self.blocks.len(), tree.blocks().len());
    }

    /// Number of decorations
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecorationRange> {
        self.blocks.iter().flatten()
    }

    #[must_use]
    pub fn to_set(&self) -> DecorationSet {
        DecorationSet {
            ranges: self.iter().cloned().collect(),
        }
    }
}

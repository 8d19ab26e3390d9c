//! Markdown syntax tree for the editor
//!
//! The dialect is a CommonMark subset plus pipe tables: ATX headings, fenced
//! code, thematic breaks, blockquotes, bullet and ordered lists, tables and
//! paragraphs; inline
//! escapes, code spans, emphasis, links, images, autolinks and hard breaks.
//! Setext headings, indented code, HTML blocks and reference links are not
//! recognized.
//!
//! Offsets are byte offsets into the document.

mod block;
mod incremental;
mod inline;
pub(crate) mod lines;
mod tree;

pub use tree::{SyntaxKind, SyntaxNode, SyntaxTree, TreeChange, apply_delta};

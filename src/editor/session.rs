use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use crate::error::EditError;

use super::decoration::{DecorationSet, DecorationStore, MarkdownDecorators, cursor_decorations};
use super::edit::TextEdit;
use super::folding::fold_range;
use super::syntax::{SyntaxTree, TreeChange};

/// One open document with its syntax tree and decorations.
///
/// Edits go through [`apply`](Self::apply), which re-parses and re-decorates
/// only what the edit affected.
pub struct EditorSession {
    doc: String,
    tree: SyntaxTree,
    decorations: DecorationStore,
    decorators: Arc<MarkdownDecorators>,
    version: u64,
}

impl EditorSession {
    pub(crate) fn new(doc: String, decorators: Arc<MarkdownDecorators>) -> Self {
        let tree = SyntaxTree::parse(&doc);
        let decorations = DecorationStore::new(&decorators, &tree, &doc);
        Self {
            doc,
            tree,
            decorations,
            decorators,
            version: 0,
        }
    }

    /// Apply `edit` and update the tree and decorations
    pub fn apply(&mut self, edit: TextEdit) -> Result<TreeChange, EditError> {
        edit.validate(&self.doc)?;

        let mut doc = std::mem::take(&mut self.doc);
        edit.apply_to(&mut doc);
        let (tree, change) = self.tree.apply_edit(&doc, &edit);
        self.decorations.update(&self.decorators, &tree, &doc, &change);
        self.doc = doc;
        self.tree = tree;
        self.version += 1;

        debug!(
            target: "markdown_bridge::editor",
            version = self.version,
            reparsed = change.new_blocks.len(),
            blocks = self.tree.blocks().len(),
            "applied edit"
        );
        Ok(change)
    }

    /// Replace the whole document
    pub fn set_doc(&mut self, doc: impl Into<String>) -> TreeChange {
        let doc = doc.into();
        let old_blocks = self.tree.blocks().len();
        self.tree = SyntaxTree::parse(&doc);
        self.decorations = DecorationStore::new(&self.decorators, &self.tree, &doc);
        self.doc = doc;
        self.version += 1;
        TreeChange::full(old_blocks, self.tree.blocks().len())
    }

    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    #[must_use]
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    #[must_use]
    pub fn decorations(&self) -> DecorationSet {
        self.decorations.to_set()
    }

    /// Number of edits applied since the session was opened
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn fold_range(&self, pos: usize) -> Option<Range<usize>> {
        fold_range(&self.tree, &self.doc, pos)
    }

    #[must_use]
    pub fn cursor_decorations(&self, selection: &[Range<usize>]) -> DecorationSet {
        cursor_decorations(&self.doc, selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(doc: &str) -> EditorSession {
        EditorSession::new(doc.to_string(), Arc::new(MarkdownDecorators::builtin()))
    }

    #[test]
    fn edits_keep_decorations_in_step() {
        let mut session = session("# Title\n\nsome *text*\n\n[link](https://example.com)");
        session.apply(TextEdit::insert(14, "more ")).expect("valid edit");
        session.apply(TextEdit::replace(0..1, "##")).expect("valid edit");
        session.apply(TextEdit::delete(9..11)).expect("valid edit");

        assert_eq!(session.version(), 3);
        let full = MarkdownDecorators::builtin().derive(session.tree(), session.doc());
        assert_eq!(session.decorations(), full);
        assert_eq!(*session.tree(), SyntaxTree::parse(session.doc()));
    }

    #[test]
    fn invalid_edit_leaves_session_untouched() {
        let mut session = session("abc");
        let err = session.apply(TextEdit::delete(2..9)).expect_err("out of bounds");
        assert_eq!(err, EditError::OutOfBounds { range: 2..9, len: 3 });
        assert_eq!(session.doc(), "abc");
        assert_eq!(session.version(), 0);
    }
}

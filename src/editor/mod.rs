//! Editor-side Markdown support
//!
//! [`markdown_extension`] is the integration point: it bundles the syntax
//! parser and the decorators, and opens [`EditorSession`]s over documents.
//!
//! ```rust
//! use markdown_bridge::editor::{TextEdit, markdown_extension};
//!
//! let mut session = markdown_extension().open("[docs](https://example.com)");
//! session.apply(TextEdit::insert(0, "See ")).unwrap();
//! assert_eq!(session.doc(), "See [docs](https://example.com)");
//! assert!(!session.decorations().is_empty());
//! ```

pub mod decoration;
pub mod edit;
pub mod folding;
pub mod session;
pub mod syntax;

use std::sync::Arc;

pub use decoration::{
    Decoration, DecorationRange, DecorationSet, DecorationStore, MarkSpec, MarkdownDecorators,
    NodeDecorator, Widget, WidgetSpec, cursor_decorations,
};
pub use edit::TextEdit;
pub use folding::fold_range;
pub use session::EditorSession;
pub use syntax::{SyntaxKind, SyntaxNode, SyntaxTree, TreeChange};

/// Syntax parser plus decorators, ready to open editor sessions
#[derive(Clone)]
pub struct MarkdownExtension {
    decorators: Arc<MarkdownDecorators>,
}

impl Default for MarkdownExtension {
    fn default() -> Self {
        markdown_extension()
    }
}

impl MarkdownExtension {
    #[must_use]
    pub fn builder() -> MarkdownExtensionBuilder {
        MarkdownExtensionBuilder::default()
    }

    /// Open a session over `doc`
    pub fn open(&self, doc: impl Into<String>) -> EditorSession {
        EditorSession::new(doc.into(), Arc::clone(&self.decorators))
    }

    #[must_use]
    pub fn decorators(&self) -> &MarkdownDecorators {
        &self.decorators
    }

    /// Parse and decorate `doc` without opening a session
    #[must_use]
    pub fn decorate(&self, doc: &str) -> DecorationSet {
        self.decorators.derive(&SyntaxTree::parse(doc), doc)
    }
}

/// The Markdown extension with the builtin decorators
#[must_use]
pub fn markdown_extension() -> MarkdownExtension {
    MarkdownExtension::builder().build()
}

/// Fluent builder for [`MarkdownExtension`]
pub struct MarkdownExtensionBuilder {
    decorators: MarkdownDecorators,
}

impl Default for MarkdownExtensionBuilder {
    fn default() -> Self {
        Self {
            decorators: MarkdownDecorators::builtin(),
        }
    }
}

impl MarkdownExtensionBuilder {
    /// Drop the builtin decorators
    #[must_use]
    pub fn without_builtin_decorators(mut self) -> Self {
        self.decorators = MarkdownDecorators::empty();
        self
    }

    /// Append a decorator; it runs after those already added
    #[must_use]
    pub fn decorator(mut self, decorator: impl NodeDecorator + 'static) -> Self {
        self.decorators.add(decorator);
        self
    }

    #[must_use]
    pub fn build(self) -> MarkdownExtension {
        MarkdownExtension {
            decorators: Arc::new(self.decorators),
        }
    }
}

use crate::editor::syntax::{SyntaxKind, SyntaxNode};

use super::{DecorationRange, MarkSpec};

/// `cm-markup` on syntax characters: heading, emphasis, code, list, quote and link marks
pub fn decorate_markup(node: &SyntaxNode, _doc: &str, emit: &mut dyn FnMut(DecorationRange)) {
    if node.kind.is_mark() {
        emit(DecorationRange::mark(node.from(), node.to(), MarkSpec::class("cm-markup")));
    }
}

/// Presentation classes for headings, emphasis, code and quotes
pub fn decorate_styles(node: &SyntaxNode, _doc: &str, emit: &mut dyn FnMut(DecorationRange)) {
    let class = match node.kind {
        SyntaxKind::AtxHeading(level) => format!("cm-header cm-header-{level}"),
        SyntaxKind::Emphasis => "cm-emphasis".to_string(),
        SyntaxKind::StrongEmphasis => "cm-strong".to_string(),
        SyntaxKind::InlineCode => "cm-inline-code".to_string(),
        SyntaxKind::FencedCode => "cm-code-block".to_string(),
        SyntaxKind::Blockquote => "cm-quote".to_string(),
        _ => return,
    };
    emit(DecorationRange::mark(node.from(), node.to(), MarkSpec::class(class)));
}

//! Link and image decorations

use crate::editor::syntax::{SyntaxKind, SyntaxNode};

use super::{Decoration, DecorationRange, MarkSpec, Widget, WidgetSpec};

/// Spans of a link, image or autolink
struct LinkLike {
    link_from: usize,
    link_to: usize,
    text_from: usize,
    text_to: usize,
    url: String,
    title: Option<String>,
}

/// Locate text, URL and title of a link or image.
///
/// `None` when the node has no destination, as in `[text]()`.
fn parse_link_like(node: &SyntaxNode, doc: &str) -> Option<LinkLike> {
    let mut marks = node.children.iter().filter(|c| c.kind == SyntaxKind::LinkMark);
    let open = marks.next()?;
    let close = marks.next()?;
    let url = node.child(SyntaxKind::Url)?;
    let title = node.child(SyntaxKind::LinkTitle).map(|t| {
        let raw = &doc[t.range.clone()];
        raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default().to_string()
    });
    Some(LinkLike {
        link_from: node.from(),
        link_to: node.to(),
        text_from: open.to(),
        text_to: close.from(),
        url: doc[url.range.clone()].to_string(),
        title,
    })
}

fn parse_autolink(node: &SyntaxNode, doc: &str) -> Option<LinkLike> {
    let url = node.child(SyntaxKind::Url)?;
    let target = &doc[url.range.clone()];
    let is_email = !target.contains(':') && target.contains('@');
    Some(LinkLike {
        link_from: node.from(),
        link_to: node.to(),
        text_from: url.from(),
        text_to: url.to(),
        url: if is_email {
            format!("mailto:{target}")
        } else {
            target.to_string()
        },
        title: None,
    })
}

/// `span[data-href]` over the whole link and an `a` element over its text.
///
/// Links with empty text or no destination get nothing.
pub fn decorate_link(node: &SyntaxNode, doc: &str, emit: &mut dyn FnMut(DecorationRange)) {
    let parsed = match node.kind {
        SyntaxKind::Link => parse_link_like(node, doc),
        SyntaxKind::Autolink => parse_autolink(node, doc),
        _ => None,
    };
    let Some(link) = parsed else {
        return;
    };
    if link.text_from == link.text_to {
        return;
    }

    emit(DecorationRange::mark(
        link.link_from,
        link.link_to,
        MarkSpec::element("span").attribute("data-href", link.url.as_str()),
    ));
    let mut anchor = MarkSpec::element("a").attribute("href", link.url);
    if let Some(title) = link.title {
        anchor = anchor.attribute("title", title);
    }
    emit(DecorationRange::mark(link.text_from, link.text_to, anchor));
}

/// `cm-image-markup` class over image source text
pub fn decorate_image_with_class(node: &SyntaxNode, _doc: &str, emit: &mut dyn FnMut(DecorationRange)) {
    if node.kind == SyntaxKind::Image {
        emit(DecorationRange::mark(node.from(), node.to(), MarkSpec::class("cm-image-markup")));
    }
}

/// Rendered image widget right after the image source text
pub fn decorate_image_with_rendered(node: &SyntaxNode, doc: &str, emit: &mut dyn FnMut(DecorationRange)) {
    if node.kind != SyntaxKind::Image {
        return;
    }
    let Some(image) = parse_link_like(node, doc) else {
        return;
    };
    let alt = doc[image.text_from..image.text_to].to_string();
    emit(DecorationRange::new(
        node.to(),
        node.to(),
        Decoration::Widget(WidgetSpec {
            widget: Widget::Image { src: image.url, alt },
            // Keeps the cursor drawn against the text before the widget
            side: 1,
        }),
    ));
}

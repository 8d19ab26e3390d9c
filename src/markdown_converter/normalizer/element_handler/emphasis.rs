use std::sync::LazyLock;

use regex::Regex;

use crate::markdown_converter::node::{MdNode, NodeKind};

use super::super::node_util::get_attr;
use super::super::structure::inline_container;
use super::super::whitespace::split_edges;
use super::{Element, Fragment, Handlers};

/// `font-weight: normal` (or a light numeric weight) in an inline style
static NORMAL_WEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)font-weight\s*:\s*(normal|lighter|[1-4]00)\b")
        .expect("NORMAL_WEIGHT: hardcoded regex is valid")
});

/// Wrap the element's content in an inline container of `kind`.
///
/// Spaces and line breaks at the content edges are moved outside the
/// delimiters. Whitespace-only content yields just that whitespace.
pub(super) fn emphasis_handler(
    handlers: &dyn Handlers,
    element: Element,
    kind: NodeKind,
) -> Option<Fragment> {
    wrap_inline(handlers.walk_children(element.node), kind)
}

pub(super) fn wrap_inline(children: Vec<MdNode>, kind: NodeKind) -> Option<Fragment> {
    if children.is_empty() {
        return None;
    }
    let (leading, core, trailing) = split_edges(children);
    let mut fragment: Fragment = leading.into_iter().collect();
    if !core.is_empty() {
        fragment.push(inline_container(kind, core));
    }
    fragment.extend(trailing);
    (!fragment.is_empty()).then_some(fragment)
}

pub(super) fn bold_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    emphasis_handler(handlers, element, NodeKind::Strong)
}

pub(super) fn italic_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    emphasis_handler(handlers, element, NodeKind::Emphasis)
}

pub(super) fn strikethrough_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    emphasis_handler(handlers, element, NodeKind::Strikethrough)
}

/// `<b style="font-weight:normal">` is a Google Docs clipboard wrapper, not bold
pub(super) fn google_docs_bold_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let is_wrapper = handlers.options().interpret_inline_styles()
        && get_attr(element.attrs, "style").is_some_and(|style| NORMAL_WEIGHT.is_match(style));
    if is_wrapper {
        return Some(handlers.walk_children(element.node).into_iter().collect());
    }
    handlers.fallback(element)
}

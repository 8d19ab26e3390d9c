use std::sync::LazyLock;

use regex::Regex;

use crate::markdown_converter::node::NodeKind;

use super::super::node_util::get_attr;
use super::emphasis::wrap_inline;
use super::{Element, Fragment, Handlers};

static BOLD_WEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)font-weight\s*:\s*(bold|bolder|[6-9]00)\b")
        .expect("BOLD_WEIGHT: hardcoded regex is valid")
});

static ITALIC_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)font-style\s*:\s*(italic|oblique)\b")
        .expect("ITALIC_STYLE: hardcoded regex is valid")
});

static LINE_THROUGH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)text-decoration(-line)?\s*:[^;]*\bline-through\b")
        .expect("LINE_THROUGH: hardcoded regex is valid")
});

/// Spans are transparent unless their inline style carries formatting.
///
/// Word and Google Docs exports express bold, italic and strikethrough this
/// way instead of with `<b>`, `<i>` and `<s>`.
pub(super) fn span_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let children = handlers.walk_children(element.node);
    let style = get_attr(element.attrs, "style").filter(|_| handlers.options().interpret_inline_styles());

    let Some(style) = style else {
        return (!children.is_empty()).then(|| children.into_iter().collect());
    };

    let mut wrappers = Vec::with_capacity(3);
    if LINE_THROUGH.is_match(style) {
        wrappers.push(NodeKind::Strikethrough);
    }
    if ITALIC_STYLE.is_match(style) {
        wrappers.push(NodeKind::Emphasis);
    }
    if BOLD_WEIGHT.is_match(style) {
        wrappers.push(NodeKind::Strong);
    }

    let mut fragment: Fragment = children.into_iter().collect();
    for kind in wrappers {
        fragment = wrap_inline(fragment.into_vec(), kind)?;
    }
    (!fragment.is_empty()).then_some(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_patterns_match_office_exports() {
        assert!(BOLD_WEIGHT.is_match("font-weight:700;font-style:normal"));
        assert!(!BOLD_WEIGHT.is_match("font-weight:400"));
        assert!(ITALIC_STYLE.is_match("font-style: italic"));
        assert!(LINE_THROUGH.is_match("text-decoration: underline line-through"));
    }
}

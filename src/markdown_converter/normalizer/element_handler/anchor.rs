use log::warn;
use smallvec::smallvec;
use url::Url;

use crate::markdown_converter::node::{MdNode, NodeKind};

use super::super::node_util::get_non_empty_attr;
use super::super::whitespace::collapse_whitespace;
use super::emphasis::wrap_inline;
use super::{Element, Fragment, Handlers};

/// Schemes kept verbatim even when a base URL is configured
const VERBATIM_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Resolve `url` against `base` using RFC 3986 rules.
///
/// Fragment-only, absolute and special-scheme URLs are kept as-is, as is
/// anything `Url::join` rejects.
pub(super) fn resolve_url(base: Option<&Url>, url: &str) -> String {
    let Some(base) = base else {
        return url.to_string();
    };
    let lower = url.to_ascii_lowercase();
    if url.starts_with('#')
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || VERBATIM_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
    {
        return url.to_string();
    }
    match base.join(url) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            warn!("Failed to resolve URL '{url}' against base '{base}': {e}");
            url.to_string()
        }
    }
}

/// `<a href>` becomes a link; anchors without `href` keep only their content.
///
/// A link whose content is empty gets text from `aria-label`, then `title`,
/// then the href itself.
pub(super) fn anchor_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let children = handlers.walk_children(element.node);
    let href = match get_non_empty_attr(element.attrs, "href") {
        Some(href) if handlers.options().preserve_links() => href,
        _ => return (!children.is_empty()).then(|| children.into_iter().collect()),
    };

    let href = resolve_url(handlers.base_url(), href);
    let title = get_non_empty_attr(element.attrs, "title").map(|t| collapse_whitespace(t).into_owned());
    let kind = NodeKind::Link {
        href: href.clone(),
        title: title.clone(),
    };

    let has_content = children.iter().any(|child| match child.as_text() {
        Some(text) => !text.trim().is_empty(),
        None => true,
    });
    if has_content {
        return wrap_inline(children, kind);
    }

    let fallback_text = get_non_empty_attr(element.attrs, "aria-label")
        .map(|label| collapse_whitespace(label).into_owned())
        .or(title)
        .unwrap_or(href);
    Some(smallvec![MdNode::new(kind, vec![MdNode::text(fallback_text)])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_url_keeps_absolute_and_fragment_urls() {
        let base = Url::parse("https://example.com/docs/guide.html").expect("valid base");
        assert_eq!(resolve_url(Some(&base), "#intro"), "#intro");
        assert_eq!(resolve_url(Some(&base), "https://other.com/x"), "https://other.com/x");
        assert_eq!(resolve_url(Some(&base), "mailto:a@b.c"), "mailto:a@b.c");
    }

    #[test]
    fn resolve_url_joins_relative_paths() {
        let base = Url::parse("https://example.com/docs/guide.html").expect("valid base");
        assert_eq!(resolve_url(Some(&base), "/api"), "https://example.com/api");
        assert_eq!(resolve_url(Some(&base), "intro"), "https://example.com/docs/intro");
        assert_eq!(resolve_url(None, "intro"), "intro");
    }
}

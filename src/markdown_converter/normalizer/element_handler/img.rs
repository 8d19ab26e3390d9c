use smallvec::smallvec;

use crate::markdown_converter::node::{MdNode, NodeKind};

use super::super::node_util::{get_attr, get_non_empty_attr};
use super::super::whitespace::collapse_whitespace;
use super::anchor::resolve_url;
use super::{Element, Fragment, Handlers};

/// `<img src>` becomes an image whose single text child is the alt text
pub(super) fn img_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    if !handlers.options().preserve_images() {
        return None;
    }
    // src is required for valid markdown image syntax
    let src = get_non_empty_attr(element.attrs, "src")?;
    let src = resolve_url(handlers.base_url(), src);
    let title = get_non_empty_attr(element.attrs, "title").map(|t| collapse_whitespace(t).into_owned());
    let alt = get_attr(element.attrs, "alt")
        .map(|alt| collapse_whitespace(alt.trim()).into_owned())
        .unwrap_or_default();

    Some(smallvec![MdNode::new(
        NodeKind::Image { src, title },
        vec![MdNode::text(alt)],
    )])
}

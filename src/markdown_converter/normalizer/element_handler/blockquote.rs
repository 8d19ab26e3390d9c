use smallvec::smallvec;

use crate::markdown_converter::node::NodeKind;

use super::super::structure::block_container;
use super::{Element, Fragment, Handlers};

pub(super) fn blockquote_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let quote = block_container(NodeKind::Blockquote, handlers.walk_children(element.node));
    if quote.children.is_empty() {
        return None;
    }
    Some(smallvec![quote])
}

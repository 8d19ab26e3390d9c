use smallvec::smallvec;

use crate::markdown_converter::node::{MdNode, NodeKind};

use super::super::node_util::{get_non_empty_attr, parent_tag_name_equals};
use super::super::structure::{block_container, list};
use super::{Element, Fragment, Handlers};

/// `<ul>` / `<ol start>` become lists of their items
pub(super) fn list_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let ordered = element.tag == "ol";
    let start = if ordered {
        get_non_empty_attr(element.attrs, "start")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1)
    } else {
        1
    };
    list(ordered, start, handlers.walk_children(element.node)).map(|l| smallvec![l])
}

/// `<li>` becomes a list item; outside `<ul>`/`<ol>` it is wrapped in its own list
pub(super) fn list_item_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let ordered = parent_tag_name_equals(element.node, &["ol"]);
    let item = block_container(NodeKind::ListItem { ordered }, handlers.walk_children(element.node));

    if parent_tag_name_equals(element.node, &["ul", "ol"]) {
        return Some(smallvec![item]);
    }
    Some(smallvec![MdNode::new(NodeKind::List { ordered, start: 1 }, vec![item])])
}

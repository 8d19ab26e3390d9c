use std::rc::Rc;
use std::rc::Weak;

use html5ever::Attribute;
use markup5ever_rcdom::{Node, NodeData};

/// RAII guard that puts a node's parent reference back when dropped.
///
/// `markup5ever_rcdom` stores the parent in a `Cell`, so reading it means
/// taking it out temporarily.
struct ParentGuard<'a> {
    node: &'a Rc<Node>,
    value: Option<Weak<Node>>,
}

impl Drop for ParentGuard<'_> {
    fn drop(&mut self) {
        self.node.parent.set(self.value.take());
    }
}

impl<'a> ParentGuard<'a> {
    fn new(node: &'a Rc<Node>) -> Self {
        let value = node.parent.take();
        Self { node, value }
    }

    fn upgrade(&self) -> Option<Rc<Node>> {
        self.value.as_ref()?.upgrade()
    }
}

pub(crate) fn get_node_tag_name(node: &Rc<Node>) -> Option<&str> {
    match &node.data {
        NodeData::Document => Some("html"),
        NodeData::Element { name, .. } => Some(&name.local),
        _ => None,
    }
}

pub(crate) fn get_parent_node(node: &Rc<Node>) -> Option<Rc<Node>> {
    ParentGuard::new(node).upgrade()
}

/// Check whether the node's parent is one of `tag_names`
pub(crate) fn parent_tag_name_equals(node: &Rc<Node>, tag_names: &[&str]) -> bool {
    get_parent_node(node)
        .as_ref()
        .and_then(get_node_tag_name)
        .is_some_and(|tag| tag_names.contains(&tag))
}

/// Value of the attribute `name`, if present
pub(crate) fn get_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| &*attr.value)
}

/// Attribute value with surrounding whitespace removed; `None` when blank
pub(crate) fn get_non_empty_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    get_attr(attrs, name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Concatenate all descendant text exactly as written.
///
/// `<br>` contributes a newline. Used for `<pre>` content, where whitespace is
/// significant.
pub(crate) fn extract_raw_text(node: &Rc<Node>) -> String {
    let mut text = String::new();
    collect_raw_text(node, &mut text);
    text
}

fn collect_raw_text(node: &Rc<Node>, text: &mut String) {
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            if &*name.local == "br" {
                text.push('\n');
                return;
            }
            for child in node.children.borrow().iter() {
                collect_raw_text(child, text);
            }
        }
        _ => {}
    }
}

/// First child element named `tag`, ignoring whitespace text between
pub(crate) fn find_child_element(node: &Rc<Node>, tag: &str) -> Option<Rc<Node>> {
    node.children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }) && get_node_tag_name(child) == Some(tag))
        .cloned()
}

use std::rc::Rc;

use html5ever::Attribute;
use markup5ever_rcdom::{Node, NodeData};
use smallvec::smallvec;

use crate::markdown_converter::node::{MdNode, NodeKind};

use super::super::node_util::{extract_raw_text, find_child_element, get_attr, get_non_empty_attr};
use super::{Element, Fragment, Handlers};

/// `<pre>` becomes a fenced code block with its text kept verbatim
pub(super) fn pre_handler(_handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    // The HTML parser already drops the newline right after <pre>
    let raw = extract_raw_text(element.node);
    let content = raw.trim_end_matches(['\n', '\r']);
    if content.trim().is_empty() {
        return None;
    }

    let lang = find_language_from_attrs(element.attrs).or_else(|| {
        let code = find_child_element(element.node, "code")?;
        language_of(&code)
    });

    Some(smallvec![MdNode::new(
        NodeKind::CodeBlock { lang },
        vec![MdNode::text(content)],
    )])
}

/// `<code>`, `<kbd>`, `<samp>` and `<tt>` outside `<pre>` become inline code
pub(super) fn code_handler(_handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let raw = extract_raw_text(element.node);
    let content = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if content.is_empty() {
        return None;
    }
    Some(smallvec![MdNode::new(NodeKind::InlineCode, vec![MdNode::text(content)])])
}

fn language_of(node: &Rc<Node>) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => find_language_from_attrs(&attrs.borrow()),
        _ => None,
    }
}

/// Language hint from `data-language` or the class attribute
fn find_language_from_attrs(attrs: &[Attribute]) -> Option<String> {
    get_non_empty_attr(attrs, "data-language")
        .map(str::to_string)
        .or_else(|| get_attr(attrs, "class").and_then(extract_language_from_class))
        .filter(|lang| !lang.is_empty() && !lang.contains(['`', '~']) && !lang.contains(char::is_whitespace))
}

/// Supports `language-X`, `lang-X`, `hljs-X` and `brush:X` patterns
fn extract_language_from_class(class: &str) -> Option<String> {
    class.split_whitespace().find_map(|part| {
        part.strip_prefix("language-")
            .or_else(|| part.strip_prefix("lang-"))
            .or_else(|| part.strip_prefix("hljs-"))
            .or_else(|| part.strip_prefix("brush:"))
            .map(|lang| lang.trim().to_string())
    })
}

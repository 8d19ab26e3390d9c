use std::cell::Cell;
use std::rc::Rc;

use log::{trace, warn};
use markup5ever_rcdom::{Node, NodeData};
use url::Url;

use crate::config::ConversionOptions;
use crate::markdown_converter::node::MdNode;

use super::element_handler::{Element, ElementHandlers, Fragment, Handlers};
use super::whitespace::collapse_whitespace;

/// Element nesting beyond which content is flattened to plain text
pub(crate) const MAX_NESTING_DEPTH: usize = 256;

/// Per-conversion walk state over a shared, immutable handler registry
pub(crate) struct DomWalker<'a> {
    handlers: &'a ElementHandlers,
    depth: Cell<usize>,
}

impl<'a> DomWalker<'a> {
    pub(crate) fn new(handlers: &'a ElementHandlers) -> Self {
        Self {
            handlers,
            depth: Cell::new(0),
        }
    }

    pub(crate) fn walk_node(&self, node: &Rc<Node>, out: &mut Vec<MdNode>) {
        match node.data {
            NodeData::Document => out.extend(self.walk_children(node)),

            NodeData::Text { ref contents } => {
                let borrowed = contents.borrow();
                let text = collapse_whitespace(&borrowed);
                if !text.is_empty() {
                    out.push(MdNode::text(text));
                }
            }

            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let tag = &*name.local;
                match self.handlers.handle(self, node, tag, &attrs.borrow(), 0) {
                    Some(fragment) => out.extend(fragment),
                    None => trace!("DOM walker: dropped <{tag}>"),
                }
            }

            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }
    }
}

impl Handlers for DomWalker<'_> {
    fn fallback(&self, element: Element) -> Option<Fragment> {
        self.handlers.handle(
            self,
            element.node,
            element.tag,
            element.attrs,
            element.skipped_handlers + 1,
        )
    }

    fn walk_children(&self, node: &Rc<Node>) -> Vec<MdNode> {
        let depth = self.depth.get();
        if depth >= MAX_NESTING_DEPTH {
            warn!("DOM walker: nesting deeper than {MAX_NESTING_DEPTH}, flattening to text");
            let text = flat_text(node);
            let text = collapse_whitespace(&text);
            return if text.trim().is_empty() {
                Vec::new()
            } else {
                vec![MdNode::text(text)]
            };
        }

        self.depth.set(depth + 1);
        let mut out = Vec::new();
        for child in node.children.borrow().iter() {
            self.walk_node(child, &mut out);
        }
        self.depth.set(depth);
        out
    }

    fn options(&self) -> &ConversionOptions {
        self.handlers.options()
    }

    fn base_url(&self) -> Option<&Url> {
        self.handlers.base_url()
    }
}

/// Descendant text without recursion, for subtrees too deep to walk
fn flat_text(node: &Rc<Node>) -> String {
    let mut text = String::new();
    let mut stack = vec![Rc::clone(node)];
    while let Some(current) = stack.pop() {
        if let NodeData::Text { contents } = &current.data {
            text.push_str(&contents.borrow());
        }
        let children = current.children.borrow();
        stack.extend(children.iter().rev().cloned());
    }
    text
}

//! HTML to normalized-node conversion
//!
//! Raw HTML is parsed with html5ever's tolerant tree builder, then walked
//! through a registry of per-tag element handlers. Handler output is regrouped
//! by the constructors in `structure` so the resulting tree always satisfies
//! the [`MdNode`] invariants.

pub(crate) mod dom_walker;
pub mod element_handler;
pub(crate) mod node_util;
pub(crate) mod structure;
pub(crate) mod whitespace;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::RcDom;
use tracing::debug;

use crate::config::ConversionOptions;
use crate::markdown_converter::node::{MdNode, NodeKind};

use dom_walker::DomWalker;
pub(crate) use element_handler::ElementHandlers;
use structure::block_container;

/// Parse `html` and convert it to a normalized `Document` node.
///
/// Never fails: markup the parser cannot use yields an empty document.
#[must_use]
pub fn normalize(html: &str, options: &ConversionOptions) -> MdNode {
    let handlers = ElementHandlers::new(options.clone());
    normalize_with(&handlers, html)
}

pub(crate) fn normalize_with(handlers: &ElementHandlers, html: &str) -> MdNode {
    let parse_options = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let dom = parse_document(RcDom::default(), parse_options).one(html);
    if !dom.errors.borrow().is_empty() {
        debug!(
            target: "markdown_bridge::normalizer",
            parse_errors = dom.errors.borrow().len(),
            "HTML recovered from parse errors"
        );
    }

    let walker = DomWalker::new(handlers);
    let mut children = Vec::new();
    walker.walk_node(&dom.document, &mut children);
    block_container(NodeKind::Document, children)
}

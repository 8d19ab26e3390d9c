mod anchor;
mod blockquote;
mod code;
mod emphasis;
mod headings;
mod img;
mod list;
mod span;
mod table;

use std::{collections::HashMap, rc::Rc};

use html5ever::Attribute;
use log::warn;
use markup5ever_rcdom::Node;
use smallvec::{SmallVec, smallvec};
use url::Url;

use crate::config::ConversionOptions;
use crate::markdown_converter::node::{MdNode, NodeKind};

use super::structure::{into_blocks, paragraph};
use anchor::anchor_handler;
use blockquote::blockquote_handler;
use code::{code_handler, pre_handler};
use emphasis::{bold_handler, google_docs_bold_handler, italic_handler, strikethrough_handler};
use headings::headings_handler;
use img::img_handler;
use list::{list_handler, list_item_handler};
use span::span_handler;
use table::table_handler;

/// Nodes produced by one element handler
pub type Fragment = SmallVec<[MdNode; 2]>;

/// An HTML element being converted
#[derive(Clone, Copy)]
pub struct Element<'a> {
    pub node: &'a Rc<Node>,
    pub tag: &'a str,
    pub attrs: &'a [Attribute],
    /// Number of later-registered handlers already skipped for this tag
    pub(crate) skipped_handlers: usize,
}

/// Trait for converting a specific HTML element into normalized nodes.
///
/// Returning `None` drops the element and its content.
pub trait ElementHandler: Send + Sync {
    fn handle(&self, handlers: &dyn Handlers, element: Element) -> Option<Fragment>;
}

impl<F> ElementHandler for F
where
    F: (Fn(&dyn Handlers, Element) -> Option<Fragment>) + Send + Sync,
{
    fn handle(&self, handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
        self(handlers, element)
    }
}

/// Builtin element handlers
pub(crate) struct ElementHandlers {
    handlers: Vec<Box<dyn ElementHandler>>,
    tag_to_handler_indices: HashMap<&'static str, Vec<usize>>,
    options: ConversionOptions,
    base_url: Option<Url>,
}

/// Elements with no Markdown counterpart whose content is dropped entirely
const DISCARDED_ELEMENTS: &[&str] = &[
    "head", "script", "style", "template", "noscript", "iframe", "object", "embed", "button",
    "input", "select", "textarea",
];

/// Block-level HTML elements without a mapping; they separate paragraphs
const UNMAPPED_BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "center", "dd", "details", "dialog", "dir", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "header", "hgroup", "legend", "main",
    "menu", "nav", "section", "summary", "caption", "thead", "tbody", "tfoot", "tr", "td", "th",
];

impl ElementHandlers {
    pub fn new(options: ConversionOptions) -> Self {
        let base_url = options.base_url().and_then(|base| match Url::parse(base) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Invalid base URL '{base}': {e}, relative links are kept as-is");
                None
            }
        });
        let mut handlers = Self {
            handlers: Vec::new(),
            tag_to_handler_indices: HashMap::new(),
            options,
            base_url,
        };

        // Other block elements
        handlers.add_handler(UNMAPPED_BLOCK_ELEMENTS, block_handler);

        // html, body
        handlers.add_handler(&["html", "body"], transparent_handler);

        // p
        handlers.add_handler(&["p"], p_handler);

        // headings
        handlers.add_handler(&["h1", "h2", "h3", "h4", "h5", "h6"], headings_handler);

        // strong, italic, strikethrough
        handlers.add_handler(&["strong", "b"], bold_handler);
        handlers.add_handler(&["em", "i", "cite", "dfn"], italic_handler);
        handlers.add_handler(&["s", "del", "strike"], strikethrough_handler);

        // Google Docs wraps whole fragments in <b style="font-weight:normal">.
        // Registered after bold_handler so it runs first and falls back.
        handlers.add_handler(&["b"], google_docs_bold_handler);

        // span
        handlers.add_handler(&["span"], span_handler);

        // a
        handlers.add_handler(&["a"], anchor_handler);

        // img
        handlers.add_handler(&["img"], img_handler);

        // list
        handlers.add_handler(&["ol", "ul"], list_handler);

        // li
        handlers.add_handler(&["li"], list_item_handler);

        // pre, code
        handlers.add_handler(&["pre"], pre_handler);
        handlers.add_handler(&["code", "kbd", "samp", "tt"], code_handler);

        // quote
        handlers.add_handler(&["blockquote"], blockquote_handler);

        // table
        handlers.add_handler(&["table"], table_handler);

        // br, hr
        handlers.add_handler(&["br"], br_handler);
        handlers.add_handler(&["hr"], hr_handler);

        // Always discarded, registered last to take priority
        handlers.add_handler(DISCARDED_ELEMENTS, discard_handler);

        handlers
    }

    /// Register `handler` for `tags`.
    ///
    /// Later registrations take priority; a handler can defer to the one
    /// registered before it via [`Handlers::fallback`].
    pub fn add_handler<Handler>(&mut self, tags: &[&'static str], handler: Handler)
    where
        Handler: ElementHandler + 'static,
    {
        let handler_idx = self.handlers.len();
        self.handlers.push(Box::new(handler));
        for tag in tags {
            self.tag_to_handler_indices
                .entry(*tag)
                .or_default()
                .insert(0, handler_idx);
        }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Convert one element with the handler registered for its tag.
    ///
    /// `skipped_handlers` counts the higher-priority handlers that already
    /// deferred via [`Handlers::fallback`].
    pub fn handle(
        &self,
        walker: &dyn Handlers,
        node: &Rc<Node>,
        tag: &str,
        attrs: &[Attribute],
        skipped_handlers: usize,
    ) -> Option<Fragment> {
        let element = Element {
            node,
            tag,
            attrs,
            skipped_handlers,
        };
        match self.find_handler(tag, skipped_handlers) {
            Some(handler) => handler.handle(walker, element),
            // Unknown element: flatten its content into the parent
            None => Some(walker.walk_children(node).into_iter().collect()),
        }
    }

    fn find_handler(&self, tag: &str, skipped_handlers: usize) -> Option<&dyn ElementHandler> {
        let handler_indices = self.tag_to_handler_indices.get(tag)?;
        let idx = *handler_indices.get(skipped_handlers)?;
        self.handlers.get(idx).map(Box::as_ref)
    }
}

/// Provides access to the handlers for processing elements and nodes.
///
/// Handlers use this to delegate to other handlers or recurse into children.
pub trait Handlers {
    /// Skip the current handler and use the one registered before it.
    fn fallback(&self, element: Element) -> Option<Fragment>;

    /// Convert the children of a node, in document order.
    fn walk_children(&self, node: &Rc<Node>) -> Vec<MdNode>;

    /// Get the conversion options.
    fn options(&self) -> &ConversionOptions;

    /// Parsed `base_url` option, used to resolve relative links and images.
    fn base_url(&self) -> Option<&Url>;
}

fn block_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let blocks = into_blocks(handlers.walk_children(element.node));
    Some(blocks.into_iter().collect())
}

fn transparent_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    Some(handlers.walk_children(element.node).into_iter().collect())
}

fn p_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    paragraph(handlers.walk_children(element.node)).map(|p| smallvec![p])
}

fn br_handler(_handlers: &dyn Handlers, _element: Element) -> Option<Fragment> {
    Some(smallvec![MdNode::leaf(NodeKind::LineBreak)])
}

fn hr_handler(_handlers: &dyn Handlers, _element: Element) -> Option<Fragment> {
    Some(smallvec![MdNode::leaf(NodeKind::ThematicBreak)])
}

fn discard_handler(_handlers: &dyn Handlers, _element: Element) -> Option<Fragment> {
    None
}

//! HTML to Markdown conversion pipeline
//!
//! 1. Parse the HTML with html5ever's tolerant tree builder
//! 2. Normalize the DOM into an [`MdNode`] tree through per-tag element handlers
//! 3. Emit Markdown text from the tree
//!
//! # Usage
//!
//! ## Synchronous (for blocking contexts)
//! ```rust
//! # use markdown_bridge::{convert_html_to_markdown_sync, ConversionOptions};
//! let html = "<h1>Title</h1><p>Hello <strong>world</strong></p>";
//! let markdown = convert_html_to_markdown_sync(html, &ConversionOptions::default());
//! assert_eq!(markdown, "# Title\n\nHello **world**");
//! ```
//!
//! ## Asynchronous (lazily loaded, shared converter)
//! ```rust
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let markdown = markdown_bridge::convert_html_to_markdown("<ul><li>a</li><li>b</li></ul>").await?;
//! assert_eq!(markdown, "- a\n- b");
//! # Ok::<(), markdown_bridge::ConvertError>(())
//! # }).unwrap();
//! ```

pub mod emitter;
pub mod node;
pub mod normalizer;

use std::time::Instant;

use tracing::debug;

use crate::config::ConversionOptions;

pub use emitter::MarkdownEmitter;
pub use node::{MdNode, NodeKind};
pub use normalizer::normalize;
use normalizer::{ElementHandlers, normalize_with};

/// Convert HTML to Markdown synchronously.
///
/// Infallible: malformed or unsupported markup degrades to best-effort text,
/// possibly an empty string.
///
/// # Examples
///
/// ```rust
/// # use markdown_bridge::{convert_html_to_markdown_sync, ConversionOptions};
/// let markdown = convert_html_to_markdown_sync("<p>5 * 3 = 15</p>", &ConversionOptions::default());
/// assert_eq!(markdown, r"5 \* 3 = 15");
/// ```
#[must_use]
pub fn convert_html_to_markdown_sync(html: &str, options: &ConversionOptions) -> String {
    MarkdownConverter::new(options.clone()).convert_sync(html)
}

/// HTML to Markdown converter with a prebuilt handler registry.
///
/// Building the registry once and reusing it is what the lazily loaded
/// façade caches.
pub struct MarkdownConverter {
    handlers: ElementHandlers,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new(ConversionOptions::default())
    }
}

impl MarkdownConverter {
    #[must_use]
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            handlers: ElementHandlers::new(options),
        }
    }

    #[must_use]
    pub fn options(&self) -> &ConversionOptions {
        self.handlers.options()
    }

    /// Parse and normalize without emitting
    #[must_use]
    pub fn normalize(&self, html: &str) -> MdNode {
        normalize_with(&self.handlers, html)
    }

    /// Convert HTML to Markdown on the current thread
    #[must_use]
    pub fn convert_sync(&self, html: &str) -> String {
        let started = Instant::now();
        let tree = self.normalize(html);
        let markdown = MarkdownEmitter::new(self.options()).emit(&tree);
        debug!(
            target: "markdown_bridge::converter",
            html_bytes = html.len(),
            markdown_bytes = markdown.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "converted HTML to Markdown"
        );
        markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        convert_html_to_markdown_sync(html, &ConversionOptions::default())
    }

    #[test]
    fn heading_and_paragraph() {
        assert_eq!(
            convert("<h1>Title</h1><p>Hello <strong>world</strong></p>"),
            "# Title\n\nHello **world**"
        );
    }

    #[test]
    fn unordered_list() {
        assert_eq!(convert("<ul><li>a</li><li>b</li></ul>"), "- a\n- b");
    }

    #[test]
    fn escapes_asterisk() {
        assert_eq!(convert("<p>5 * 3 = 15</p>"), r"5 \* 3 = 15");
    }

    #[test]
    fn minimal_preset_drops_links_and_images() {
        let md = convert_html_to_markdown_sync(
            r#"<p><a href="https://example.com">site</a> <img src="a.png" alt="pic"></p>"#,
            &ConversionOptions::minimal(),
        );
        assert_eq!(md, "site");
    }

    #[test]
    fn base_url_resolves_relative_links() {
        let options = ConversionOptions::builder()
            .base_url("https://example.com/docs/guide.html")
            .build()
            .expect("valid options");
        let md = convert_html_to_markdown_sync(r#"<a href="/api">API</a>"#, &options);
        assert_eq!(md, "[API](https://example.com/api)");
    }
}

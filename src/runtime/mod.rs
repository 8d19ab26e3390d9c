//! Lazily loaded, shared conversion runtime
//!
//! The converter is built on first use and cached for the life of the
//! process. Concurrent first callers attach to a single in-flight load.

pub mod lazy_converter;
pub mod pending;

use std::sync::LazyLock;

use crate::error::ConvertResult;
use crate::markdown_converter::MarkdownConverter;

pub use lazy_converter::{BuiltinLoader, ConverterLoader, LazyConverter, LoadFuture};
pub use pending::{PendingConversion, PendingLoad};

/// A loaded HTML to Markdown implementation
pub trait HtmlConverter: Send + Sync {
    fn convert(&self, html: &str) -> String;
}

impl HtmlConverter for MarkdownConverter {
    fn convert(&self, html: &str) -> String {
        self.convert_sync(html)
    }
}

static DEFAULT_CONVERTER: LazyLock<LazyConverter> = LazyLock::new(LazyConverter::default);

/// The process-wide converter behind [`convert_html_to_markdown`]
#[must_use]
pub fn default_converter() -> &'static LazyConverter {
    &DEFAULT_CONVERTER
}

/// Convert HTML to Markdown with default options.
///
/// The first call loads the converter; later calls reuse it. Fails with
/// [`crate::ConvertError::Load`] when the converter cannot be loaded and
/// [`crate::ConvertError::Conversion`] when the conversion task dies.
pub async fn convert_html_to_markdown(html: &str) -> ConvertResult<String> {
    DEFAULT_CONVERTER.convert(html).await
}

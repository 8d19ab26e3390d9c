//! HTML to Markdown conversion and editor-side Markdown support.
//!
//! - [`convert_html_to_markdown`]: asynchronous, lazily loaded converter
//!   shared by the whole process
//! - [`convert_html_to_markdown_sync`] / [`MarkdownConverter`]: the same
//!   pipeline on the calling thread
//! - [`markdown_extension`]: incremental syntax tree and decorations for a
//!   live Markdown editor

pub mod config;
pub mod editor;
pub mod error;
pub mod markdown_converter;
pub mod runtime;

pub use config::{BrStyle, BulletListMarker, ConversionOptions, ConversionOptionsBuilder};
pub use editor::{EditorSession, MarkdownExtension, TextEdit, markdown_extension};
pub use error::{ConfigError, ConvertError, ConvertResult, EditError, LoadError};
pub use markdown_converter::{MarkdownConverter, MdNode, NodeKind, convert_html_to_markdown_sync};
pub use runtime::{
    BuiltinLoader, ConverterLoader, HtmlConverter, LazyConverter, convert_html_to_markdown,
};

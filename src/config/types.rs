//! Core configuration types for HTML to Markdown conversion
//!
//! This module contains the main `ConversionOptions` struct and the enums
//! selecting between equivalent Markdown spellings.

use serde::{Deserialize, Serialize};

/// Spaces added per list nesting level.
///
/// Four columns keep nested lists and continuation paragraphs inside items
/// for every bullet marker and for ordered markers up to `99.`.
pub const DEFAULT_LIST_INDENT_WIDTH: u8 = 4;

/// Marker used for unordered list items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletListMarker {
    /// `- item`
    Dash,
    /// `* item`
    Asterisk,
    /// `+ item`
    Plus,
}

impl BulletListMarker {
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            BulletListMarker::Dash => '-',
            BulletListMarker::Asterisk => '*',
            BulletListMarker::Plus => '+',
        }
    }
}

/// Spelling of a hard line break (`<br>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrStyle {
    /// Backslash at end of line: `line\`
    Backslash,
    /// Two trailing spaces: `line  `
    TwoSpaces,
}

/// Main configuration struct for HTML to Markdown conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub(crate) bullet_list_marker: BulletListMarker,
    /// Spaces per nesting level for list item content.
    ///
    /// **INVARIANT:** between 2 and 8 (validated by the builder and by
    /// [`ConversionOptions::from_json_str`]).
    pub(crate) list_indent_width: u8,
    pub(crate) br_style: BrStyle,
    /// Emit `![alt](src)` for `<img>`; when disabled images are dropped
    pub(crate) preserve_images: bool,
    /// Emit `[text](href)` for `<a>`; when disabled only the text remains
    pub(crate) preserve_links: bool,
    /// Base URL for resolving relative `href`/`src` values.
    ///
    /// Fragment-only, absolute and special-scheme URLs are kept as-is.
    pub(crate) base_url: Option<String>,
    /// Interpret inline `style` attributes (Google Docs / Word exports)
    pub(crate) interpret_inline_styles: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            bullet_list_marker: BulletListMarker::Dash,
            list_indent_width: DEFAULT_LIST_INDENT_WIDTH,
            br_style: BrStyle::Backslash,
            preserve_images: true,
            preserve_links: true,
            base_url: None,
            interpret_inline_styles: true,
        }
    }
}

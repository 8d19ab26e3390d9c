//! Getter methods for `ConversionOptions`

use super::types::{BrStyle, BulletListMarker, ConversionOptions};

impl ConversionOptions {
    #[must_use]
    pub fn bullet_list_marker(&self) -> BulletListMarker {
        self.bullet_list_marker
    }

    #[must_use]
    pub fn list_indent_width(&self) -> usize {
        usize::from(self.list_indent_width)
    }

    #[must_use]
    pub fn br_style(&self) -> BrStyle {
        self.br_style
    }

    #[must_use]
    pub fn preserve_images(&self) -> bool {
        self.preserve_images
    }

    #[must_use]
    pub fn preserve_links(&self) -> bool {
        self.preserve_links
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[must_use]
    pub fn interpret_inline_styles(&self) -> bool {
        self.interpret_inline_styles
    }
}

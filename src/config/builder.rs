//! Fluent builder for `ConversionOptions`
//!
//! Setters never fail; `build()` validates the assembled options once.

use anyhow::{Result, anyhow};

use super::types::{BrStyle, BulletListMarker, ConversionOptions};

#[derive(Debug, Clone, Default)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptions {
    /// Create a builder for configuring `ConversionOptions` with a fluent interface
    #[must_use]
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder::default()
    }

    /// Builder seeded with these options, for overriding a few settings
    #[must_use]
    pub fn to_builder(&self) -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: self.clone(),
        }
    }
}

impl ConversionOptionsBuilder {
    #[must_use]
    pub fn bullet_list_marker(mut self, marker: BulletListMarker) -> Self {
        self.options.bullet_list_marker = marker;
        self
    }

    #[must_use]
    pub fn list_indent_width(mut self, width: u8) -> Self {
        self.options.list_indent_width = width;
        self
    }

    #[must_use]
    pub fn br_style(mut self, style: BrStyle) -> Self {
        self.options.br_style = style;
        self
    }

    #[must_use]
    pub fn preserve_images(mut self, preserve: bool) -> Self {
        self.options.preserve_images = preserve;
        self
    }

    #[must_use]
    pub fn preserve_links(mut self, preserve: bool) -> Self {
        self.options.preserve_links = preserve;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base: impl Into<String>) -> Self {
        self.options.base_url = Some(base.into());
        self
    }

    #[must_use]
    pub fn interpret_inline_styles(mut self, interpret: bool) -> Self {
        self.options.interpret_inline_styles = interpret;
        self
    }

    /// Validate and return the options
    ///
    /// # Errors
    ///
    /// Returns an error if `list_indent_width` is out of range or `base_url`
    /// is not an absolute URL.
    pub fn build(self) -> Result<ConversionOptions> {
        self.options
            .validate()
            .map_err(|e| anyhow!("Invalid conversion options: {e}"))?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_settings() {
        let options = ConversionOptions::builder()
            .bullet_list_marker(BulletListMarker::Plus)
            .list_indent_width(2)
            .br_style(BrStyle::TwoSpaces)
            .base_url("https://example.com/docs/")
            .build()
            .expect("valid options");

        assert_eq!(options.bullet_list_marker(), BulletListMarker::Plus);
        assert_eq!(options.list_indent_width(), 2);
        assert_eq!(options.br_style(), BrStyle::TwoSpaces);
        assert_eq!(options.base_url(), Some("https://example.com/docs/"));
    }

    #[test]
    fn to_builder_keeps_existing_settings() {
        let options = ConversionOptions::minimal()
            .to_builder()
            .br_style(BrStyle::TwoSpaces)
            .build()
            .expect("valid options");
        assert!(!options.preserve_links());
        assert_eq!(options.br_style(), BrStyle::TwoSpaces);
    }

    #[test]
    fn builder_rejects_invalid_indent() {
        assert!(ConversionOptions::builder().list_indent_width(12).build().is_err());
    }
}

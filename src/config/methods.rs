//! Presets, validation and JSON loading for `ConversionOptions`

use std::path::Path;

use crate::error::ConfigError;

use super::types::ConversionOptions;

/// Allowed range for `list_indent_width`
pub(crate) const LIST_INDENT_RANGE: std::ops::RangeInclusive<u8> = 2..=8;

impl ConversionOptions {
    /// Create a new `ConversionOptions` with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal preset: links are reduced to their text and images dropped
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            preserve_links: false,
            preserve_images: false,
            ..Self::default()
        }
    }

    /// Parse options from a JSON document.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read options file {}: {e}", path.display()))?;
        Ok(Self::from_json_str(&json)?)
    }

    /// Check invariants that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LIST_INDENT_RANGE.contains(&self.list_indent_width) {
            return Err(ConfigError::InvalidValue {
                field: "list_indent_width",
                message: format!(
                    "{} is outside {}..={}",
                    self.list_indent_width,
                    LIST_INDENT_RANGE.start(),
                    LIST_INDENT_RANGE.end()
                ),
            });
        }
        if let Some(base) = &self.base_url
            && let Err(e) = url::Url::parse(base)
        {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                message: format!("'{base}' is not an absolute URL: {e}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BrStyle, BulletListMarker};

    #[test]
    fn missing_fields_take_defaults() {
        let options = ConversionOptions::from_json_str(r#"{"bullet_list_marker": "asterisk"}"#)
            .expect("valid options");
        assert_eq!(options.bullet_list_marker(), BulletListMarker::Asterisk);
        assert_eq!(options.br_style(), BrStyle::Backslash);
        assert_eq!(options.list_indent_width(), 4);
    }

    #[test]
    fn rejects_out_of_range_indent() {
        let err = ConversionOptions::from_json_str(r#"{"list_indent_width": 1}"#)
            .expect_err("indent of 1 is invalid");
        assert!(err.to_string().contains("list_indent_width"));
    }

    #[test]
    fn rejects_relative_base_url() {
        let err = ConversionOptions::from_json_str(r#"{"base_url": "/docs"}"#)
            .expect_err("relative base is invalid");
        assert!(matches!(err, ConfigError::InvalidValue { field: "base_url", .. }));
    }
}

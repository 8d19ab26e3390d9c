//! Error types for the conversion façade, the editor session and configuration
//!
//! Normalizer and emitter degradations never surface here: malformed HTML is
//! converted best-effort. Only the façade (loading / running the converter)
//! and editor edit dispatch can fail.

use std::ops::Range;
use thiserror::Error;

/// Result type alias for façade conversions
pub type ConvertResult<T> = Result<T, ConvertError>;

/// The converter implementation could not be obtained.
///
/// Cloneable because every caller waiting on the same in-flight load receives
/// the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The loader reported that the implementation is unavailable
    #[error("Converter implementation unavailable: {0}")]
    Unavailable(String),

    /// The loading task was cancelled or panicked
    #[error("Converter loading task failed: {0}")]
    TaskFailed(String),
}

/// Errors surfaced by [`crate::runtime::LazyConverter::convert`]
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    /// Loading the implementation failed; no conversion was attempted
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The implementation was loaded but the conversion itself did not complete
    #[error("HTML conversion failed: {0}")]
    Conversion(String),
}

impl ConvertError {
    /// Check if the failure happened while loading the implementation
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(self, ConvertError::Load(_))
    }
}

/// Errors raised when applying an edit to an editor session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The replaced range does not lie inside the document
    #[error("Edit range {range:?} is outside the document (length {len})")]
    OutOfBounds { range: Range<usize>, len: usize },

    /// The replaced range splits a UTF-8 character
    #[error("Edit range {range:?} does not fall on character boundaries")]
    NotCharBoundary { range: Range<usize> },

    /// Range start is after range end
    #[error("Edit range {0:?} is inverted")]
    Inverted(Range<usize>),
}

/// Errors raised when loading or validating conversion options
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Options file/string is not valid JSON for [`crate::ConversionOptions`]
    #[error("Invalid conversion options: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Replacement of a byte range of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub insert: String,
}

impl TextEdit {
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            insert: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }

    #[must_use]
    pub fn delete(range: Range<usize>) -> Self {
        Self::replace(range, String::new())
    }

    /// Change in document length
    #[must_use]
    pub fn delta(&self) -> isize {
        self.insert.len() as isize - (self.range.end - self.range.start) as isize
    }

    /// Check the edit can be applied to `doc`
    pub fn validate(&self, doc: &str) -> Result<(), EditError> {
        if self.range.start > self.range.end {
            return Err(EditError::Inverted(self.range.clone()));
        }
        if self.range.end > doc.len() {
            return Err(EditError::OutOfBounds {
                range: self.range.clone(),
                len: doc.len(),
            });
        }
        if !doc.is_char_boundary(self.range.start) || !doc.is_char_boundary(self.range.end) {
            return Err(EditError::NotCharBoundary {
                range: self.range.clone(),
            });
        }
        Ok(())
    }

    /// Apply to `doc`; the edit must have passed [`validate`](Self::validate)
    pub fn apply_to(&self, doc: &mut String) {
        doc.replace_range(self.range.clone(), &self.insert);
    }
}

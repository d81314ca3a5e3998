//! Validated message body text.

use super::ContentError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message text that is non-blank and within a byte budget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    /// Validates raw text against a byte limit.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Blank`] for empty or whitespace-only text and
    /// [`ContentError::TooLarge`] when the text exceeds `max_bytes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use duologue::messaging::domain::{ContentError, MessageContent};
    ///
    /// assert!(MessageContent::parse("hi", 16).is_ok());
    /// assert_eq!(MessageContent::parse("   ", 16), Err(ContentError::Blank));
    /// ```
    pub fn parse(raw: impl Into<String>, max_bytes: usize) -> Result<Self, ContentError> {
        let text = raw.into();
        if text.trim().is_empty() {
            return Err(ContentError::Blank);
        }
        if text.len() > max_bytes {
            return Err(ContentError::TooLarge {
                actual: text.len(),
                limit: max_bytes,
            });
        }
        Ok(Self(text))
    }

    /// Wraps text read back from the store without re-validating it.
    pub(crate) const fn from_persisted(text: String) -> Self {
        Self(text)
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

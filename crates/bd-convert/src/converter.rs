//! Converter trait and conversion result types.

use serde::Serialize;

use crate::tags::Tags;

/// Publishable representation of a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Content {
    /// Document title (front matter, then first H1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Rendered HTML body.
    pub html: String,
}

/// Output of converting one raw document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Conversion {
    /// Structured content.
    pub content: Content,
    /// Outbound link targets as authored (may be relative or malformed).
    pub links: Vec<String>,
    /// Metadata tags.
    pub tags: Tags,
}

/// Error returned when a document cannot be converted.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Front matter is present but is not valid YAML of the expected shape.
    #[error("Invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
    /// Any other converter-specific failure.
    #[error("Invalid document: {0}")]
    Invalid(String),
}

/// Converts raw document text into publishable content.
///
/// Implementations must be pure functions of their input: no corpus-wide
/// state, so every document can be converted independently and in parallel.
pub trait Converter: Send + Sync {
    /// Convert one raw document.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if the document is malformed.
    fn convert(&self, raw: &str) -> Result<Conversion, ConvertError>;
}

impl<F> Converter for F
where
    F: Fn(&str) -> Result<Conversion, ConvertError> + Send + Sync,
{
    fn convert(&self, raw: &str) -> Result<Conversion, ConvertError> {
        self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_converter() {
        let converter = |raw: &str| -> Result<Conversion, ConvertError> {
            Ok(Conversion {
                content: Content {
                    title: None,
                    html: raw.to_uppercase(),
                },
                links: Vec::new(),
                tags: Tags::new(),
            })
        };

        let result = converter.convert("hello").unwrap();

        assert_eq!(result.content.html, "HELLO");
    }

    #[test]
    fn test_closure_error_propagates() {
        let converter = |_: &str| -> Result<Conversion, ConvertError> {
            Err(ConvertError::Invalid("broken".to_owned()))
        };

        let err = converter.convert("x").unwrap_err();

        assert_eq!(err.to_string(), "Invalid document: broken");
    }
}

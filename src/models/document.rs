//! Document model for annotation suggestion.
//!
//! Documents are owned by the surrounding application; the engine only reads
//! them, so the model is a plain value with no lifecycle of its own.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Markup flavour of a document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Plain,
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Html => "text/html",
        }
    }

    /// Parse a MIME type, ignoring parameters such as `; charset=utf-8`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case("text/plain") {
            Some(Self::Plain)
        } else if essence.eq_ignore_ascii_case("text/html") {
            Some(Self::Html)
        } else {
            None
        }
    }
}

/// A stored document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: i32,
    pub title: String,
    /// Raw body, UTF-8 encoded.
    pub content: Vec<u8>,
    /// MIME type as stored.
    pub content_type: String,
}

impl Document {
    pub fn new(id: i32, title: impl Into<String>, content: impl Into<Vec<u8>>, content_type: ContentType) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            content_type: content_type.as_str().to_string(),
        }
    }

    /// Body decoded as UTF-8. Invalid sequences are replaced rather than rejected.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Parsed content type, if it is one the engine understands.
    pub fn kind(&self) -> Option<ContentType> {
        ContentType::from_mime(&self.content_type)
    }

    /// SHA-256 of the raw body.
    pub fn content_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.content);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parameters_ignored() {
        assert_eq!(
            ContentType::from_mime("text/html; charset=utf-8"),
            Some(ContentType::Html)
        );
        assert_eq!(ContentType::from_mime("TEXT/PLAIN"), Some(ContentType::Plain));
        assert_eq!(ContentType::from_mime("application/pdf"), None);
    }

    #[test]
    fn test_lossy_text() {
        let doc = Document {
            id: 1,
            title: "t".to_string(),
            content: vec![b'a', 0xff, b'b'],
            content_type: "text/plain".to_string(),
        };
        assert_eq!(doc.text(), "a\u{fffd}b");
    }
}

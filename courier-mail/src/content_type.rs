//! Body content type detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContentType {
    /// Plain text.
    #[default]
    #[serde(rename = "text/plain")]
    TextPlain,
    /// HTML.
    #[serde(rename = "text/html")]
    TextHtml,
}

impl ContentType {
    /// MIME type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextPlain => "text/plain",
            Self::TextHtml => "text/html",
        }
    }

    /// Check if this is HTML.
    pub fn is_html(&self) -> bool {
        matches!(self, Self::TextHtml)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a body as HTML when it contains at least one tag marker
/// (`<p>`, `</div>`, `<br/>`, `<!DOCTYPE html>`), plain text otherwise.
pub fn classify(body: &str) -> ContentType {
    if contains_tag(body) {
        ContentType::TextHtml
    } else {
        ContentType::TextPlain
    }
}

fn contains_tag(body: &str) -> bool {
    body.match_indices('<').any(|(start, _)| {
        let rest = &body[start + 1..];
        let opens_tag = rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');

        opens_tag && rest.contains('>')
    })
}

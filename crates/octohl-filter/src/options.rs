//! Per-block render options.
//!
//! The options string on an opening fence is a JSON object:
//!
//! ````text
//! ```{"lang": "ruby", "title": "The Classic", "href": "/code/hello.rb", "linenos": false}
//! puts "Hello World!"
//! ```
//! ````
//!
//! Recognized keys are `language` (alias `lang`), `title`, `href` and
//! `linenos`. Unknown keys are ignored.

use serde::{Deserialize, Serialize};

/// Decoded configuration for one code block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Highlighter language. `None` renders the body as plain text.
    #[serde(alias = "lang", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Panel heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Download URL for the snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Whether to render the line-number gutter.
    #[serde(rename = "linenos", skip_serializing_if = "is_true")]
    pub line_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            language: None,
            title: None,
            href: None,
            line_numbers: true,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(value: &bool) -> bool {
    *value
}

impl RenderOptions {
    /// Decode an options string.
    ///
    /// An empty (or whitespace-only) string yields the defaults. Anything
    /// else must be a JSON object.
    ///
    /// # Example
    ///
    /// ```
    /// use octohl_filter::RenderOptions;
    ///
    /// let options = RenderOptions::decode(r#"{"lang": "ruby", "linenos": false}"#).unwrap();
    /// assert_eq!(options.language.as_deref(), Some("ruby"));
    /// assert!(!options.line_numbers);
    ///
    /// assert_eq!(RenderOptions::decode("").unwrap(), RenderOptions::default());
    /// ```
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
    }
}

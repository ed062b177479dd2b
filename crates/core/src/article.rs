//! Extraction output and format conversion.
//!
//! [`ExtractionResult`] is what the extractor stores for a bookmark: a title
//! and the readable body. The body is HTML for pages handled by the generic
//! extractor and plain text for readme pages; both convert to every
//! [`OutputFormat`].

use std::str::FromStr;

use scraper::Html;
use serde::{Deserialize, Serialize};

/// Tags that start a new paragraph in plain text output
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre", "td", "th", "article", "section", "br",
];

/// Output format options for an [`ExtractionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The article body as extracted.
    #[default]
    Html,
    /// Plain text with paragraphs separated by blank lines.
    Text,
    /// Markdown with the title as a level one heading.
    Markdown,
    /// `{"title": ..., "article_body": ...}`.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {s}. Valid options: html, text, markdown, json")),
        }
    }
}

/// Title and readable body of a bookmarked page.
///
/// `article_body` may be empty but is never absent. A result whose title is
/// the URL and whose body is empty is the fallback the extractor returns
/// whenever nothing better can be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub article_body: String,
}

impl ExtractionResult {
    pub fn new(title: impl Into<String>, article_body: impl Into<String>) -> Self {
        Self { title: title.into(), article_body: article_body.into() }
    }

    /// The `(url, "")` result.
    ///
    /// ```rust
    /// use pypo_core::ExtractionResult;
    ///
    /// let result = ExtractionResult::fallback("http://example.com/a");
    /// assert_eq!(result.title, "http://example.com/a");
    /// assert!(result.article_body.is_empty());
    /// ```
    pub fn fallback(url: &str) -> Self {
        Self::new(url, "")
    }

    /// Whether no article body was extracted.
    pub fn is_empty(&self) -> bool {
        self.article_body.trim().is_empty()
    }

    /// Converts the result to the specified format.
    pub fn to_format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Html => self.article_body.clone(),
            OutputFormat::Text => self.to_text(),
            OutputFormat::Markdown => self.to_markdown(),
            OutputFormat::Json => format!("{:#}", self.to_json()),
        }
    }

    /// Body as plain text, block elements separated by blank lines.
    pub fn to_text(&self) -> String {
        html_to_text(&self.article_body)
    }

    /// Body as Markdown, preceded by the title as a heading.
    pub fn to_markdown(&self) -> String {
        let body = html_to_markdown(&self.article_body);
        if self.title.trim().is_empty() {
            return body;
        }
        format!("# {}\n\n{}", self.title.trim(), body)
    }

    /// Result as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "title": self.title, "article_body": self.article_body })
    }
}

#[cfg(feature = "markdown")]
fn html_to_markdown(html: &str) -> String {
    htmd::convert(html).unwrap_or_default().trim().to_string()
}

/// Fallback when the markdown feature is disabled
#[cfg(not(feature = "markdown"))]
fn html_to_markdown(html: &str) -> String {
    html_to_text(html)
}

/// Convert HTML to text, keeping paragraph boundaries
fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();

    for node in fragment.root_element().descendants() {
        if let Some(text) = node.value().as_text() {
            raw.push_str(text);
        } else if let Some(element) = node.value().as_element()
            && BLOCK_ELEMENTS.contains(&element.name())
        {
            raw.push('\n');
        }
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

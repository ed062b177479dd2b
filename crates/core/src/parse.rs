//! HTML parsing and DOM queries.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! generic extractor and by domain strategies to query markup with CSS
//! selectors.
//!
//! # Example
//!
//! ```rust
//! use pypo_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title>Title</title></head>
//!         <body><p class="content">Paragraph</p></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! assert_eq!(doc.title(), Some("Title".to_string()));
//! assert_eq!(doc.select("p.content").unwrap().len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::preprocess::{self, PreprocessConfig};
use crate::{ExtractError, Result};

/// A parsed HTML document.
///
/// html5ever recovers from any malformed input, so parsing itself never fails;
/// only invalid selectors produce errors.
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string without preprocessing.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html), base_url: None }
    }

    /// Parses HTML after running it through [`preprocess::preprocess_html`].
    pub fn parse_with_preprocessing(html: &str, config: &PreprocessConfig) -> Self {
        let cleaned = preprocess::preprocess_html(html, config);
        Self { html: Html::parse_document(&cleaned), base_url: config.base_url.clone() }
    }

    /// Base URL relative links were resolved against, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSelector`] if the selector does not parse.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Returns the first element matching `selector`.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(Element::new))
    }

    /// Text of the `<title>` element, if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// Value of a `<meta>` tag matched by `property` or `name`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        let selector = Selector::parse("meta").ok()?;
        self.html
            .select(&selector)
            .find(|el| {
                let value = el.value();
                value.attr("property") == Some(key) || value.attr("name") == Some(key)
            })
            .and_then(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }

    /// All text content of the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A single element of a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// HTML inside this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// HTML of this element including its own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text of this element with everything inside `excluded` left out.
    ///
    /// Text following `excluded` (its tail) is kept.
    pub fn text_excluding(&self, excluded: &Element<'_>) -> String {
        let skip = *excluded.element;
        let mut text = String::new();

        for node in self.element.descendants() {
            if node == skip || node.ancestors().any(|ancestor| ancestor == skip) {
                continue;
            }
            if let Some(fragment) = node.value().as_text() {
                text.push_str(fragment);
            }
        }

        text
    }

    /// Value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Nearest parent that is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Element::new)
    }

    /// Direct element children in document order.
    pub fn children(&self) -> Vec<Element<'a>> {
        self.element.children().filter_map(ElementRef::wrap).map(Element::new).collect()
    }

    /// Selects descendant elements using a CSS selector.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(Element::new).collect())
    }

    /// First descendant matching `selector`.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).next().map(Element::new))
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector(format!("{selector}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <meta property="og:title" content="  Shared Title ">
            <title>Test Page</title>
        </head>
        <body>
            <h1>Heading</h1>
            <div id="wrap"><p class="content">Paragraph 1</p><p class="content">Paragraph 2</p></div>
            <a href="https://example.com">Link</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Test Page".to_string()));
        assert!(doc.base_url().is_none());
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        assert!(matches!(doc.select("[[invalid"), Err(ExtractError::InvalidSelector(_))));
    }

    #[test]
    fn test_meta_content() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.meta_content("og:title"), Some("Shared Title".to_string()));
        assert_eq!(doc.meta_content("twitter:title"), None);
    }

    #[test]
    fn test_parent_and_children() {
        let doc = Document::parse(SAMPLE_HTML);
        let first = doc.select_first("p.content").unwrap().unwrap();
        let parent = first.parent().unwrap();

        assert_eq!(parent.attr("id"), Some("wrap"));
        assert_eq!(parent.children().len(), 2);
        assert_eq!(parent.children()[0], first);
    }

    #[test]
    fn test_text_excluding_keeps_tail() {
        let doc = Document::parse("<div><h1>Name</h1>after heading<p>body <b>bold</b></p></div>");
        let div = doc.select_first("div").unwrap().unwrap();
        let h1 = div.select_first("h1").unwrap().unwrap();

        assert_eq!(div.text_excluding(&h1), "after headingbody bold");
    }

    #[test]
    fn test_text_content() {
        let doc = Document::parse(SAMPLE_HTML);
        let text = doc.text_content();

        assert!(text.contains("Heading"));
        assert!(text.contains("Paragraph 2"));
    }
}

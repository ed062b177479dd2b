//! Generic readability extraction.
//!
//! Pages from domains without a dedicated strategy go through [`Readability`]:
//! the markup is cleaned, candidate blocks are scored, and the best block plus
//! its qualifying siblings becomes the article body. The title is the page
//! title shortened to its most descriptive segment.
//!
//! # Example
//!
//! ```rust
//! use pypo_core::Readability;
//!
//! let html = r#"<html><head><title>Kernel notes | Example Blog</title></head><body>
//!     <article class="post"><p>Scheduling, interrupts, memory, and the rest of the kernel are covered here in depth.
//!     Each section explains the moving parts, how they interact, and which trade-offs were made.</p></article>
//! </body></html>"#;
//!
//! let result = Readability::new().extract(html, Some("https://example.com/kernel")).unwrap();
//! assert_eq!(result.title, "Kernel notes | Example Blog");
//! assert!(result.article_body.contains("Scheduling"));
//! ```

use tracing::debug;
use url::Url;

use crate::article::ExtractionResult;
use crate::candidates::{ExtractConfig, extract_content};
use crate::parse::Document;
use crate::postprocess::PostProcessConfig;
use crate::preprocess::PreprocessConfig;
use crate::{ExtractError, Result};

/// Separators between the article name and the site name in page titles.
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " \u{2014} ", " :: ", " / "];

/// Words a title segment needs to stand on its own.
const MIN_TITLE_WORDS: usize = 4;

/// Configuration for the Readability extractor.
///
/// # Example
///
/// ```rust
/// use pypo_core::ReadabilityConfig;
///
/// let config = ReadabilityConfig::builder()
///     .min_score(25.0)
///     .char_threshold(500)
///     .preserve_images(true)
///     .build();
/// assert_eq!(config.min_score, 25.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReadabilityConfig {
    /// Minimum score threshold for extraction (default: 20.0).
    pub min_score: f64,

    /// Character count that marks a full block of content (default: 500).
    /// Blocks under a tenth of it are not scored.
    pub char_threshold: usize,

    /// Number of top candidates to track (default: 5).
    pub nb_top_candidates: usize,

    /// Maximum elements to parse (0 = 1000, default: 0).
    pub max_elems_to_parse: usize,

    /// Whether to unwrap unlikely candidates before scoring (default: true).
    pub remove_unlikely: bool,

    /// Whether to preserve class attributes in output HTML (default: false).
    pub keep_classes: bool,

    /// Whether to preserve images in output HTML (default: true).
    pub preserve_images: bool,
}

impl Default for ReadabilityConfig {
    fn default() -> Self {
        Self {
            min_score: 20.0,
            char_threshold: 500,
            nb_top_candidates: 5,
            max_elems_to_parse: 0,
            remove_unlikely: true,
            keep_classes: false,
            preserve_images: true,
        }
    }
}

impl ReadabilityConfig {
    /// Creates a new builder for ReadabilityConfig.
    pub fn builder() -> ReadabilityConfigBuilder {
        ReadabilityConfigBuilder::new()
    }
}

/// Builder for ReadabilityConfig.
pub struct ReadabilityConfigBuilder {
    config: ReadabilityConfig,
}

impl ReadabilityConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ReadabilityConfig::default() }
    }

    /// Sets the minimum score threshold.
    pub fn min_score(mut self, value: f64) -> Self {
        self.config.min_score = value;
        self
    }

    /// Sets the character threshold.
    pub fn char_threshold(mut self, value: usize) -> Self {
        self.config.char_threshold = value;
        self
    }

    /// Sets the number of top candidates.
    pub fn nb_top_candidates(mut self, value: usize) -> Self {
        self.config.nb_top_candidates = value;
        self
    }

    /// Sets the maximum elements to parse.
    pub fn max_elems_to_parse(mut self, value: usize) -> Self {
        self.config.max_elems_to_parse = value;
        self
    }

    /// Sets whether to remove unlikely candidates.
    pub fn remove_unlikely(mut self, value: bool) -> Self {
        self.config.remove_unlikely = value;
        self
    }

    /// Sets whether to preserve class attributes in output HTML.
    pub fn keep_classes(mut self, value: bool) -> Self {
        self.config.keep_classes = value;
        self
    }

    /// Sets whether to preserve images in output HTML.
    pub fn preserve_images(mut self, value: bool) -> Self {
        self.config.preserve_images = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ReadabilityConfig {
        self.config
    }
}

impl Default for ReadabilityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Heuristic extractor for pages without a domain strategy.
#[derive(Debug, Clone, Default)]
pub struct Readability {
    config: ReadabilityConfig,
}

impl Readability {
    /// Creates a new Readability instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Readability instance with a custom configuration.
    pub fn with_config(config: ReadabilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadabilityConfig {
        &self.config
    }

    /// Extracts title and main content from an HTML string.
    ///
    /// `url` is used to resolve relative links and as the title when the page
    /// has none.
    ///
    /// # Errors
    ///
    /// [`ExtractError::NoText`] for blank input, otherwise whatever candidate
    /// selection reports ([`ExtractError::NoContent`],
    /// [`ExtractError::NotReadable`]).
    pub fn extract(&self, html: &str, url: Option<&str>) -> Result<ExtractionResult> {
        if html.trim().is_empty() {
            return Err(ExtractError::NoText);
        }

        let preprocess = PreprocessConfig {
            remove_unlikely: self.config.remove_unlikely,
            base_url: url.and_then(|u| Url::parse(u).ok()),
            ..Default::default()
        };
        let doc = Document::parse_with_preprocessing(html, &preprocess);

        let extracted = extract_content(&doc, &self.extract_config())?;
        debug!(score = extracted.top_score, elements = extracted.element_count, "selected main content");

        let title = short_title(&doc).or_else(|| url.map(str::to_string)).unwrap_or_default();

        Ok(ExtractionResult::new(title, extracted.content))
    }

    /// Extracts without a known URL.
    pub fn parse(&self, html: &str) -> Result<ExtractionResult> {
        self.extract(html, None)
    }

    fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            min_score_threshold: self.config.min_score,
            max_top_candidates: self.config.nb_top_candidates,
            char_threshold: self.config.char_threshold,
            max_elements: if self.config.max_elems_to_parse == 0 { 1000 } else { self.config.max_elems_to_parse },
            sibling_threshold: 0.2,
            postprocess: PostProcessConfig {
                strip_images: !self.config.preserve_images,
                keep_classes: self.config.keep_classes,
                ..Default::default()
            },
        }
    }
}

/// The page title reduced to its most descriptive part.
///
/// Taken from `<title>`, then `og:title`, then the first `<h1>`. When the title
/// contains a separator such as `" | "` the longest segment is kept if it has at
/// least four words; otherwise the whole title is kept.
pub fn short_title(doc: &Document) -> Option<String> {
    let raw = doc
        .title()
        .map(|t| normalize_whitespace(&t))
        .filter(|t| !t.is_empty())
        .or_else(|| doc.meta_content("og:title").map(|t| normalize_whitespace(&t)))
        .or_else(|| {
            doc.select_first("h1")
                .ok()
                .flatten()
                .map(|h1| normalize_whitespace(&h1.text()))
                .filter(|t| !t.is_empty())
        })?;

    let Some(separator) = TITLE_SEPARATORS.iter().find(|sep| raw.contains(**sep)) else {
        return Some(raw);
    };

    let longest = raw
        .split(separator)
        .map(str::trim)
        .max_by_key(|segment| segment.split_whitespace().count())
        .unwrap_or_default();

    if longest.split_whitespace().count() >= MIN_TITLE_WORDS {
        Some(longest.to_string())
    } else {
        Some(raw)
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ARTICLE_HTML: &str = r##"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>Test Article</title>
            <script>var tracking = true;</script>
        </head>
        <body>
            <div class="menu"><a href="/">Home</a> <a href="/about">About</a></div>
            <article class="main-content">
                <h1>Article Title</h1>
                <p>This is a long paragraph with lots of content to ensure it meets the character threshold.</p>
                <p>This is another long paragraph with plenty of content, text, commas, and meaningful sentences for scoring.</p>
                <p>A third paragraph with substantial content that should help boost the overall readability score significantly.</p>
                <p><a href="/related">Related reading</a> and <img src="/figure.png" alt="figure"> inline.</p>
            </article>
        </body>
        </html>
    "##;

    #[test]
    fn test_readability_config_default() {
        let config = ReadabilityConfig::default();
        assert_eq!(config.min_score, 20.0);
        assert_eq!(config.char_threshold, 500);
        assert_eq!(config.nb_top_candidates, 5);
        assert_eq!(config.max_elems_to_parse, 0);
        assert!(config.remove_unlikely);
        assert!(!config.keep_classes);
        assert!(config.preserve_images);
    }

    #[test]
    fn test_readability_config_builder() {
        let config = ReadabilityConfig::builder()
            .min_score(30.0)
            .char_threshold(1000)
            .nb_top_candidates(10)
            .max_elems_to_parse(500)
            .remove_unlikely(false)
            .keep_classes(true)
            .preserve_images(false)
            .build();

        assert_eq!(config.min_score, 30.0);
        assert_eq!(config.char_threshold, 1000);
        assert_eq!(config.nb_top_candidates, 10);
        assert_eq!(config.max_elems_to_parse, 500);
        assert!(!config.remove_unlikely);
        assert!(config.keep_classes);
        assert!(!config.preserve_images);
    }

    #[test]
    fn test_extract_article() {
        let result = Readability::new().parse(ARTICLE_HTML).unwrap();

        assert_eq!(result.title, "Test Article");
        assert!(result.article_body.contains("another long paragraph"));
        assert!(!result.article_body.contains("tracking"));
        assert!(!result.article_body.contains("class="));
    }

    #[test]
    fn test_extract_resolves_relative_links() {
        let result = Readability::new().extract(ARTICLE_HTML, Some("https://example.com/blog/post")).unwrap();

        assert!(result.article_body.contains(r#"href="https://example.com/related""#));
        assert!(result.article_body.contains(r#"src="https://example.com/figure.png""#));
    }

    #[test]
    fn test_extract_strips_images_when_configured() {
        let reader = Readability::with_config(ReadabilityConfig::builder().preserve_images(false).build());
        let result = reader.parse(ARTICLE_HTML).unwrap();

        assert!(!result.article_body.contains("<img"));
    }

    #[test]
    fn test_extract_title_falls_back_to_url() {
        let html = ARTICLE_HTML.replace("<title>Test Article</title>", "").replace("<h1>Article Title</h1>", "");
        let result = Readability::new().extract(&html, Some("https://example.com/untitled")).unwrap();

        assert_eq!(result.title, "https://example.com/untitled");
    }

    #[test]
    fn test_extract_blank_input() {
        assert_eq!(Readability::new().parse("  \n ").unwrap_err(), ExtractError::NoText);
    }

    #[test]
    fn test_extract_navigation_only_page() {
        let html = r##"<html><body><nav><a href="#">Link 1</a><a href="#">Link 2</a></nav></body></html>"##;
        let err = Readability::new().parse(html).unwrap_err();

        assert!(matches!(err, ExtractError::NoContent | ExtractError::NotReadable { .. }));
    }

    #[rstest]
    #[case("Test Article", "Test Article")]
    #[case("How to write a parser in Rust | Example Blog", "How to write a parser in Rust")]
    #[case("Example Blog - How to write a parser in Rust", "How to write a parser in Rust")]
    #[case("Short Name | Example Blog", "Short Name | Example Blog")]
    #[case("News :: The quick brown fox jumps", "The quick brown fox jumps")]
    #[case("  Spaced\n   Title  ", "Spaced Title")]
    fn test_short_title(#[case] title: &str, #[case] expected: &str) {
        let doc = Document::parse(&format!("<html><head><title>{title}</title></head><body></body></html>"));
        assert_eq!(short_title(&doc).as_deref(), Some(expected));
    }

    #[test]
    fn test_short_title_fallbacks() {
        let og = Document::parse(r#"<html><head><meta property="og:title" content="Shared"></head></html>"#);
        assert_eq!(short_title(&og).as_deref(), Some("Shared"));

        let h1 = Document::parse("<html><body><h1>Heading Title</h1></body></html>");
        assert_eq!(short_title(&h1).as_deref(), Some("Heading Title"));

        let none = Document::parse("<html><body><p>text</p></body></html>");
        assert_eq!(short_title(&none), None);
    }
}

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Tags that never carry article content.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "canvas", "template"];

/// Tags kept even when their class or id looks unlikely.
const PROTECTED_TAGS: &[&str] = &["html", "body", "article", "main", "a"];

static UNLIKELY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|cookie|disqus|extra|foot|header|menu|related|remark|rss|share|shoutbox|sidebar|skyscraper|social|sponsor|ad-break|agegate|pagination|pager|popup)",
    )
    .expect("unlikely pattern is valid")
});

static MAYBE_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(and|article|body|column|content|entry|hentry|h-entry|main|page|post|shadow|text|blog|story)")
        .expect("candidate pattern is valid")
});

static HIDDEN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").expect("hidden pattern is valid")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script, style and other non-content tags
    pub remove_non_content: bool,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
    /// Whether to unwrap elements whose class/id marks them as unlikely content
    pub remove_unlikely: bool,
    /// Whether to remove elements hidden with inline styles
    pub remove_hidden: bool,
    /// Base URL for converting relative URLs
    pub base_url: Option<Url>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { remove_non_content: true, remove_comments: true, remove_unlikely: true, remove_hidden: true, base_url: None }
    }
}

/// Preprocess HTML by removing boilerplate elements and normalizing the document
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = strip_boilerplate(html, config);

    if let Some(base_url) = &config.base_url {
        processed = convert_relative_urls(&processed, base_url);
    }

    WHITESPACE.replace_all(&processed, " ").into_owned()
}

/// Whether a class or id value marks an element as unlikely content.
pub(crate) fn is_unlikely(value: &str) -> bool {
    value
        .split_whitespace()
        .any(|name| UNLIKELY.is_match(name) && !MAYBE_CANDIDATE.is_match(name))
}

/// Single rewriting pass removing non-content tags, comments, hidden elements
/// and unwrapping unlikely candidates.
fn strip_boilerplate(html: &str, config: &PreprocessConfig) -> String {
    let mut output = String::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                let tag = el.tag_name().to_ascii_lowercase();

                if config.remove_non_content && NON_CONTENT_TAGS.contains(&tag.as_str()) {
                    el.remove();
                    return Ok(());
                }

                if config.remove_hidden
                    && let Some(style) = el.get_attribute("style")
                    && HIDDEN_STYLE.is_match(&style)
                {
                    el.remove();
                    return Ok(());
                }

                if config.remove_unlikely && !PROTECTED_TAGS.contains(&tag.as_str()) {
                    let unlikely = ["class", "id"]
                        .iter()
                        .filter_map(|name| el.get_attribute(name))
                        .any(|value| is_unlikely(&value));
                    if unlikely {
                        el.remove_and_keep_content();
                    }
                }

                Ok(())
            })],
            document_content_handlers: if config.remove_comments {
                vec![lol_html::doc_comments!(|comment| {
                    comment.remove();
                    Ok(())
                })]
            } else {
                vec![]
            },
            ..Default::default()
        },
        |c: &[u8]| output.push_str(&String::from_utf8_lossy(c)),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Convert relative URLs of links and images to absolute URLs
pub fn convert_relative_urls(html: &str, base_url: &Url) -> String {
    let mut output = String::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                lol_html::element!("a[href]", |el| {
                    if let Some(href) = el.get_attribute("href")
                        && let Ok(absolute) = base_url.join(&href)
                    {
                        el.set_attribute("href", absolute.as_str()).ok();
                    }
                    Ok(())
                }),
                lol_html::element!("img[src]", |el| {
                    if let Some(src) = el.get_attribute("src")
                        && let Ok(absolute) = base_url.join(&src)
                    {
                        el.set_attribute("src", absolute.as_str()).ok();
                    }
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| output.push_str(&String::from_utf8_lossy(c)),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}

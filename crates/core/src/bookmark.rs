//! The saved resource extraction runs for.

use serde::{Deserialize, Serialize};

use crate::article::ExtractionResult;
use crate::domain::first_level_domain;

#[cfg(feature = "fetch")]
use crate::{DownloadError, Downloader, Extractor};

/// A bookmarked URL with its title, readable article and tags.
///
/// A new bookmark is titled with its own URL until an article is fetched.
///
/// ```rust
/// use pypo_core::Bookmark;
///
/// let bookmark = Bookmark::new("https://github.com/rust-lang/rust").with_tags([" lang ", "rust", "", "lang"]);
/// assert_eq!(bookmark.title, "https://github.com/rust-lang/rust");
/// assert_eq!(bookmark.domain().as_deref(), Some("github.com"));
/// assert_eq!(bookmark.tags, ["lang", "rust"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub url: String,
    pub title: String,
    pub readable_article: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Bookmark {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self { title: url.clone(), url, readable_article: None, tags: Vec::new() }
    }

    /// Replaces the tags, trimmed, without empty entries or duplicates.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
                normalized.push(tag.to_string());
            }
        }
        self.tags = normalized;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// First-level domain of the URL, `None` when it cannot be determined.
    pub fn domain(&self) -> Option<String> {
        first_level_domain(&self.url)
    }

    /// Stores an extraction result as title and article.
    pub fn apply(&mut self, result: ExtractionResult) {
        self.title = result.title;
        self.readable_article = Some(result.article_body);
    }

    /// Downloads the page and stores its extracted title and article.
    ///
    /// # Errors
    ///
    /// Returns the [`DownloadError`] when the page cannot be fetched. The
    /// bookmark is then titled with its URL and gets an empty article.
    #[cfg(feature = "fetch")]
    pub async fn fetch_article(&mut self, downloader: &Downloader, extractor: &Extractor) -> Result<(), DownloadError> {
        match downloader.download(&self.url).await {
            Ok(download) => {
                let result = extractor.parse_download(self, &download);
                self.apply(result);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(url = %self.url, error = %err, "could not download article");
                self.apply(ExtractionResult::fallback(&self.url));
                Err(err)
            }
        }
    }
}

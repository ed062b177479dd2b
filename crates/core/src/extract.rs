//! Dispatch of downloaded pages to an extraction strategy.
//!
//! [`Extractor::parse`] routes a page to the strategy registered for the
//! bookmark's domain, or to the generic [`Readability`] extractor when no
//! strategy is registered. It never fails: whenever a title and article cannot
//! be produced the result is the bookmark URL with an empty article.
//!
//! # Example
//!
//! ```rust
//! use pypo_core::{Bookmark, Extractor};
//!
//! let extractor = Extractor::new();
//! let bookmark = Bookmark::new("https://github.com/owner/repo");
//!
//! let result = extractor.parse(&bookmark, "text/html", None, None);
//! assert_eq!(result.title, "https://github.com/owner/repo");
//! assert_eq!(result.article_body, "");
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::{debug, warn};

use crate::article::ExtractionResult;
use crate::bookmark::Bookmark;
use crate::readability::Readability;
use crate::scrapers::{DOMAIN_STRATEGIES, StrategyFn};

#[cfg(feature = "fetch")]
use crate::download::DownloadResult;

static DEFAULT_EXTRACTOR: LazyLock<Extractor> = LazyLock::new(Extractor::new);

/// Strategy registry plus the generic fallback extractor.
///
/// The registry is fixed at construction; an `Extractor` can be shared
/// across threads and tasks.
#[derive(Debug, Clone)]
pub struct Extractor {
    strategies: HashMap<String, StrategyFn>,
    readability: Readability,
}

impl Extractor {
    /// Extractor with the built-in domain strategies.
    pub fn new() -> Self {
        Self::with_strategies(DOMAIN_STRATEGIES.iter().copied())
    }

    /// Extractor with a custom strategy table.
    ///
    /// Domains are matched case-insensitively; a later entry for the same
    /// domain replaces an earlier one.
    pub fn with_strategies<'a, I>(strategies: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, StrategyFn)>,
    {
        let strategies = strategies
            .into_iter()
            .map(|(domain, strategy)| (domain.to_ascii_lowercase(), strategy))
            .collect();
        Self { strategies, readability: Readability::new() }
    }

    /// Replaces the generic extractor used for unregistered domains.
    pub fn with_readability(mut self, readability: Readability) -> Self {
        self.readability = readability;
        self
    }

    /// Strategy registered for `domain`, if any.
    pub fn strategy_for(&self, domain: &str) -> Option<StrategyFn> {
        self.strategies.get(domain).copied()
    }

    /// Registered domains, sorted.
    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }

    /// Extracts title and article for a downloaded resource.
    ///
    /// Without decoded text no strategy runs. A registered strategy handles
    /// its domain; other pages go to the generic extractor. Every failure
    /// yields [`ExtractionResult::fallback`]. The raw bytes are accepted for
    /// strategies working on undecoded content; none of the built-in ones do.
    pub fn parse(
        &self, resource: &Bookmark, content_type: &str, decoded_text: Option<&str>, _raw_bytes: Option<&[u8]>,
    ) -> ExtractionResult {
        let Some(text) = decoded_text else {
            debug!(url = %resource.url, content_type, "no decoded text, using fallback");
            return ExtractionResult::fallback(&resource.url);
        };

        let domain = resource.domain();
        let outcome = match domain.as_deref().and_then(|d| self.strategy_for(d)) {
            Some(strategy) => {
                debug!(url = %resource.url, domain = domain.as_deref(), "using domain strategy");
                strategy(resource, content_type, text)
            }
            None => {
                debug!(url = %resource.url, domain = domain.as_deref(), "using generic extractor");
                self.readability.extract(text, Some(&resource.url))
            }
        };

        outcome.unwrap_or_else(|err| {
            warn!(url = %resource.url, domain = domain.as_deref(), error = %err, "extraction failed, using fallback");
            ExtractionResult::fallback(&resource.url)
        })
    }

    /// [`parse`](Self::parse) fed from a download.
    #[cfg(feature = "fetch")]
    pub fn parse_download(&self, resource: &Bookmark, download: &DownloadResult) -> ExtractionResult {
        self.parse(resource, download.content_type(), download.decoded_text(), download.raw_bytes())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Extractor::parse`] with the built-in strategies and default settings.
pub fn parse(
    resource: &Bookmark, content_type: &str, decoded_text: Option<&str>, raw_bytes: Option<&[u8]>,
) -> ExtractionResult {
    DEFAULT_EXTRACTOR.parse(resource, content_type, decoded_text, raw_bytes)
}

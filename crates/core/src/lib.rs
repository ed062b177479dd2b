pub mod article;
pub mod bookmark;
pub mod candidates;
pub mod domain;
#[cfg(feature = "fetch")]
pub mod download;
pub mod error;
pub mod extract;
pub mod parse;
pub mod postprocess;
pub mod preprocess;
pub mod readability;
pub mod scoring;
pub mod scrapers;

pub use article::{ExtractionResult, OutputFormat};
pub use bookmark::Bookmark;
#[doc(hidden)]
pub use candidates::{ExtractConfig, ExtractedContent, extract_content};
pub use domain::first_level_domain;
#[cfg(feature = "fetch")]
pub use download::{DEFAULT_MAX_CONTENT_LENGTH, DownloadConfig, DownloadConfigBuilder, DownloadResult, Downloader, download};
#[cfg(feature = "fetch")]
pub use error::DownloadError;
pub use error::{ExtractError, Result};
pub use extract::{Extractor, parse};
pub use parse::{Document, Element};
#[doc(hidden)]
pub use postprocess::{PostProcessConfig, postprocess_html};
#[doc(hidden)]
pub use preprocess::{PreprocessConfig, preprocess_html};
pub use readability::{Readability, ReadabilityConfig, ReadabilityConfigBuilder, short_title};
#[doc(hidden)]
pub use scoring::{ScoreConfig, ScoreResult, calculate_score};
pub use scrapers::{DOMAIN_STRATEGIES, StrategyFn, parse_readme};

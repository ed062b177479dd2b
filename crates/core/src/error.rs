//! Error types for downloading and extraction.
//!
//! Two error families live here. [`DownloadError`] is surfaced to callers of the
//! downloader: every way a fetch can fail to produce a
//! [`DownloadResult`](crate::download::DownloadResult) maps to one variant, with
//! the low-level cause available through [`std::error::Error::source`].
//!
//! [`ExtractError`] is the failure signal of extraction strategies. The
//! dispatcher in [`crate::extract`] always recovers from it, so callers of
//! [`Extractor::parse`](crate::extract::Extractor::parse) never see one.
//!
//! # Example
//!
//! ```rust
//! use pypo_core::ExtractError;
//!
//! let err = ExtractError::MissingElement("#readme article");
//! assert_eq!(err.to_string(), "Expected element not found: #readme article");
//! ```

use thiserror::Error;

/// Failure of a bounded download.
///
/// The `Display` output is the human readable message, the wrapped transport or
/// conversion error (if any) is exposed as the error source.
#[cfg(feature = "fetch")]
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The request could not be sent or no response head arrived
    /// (DNS failure, refused connection, timeout, TLS failure, malformed URL).
    #[error("Request failed")]
    RequestFailed {
        #[source]
        source: reqwest::Error,
    },

    /// The `content-length` header is not an integer.
    ///
    /// The cause is the integer parse error, or the transport error when the
    /// HTTP stack rejected the header before it reached us. `value` is the raw
    /// header when it could be read.
    #[error("Could not convert: content-length = {value}")]
    InvalidContentLength {
        value: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The declared `content-length` exceeds the configured maximum.
    ///
    /// This is a policy rejection and carries no cause.
    #[error("Aborting: content-length {length} is larger than max content length {max}")]
    ContentTooLarge { length: u64, max: u64 },

    /// The body stream broke after the response head was received.
    #[error("Reading response body failed")]
    ReadFailed {
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed (TLS backend initialisation).
    #[error("Could not build HTTP client")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

#[cfg(feature = "fetch")]
impl DownloadError {
    /// Human readable message, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Signal raised by an extraction strategy that cannot produce a result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Markup the strategy depends on is absent.
    #[error("Expected element not found: {0}")]
    MissingElement(&'static str),

    /// There is no decoded text to work on.
    #[error("No decoded text available")]
    NoText,

    /// No element qualified as a content candidate.
    #[error("No content could be extracted from the document")]
    NoContent,

    /// The best candidate scored below the readability threshold.
    #[error("Content is not readable (score {score} below threshold {threshold})")]
    NotReadable { score: f64, threshold: f64 },

    /// A CSS selector failed to parse.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Result alias for extraction steps.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_display() {
        let err = ExtractError::MissingElement("title");
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_not_readable_display() {
        let err = ExtractError::NotReadable { score: 15.0, threshold: 20.0 };
        assert!(err.to_string().contains("15"));
        assert!(err.to_string().contains("20"));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_content_too_large_message() {
        let err = DownloadError::ContentTooLarge { length: 2000, max: 1000 };
        assert_eq!(
            err.message(),
            "Aborting: content-length 2000 is larger than max content length 1000"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_invalid_content_length_keeps_cause() {
        let source = "invalid".parse::<u64>().unwrap_err();
        let err = DownloadError::InvalidContentLength { value: "invalid".to_string(), source: Box::new(source) };

        let message = err.to_string();
        assert!(message.contains("content-length"));
        assert!(message.contains("convert"));

        let cause = std::error::Error::source(&err).expect("cause should be kept");
        assert!(cause.downcast_ref::<std::num::ParseIntError>().is_some());
    }
}

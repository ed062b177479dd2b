//! Bounded downloading of bookmarked pages.
//!
//! A download is a single streaming GET that never buffers more than a fixed
//! number of bytes. The declared `content-length` is checked first so that an
//! honest oversized response is rejected before any body byte is read, and the
//! body is then read up to the bound no matter what the header claimed.
//!
//! Text responses (`text/*`) are decoded with the charset declared in the
//! `content-type` header. Undecodable sequences are replaced, an unknown charset
//! leaves the text undecoded; neither fails the download.
//!
//! # Example
//!
//! ```no_run
//! use pypo_core::{DownloadConfig, Downloader};
//!
//! # async fn example() -> Result<(), pypo_core::DownloadError> {
//! let downloader = Downloader::with_config(DownloadConfig::builder().max_content_length(1_000_000).build())?;
//! let result = downloader.download("https://example.com/article").await?;
//! println!("{} ({} bytes)", result.content_type(), result.raw_bytes().map_or(0, <[u8]>::len));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use encoding_rs::Encoding;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName};
use tracing::debug;

use crate::DownloadError;

/// Default upper bound for a download, roughly 10 MB.
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 10_490_000;

/// Charset assumed for text responses that do not declare one.
const DEFAULT_CHARSET: &str = "utf-8";

/// HTTP configuration of the downloader.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of body bytes read per download.
    pub max_content_length: u64,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Accept invalid or self-signed TLS certificates.
    ///
    /// Off by default. Turning it on trades certificate validation for
    /// reachability of misconfigured sites.
    pub accept_invalid_certs: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; pypo/0.4; read-it-later)".to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl DownloadConfig {
    /// Creates a new builder for DownloadConfig.
    pub fn builder() -> DownloadConfigBuilder {
        DownloadConfigBuilder::new()
    }
}

/// Builder for DownloadConfig.
///
/// ```rust
/// use pypo_core::DownloadConfig;
///
/// let config = DownloadConfig::builder().max_content_length(1000).timeout(5).build();
/// assert_eq!(config.max_content_length, 1000);
/// assert!(!config.accept_invalid_certs);
/// ```
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: DownloadConfig::default() }
    }

    /// Sets the maximum number of bytes read.
    pub fn max_content_length(mut self, value: u64) -> Self {
        self.config.max_content_length = value;
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, value: u64) -> Self {
        self.config.timeout = value;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.user_agent = value.into();
        self
    }

    /// Sets whether invalid TLS certificates are accepted.
    pub fn accept_invalid_certs(mut self, value: bool) -> Self {
        self.config.accept_invalid_certs = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> DownloadConfig {
        self.config
    }
}

impl Default for DownloadConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a successful bounded download.
///
/// Immutable once built. `decoded_text` is only ever present for `text/*`
/// content types and `raw_bytes` never exceeds the bound it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    content_type: String,
    raw_bytes: Option<Vec<u8>>,
    decoded_text: Option<String>,
}

impl DownloadResult {
    /// Builds a result from a content type and the bytes read, decoding the
    /// bytes when the content type is textual.
    pub fn from_body(content_type: impl Into<String>, raw_bytes: Option<Vec<u8>>) -> Self {
        let content_type = content_type.into();
        let decoded_text = raw_bytes.as_deref().and_then(|bytes| decode_text(&content_type, bytes));
        Self { content_type, raw_bytes, decoded_text }
    }

    /// MIME type as sent by the server, empty if the header was absent.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Body bytes, `None` when the server sent no body.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.raw_bytes.as_deref()
    }

    /// Decoded body of a text response.
    pub fn decoded_text(&self) -> Option<&str> {
        self.decoded_text.as_deref()
    }
}

/// Streaming HTTP downloader with a hard byte bound.
///
/// Cloning is cheap, the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
}

impl Downloader {
    /// Creates a downloader with default settings.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(DownloadConfig::default())
    }

    /// Creates a downloader from a configuration.
    pub fn with_config(config: DownloadConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|source| DownloadError::ClientBuild { source })?;

        Ok(Self { client, config })
    }

    /// The configuration this downloader was built with.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Downloads `url` bounded by the configured maximum content length.
    pub async fn download(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        self.download_with_limit(url, self.config.max_content_length).await
    }

    /// Downloads `url`, reading at most `max_content_length` bytes.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::RequestFailed`] for transport failures.
    /// - [`DownloadError::InvalidContentLength`] when `content-length` is not an integer.
    /// - [`DownloadError::ContentTooLarge`] when `content-length` exceeds the bound.
    /// - [`DownloadError::ReadFailed`] when the body stream breaks.
    pub async fn download_with_limit(&self, url: &str, max_content_length: u64) -> Result<DownloadResult, DownloadError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(send_error)?;

        let headers = response.headers();
        let content_length = declared_content_length(headers)?;
        if content_length > max_content_length {
            return Err(DownloadError::ContentTooLarge { length: content_length, max: max_content_length });
        }

        let content_type = header_str(headers, &CONTENT_TYPE).unwrap_or_default().to_string();
        debug!(url, status = %response.status(), content_type = %content_type, content_length, "response received");

        let raw_bytes = read_bounded(response.bytes_stream(), max_content_length)
            .await
            .map_err(|source| DownloadError::ReadFailed { source })?;
        debug!(url, bytes = raw_bytes.as_ref().map_or(0, Vec::len), "body read");

        Ok(DownloadResult::from_body(content_type, raw_bytes))
    }
}

/// Downloads `url` with a default [`Downloader`], reading at most
/// `max_content_length` bytes.
pub async fn download(url: &str, max_content_length: u64) -> Result<DownloadResult, DownloadError> {
    Downloader::new()?.download_with_limit(url, max_content_length).await
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Maps a failed `send()` to a download error.
///
/// hyper validates `content-length` while parsing the response head, so a
/// non-integer header surfaces here as a parse error inside the transport
/// error rather than reaching [`declared_content_length`].
fn send_error(source: reqwest::Error) -> DownloadError {
    if rejected_content_length(&source) {
        return DownloadError::InvalidContentLength {
            value: "<rejected by the HTTP parser>".to_string(),
            source: Box::new(source),
        };
    }
    DownloadError::RequestFailed { source }
}

/// Whether a cause of `err` is hyper rejecting the `content-length` header.
fn rejected_content_length(err: &reqwest::Error) -> bool {
    std::iter::successors(std::error::Error::source(err), |cause| cause.source())
        .any(|cause| cause.to_string().to_ascii_lowercase().contains("content-length"))
}

/// Parses the `content-length` header, `0` when absent.
fn declared_content_length(headers: &HeaderMap) -> Result<u64, DownloadError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(0);
    };

    let raw = String::from_utf8_lossy(value.as_bytes()).into_owned();
    raw.trim()
        .parse::<u64>()
        .map_err(|source| DownloadError::InvalidContentLength { value: raw, source: Box::new(source) })
}

/// Collects at most `max` bytes from a chunk stream.
///
/// Stops pulling chunks once the bound is reached; the last chunk is cut to
/// fit. Returns `None` when the stream produced no bytes.
async fn read_bounded<S, B, E>(stream: S, max: u64) -> Result<Option<Vec<u8>>, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    let limit = usize::try_from(max).unwrap_or(usize::MAX);
    let mut stream = std::pin::pin!(stream);
    let mut buffer = Vec::new();

    while buffer.len() < limit {
        let Some(chunk) = stream.next().await else {
            break;
        };
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        let take = chunk.len().min(limit - buffer.len());
        buffer.extend_from_slice(&chunk[..take]);
    }

    Ok(if buffer.is_empty() { None } else { Some(buffer) })
}

/// Extracts the `charset` parameter of a content type.
fn charset_of(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\''))
    })
}

/// Decodes the body of a `text/*` response.
///
/// Returns `None` for other content types and for charset labels
/// `encoding_rs` does not know. A `text/*` response without a `charset`
/// parameter is decoded as UTF-8, not the ISO-8859-1 default of RFC 2616.
/// Malformed sequences become U+FFFD instead of being dropped.
fn decode_text(content_type: &str, bytes: &[u8]) -> Option<String> {
    if !content_type.trim_start().to_ascii_lowercase().starts_with("text/") {
        return None;
    }

    let label = charset_of(content_type).unwrap_or(DEFAULT_CHARSET);
    let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
        debug!(charset = label, "unknown charset, leaving body undecoded");
        return None;
    };

    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        debug!(charset = encoding.name(), "replaced malformed sequences while decoding");
    }
    Some(text.into_owned())
}

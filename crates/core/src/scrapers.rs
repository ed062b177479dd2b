//! Domain strategies.
//!
//! A strategy turns the decoded page of one website into an
//! [`ExtractionResult`], or reports why it cannot. [`DOMAIN_STRATEGIES`] is the
//! table the [`Extractor`](crate::Extractor) registry is built from.

use crate::article::ExtractionResult;
use crate::bookmark::Bookmark;
use crate::parse::Document;
use crate::{ExtractError, Result};

/// Extraction function for pages of one domain.
///
/// Receives the bookmark, the content type and the decoded text of the page.
pub type StrategyFn = fn(&Bookmark, &str, &str) -> Result<ExtractionResult>;

/// Registrable domains and the strategy that handles their pages.
pub const DOMAIN_STRATEGIES: &[(&str, StrategyFn)] = &[("github.com", parse_readme), ("bitbucket.org", parse_readme)];

const README_SELECTOR: &str = "#readme article";

/// Reads the readme of a repository page.
///
/// The body is the text of the first `#readme article` element without its
/// first `<h1>`, the title is the text of the page `<title>`.
///
/// # Errors
///
/// [`ExtractError::MissingElement`] when the page has no readme or no title.
///
/// ```rust
/// use pypo_core::{Bookmark, scrapers::parse_readme};
///
/// let html = r#"<html><head><title>owner/repo</title></head><body>
///     <div id="readme"><article><h1>repo</h1><p>Does things.</p></article></div>
/// </body></html>"#;
///
/// let bookmark = Bookmark::new("https://github.com/owner/repo");
/// let result = parse_readme(&bookmark, "text/html", html).unwrap();
/// assert_eq!(result.title, "owner/repo");
/// assert_eq!(result.article_body, "Does things.");
/// ```
pub fn parse_readme(_resource: &Bookmark, _content_type: &str, text: &str) -> Result<ExtractionResult> {
    let doc = Document::parse(text);

    let readme = doc
        .select_first(README_SELECTOR)?
        .ok_or(ExtractError::MissingElement(README_SELECTOR))?;
    let article_body = match readme.select_first("h1")? {
        Some(heading) => readme.text_excluding(&heading),
        None => readme.text(),
    };

    let title = doc.title().ok_or(ExtractError::MissingElement("title"))?;

    Ok(ExtractionResult::new(title, article_body))
}

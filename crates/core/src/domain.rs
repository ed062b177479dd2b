//! Derivation of the registrable domain a strategy is keyed on.

use url::{Host, Url};

/// Second-level labels that sit under a two-letter country TLD and are not
/// registrable on their own (`example.co.uk`, `example.com.au`).
const COUNTRY_SECOND_LEVELS: &[&str] = &["ac", "co", "com", "edu", "go", "gov", "ne", "net", "or", "org"];

/// Returns the first-level domain of a URL, lowercased.
///
/// `https://www.github.com/rust-lang` and `https://gist.github.com/x` both map
/// to `github.com`. Malformed URLs, IP hosts and hosts without a plausible
/// top-level domain yield `None`.
///
/// ```rust
/// use pypo_core::first_level_domain;
///
/// assert_eq!(first_level_domain("https://www.GitHub.com/rust-lang/rust"), Some("github.com".to_string()));
/// assert_eq!(first_level_domain("http://news.bbc.co.uk/a"), Some("bbc.co.uk".to_string()));
/// assert_eq!(first_level_domain("foobar"), None);
/// ```
pub fn first_level_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = match parsed.host()? {
        Host::Domain(domain) => domain.trim_end_matches('.').to_ascii_lowercase(),
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return None;
    }

    let tld = labels[labels.len() - 1];
    if !is_top_level_label(tld) {
        return None;
    }

    let second = labels[labels.len() - 2];
    let keep = if tld.len() == 2 && COUNTRY_SECOND_LEVELS.contains(&second) && labels.len() >= 3 { 3 } else { 2 };

    Some(labels[labels.len() - keep..].join("."))
}

fn is_top_level_label(label: &str) -> bool {
    label.starts_with("xn--") || (label.len() >= 2 && label.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://www.example.com/", Some("example.com"))]
    #[case("https://github.com/rust-lang/rust", Some("github.com"))]
    #[case("https://gist.github.com/someone/1234", Some("github.com"))]
    #[case("https://BitBucket.org/team/repo", Some("bitbucket.org"))]
    #[case("http://news.bbc.co.uk/story", Some("bbc.co.uk"))]
    #[case("https://example.com.:8080/x", Some("example.com"))]
    #[case("http://xn--bcher-kva.xn--p1ai/", Some("xn--bcher-kva.xn--p1ai"))]
    fn test_first_level_domain(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(first_level_domain(url).as_deref(), expected);
    }

    #[rstest]
    #[case("foobar")]
    #[case("")]
    #[case("http://localhost:8000/")]
    #[case("http://127.0.0.1/page")]
    #[case("http://[::1]/page")]
    #[case("http://some_invalid_localhost")]
    #[case("http://example.123/")]
    #[case("mailto:someone@example.com")]
    fn test_first_level_domain_unresolvable(#[case] url: &str) {
        assert_eq!(first_level_domain(url), None);
    }
}

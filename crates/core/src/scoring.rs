use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Element;

/// Class/id fragments suggesting an element holds the main content
static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story|readme|markdown)")
        .expect("positive pattern is valid")
});

/// Class/id fragments suggesting boilerplate
static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|com-|contact|foot|footer|footnote|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|tool|widget|pagination|pager|popup)",
    )
    .expect("negative pattern is valid")
});

/// Configuration for content scoring algorithm
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Maximum content density score from character count
    pub max_char_density_score: f64,
    /// Maximum content density score from comma count
    pub max_comma_density_score: f64,
    /// Characters per point for content density scoring
    pub chars_per_point: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            max_comma_density_score: 3.0,
            chars_per_point: 100,
        }
    }
}

/// Breakdown of an element's score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// Base score from tag type
    pub base_score: f64,
    /// Weight adjustment from class/ID patterns
    pub class_weight: f64,
    /// Content density score
    pub content_density: f64,
    /// Link density (0.0 to 1.0)
    pub link_density: f64,
    /// Final calculated score
    pub final_score: f64,
}

/// Score contributed by the tag alone
///
/// Containers that usually wrap articles score high, lists and headings
/// slightly negative, navigation chrome lowest.
pub fn base_tag_score(element: &Element<'_>) -> f64 {
    match element.tag_name().as_str() {
        "article" => 10.0,
        "section" | "main" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "pre" | "p" => 0.0,
        "form" | "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" | "aside" => -5.0,
        _ => 0.0,
    }
}

/// Weight from class and id names
///
/// The id is checked first; a positive match wins over a negative one.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let names = element
        .attr("id")
        .into_iter()
        .chain(element.attr("class").into_iter().flat_map(str::split_whitespace));

    for name in names {
        if POSITIVE.is_match(name) {
            return config.positive_weight;
        }
        if NEGATIVE.is_match(name) {
            return config.negative_weight;
        }
    }

    0.0
}

/// One point per `chars_per_point` characters plus one per comma, each capped
pub fn content_density_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let text = element.text();
    let char_score = ((text.chars().count() / config.chars_per_point) as f64).min(config.max_char_density_score);
    let comma_score = (text.matches(',').count() as f64).min(config.max_comma_density_score);

    char_score + comma_score
}

/// Ratio of link text to all text, 0.0 for empty elements
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_length = element.text().chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let link_text_length: usize = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| link.text().chars().count())
        .sum();

    link_text_length as f64 / text_length as f64
}

/// Whether a `<pre>` block looks like source code rather than prose
fn looks_like_code(text: &str) -> bool {
    let len = text.len();
    if len <= 50 {
        return false;
    }

    let ratio = |count: usize| count as f64 / len as f64;
    let special = text.chars().filter(|c| !c.is_alphanumeric() && !c.is_whitespace()).count();

    ratio(special) > 0.15 && ratio(text.matches(',').count()) < 0.01 && ratio(text.matches(' ').count()) < 0.15
}

/// Calculate the final score for an element
///
/// `(base + class weight + density + code penalty) * (1 - link density)`,
/// with the link penalty halved for elements that carry a positive class or
/// more than 500 characters of text.
pub fn calculate_score(element: &Element<'_>, config: &ScoreConfig) -> ScoreResult {
    let base_score = base_tag_score(element);
    let class_weight = class_id_weight(element, config);
    let content_density = content_density_score(element, config);
    let ld = link_density(element);

    let text = element.text();
    let code_penalty = if element.tag_name() == "pre" && looks_like_code(&text) { -10.0 } else { 0.0 };

    let lenient = class_weight > 0.0 || text.chars().count() > 500;
    let link_penalty = if lenient { 1.0 - ld * 0.5 } else { 1.0 - ld };

    let final_score = (base_score + class_weight + content_density + code_penalty) * link_penalty;

    ScoreResult { base_score, class_weight, content_density, link_density: ld, final_score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use rstest::rstest;

    fn score_first(html: &str, selector: &str) -> ScoreResult {
        let doc = Document::parse(html);
        let element = doc.select_first(selector).unwrap().unwrap();
        calculate_score(&element, &ScoreConfig::default())
    }

    #[rstest]
    #[case("<article>x</article>", "article", 10.0)]
    #[case("<section>x</section>", "section", 8.0)]
    #[case("<div>x</div>", "div", 5.0)]
    #[case("<blockquote>x</blockquote>", "blockquote", 3.0)]
    #[case("<ul><li>x</li></ul>", "li", -3.0)]
    #[case("<nav>x</nav>", "nav", -5.0)]
    fn test_base_tag_score(#[case] html: &str, #[case] selector: &str, #[case] expected: f64) {
        let doc = Document::parse(html);
        let element = doc.select_first(selector).unwrap().unwrap();
        assert_eq!(base_tag_score(&element), expected);
    }

    #[rstest]
    #[case(r#"<div class="article-content">x</div>"#, 25.0)]
    #[case(r#"<div id="main-content">x</div>"#, 25.0)]
    #[case(r#"<div class="sidebar">x</div>"#, -25.0)]
    #[case(r#"<div class="container" id="wrapper">x</div>"#, 0.0)]
    #[case(r#"<div id="post" class="sidebar">x</div>"#, 25.0)]
    fn test_class_id_weight(#[case] html: &str, #[case] expected: f64) {
        let doc = Document::parse(html);
        let element = doc.select_first("div").unwrap().unwrap();
        assert_eq!(class_id_weight(&element, &ScoreConfig::default()), expected);
    }

    #[test]
    fn test_content_density_caps() {
        let doc = Document::parse(&format!("<div>{}</div>", "a, ".repeat(300)));
        let element = doc.select_first("div").unwrap().unwrap();
        assert_eq!(content_density_score(&element, &ScoreConfig::default()), 6.0);
    }

    #[test]
    fn test_link_density() {
        let doc = Document::parse(r##"<div id="a"><a href="#">Link text</a></div><div id="b">Some text <a href="#">link</a></div><div id="c"></div>"##);
        let density = |id: &str| link_density(&doc.select_first(&format!("#{id}")).unwrap().unwrap());

        assert_eq!(density("a"), 1.0);
        assert!(density("b") > 0.0 && density("b") < 1.0);
        assert_eq!(density("c"), 0.0);
    }

    #[test]
    fn test_code_block_penalized() {
        let code = "fn main(){let x=vec![1;2];println!(\"{:?}\";x.iter().map(|v|v*2).sum());}";
        let result = score_first(&format!("<pre>{code}</pre>"), "pre");
        assert!(result.final_score < 0.0);
    }

    #[test]
    fn test_navigation_scores_negative() {
        let result = score_first(
            r##"<nav class="menu"><a href="#">Link 1</a><a href="#">Link 2</a><a href="#">Link 3</a></nav>"##,
            "nav",
        );
        assert_eq!(result.base_score, -5.0);
        assert_eq!(result.link_density, 1.0);
        assert!(result.final_score <= 0.0);
    }

    #[test]
    fn test_article_scores_high() {
        let result = score_first(
            r##"<article class="main-content">
                A long piece of text that should score well, with commas, to indicate prose content, and more.
                <a href="#">Small link</a>
                More text here to increase character count, more commas, more content.
            </article>"##,
            "article",
        );
        assert_eq!(result.class_weight, 25.0);
        assert!(result.link_density > 0.0 && result.link_density < 0.3);
        assert!(result.final_score > 35.0);
    }
}

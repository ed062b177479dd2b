use std::cmp::Ordering;

use crate::parse::{Document, Element};
use crate::postprocess::{PostProcessConfig, postprocess_html};
use crate::scoring::{ScoreConfig, ScoreResult, calculate_score, link_density};
use crate::{ExtractError, Result};

/// Tags that are considered potential content containers
const CANDIDATE_TAGS: &[&str] = &["div", "article", "section", "main", "p", "td", "pre", "blockquote"];

/// Configuration for candidate selection
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum score threshold for top candidate
    pub min_score_threshold: f64,
    /// Maximum number of top candidates to track
    pub max_top_candidates: usize,
    /// Minimum character threshold for content
    pub char_threshold: usize,
    /// Maximum elements to consider
    pub max_elements: usize,
    /// Sibling score threshold (multiplier of top score)
    pub sibling_threshold: f64,
    /// Post-processing configuration
    pub postprocess: PostProcessConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_score_threshold: 20.0,
            max_top_candidates: 5,
            char_threshold: 500,
            max_elements: 1000,
            sibling_threshold: 0.2,
            postprocess: PostProcessConfig::default(),
        }
    }
}

/// A candidate element with its score
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub element: Element<'a>,
    pub score_result: ScoreResult,
}

impl<'a> Candidate<'a> {
    fn new(element: Element<'a>, score_result: ScoreResult) -> Self {
        Self { element, score_result }
    }

    pub fn score(&self) -> f64 {
        self.score_result.final_score
    }
}

/// The main content picked out of a document
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Cleaned HTML of the top candidate and its siblings
    pub content: String,
    /// Score of the top candidate
    pub top_score: f64,
    /// Number of elements joined into `content`
    pub element_count: usize,
}

/// Score every candidate-tag element with enough text, in document order
///
/// Short elements are skipped unless they are semantic containers and do not
/// count towards `max_elements`.
fn identify_candidates<'a>(
    doc: &'a Document, config: &ExtractConfig, score_config: &ScoreConfig,
) -> Vec<Candidate<'a>> {
    let max_elements = if config.max_elements == 0 { usize::MAX } else { config.max_elements };
    let min_chars = config.char_threshold / 10;

    let Ok(elements) = doc.select(&CANDIDATE_TAGS.join(", ")) else {
        return Vec::new();
    };

    elements
        .into_iter()
        .filter(|element| {
            matches!(element.tag_name().as_str(), "article" | "section" | "main")
                || element.text().trim().chars().count() >= min_chars
        })
        .take(max_elements)
        .map(|element| {
            let score_result = calculate_score(&element, score_config);
            Candidate::new(element, score_result)
        })
        .collect()
}

/// Add a share of each candidate's score to its parent (half) and
/// grandparent (a third)
///
/// Ancestors that are not yet candidates are scored and added. Boosts are
/// computed from the scores before propagation.
fn propagate_scores(candidates: &mut Vec<Candidate<'_>>, score_config: &ScoreConfig) {
    let boosts: Vec<_> = candidates
        .iter()
        .flat_map(|candidate| {
            let parent = candidate.element.parent();
            let grandparent = parent.and_then(|p| p.parent());
            [(parent, candidate.score() / 2.0), (grandparent, candidate.score() / 3.0)]
        })
        .filter_map(|(ancestor, boost)| ancestor.map(|a| (a, boost)))
        .filter(|(ancestor, _)| ancestor.tag_name() != "html")
        .collect();

    for (ancestor, boost) in boosts {
        match candidates.iter().position(|c| c.element == ancestor) {
            Some(index) => candidates[index].score_result.final_score += boost,
            None => {
                let mut score_result = calculate_score(&ancestor, score_config);
                score_result.final_score += boost;
                candidates.push(Candidate::new(ancestor, score_result));
            }
        }
    }
}

/// Highest scoring candidate, provided it reaches the minimum threshold
fn select_top_candidate<'c, 'a>(candidates: &'c [Candidate<'a>], config: &ExtractConfig) -> Result<&'c Candidate<'a>> {
    let top_candidate = candidates
        .iter()
        .max_by(|a, b| compare_candidates(a, b))
        .ok_or(ExtractError::NoContent)?;

    if top_candidate.score() < config.min_score_threshold {
        return Err(ExtractError::NotReadable { score: top_candidate.score(), threshold: config.min_score_threshold });
    }

    Ok(top_candidate)
}

/// Children of the top candidate's parent worth keeping, in document order
///
/// A sibling qualifies if it is a candidate scoring at least
/// `top_score * sibling_threshold`, or a paragraph over 80 characters with a
/// link density below 0.25.
fn select_siblings<'a>(
    top_candidate: &Candidate<'a>, candidates: &[Candidate<'a>], config: &ExtractConfig,
) -> Vec<Element<'a>> {
    let Some(parent) = top_candidate.element.parent() else {
        return Vec::new();
    };
    let threshold = (top_candidate.score() * config.sibling_threshold).max(0.0);

    parent
        .children()
        .into_iter()
        .filter(|sibling| *sibling != top_candidate.element)
        .filter(|sibling| {
            let scored = candidates
                .iter()
                .find(|c| c.element == *sibling)
                .is_some_and(|c| c.score() >= threshold);

            scored
                || (sibling.tag_name() == "p"
                    && sibling.text().trim().chars().count() > 80
                    && link_density(sibling) < 0.25)
        })
        .collect()
}

fn compare_candidates(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.score()
        .partial_cmp(&b.score())
        .unwrap_or(Ordering::Equal)
        .then_with(|| candidate_priority(&a.element.tag_name()).cmp(&candidate_priority(&b.element.tag_name())))
        .then_with(|| a.element.text().chars().count().cmp(&b.element.text().chars().count()))
}

fn candidate_priority(tag_name: &str) -> u8 {
    match tag_name {
        "article" | "main" | "section" => 3,
        "div" => 2,
        _ => 1,
    }
}

/// HTML of an element to splice into the output; document-level containers
/// contribute only their children.
fn fragment(element: &Element<'_>) -> String {
    match element.tag_name().as_str() {
        "body" | "html" => element.inner_html(),
        _ => element.outer_html(),
    }
}

/// Extract the main content from a document
///
/// 1. Identifies candidate elements
/// 2. Propagates scores to ancestors
/// 3. Selects the top candidate
/// 4. Includes qualifying siblings
/// 5. Post-processes the joined content
///
/// # Errors
///
/// [`ExtractError::NoContent`] when nothing qualifies as a candidate or the
/// cleaned content has no text, [`ExtractError::NotReadable`] when the best
/// candidate scores below the threshold.
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Result<ExtractedContent> {
    let score_config = ScoreConfig::default();

    let mut candidates = identify_candidates(doc, config, &score_config);
    propagate_scores(&mut candidates, &score_config);

    candidates.sort_by(|a, b| compare_candidates(b, a));
    candidates.truncate(config.max_top_candidates.max(1));

    let top_candidate = select_top_candidate(&candidates, config)?;
    let siblings = select_siblings(top_candidate, &candidates, config);

    let mut joined = String::from("<div>");
    if siblings.is_empty() {
        joined.push_str(&fragment(&top_candidate.element));
    } else {
        let top = top_candidate.element;
        let parent_children = top.parent().map(|p| p.children()).unwrap_or_default();
        for element in parent_children.iter().filter(|c| **c == top || siblings.contains(c)) {
            joined.push_str(&fragment(element));
        }
    }
    joined.push_str("</div>");

    let content = postprocess_html(&joined, &config.postprocess);
    if Document::parse(&content).text_content().trim().is_empty() {
        return Err(ExtractError::NoContent);
    }

    Ok(ExtractedContent { content, top_score: top_candidate.score(), element_count: 1 + siblings.len() })
}

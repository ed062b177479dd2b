use std::sync::LazyLock;

use regex::Regex;

/// Elements dropped from an extracted article together with their content.
const CHROME_TAGS: &[&str] = &["form", "input", "button", "select", "textarea", "object", "embed", "nav", "aside", "footer"];

/// Containers dropped when they end up empty.
const EMPTY_CANDIDATE_TAGS: &[&str] = &["div", "p", "span", "section", "article", "header", "li", "ul", "ol"];

static EMPTY_NODE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    EMPTY_CANDIDATE_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"<{tag}(?:\s[^>]*)?>(?:\s|&nbsp;|<br\s*/?>)*</{tag}>"))
                .expect("empty node pattern is valid")
        })
        .collect()
});

/// Configuration for cleanup of extracted article HTML
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    /// Whether to remove form controls, navigation and footers
    pub remove_chrome: bool,
    /// Whether to remove empty containers
    pub remove_empty_nodes: bool,
    /// Maximum passes for removing empty nodes
    pub max_empty_node_passes: usize,
    /// Whether to strip all images
    pub strip_images: bool,
    /// Whether to keep class and id attributes
    pub keep_classes: bool,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            remove_chrome: true,
            remove_empty_nodes: true,
            max_empty_node_passes: 10,
            strip_images: false,
            keep_classes: false,
        }
    }
}

/// Post-process extracted HTML by cleaning up remaining unwanted content
pub fn postprocess_html(html: &str, config: &PostProcessConfig) -> String {
    let mut processed = rewrite_elements(html, config);

    if config.remove_empty_nodes {
        processed = remove_empty_nodes(&processed, config.max_empty_node_passes);
    }

    processed.trim().to_string()
}

fn rewrite_elements(html: &str, config: &PostProcessConfig) -> String {
    let mut output = String::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                let tag = el.tag_name().to_ascii_lowercase();

                if config.remove_chrome && CHROME_TAGS.contains(&tag.as_str()) {
                    el.remove();
                    return Ok(());
                }

                if config.strip_images && matches!(tag.as_str(), "img" | "picture" | "figure") {
                    el.remove();
                    return Ok(());
                }

                if !config.keep_classes {
                    el.remove_attribute("class");
                    el.remove_attribute("id");
                }
                el.remove_attribute("style");

                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.push_str(&String::from_utf8_lossy(c)),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    output
}

/// Remove empty containers, repeating until nothing changes
///
/// Removing a node can leave its parent empty, hence the passes.
fn remove_empty_nodes(html: &str, max_passes: usize) -> String {
    let mut result = html.to_string();

    for _ in 0..max_passes {
        let before = result.len();
        for re in EMPTY_NODE.iter() {
            result = re.replace_all(&result, "").into_owned();
        }
        if result.len() == before {
            break;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postprocess_config_default() {
        let config = PostProcessConfig::default();
        assert!(config.remove_chrome);
        assert!(config.remove_empty_nodes);
        assert_eq!(config.max_empty_node_passes, 10);
        assert!(!config.strip_images);
        assert!(!config.keep_classes);
    }

    #[test]
    fn test_removes_chrome() {
        let html = r#"<div><p>Text</p><form><input name="q"><button>Go</button></form><footer>Legal</footer></div>"#;
        let result = postprocess_html(html, &PostProcessConfig::default());

        assert_eq!(result, "<div><p>Text</p></div>");
    }

    #[test]
    fn test_strips_classes_ids_and_styles() {
        let html = r#"<div class="post" id="main" style="color:red"><p class="lead">Text</p></div>"#;
        let result = postprocess_html(html, &PostProcessConfig::default());

        assert_eq!(result, "<div><p>Text</p></div>");
    }

    #[test]
    fn test_keep_classes() {
        let html = r#"<div class="post"><p>Text</p></div>"#;
        let config = PostProcessConfig { keep_classes: true, ..Default::default() };

        assert!(postprocess_html(html, &config).contains(r#"class="post""#));
    }

    #[test]
    fn test_strip_images() {
        let html = r#"<p>Text <img src="a.png" alt="a"></p>"#;
        let config = PostProcessConfig { strip_images: true, ..Default::default() };

        assert_eq!(postprocess_html(html, &config), "<p>Text </p>");
        assert!(postprocess_html(html, &PostProcessConfig::default()).contains("<img"));
    }

    #[test]
    fn test_remove_empty_nodes_nested() {
        let html = "<div><div><p> </p><span><br></span></div></div><p>Kept</p>";
        assert_eq!(remove_empty_nodes(html, 10), "<p>Kept</p>");
    }

    #[test]
    fn test_remove_empty_nodes_respects_passes() {
        let html = "<div><div><p></p></div></div>";
        assert_eq!(remove_empty_nodes(html, 1), "<div><div></div></div>");
    }
}

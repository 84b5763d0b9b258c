//! Wrap patterns and the CSS selectors they are usually built from.
//!
//! Selectors are parsed and matched by `scraper`, so the full selector
//! grammar it supports is available: compound selectors, attribute
//! operators, combinators and structural pseudo-classes such as `:not()` or
//! `:first-child`.
//!
//! Matching runs over an HTML rendition of the tree in which every element
//! carries its path as an extra attribute. A match reports that attribute, so
//! the result always points back at the original node, even where the HTML
//! parser moves elements around.
//!
//! ## Examples
//!
//! ```rust
//! use wayfinder_lib::rewrite::WrapPattern;
//! use wayfinder_lib::tree::SyntaxNode;
//!
//! let pattern = WrapPattern::selector("svg[id^='mermaid-']").unwrap();
//! let diagram = SyntaxNode::element("svg").with_property("id", "mermaid-3");
//! let icon = SyntaxNode::element("svg").with_property("id", "logo");
//!
//! assert!(pattern.matches(&diagram));
//! assert!(!pattern.matches(&icon));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use scraper::Html;

use crate::error::{WayfinderError, WayfinderResult};
use crate::html::to_html;
use crate::tree::SyntaxNode;

/// Selector matching the diagram elements a mermaid renderer emits.
pub const DEFAULT_MERMAID_SELECTOR: &str = "svg[id^='mermaid-']";

/// Attribute holding an element's dot-separated path while it is matched.
const PATH_ATTR: &str = "data-wayfinder-path";

/// A parsed CSS selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    inner: scraper::Selector,
}

impl Selector {
    /// Parses a selector list.
    ///
    /// ## Errors
    ///
    /// Returns [`WayfinderError::InvalidSelector`] with the parser's reason
    /// when `source` is not a valid selector list.
    pub fn parse(source: &str) -> WayfinderResult<Self> {
        let inner =
            scraper::Selector::parse(source).map_err(|e| WayfinderError::InvalidSelector {
                selector: source.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            source: source.to_string(),
            inner,
        })
    }

    /// Returns the paths of every element in `tree` matched by this
    /// selector, in document order.
    ///
    /// Combinators and structural pseudo-classes see the tree as a browser
    /// would after parsing its HTML.
    pub fn match_paths(&self, tree: &SyntaxNode) -> Vec<Vec<usize>> {
        let mut marked = tree.clone();
        mark_paths(&mut marked, &mut Vec::new());
        let fragment = Html::parse_fragment(&to_html(&marked));

        let mut paths: Vec<Vec<usize>> = fragment
            .select(&self.inner)
            .filter_map(|element| element.value().attr(PATH_ATTR))
            .filter_map(parse_path)
            .collect();
        // the parser may have reordered misnested elements
        paths.sort();
        paths.dedup();
        paths
    }

    /// Returns `true` if `node` is an element matched by this selector.
    ///
    /// The node is matched on its own, without ancestors or children, so
    /// only selectors that describe a single element can match here.
    pub fn matches(&self, node: &SyntaxNode) -> bool {
        if node.tag_name().is_none() {
            return false;
        }
        let mut shallow = SyntaxNode::new(node.kind.clone());
        shallow.properties = node.properties.clone();
        self.match_paths(&shallow).iter().any(Vec::is_empty)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = WayfinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn mark_paths(node: &mut SyntaxNode, path: &mut Vec<usize>) {
    if node.tag_name().is_some() {
        let key = path
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(".");
        node.set_property(PATH_ATTR, key);
    }
    for (index, child) in node.children.iter_mut().enumerate() {
        path.push(index);
        mark_paths(child, path);
        path.pop();
    }
}

fn parse_path(key: &str) -> Option<Vec<usize>> {
    if key.is_empty() {
        return Some(Vec::new());
    }
    key.split('.').map(|index| index.parse().ok()).collect()
}

/// Decides which nodes a rewrite pass wraps.
#[derive(Clone)]
pub enum WrapPattern {
    /// Elements matched by a selector list.
    Selector(Selector),
    /// Any node accepted by a structural predicate.
    Predicate(Arc<dyn Fn(&SyntaxNode) -> bool + Send + Sync>),
}

impl WrapPattern {
    /// Builds a pattern from a selector string.
    ///
    /// ## Errors
    ///
    /// Returns [`WayfinderError::InvalidSelector`] if the selector cannot be parsed.
    pub fn selector(source: &str) -> WayfinderResult<Self> {
        Selector::parse(source).map(WrapPattern::Selector)
    }

    /// Builds a pattern from an arbitrary predicate.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&SyntaxNode) -> bool + Send + Sync + 'static,
    {
        WrapPattern::Predicate(Arc::new(predicate))
    }

    /// Tests a single node; see [`Selector::matches`] for how selectors
    /// treat a node out of context.
    pub fn matches(&self, node: &SyntaxNode) -> bool {
        match self {
            WrapPattern::Selector(selector) => selector.matches(node),
            WrapPattern::Predicate(predicate) => predicate(node),
        }
    }

    /// Paths of every node in `tree` this pattern selects, in document order.
    pub fn match_paths(&self, tree: &SyntaxNode) -> Vec<Vec<usize>> {
        match self {
            WrapPattern::Selector(selector) => selector.match_paths(tree),
            WrapPattern::Predicate(predicate) => tree.find_paths(|node| predicate(node)),
        }
    }
}

impl Default for WrapPattern {
    fn default() -> Self {
        WrapPattern::selector(DEFAULT_MERMAID_SELECTOR).expect("default selector is valid")
    }
}

impl fmt::Debug for WrapPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapPattern::Selector(selector) => {
                f.debug_tuple("Selector").field(&selector.as_str()).finish()
            }
            WrapPattern::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_fragment;

    fn svg(id: &str) -> SyntaxNode {
        SyntaxNode::element("svg").with_property("id", id)
    }

    #[test]
    fn test_default_selector_matches_mermaid_output() {
        let pattern = WrapPattern::default();
        assert!(pattern.matches(&svg("mermaid-0")));
        assert!(pattern.matches(&svg("mermaid-")));
        assert!(!pattern.matches(&svg("not-mermaid-0")));
        assert!(!pattern.matches(&SyntaxNode::element("div").with_property("id", "mermaid-0")));
        assert!(!pattern.matches(&SyntaxNode::element("svg")));
    }

    #[test]
    fn test_selector_never_matches_non_elements() {
        let pattern = WrapPattern::selector("*").unwrap();
        assert!(pattern.matches(&SyntaxNode::element("p")));
        assert!(!pattern.matches(&SyntaxNode::text("svg")));
    }

    #[test]
    fn test_tag_match_is_case_insensitive() {
        let selector = Selector::parse("DIV").unwrap();
        assert!(selector.matches(&SyntaxNode::element("div")));
    }

    #[test]
    fn test_id_and_class_conditions() {
        let selector = Selector::parse("div#main.card.wide").unwrap();
        let node = SyntaxNode::element("div")
            .with_property("id", "main")
            .with_property("class", "wide card");
        assert!(selector.matches(&node));
        assert!(!selector.matches(&node.clone().with_property("class", "card")));
    }

    #[test]
    fn test_attribute_operators() {
        let node = SyntaxNode::element("a")
            .with_property("href", "https://example.com/docs.pdf")
            .with_property("rel", "external noopener");

        assert!(Selector::parse("a[href]").unwrap().matches(&node));
        assert!(Selector::parse("a[href^=\"https:\"]").unwrap().matches(&node));
        assert!(Selector::parse("a[href$='.pdf']").unwrap().matches(&node));
        assert!(Selector::parse("a[href*=example]").unwrap().matches(&node));
        assert!(Selector::parse("a[rel~=noopener]").unwrap().matches(&node));
        assert!(!Selector::parse("a[rel=noopener]").unwrap().matches(&node));
        assert!(!Selector::parse("a[title]").unwrap().matches(&node));
    }

    #[test]
    fn test_empty_prefix_matches_nothing() {
        assert!(!Selector::parse("svg[id^='']").unwrap().matches(&svg("mermaid-0")));
    }

    #[test]
    fn test_selector_list() {
        let selector = Selector::parse("pre.mermaid, svg[id^=mermaid-]").unwrap();
        assert!(selector.matches(&svg("mermaid-2")));
        assert!(selector.matches(&SyntaxNode::element("pre").with_property("class", "mermaid")));
        assert!(!selector.matches(&SyntaxNode::element("pre")));
    }

    #[test]
    fn test_invalid_selectors() {
        for source in ["", "   ", "div >", "div[", "div[id^x]", "#", ",", "p:hover"] {
            let err = Selector::parse(source).unwrap_err();
            assert!(err.to_string().starts_with("Invalid selector"), "{err}");
            let WayfinderError::InvalidSelector { selector, reason } = err else {
                panic!("{source:?} should be rejected as a selector");
            };
            assert_eq!(selector, source);
            assert!(!reason.is_empty());
        }
    }

    #[test]
    fn test_combinators_and_pseudo_classes() {
        let tree = parse_fragment(concat!(
            r#"<section><svg id="mermaid-0" class="x"></svg><svg id="mermaid-1"></svg></section>"#,
            r#"<svg id="mermaid-2"></svg>"#,
        ));

        let paths = |source: &str| Selector::parse(source).unwrap().match_paths(&tree);

        assert_eq!(paths("section > svg"), vec![vec![0, 0], vec![0, 1]]);
        assert_eq!(paths("section svg:not(.x)"), vec![vec![0, 1]]);
        assert_eq!(paths("svg:first-child"), vec![vec![0, 0]]);
        assert_eq!(paths("svg + svg"), vec![vec![0, 1]]);
        assert_eq!(paths("section ~ svg"), vec![vec![1]]);
        assert_eq!(paths("svg[id^='mermaid-']").len(), 3);
    }

    #[test]
    fn test_match_paths_point_at_original_nodes() {
        // the HTML parser closes the outer <p> before the inner one opens
        let inner = SyntaxNode::element("p").with_property("class", "target");
        let outer = SyntaxNode::element("p").with_children(vec![SyntaxNode::text("lead"), inner]);
        let tree = SyntaxNode::root(vec![SyntaxNode::element("div").with_children(vec![outer])]);

        let paths = Selector::parse("p.target").unwrap().match_paths(&tree);
        assert_eq!(paths, vec![vec![0, 0, 1]]);
        assert_eq!(
            tree.get(&paths[0]).and_then(|n| n.property("class")),
            Some("target")
        );
    }

    #[test]
    fn test_matching_leaves_tree_untouched() {
        let tree = parse_fragment(r#"<svg id="mermaid-0"></svg>"#);
        let before = tree.clone();
        WrapPattern::default().match_paths(&tree);
        assert_eq!(tree, before);
        assert_eq!(to_html(&tree), r#"<svg id="mermaid-0"></svg>"#);
    }

    #[test]
    fn test_root_element_matches_with_empty_path() {
        let paths = WrapPattern::default().match_paths(&svg("mermaid-9"));
        assert_eq!(paths, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_predicate_match_paths() {
        let tree = parse_fragment("<ul><li>a</li><li>b</li></ul>");
        let items = WrapPattern::predicate(|n| n.is_element("li"));
        assert_eq!(items.match_paths(&tree), vec![vec![0, 0], vec![0, 1]]);
    }

    #[test]
    fn test_predicate_pattern() {
        let pattern = WrapPattern::predicate(|n| n.children.len() > 1);
        let node = SyntaxNode::element("ul")
            .with_children(vec![SyntaxNode::element("li"), SyntaxNode::element("li")]);
        assert!(pattern.matches(&node));
        assert!(!pattern.matches(&SyntaxNode::element("ul")));
        assert_eq!(format!("{pattern:?}"), "Predicate(..)");
    }

    #[test]
    fn test_display_round_trips_source() {
        let selector: Selector = DEFAULT_MERMAID_SELECTOR.parse().unwrap();
        assert_eq!(selector.to_string(), DEFAULT_MERMAID_SELECTOR);
    }
}

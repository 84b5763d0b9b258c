//! Built-in tree transforms for rendered documents.

use crate::config::{AutolinkConfig, WrapConfig};
use crate::error::WayfinderResult;
use crate::rewrite::{WrapPattern, WrapperTemplate, wrap_matches};
use crate::toc::Slugger;
use crate::tree::SyntaxNode;

use super::TreeTransform;

pub const HEADING_SLUG: &str = "heading-slug";
pub const AUTOLINK_HEADINGS: &str = "autolink-headings";
pub const MERMAID_WRAP: &str = "mermaid-wrap";

/// Returns the level of an `h1`-`h6` element.
pub fn heading_level(node: &SyntaxNode) -> Option<u8> {
    let tag = node.tag_name()?.as_bytes();
    match tag {
        [h, level @ b'1'..=b'6'] if h.eq_ignore_ascii_case(&b'h') => Some(level - b'0'),
        _ => None,
    }
}

/// Gives every rendered heading without an `id` a unique one.
///
/// Uses the same derivation as markdown headings, so the anchors agree with
/// the links in the extracted outline. Markup inside a heading does not
/// contribute to its slug on either side.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingSlugStage;

impl TreeTransform for HeadingSlugStage {
    fn name(&self) -> &str {
        HEADING_SLUG
    }

    fn apply(&self, tree: &mut SyntaxNode) -> WayfinderResult<()> {
        let mut slugger = Slugger::new();
        for node in tree.descendants() {
            if heading_level(node).is_some()
                && let Some(id) = node.property("id")
            {
                slugger.reserve(id);
            }
        }

        tree.visit_mut(&mut |node| {
            if heading_level(node).is_some() && node.property("id").is_none() {
                let id = slugger.slug(&node.text_content());
                node.set_property("id", id);
            }
        });
        Ok(())
    }
}

/// Wraps the content of each heading that has an `id` in a link to itself.
///
/// `<h2 id="setup">Setup</h2>` becomes
/// `<h2 id="setup"><a class="toc-link" href="#setup">Setup</a></h2>`.
#[derive(Debug, Clone)]
pub struct AutolinkHeadingsStage {
    class: String,
}

impl AutolinkHeadingsStage {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    pub fn from_config(config: &AutolinkConfig) -> Self {
        Self::new(config.class.clone())
    }

    fn is_own_link(&self, node: &SyntaxNode, href: &str) -> bool {
        node.is_element("a") && node.property("href") == Some(href)
    }
}

impl Default for AutolinkHeadingsStage {
    fn default() -> Self {
        Self::from_config(&AutolinkConfig::default())
    }
}

impl TreeTransform for AutolinkHeadingsStage {
    fn name(&self) -> &str {
        AUTOLINK_HEADINGS
    }

    fn apply(&self, tree: &mut SyntaxNode) -> WayfinderResult<()> {
        tree.visit_mut(&mut |node| {
            if heading_level(node).is_none() {
                return;
            }
            let Some(id) = node.property("id") else {
                return;
            };
            let href = format!("#{id}");
            // already linked by an earlier run
            if let [only] = node.children.as_slice()
                && self.is_own_link(only, &href)
            {
                return;
            }

            let mut link = SyntaxNode::element("a").with_property("href", href);
            if !self.class.is_empty() {
                link.set_property("class", self.class.clone());
            }
            link.children = std::mem::take(&mut node.children);
            node.children = vec![link];
        });
        Ok(())
    }
}

/// Wraps rendered diagrams (or anything else the pattern selects) in a
/// container element.
#[derive(Debug, Clone, Default)]
pub struct WrapStage {
    pattern: WrapPattern,
    template: WrapperTemplate,
}

impl WrapStage {
    pub fn new(pattern: WrapPattern, template: WrapperTemplate) -> Self {
        Self { pattern, template }
    }

    pub fn from_config(config: &WrapConfig) -> WayfinderResult<Self> {
        Ok(Self::new(config.pattern()?, config.template()?))
    }
}

impl TreeTransform for WrapStage {
    fn name(&self) -> &str {
        MERMAID_WRAP
    }

    fn apply(&self, tree: &mut SyntaxNode) -> WayfinderResult<()> {
        wrap_matches(tree, &self.pattern, || self.template.build());
        Ok(())
    }
}

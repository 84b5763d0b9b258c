//! Wrapper element templates such as `div.mermaid-container`.

use std::fmt;
use std::str::FromStr;

use crate::error::{WayfinderError, WayfinderResult};
use crate::tree::SyntaxNode;

/// Template used for the diagram container.
pub const DEFAULT_MERMAID_WRAPPER: &str = "div.mermaid-container";

/// Describes the element a matched node is wrapped in.
///
/// Written as `tag#id.class1.class2`; the tag is optional and defaults to
/// `div`, so `.note` and `div.note` are equivalent.
///
/// ## Examples
///
/// ```rust
/// use wayfinder_lib::rewrite::WrapperTemplate;
///
/// let template = WrapperTemplate::parse("section#diagrams.wide.dark").unwrap();
/// let node = template.build();
///
/// assert!(node.is_element("section"));
/// assert_eq!(node.property("id"), Some("diagrams"));
/// assert_eq!(node.property("class"), Some("wide dark"));
/// assert!(node.children.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperTemplate {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl WrapperTemplate {
    /// Parses a `tag#id.class` template.
    ///
    /// ## Errors
    ///
    /// Returns [`WayfinderError::InvalidWrapper`] for empty names, a second
    /// `#id`, or characters outside `[A-Za-z0-9_-]`.
    pub fn parse(template: &str) -> WayfinderResult<Self> {
        let invalid = |reason: &str| WayfinderError::InvalidWrapper {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = template.trim();
        if trimmed.is_empty() {
            return Err(invalid("template is empty"));
        }

        let name_end = trimmed.find(['#', '.']).unwrap_or(trimmed.len());
        let (tag, mut rest) = trimmed.split_at(name_end);
        if !tag.is_empty() && !is_name(tag) {
            return Err(invalid("tag name must be alphanumeric"));
        }

        let mut id = None;
        let mut classes = Vec::new();
        while let Some(marker) = rest.chars().next() {
            rest = &rest[1..];
            let end = rest.find(['#', '.']).unwrap_or(rest.len());
            let (name, tail) = rest.split_at(end);
            rest = tail;

            if !is_name(name) {
                return Err(invalid(&format!("expected a name after `{marker}`")));
            }
            if marker == '#' {
                if id.is_some() {
                    return Err(invalid("only one `#id` is allowed"));
                }
                id = Some(name.to_string());
            } else {
                classes.push(name.to_string());
            }
        }

        Ok(Self {
            tag: if tag.is_empty() { "div" } else { tag }.to_string(),
            id,
            classes,
        })
    }

    /// Creates a fresh, childless wrapper element.
    pub fn build(&self) -> SyntaxNode {
        let mut node = SyntaxNode::element(self.tag.clone());
        if let Some(id) = &self.id {
            node.set_property("id", id.clone());
        }
        if !self.classes.is_empty() {
            node.set_property("class", self.classes.join(" "));
        }
        node
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Default for WrapperTemplate {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            id: None,
            classes: vec!["mermaid-container".to_string()],
        }
    }
}

impl FromStr for WrapperTemplate {
    type Err = WayfinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WrapperTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)?;
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_mermaid_template() {
        assert_eq!(
            WrapperTemplate::parse(DEFAULT_MERMAID_WRAPPER).unwrap(),
            WrapperTemplate::default()
        );
        assert_eq!(WrapperTemplate::default().to_string(), DEFAULT_MERMAID_WRAPPER);
    }

    #[test]
    fn test_tag_defaults_to_div() {
        let template = WrapperTemplate::parse(".note").unwrap();
        assert_eq!(template.tag, "div");
        assert_eq!(template.classes, vec!["note"]);
    }

    #[test]
    fn test_build_creates_fresh_element() {
        let template = WrapperTemplate::parse("figure#fig.a.b").unwrap();
        let node = template.build();
        assert!(node.is_element("figure"));
        assert_eq!(node.property("id"), Some("fig"));
        assert_eq!(node.classes().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_plain_tag_has_no_properties() {
        let node = WrapperTemplate::parse("span").unwrap().build();
        assert!(node.properties.is_empty());
    }

    #[test]
    fn test_invalid_templates() {
        for template in ["", "  ", "div.", "#", "div#a#b", "div..x", "d iv", "div.a b"] {
            let err = WrapperTemplate::parse(template).unwrap_err();
            assert!(
                matches!(err, WayfinderError::InvalidWrapper { .. }),
                "{template:?} should be rejected"
            );
        }
    }
}

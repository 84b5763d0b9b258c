//! Type definitions for document outlines.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{WayfinderError, WayfinderResult};

/// Deepest heading level markdown supports.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// One heading in an outline forest.
///
/// Entries nest by level: an entry is a child of the nearest preceding
/// entry with a lower level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// The level of the heading (1-6).
    pub level: u8,
    /// Plain text of the heading, without markup or `{#id}` suffix.
    pub text: String,
    /// Anchor identifier the outline links to.
    pub anchor_id: String,
    /// Entries for deeper headings under this one.
    pub children: Vec<HeadingEntry>,
}

impl HeadingEntry {
    pub fn new(level: u8, text: impl Into<String>, anchor_id: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            anchor_id: anchor_id.into(),
            children: Vec::new(),
        }
    }

    /// Returns the total number of entries in this subtree (including self).
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(HeadingEntry::node_count).sum::<usize>()
    }
}

/// Which headings are eligible for the outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingScope {
    /// Only headings that are direct children of the document root.
    #[default]
    TopLevel,
    /// Every heading, including those inside block quotes and list items.
    Anywhere,
}

/// Options controlling outline extraction and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineOptions {
    /// Deepest heading level to include (1-6).
    pub max_depth: u8,
    /// Regex; headings whose whole text matches (case-insensitively) are left out.
    pub skip: Option<String>,
    /// Render a tight list (no blank lines or paragraphs inside items).
    pub tight: bool,
    /// Render ordered (`1.`) lists instead of bullets.
    pub ordered: bool,
    /// Prepended to every anchor in link targets.
    pub prefix: Option<String>,
    pub scope: HeadingScope,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_HEADING_LEVEL,
            skip: None,
            tight: false,
            ordered: false,
            prefix: None,
            scope: HeadingScope::TopLevel,
        }
    }
}

impl OutlineOptions {
    /// Validates the options, compiling the `skip` pattern.
    ///
    /// ## Errors
    ///
    /// Returns [`WayfinderError::InvalidOption`] when `max_depth` is outside
    /// `1..=6` or `skip` is not a valid regex.
    pub fn validate(&self) -> WayfinderResult<ValidatedOptions> {
        if !(1..=MAX_HEADING_LEVEL).contains(&self.max_depth) {
            return Err(WayfinderError::InvalidOption {
                option: "max_depth",
                reason: format!(
                    "expected a level between 1 and {MAX_HEADING_LEVEL}, got {}",
                    self.max_depth
                ),
            });
        }

        let skip = self
            .skip
            .as_deref()
            .map(|pattern| {
                RegexBuilder::new(&format!("^(?:{pattern})$"))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| WayfinderError::InvalidOption {
                        option: "skip",
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        Ok(ValidatedOptions {
            max_depth: self.max_depth,
            skip,
            scope: self.scope,
        })
    }

    /// Builds the `#...` link target for an anchor.
    pub fn link_target(&self, anchor_id: &str) -> String {
        format!("#{}{anchor_id}", self.prefix.as_deref().unwrap_or_default())
    }
}

/// [`OutlineOptions`] that passed validation, ready for heading collection.
#[derive(Debug, Clone)]
pub struct ValidatedOptions {
    pub(crate) max_depth: u8,
    pub(crate) skip: Option<Regex>,
    pub(crate) scope: HeadingScope,
}

impl ValidatedOptions {
    /// Returns `true` if a heading with this level and text belongs in the outline.
    pub fn includes(&self, level: u8, text: &str) -> bool {
        level <= self.max_depth && !self.skip.as_ref().is_some_and(|re| re.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        let validated = OutlineOptions::default().validate().unwrap();
        assert!(validated.includes(6, "Anything"));
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let options = OutlineOptions {
            max_depth: 0,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(matches!(
            err,
            WayfinderError::InvalidOption {
                option: "max_depth",
                ..
            }
        ));
    }

    #[test]
    fn test_depth_above_six_is_rejected() {
        let options = OutlineOptions {
            max_depth: 7,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_invalid_skip_pattern_is_rejected() {
        let options = OutlineOptions {
            skip: Some("(unclosed".to_string()),
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("skip"));
    }

    #[test]
    fn test_skip_matches_whole_text_case_insensitively() {
        let validated = OutlineOptions {
            skip: Some("table of contents|changelog".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert!(!validated.includes(2, "Table of Contents"));
        assert!(!validated.includes(2, "CHANGELOG"));
        assert!(validated.includes(2, "Changelog entries"));
    }

    #[test]
    fn test_link_target_with_prefix() {
        let options = OutlineOptions {
            prefix: Some("user-content-".to_string()),
            ..Default::default()
        };
        assert_eq!(options.link_target("intro"), "#user-content-intro");
        assert_eq!(OutlineOptions::default().link_target("intro"), "#intro");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: OutlineOptions =
            toml::from_str("max_depth = 3\nscope = \"anywhere\"").unwrap();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.scope, HeadingScope::Anywhere);
        assert!(!options.tight);
    }

    #[test]
    fn test_negative_depth_fails_to_deserialize() {
        let result: Result<OutlineOptions, _> = toml::from_str("max_depth = -1");
        assert!(result.is_err());
    }

    #[test]
    fn test_heading_entry_node_count() {
        let mut root = HeadingEntry::new(1, "Root", "root");
        let mut child = HeadingEntry::new(2, "Child", "child");
        child.children.push(HeadingEntry::new(3, "Leaf", "leaf"));
        root.children.push(child);
        root.children.push(HeadingEntry::new(2, "Sibling", "sibling"));

        assert_eq!(root.node_count(), 4);
        assert_eq!(HeadingEntry::new(1, "Alone", "alone").node_count(), 1);
    }
}

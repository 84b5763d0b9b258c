//! Anchor identifiers for headings.
//!
//! Identifiers come from three places, in order of precedence:
//!
//! 1. an `id` property already present on the heading,
//! 2. an explicit `{#custom-id}` suffix at the end of the heading text,
//! 3. a slug derived from the heading's plain text.
//!
//! Explicit identifiers (1 and 2) are reserved before any slug is derived,
//! so derived anchors never collide with them.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::tree::{NodeKind, SyntaxNode};

lazy_static! {
    static ref CUSTOM_ID: Regex =
        Regex::new(r"\s*\{#([^\s{}]+)\}\s*$").expect("custom id regex is valid");
}

/// Fallback used when a heading has no alphanumeric characters at all.
const EMPTY_SLUG: &str = "heading";

/// Generates a URL-fragment-safe slug from heading text.
///
/// Lower-cases alphanumerics and collapses every run of whitespace or
/// punctuation into a single hyphen; leading and trailing hyphens are trimmed.
///
/// ## Examples
///
/// ```rust
/// use wayfinder_lib::toc::slug::generate_slug;
///
/// assert_eq!(generate_slug("Hello World"), "hello-world");
/// assert_eq!(generate_slug("  What's   New?  "), "what-s-new");
/// assert_eq!(generate_slug("???"), "heading");
/// ```
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Hands out anchor identifiers that are unique within one document.
#[derive(Debug, Default, Clone)]
pub struct Slugger {
    used: HashSet<String>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as taken. Returns `false` if it was already taken.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.used.insert(id.to_string())
    }

    /// Derives a unique slug for `text`, appending `-1`, `-2`, ... on collision.
    pub fn slug(&mut self, text: &str) -> String {
        let base = generate_slug(text);
        if self.reserve(&base) {
            return base;
        }

        let mut suffix = 1usize;
        loop {
            let candidate = format!("{base}-{suffix}");
            if self.reserve(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Removes a trailing `{#custom-id}` from a heading's text and returns the id.
///
/// Only the last child is inspected, and only when it is a text node.
pub fn take_custom_id(heading: &mut SyntaxNode) -> Option<String> {
    let last = heading.children.last_mut()?;
    if last.kind != NodeKind::Text {
        return None;
    }
    let value = last.value.as_mut()?;
    let captures = CUSTOM_ID.captures(value)?;
    let id = captures.get(1)?.as_str().to_string();
    let start = captures.get(0)?.start();
    value.truncate(start);
    Some(id)
}

/// Assigns an `id` property to every heading in `tree`, in document order.
///
/// Running this twice over the same tree yields the same identifiers: headings
/// that already carry an `id` are left untouched. Returns the number of
/// headings that received a derived identifier.
#[tracing::instrument(skip(tree))]
pub fn assign_heading_ids(tree: &mut SyntaxNode) -> usize {
    let mut slugger = Slugger::new();

    // explicit ids first, so derived slugs can steer around them
    tree.visit_mut(&mut |node| {
        if !node.is_heading() {
            return;
        }
        if node.property("id").is_none()
            && let Some(id) = take_custom_id(node)
        {
            node.set_property("id", id);
        }
        if let Some(id) = node.property("id")
            && !slugger.reserve(id)
        {
            tracing::warn!(id, "Duplicate explicit heading id");
        }
    });

    let mut assigned = 0;
    tree.visit_mut(&mut |node| {
        if node.is_heading() && node.property("id").is_none() {
            let id = slugger.slug(&node.text_content());
            node.set_property("id", id);
            assigned += 1;
        }
    });

    tracing::debug!(assigned, "Assigned heading ids");
    assigned
}

//! Markdown outline (table of contents) extraction.
//!
//! The extractor parses a document, assigns an anchor identifier to every
//! heading, folds the headings into a [`HeadingEntry`] forest and renders
//! that forest back to markdown as a nested list of links.
//!
//! ## Examples
//!
//! ```rust
//! use wayfinder_lib::toc::{OutlineOptions, extract_outline};
//!
//! let content = "# Introduction\n\nWelcome.\n\n## Getting Started\n\nFirst steps.";
//! let outline = extract_outline(content, &OutlineOptions::default()).unwrap();
//!
//! assert!(outline.contains("[Introduction](#introduction)"));
//! assert!(outline.contains("[Getting Started](#getting-started)"));
//! ```

pub mod slug;
mod types;

pub use slug::{Slugger, assign_heading_ids, generate_slug};
pub use types::{
    HeadingEntry, HeadingScope, MAX_HEADING_LEVEL, OutlineOptions, ValidatedOptions,
};

use crate::error::WayfinderResult;
use crate::markdown::{parse, to_markdown};
use crate::tree::{NodeKind, SyntaxNode};

/// Extracts the outline of a markdown document as markdown text.
///
/// Returns the empty string when the document has no (eligible) headings.
/// The function is pure: the same input and options always produce the same
/// output.
///
/// ## Errors
///
/// Returns [`WayfinderError::InvalidOption`](crate::error::WayfinderError::InvalidOption)
/// for invalid options. Malformed markdown never fails; it degrades to text.
#[tracing::instrument(skip(markdown, options), fields(len = markdown.len()))]
pub fn extract_outline(markdown: &str, options: &OutlineOptions) -> WayfinderResult<String> {
    let validated = options.validate()?;

    let mut tree = parse(markdown);
    assign_heading_ids(&mut tree);

    let headings = collect_headings(&tree, &validated);
    let forest = build_forest(headings);
    tracing::debug!(
        roots = forest.len(),
        headings = forest.iter().map(HeadingEntry::node_count).sum::<usize>(),
        "Collected headings"
    );
    match render_outline(&forest, options) {
        Some(list) => to_markdown(&list),
        None => Ok(String::new()),
    }
}

/// Collects the eligible headings of an annotated tree as a flat list.
///
/// Headings are expected to carry an `id` property (see
/// [`assign_heading_ids`]); a heading without one falls back to the slug of
/// its text.
pub fn collect_headings(tree: &SyntaxNode, options: &ValidatedOptions) -> Vec<HeadingEntry> {
    let candidates: Vec<&SyntaxNode> = match options.scope {
        HeadingScope::TopLevel => tree.children.iter().filter(|n| n.is_heading()).collect(),
        HeadingScope::Anywhere => tree.descendants().filter(|n| n.is_heading()).collect(),
    };

    candidates
        .into_iter()
        .filter_map(|heading| {
            let level = heading.depth.unwrap_or(1);
            // setext headings can span lines
            let text = heading
                .text_content()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if !options.includes(level, &text) {
                return None;
            }
            let anchor_id = heading
                .property("id")
                .map(str::to_string)
                .unwrap_or_else(|| generate_slug(&text));
            Some(HeadingEntry::new(level, text, anchor_id))
        })
        .collect()
}

/// Folds a flat heading list into a forest using a stack of open ancestors.
///
/// An entry becomes a child of the nearest preceding entry with a lower
/// level; entries with no such predecessor become roots.
pub fn build_forest(headings: Vec<HeadingEntry>) -> Vec<HeadingEntry> {
    let mut roots: Vec<HeadingEntry> = Vec::new();
    let mut stack: Vec<HeadingEntry> = Vec::new();

    fn close(entry: HeadingEntry, stack: &mut [HeadingEntry], roots: &mut Vec<HeadingEntry>) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(entry),
            None => roots.push(entry),
        }
    }

    for entry in headings {
        // pop entries at the same or a deeper level
        while stack.last().is_some_and(|top| top.level >= entry.level) {
            if let Some(done) = stack.pop() {
                close(done, &mut stack, &mut roots);
            }
        }
        stack.push(entry);
    }

    while let Some(done) = stack.pop() {
        close(done, &mut stack, &mut roots);
    }

    roots
}

/// Renders a heading forest as a nested list of links.
///
/// Returns `None` for an empty forest.
pub fn render_outline(forest: &[HeadingEntry], options: &OutlineOptions) -> Option<SyntaxNode> {
    if forest.is_empty() {
        return None;
    }
    Some(render_list(forest, options))
}

fn render_list(entries: &[HeadingEntry], options: &OutlineOptions) -> SyntaxNode {
    let spread = !options.tight;
    let items = entries
        .iter()
        .map(|entry| {
            let link = SyntaxNode::new(NodeKind::Link {
                url: options.link_target(&entry.anchor_id),
                title: None,
            })
            .with_children(vec![SyntaxNode::text(entry.text.clone())]);

            let mut children =
                vec![SyntaxNode::new(NodeKind::Paragraph).with_children(vec![link])];
            if !entry.children.is_empty() {
                children.push(render_list(&entry.children, options));
            }
            SyntaxNode::new(NodeKind::ListItem { spread }).with_children(children)
        })
        .collect();

    SyntaxNode::new(NodeKind::List {
        ordered: options.ordered,
        spread,
    })
    .with_children(items)
}

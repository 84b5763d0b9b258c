//! Owned document trees.
//!
//! Both the markdown side (an mdast-shaped tree) and the rendered side (an
//! hast-shaped element tree) are represented with the same [`SyntaxNode`]
//! type. Every node owns its children exclusively; positions inside a tree
//! are addressed by *paths* (the sequence of child indices from the root),
//! so no back-references are ever stored.
//!
//! ## Examples
//!
//! ```rust
//! use wayfinder_lib::tree::{NodeKind, SyntaxNode};
//!
//! let tree = SyntaxNode::root(vec![
//!     SyntaxNode::heading(1, vec![SyntaxNode::text("Intro")]),
//!     SyntaxNode::new(NodeKind::Paragraph).with_children(vec![SyntaxNode::text("Body")]),
//! ]);
//!
//! assert_eq!(tree.node_count(), 5);
//! assert_eq!(tree.get(&[0, 0]).and_then(|n| n.value.as_deref()), Some("Intro"));
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

/// The type tag of a [`SyntaxNode`].
///
/// Markdown constructs carry the few attributes that affect serialization
/// inline; rendered HTML nodes use [`NodeKind::Element`] with their
/// attributes stored in [`SyntaxNode::properties`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Root,
    Heading,
    Paragraph,
    Text,
    Emphasis,
    Strong,
    Delete,
    InlineCode,
    Code { lang: Option<String> },
    Link { url: String, title: Option<String> },
    Image { url: String, alt: String },
    List { ordered: bool, spread: bool },
    ListItem { spread: bool },
    Blockquote,
    ThematicBreak,
    Break,
    Html,
    Table,
    TableRow,
    TableCell,
    /// A rendered element such as `<div>` or `<svg>`.
    Element { tag: String },
    Comment,
    /// Anything the converters do not model explicitly (MDX, footnotes, ...).
    Other { name: String },
}

/// Advisory source location of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Byte offset range in the source document [start, end).
    pub byte_range: (usize, usize),
    /// Line number range [start_line, end_line] (1-indexed).
    pub line_range: (usize, usize),
}

/// A node in a document syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Heading level (1-6); `None` for everything else.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u8>,
    /// Text payload of leaf nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Attribute name to value (element attributes, heading `id`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    /// Children in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Span>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            depth: None,
            value: None,
            properties: BTreeMap::new(),
            children: Vec::new(),
            position: None,
        }
    }

    pub fn root(children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::Root).with_children(children)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text).with_value(value)
    }

    pub fn heading(depth: u8, children: Vec<SyntaxNode>) -> Self {
        let mut node = Self::new(NodeKind::Heading).with_children(children);
        node.depth = Some(depth);
        node
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Self::new(NodeKind::Element { tag: tag.into() })
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Returns the element tag name, or `None` for non-element nodes.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    /// Returns `true` for an element whose tag matches `tag` (ASCII case-insensitive).
    pub fn is_element(&self, tag: &str) -> bool {
        self.tag_name().is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_heading(&self) -> bool {
        self.kind == NodeKind::Heading
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Whitespace-separated entries of the `class` property.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.property("class").unwrap_or_default().split_whitespace()
    }

    /// Concatenates the text payload of this node and all of its descendants.
    ///
    /// Comments and raw HTML carry no visible text and are left out, so a
    /// markdown heading and the element it renders to yield the same string.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in self.descendants() {
            if matches!(node.kind, NodeKind::Comment | NodeKind::Html) {
                continue;
            }
            if let Some(value) = &node.value {
                out.push_str(value);
            }
        }
        out
    }

    /// Total number of nodes in this subtree (including self).
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SyntaxNode::node_count).sum::<usize>()
    }

    /// Iterates over this node and all descendants in document (pre-)order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Returns the node at `path`, where each entry is a child index.
    ///
    /// The empty path addresses `self`.
    pub fn get(&self, path: &[usize]) -> Option<&SyntaxNode> {
        path.iter().try_fold(self, |node, &index| node.children.get(index))
    }

    /// Mutable counterpart of [`SyntaxNode::get`].
    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut SyntaxNode> {
        path.iter().try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Collects the paths of every node satisfying `predicate`, in document order.
    pub fn find_paths<F>(&self, mut predicate: F) -> Vec<Vec<usize>>
    where
        F: FnMut(&SyntaxNode) -> bool,
    {
        fn visit<F>(
            node: &SyntaxNode,
            path: &mut Vec<usize>,
            predicate: &mut F,
            out: &mut Vec<Vec<usize>>,
        ) where
            F: FnMut(&SyntaxNode) -> bool,
        {
            if predicate(node) {
                out.push(path.clone());
            }
            for (index, child) in node.children.iter().enumerate() {
                path.push(index);
                visit(child, path, predicate, out);
                path.pop();
            }
        }

        let mut out = Vec::new();
        visit(self, &mut Vec::new(), &mut predicate, &mut out);
        out
    }

    /// Applies `f` to every node of the subtree, parents before children.
    pub fn visit_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut SyntaxNode),
    {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }
}

/// Pre-order iterator returned by [`SyntaxNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxNode {
        SyntaxNode::root(vec![
            SyntaxNode::heading(1, vec![SyntaxNode::text("A")]),
            SyntaxNode::element("div").with_children(vec![
                SyntaxNode::element("svg").with_property("id", "mermaid-0"),
                SyntaxNode::text("tail"),
            ]),
        ])
    }

    #[test]
    fn test_descendants_are_in_document_order() {
        let tree = sample();
        let kinds: Vec<_> = tree
            .descendants()
            .map(|n| n.tag_name().map(str::to_string).or(n.value.clone()))
            .collect();

        assert_eq!(
            kinds,
            vec![
                None,
                None,
                Some("A".to_string()),
                Some("div".to_string()),
                Some("svg".to_string()),
                Some("tail".to_string()),
            ]
        );
    }

    #[test]
    fn test_node_count() {
        assert_eq!(sample().node_count(), 6);
    }

    #[test]
    fn test_get_by_path() {
        let tree = sample();
        assert!(tree.get(&[]).is_some_and(|n| n.kind == NodeKind::Root));
        assert!(tree.get(&[1, 0]).is_some_and(|n| n.is_element("SVG")));
        assert!(tree.get(&[1, 5]).is_none());
        assert!(tree.get(&[0, 0, 0]).is_none());
    }

    #[test]
    fn test_find_paths() {
        let tree = sample();
        let paths = tree.find_paths(|n| n.tag_name().is_some());
        assert_eq!(paths, vec![vec![1], vec![1, 0]]);
    }

    #[test]
    fn test_text_content_skips_comments() {
        let node = SyntaxNode::element("p").with_children(vec![
            SyntaxNode::text("Hello "),
            SyntaxNode::new(NodeKind::Comment).with_value("hidden"),
            SyntaxNode::new(NodeKind::InlineCode).with_value("world"),
        ]);
        assert_eq!(node.text_content(), "Hello world");
    }

    #[test]
    fn test_text_content_skips_raw_html() {
        let heading = SyntaxNode::heading(
            1,
            vec![
                SyntaxNode::text("Hello "),
                SyntaxNode::new(NodeKind::Html).with_value("<span>"),
                SyntaxNode::text("x"),
                SyntaxNode::new(NodeKind::Html).with_value("</span>"),
            ],
        );
        assert_eq!(heading.text_content(), "Hello x");
    }

    #[test]
    fn test_classes() {
        let node = SyntaxNode::element("div").with_property("class", " a  b ");
        assert_eq!(node.classes().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(SyntaxNode::element("div").classes().count(), 0);
    }

    #[test]
    fn test_serializes_as_tagged_json() {
        let node = SyntaxNode::heading(2, vec![SyntaxNode::text("A")]).with_property("id", "a");
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["kind"]["type"], "heading");
        assert_eq!(json["depth"], 2);
        assert_eq!(json["properties"]["id"], "a");
        assert_eq!(json["children"][0]["value"], "A");
        assert!(json.get("position").is_none());
    }

    #[test]
    fn test_visit_mut_reaches_every_node() {
        let mut tree = sample();
        let mut seen = 0;
        tree.visit_mut(&mut |_| seen += 1);
        assert_eq!(seen, tree.node_count());
    }
}

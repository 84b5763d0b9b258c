//! Markdown parsing into [`SyntaxNode`] trees.
//!
//! Parsing uses the `markdown` crate's MDAST implementation with GitHub
//! Flavored Markdown (GFM) extensions enabled, then converts the MDAST into
//! the owned [`SyntaxNode`] representation shared with the rewriter. The
//! canonical writer lives in [`write`].

pub mod write;

use markdown::ParseOptions;
use markdown::mdast::Node;

use crate::tree::{NodeKind, Span, SyntaxNode};

pub use write::{escape_inline, to_markdown};

/// Parses markdown text into a [`SyntaxNode`] tree rooted at [`NodeKind::Root`].
///
/// Parsing never fails. Constructs the grammar does not recognize are
/// already plain text in the MDAST; if the parser rejects the document
/// outright, the whole input degrades to a single paragraph of literal text.
///
/// ## Examples
///
/// ```rust
/// use wayfinder_lib::markdown::parse;
/// use wayfinder_lib::tree::NodeKind;
///
/// let tree = parse("# Hello\n\nWorld");
/// assert_eq!(tree.kind, NodeKind::Root);
/// assert_eq!(tree.children[0].depth, Some(1));
/// ```
#[tracing::instrument(skip(content), fields(len = content.len()))]
pub fn parse(content: &str) -> SyntaxNode {
    match markdown::to_mdast(content, &ParseOptions::gfm()) {
        Ok(mdast) => from_mdast(&mdast),
        Err(e) => {
            tracing::warn!(error = %e, "Markdown parse failed, degrading to literal text");
            SyntaxNode::root(vec![
                SyntaxNode::new(NodeKind::Paragraph).with_children(vec![SyntaxNode::text(content)]),
            ])
        }
    }
}

/// Converts an MDAST node (and its subtree) into a [`SyntaxNode`].
pub fn from_mdast(node: &Node) -> SyntaxNode {
    let (kind, value) = match node {
        Node::Root(_) => (NodeKind::Root, None),
        Node::Heading(_) => (NodeKind::Heading, None),
        Node::Paragraph(_) => (NodeKind::Paragraph, None),
        Node::Text(text) => (NodeKind::Text, Some(text.value.clone())),
        Node::Emphasis(_) => (NodeKind::Emphasis, None),
        Node::Strong(_) => (NodeKind::Strong, None),
        Node::Delete(_) => (NodeKind::Delete, None),
        Node::InlineCode(code) => (NodeKind::InlineCode, Some(code.value.clone())),
        Node::Code(code) => (
            NodeKind::Code {
                lang: code.lang.clone(),
            },
            Some(code.value.clone()),
        ),
        Node::Link(link) => (
            NodeKind::Link {
                url: link.url.clone(),
                title: link.title.clone(),
            },
            None,
        ),
        Node::Image(image) => (
            NodeKind::Image {
                url: image.url.clone(),
                alt: image.alt.clone(),
            },
            None,
        ),
        Node::List(list) => (
            NodeKind::List {
                ordered: list.ordered,
                spread: list.spread,
            },
            None,
        ),
        Node::ListItem(item) => (NodeKind::ListItem { spread: item.spread }, None),
        Node::Blockquote(_) => (NodeKind::Blockquote, None),
        Node::ThematicBreak(_) => (NodeKind::ThematicBreak, None),
        Node::Break(_) => (NodeKind::Break, None),
        Node::Html(html) => (NodeKind::Html, Some(html.value.clone())),
        Node::Table(_) => (NodeKind::Table, None),
        Node::TableRow(_) => (NodeKind::TableRow, None),
        Node::TableCell(_) => (NodeKind::TableCell, None),
        Node::InlineMath(math) => (other("inlineMath"), Some(math.value.clone())),
        Node::Math(math) => (other("math"), Some(math.value.clone())),
        Node::Yaml(yaml) => (other("yaml"), Some(yaml.value.clone())),
        Node::Toml(toml) => (other("toml"), Some(toml.value.clone())),
        Node::Definition(_) => (other("definition"), None),
        Node::FootnoteDefinition(_) => (other("footnoteDefinition"), None),
        Node::FootnoteReference(_) => (other("footnoteReference"), None),
        Node::LinkReference(_) => (other("linkReference"), None),
        Node::ImageReference(_) => (other("imageReference"), None),
        _ => (other("mdx"), None),
    };

    let mut converted = SyntaxNode::new(kind);
    converted.value = value;
    if let Node::Heading(heading) = node {
        converted.depth = Some(heading.depth);
    }
    converted.position = node.position().map(|p| Span {
        byte_range: (p.start.offset, p.end.offset),
        line_range: (p.start.line, p.end.line),
    });
    if let Some(children) = node.children() {
        converted.children = children.iter().map(from_mdast).collect();
    }
    converted
}

fn other(name: &str) -> NodeKind {
    NodeKind::Other {
        name: name.to_string(),
    }
}

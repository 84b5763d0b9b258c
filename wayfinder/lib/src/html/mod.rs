//! Bridge between rendered HTML text and [`SyntaxNode`] element trees.
//!
//! Parsing uses the `scraper` crate (html5ever underneath), so malformed
//! markup is recovered the way a browser would recover it. The DOM is
//! converted into an owned tree of [`NodeKind::Element`], [`NodeKind::Text`]
//! and [`NodeKind::Comment`] nodes that the rewriter can restructure.
//!
//! ## Trade-offs
//!
//! Attributes are kept in a sorted map, so serialized output lists them in
//! alphabetical order rather than source order.
//!
//! ## Examples
//!
//! ```rust
//! use wayfinder_lib::html::{parse_fragment, to_html};
//!
//! let tree = parse_fragment(r#"<p class="lead">Hi &amp; bye</p>"#);
//! assert_eq!(to_html(&tree), r#"<p class="lead">Hi &amp; bye</p>"#);
//! ```

use scraper::{ElementRef, Html, Node};

use crate::tree::{NodeKind, SyntaxNode};

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parses an HTML fragment into a tree rooted at [`NodeKind::Root`].
#[tracing::instrument(skip(content), fields(len = content.len()))]
pub fn parse_fragment(content: &str) -> SyntaxNode {
    let fragment = Html::parse_fragment(content);
    // html5ever places fragment content under a synthetic <html> element
    let container = fragment.root_element();
    SyntaxNode::root(convert_children(container))
}

fn convert_children(element: ElementRef<'_>) -> Vec<SyntaxNode> {
    let mut children = Vec::new();
    for child in element.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    children.push(convert_element(child_element));
                }
            }
            Node::Text(text) => children.push(SyntaxNode::text(text.to_string())),
            Node::Comment(comment) => {
                children.push(SyntaxNode::new(NodeKind::Comment).with_value(comment.to_string()));
            }
            _ => {}
        }
    }
    children
}

fn convert_element(element: ElementRef<'_>) -> SyntaxNode {
    let value = element.value();
    let mut node = SyntaxNode::element(value.name());
    for (name, attr) in value.attrs() {
        node.set_property(name, attr);
    }
    node.children = convert_children(element);
    node
}

/// Serializes a tree back into HTML text.
///
/// Markdown-only nodes that somehow ended up in an element tree are written
/// as their escaped text content.
pub fn to_html(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

fn write_node(node: &SyntaxNode, raw_text: bool, out: &mut String) {
    match &node.kind {
        NodeKind::Root => {
            for child in &node.children {
                write_node(child, raw_text, out);
            }
        }
        NodeKind::Element { tag } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in &node.properties {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');

            let lower = tag.to_ascii_lowercase();
            if VOID_ELEMENTS.contains(&lower.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&lower.as_str());
            for child in &node.children {
                write_node(child, raw, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeKind::Text => {
            let value = node.value.as_deref().unwrap_or_default();
            if raw_text {
                out.push_str(value);
            } else {
                out.push_str(&html_escape::encode_text(value));
            }
        }
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push_str("-->");
        }
        NodeKind::Html => out.push_str(node.value.as_deref().unwrap_or_default()),
        _ => out.push_str(&html_escape::encode_text(&node.text_content())),
    }
}

//! Canonical markdown writer.
//!
//! A [`SyntaxNode`] tree is lowered into a `pulldown-cmark` event stream and
//! rendered by `pulldown-cmark-to-cmark`, so the output is whatever that
//! writer considers canonical CommonMark. Only markdown constructs are
//! lowered structurally; rendered elements, tables and unknown nodes degrade
//! to their text content.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Tag};
use pulldown_cmark_to_cmark::Options as CmarkOptions;

use crate::error::{WayfinderError, WayfinderResult};
use crate::tree::{NodeKind, SyntaxNode};

/// Serializes a [`SyntaxNode`] tree back into markdown text.
///
/// An empty root serializes to the empty string.
///
/// ## Errors
///
/// Returns [`WayfinderError::Serialize`] if the writer rejects the event stream.
///
/// ## Examples
///
/// ```rust
/// use wayfinder_lib::markdown::{parse, to_markdown};
///
/// let tree = parse("* [Intro](#intro)");
/// let text = to_markdown(&tree).unwrap();
/// assert!(text.contains("[Intro](#intro)"));
/// ```
pub fn to_markdown(node: &SyntaxNode) -> WayfinderResult<String> {
    let mut events = Vec::new();
    lower(node, Context::Block, &mut events);

    let mut output = String::new();
    // standard markdown fences use 3 backticks; the writer defaults to 4
    let mut options = CmarkOptions::default();
    options.code_block_token_count = 3;

    pulldown_cmark_to_cmark::cmark_with_options(events.iter(), &mut output, options)
        .map_err(|e| WayfinderError::Serialize(e.to_string()))?;

    Ok(output)
}

/// Where a node sits, which decides how paragraphs, text and raw HTML are
/// emitted.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    Block,
    TightItem,
    Inline,
    /// Inside the label of a link, where every special character is escaped.
    LinkText,
}

impl Context {
    fn is_inline(self) -> bool {
        matches!(self, Context::Inline | Context::LinkText)
    }

    /// Context for the children of an inline container.
    fn inline(self) -> Context {
        if self == Context::LinkText {
            Context::LinkText
        } else {
            Context::Inline
        }
    }
}

/// Backslash-escapes every character that could open or close an inline
/// construct, so `text` reads back literally.
///
/// The writer only escapes a special character at the start of a text run,
/// which leaves `]` or a trailing `\` free to end a link label early.
pub fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '!' | '&' | '~' | '|' | '#'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn lower(node: &SyntaxNode, ctx: Context, events: &mut Vec<Event<'static>>) {
    match &node.kind {
        NodeKind::Root => lower_children(node, Context::Block, events),
        NodeKind::Blockquote => wrap(Tag::BlockQuote(None), node, Context::Block, events),
        NodeKind::Heading => {
            let level = heading_level(node.depth.unwrap_or(1));
            wrap(
                Tag::Heading {
                    level,
                    id: None,
                    classes: Vec::new(),
                    attrs: Vec::new(),
                },
                node,
                Context::Inline,
                events,
            );
        }
        NodeKind::Paragraph => {
            if ctx == Context::TightItem {
                lower_children(node, Context::Inline, events);
            } else {
                wrap(Tag::Paragraph, node, Context::Inline, events);
            }
        }
        // escaped text goes out raw so the writer cannot escape it twice
        NodeKind::Text if ctx == Context::LinkText => {
            let escaped = escape_inline(node.value.as_deref().unwrap_or_default());
            events.push(Event::InlineHtml(CowStr::from(escaped)));
        }
        NodeKind::Text => events.push(Event::Text(owned(node.value.as_deref()))),
        NodeKind::InlineCode => events.push(Event::Code(owned(node.value.as_deref()))),
        NodeKind::Emphasis => wrap(Tag::Emphasis, node, ctx.inline(), events),
        NodeKind::Strong => wrap(Tag::Strong, node, ctx.inline(), events),
        NodeKind::Delete => wrap(Tag::Strikethrough, node, ctx.inline(), events),
        NodeKind::Link { url, title } => wrap(
            Tag::Link {
                link_type: LinkType::Inline,
                dest_url: CowStr::from(url.clone()),
                title: owned(title.as_deref()),
                id: CowStr::Borrowed(""),
            },
            node,
            Context::LinkText,
            events,
        ),
        NodeKind::Image { url, alt } => {
            let tag = Tag::Image {
                link_type: LinkType::Inline,
                dest_url: CowStr::from(url.clone()),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            };
            let end = tag.to_end();
            events.push(Event::Start(tag));
            events.push(Event::Text(CowStr::from(alt.clone())));
            events.push(Event::End(end));
        }
        NodeKind::Code { lang } => {
            let info = CowStr::from(lang.clone().unwrap_or_default());
            let tag = Tag::CodeBlock(CodeBlockKind::Fenced(info));
            let end = tag.to_end();
            let mut body = node.value.clone().unwrap_or_default();
            if !body.ends_with('\n') {
                body.push('\n');
            }
            events.push(Event::Start(tag));
            events.push(Event::Text(CowStr::from(body)));
            events.push(Event::End(end));
        }
        NodeKind::List { ordered, spread } => {
            let tag = Tag::List(ordered.then_some(1));
            let end = tag.to_end();
            let item_ctx = if *spread {
                Context::Block
            } else {
                Context::TightItem
            };
            events.push(Event::Start(tag));
            for item in &node.children {
                lower(item, item_ctx, events);
            }
            events.push(Event::End(end));
        }
        NodeKind::ListItem { .. } => {
            let item_ctx = if ctx == Context::TightItem {
                Context::TightItem
            } else {
                Context::Block
            };
            wrap(Tag::Item, node, item_ctx, events);
        }
        NodeKind::ThematicBreak => events.push(Event::Rule),
        NodeKind::Break => events.push(Event::HardBreak),
        NodeKind::Html => {
            let html = owned(node.value.as_deref());
            if ctx.is_inline() {
                events.push(Event::InlineHtml(html));
            } else {
                events.push(Event::Html(html));
            }
        }
        NodeKind::Table
        | NodeKind::TableRow
        | NodeKind::TableCell
        | NodeKind::Element { .. }
        | NodeKind::Comment
        | NodeKind::Other { .. } => {
            let text = node.text_content();
            if text.is_empty() {
                return;
            }
            if ctx == Context::LinkText {
                events.push(Event::InlineHtml(CowStr::from(escape_inline(&text))));
            } else if ctx.is_inline() || ctx == Context::TightItem {
                events.push(Event::Text(CowStr::from(text)));
            } else {
                events.push(Event::Start(Tag::Paragraph));
                events.push(Event::Text(CowStr::from(text)));
                events.push(Event::End(Tag::Paragraph.to_end()));
            }
        }
    }
}

fn wrap(tag: Tag<'static>, node: &SyntaxNode, ctx: Context, events: &mut Vec<Event<'static>>) {
    let end = tag.to_end();
    events.push(Event::Start(tag));
    lower_children(node, ctx, events);
    events.push(Event::End(end));
}

fn lower_children(node: &SyntaxNode, ctx: Context, events: &mut Vec<Event<'static>>) {
    for child in &node.children {
        lower(child, ctx, events);
    }
}

fn owned(value: Option<&str>) -> CowStr<'static> {
    CowStr::from(value.unwrap_or_default().to_string())
}

fn heading_level(depth: u8) -> HeadingLevel {
    match depth {
        0 | 1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        3 => HeadingLevel::H3,
        4 => HeadingLevel::H4,
        5 => HeadingLevel::H5,
        _ => HeadingLevel::H6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse;

    fn link_item(text: &str, url: &str, nested: Option<SyntaxNode>) -> SyntaxNode {
        let mut children = vec![SyntaxNode::new(NodeKind::Paragraph).with_children(vec![
            SyntaxNode::new(NodeKind::Link {
                url: url.to_string(),
                title: None,
            })
            .with_children(vec![SyntaxNode::text(text)]),
        ])];
        children.extend(nested);
        SyntaxNode::new(NodeKind::ListItem { spread: false }).with_children(children)
    }

    fn list(spread: bool, items: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::new(NodeKind::List {
            ordered: false,
            spread,
        })
        .with_children(items)
    }

    #[test]
    fn test_empty_root_writes_nothing() {
        let out = to_markdown(&SyntaxNode::root(Vec::new())).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_tight_nested_list_reparses() {
        let tree = list(
            false,
            vec![
                link_item(
                    "One",
                    "#one",
                    Some(list(false, vec![link_item("Two", "#two", None)])),
                ),
                link_item("Three", "#three", None),
            ],
        );
        let text = to_markdown(&tree).unwrap();
        assert!(text.contains("[One](#one)"));

        let reparsed = parse(&text);
        let outer = &reparsed.children[0];
        assert!(matches!(outer.kind, NodeKind::List { .. }));
        assert_eq!(outer.children.len(), 2);
        let inner = outer.children[0]
            .children
            .iter()
            .find(|n| matches!(n.kind, NodeKind::List { .. }))
            .expect("nested list");
        assert_eq!(inner.children.len(), 1);
    }

    #[test]
    fn test_spread_list_separates_items() {
        let tree = list(
            true,
            vec![link_item("A", "#a", None), link_item("B", "#b", None)],
        );
        let text = to_markdown(&tree).unwrap();
        assert!(text.contains("\n\n"));
        let reparsed = parse(&text);
        assert_eq!(reparsed.children[0].children.len(), 2);
    }

    #[test]
    fn test_escape_inline() {
        assert_eq!(escape_inline("plain text"), "plain text");
        assert_eq!(escape_inline("a ] b"), "a \\] b");
        assert_eq!(escape_inline("a\\"), "a\\\\");
        assert_eq!(escape_inline("*x* <y> &amp;"), "\\*x\\* \\<y\\> \\&amp;");
    }

    #[test]
    fn test_link_labels_read_back_literally() {
        for label in ["a ] b", "a\\", "[x](y)", "*not emphasis*", "<b>", "&copy;", "`tick"] {
            let tree = list(false, vec![link_item(label, "#target", None)]);
            let text = to_markdown(&tree).unwrap();
            let reparsed = parse(&text);
            let link = reparsed
                .descendants()
                .find(|n| matches!(n.kind, NodeKind::Link { .. }))
                .unwrap_or_else(|| panic!("no link in {text:?}"));

            assert_eq!(link.text_content(), label, "{text:?}");
            assert_eq!(
                link.kind,
                NodeKind::Link {
                    url: "#target".to_string(),
                    title: None
                }
            );
        }
    }

    #[test]
    fn test_code_block_uses_three_backticks() {
        let tree = parse("```rust\nfn main() {}\n```");
        let text = to_markdown(&tree).unwrap();
        assert!(text.contains("```rust"));
        assert!(!text.contains("````"));
    }

    #[test]
    fn test_elements_degrade_to_text() {
        let tree = SyntaxNode::root(vec![
            SyntaxNode::element("div").with_children(vec![SyntaxNode::text("inside")]),
        ]);
        assert_eq!(to_markdown(&tree).unwrap().trim(), "inside");
    }

    #[test]
    fn test_heading_and_emphasis() {
        let tree = parse("## Hello *there*");
        let text = to_markdown(&tree).unwrap();
        let reparsed = parse(&text);
        assert_eq!(reparsed.children[0].depth, Some(2));
        assert_eq!(reparsed.children[0].text_content(), "Hello there");
    }
}

//! Structural rewriting of element trees.
//!
//! The main operation, [`wrap_matches`], replaces every node matched by a
//! [`WrapPattern`] with a freshly built wrapper whose only child is the
//! original node. It is what turns
//!
//! ```html
//! <svg id="mermaid-0">...</svg>
//! ```
//!
//! into
//!
//! ```html
//! <div class="mermaid-container"><svg id="mermaid-0">...</svg></div>
//! ```
//!
//! ## Traversal
//!
//! Matches are collected as paths (see [`WrapPattern::match_paths`]) before
//! anything is modified, then applied in reverse document order. Replacing a
//! node in place keeps its index, and a later sibling or descendant is always
//! handled before anything that precedes it, so every remaining path stays
//! valid.
//! Each match is wrapped exactly once, and wrappers inserted by the pass are
//! never themselves candidates.

mod selector;
mod wrapper;

pub use selector::{DEFAULT_MERMAID_SELECTOR, Selector, WrapPattern};
pub use wrapper::{DEFAULT_MERMAID_WRAPPER, WrapperTemplate};

use crate::tree::SyntaxNode;

/// Wraps every node matched by `pattern` in a wrapper from `make_wrapper`.
///
/// `make_wrapper` is called once per match and must return a new node each
/// time. A wrapper that already has children loses them (with a warning).
/// The root node itself is never wrapped, since it has no parent to hold the
/// wrapper. Returns the number of nodes wrapped.
///
/// ## Examples
///
/// ```rust
/// use wayfinder_lib::html::{parse_fragment, to_html};
/// use wayfinder_lib::rewrite::{WrapPattern, WrapperTemplate, wrap_matches};
///
/// let mut tree = parse_fragment(r#"<p>intro</p><svg id="mermaid-0"></svg>"#);
/// let template = WrapperTemplate::default();
///
/// let wrapped = wrap_matches(&mut tree, &WrapPattern::default(), || template.build());
///
/// assert_eq!(wrapped, 1);
/// assert_eq!(
///     to_html(&tree),
///     r#"<p>intro</p><div class="mermaid-container"><svg id="mermaid-0"></svg></div>"#
/// );
/// ```
#[tracing::instrument(skip(tree, make_wrapper))]
pub fn wrap_matches<F>(tree: &mut SyntaxNode, pattern: &WrapPattern, mut make_wrapper: F) -> usize
where
    F: FnMut() -> SyntaxNode,
{
    let paths = pattern.match_paths(tree);
    let mut wrapped = 0;

    for path in paths.iter().rev() {
        let Some((&index, parent_path)) = path.split_last() else {
            tracing::debug!("Skipping match on the root node");
            continue;
        };
        let Some(slot) = tree
            .get_mut(parent_path)
            .and_then(|parent| parent.children.get_mut(index))
        else {
            continue;
        };

        let wrapper = make_wrapper();
        if !wrapper.children.is_empty() {
            tracing::warn!(
                discarded = wrapper.children.len(),
                "Wrapper template already had children; replacing them"
            );
        }
        let original = std::mem::replace(slot, wrapper);
        slot.children = vec![original];
        wrapped += 1;
    }

    tracing::debug!(wrapped, "Wrapped matching nodes");
    wrapped
}

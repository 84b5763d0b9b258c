//! Outline extraction and structural rewrites for a markdown documentation build.
//!
//! Two independent passes over document trees:
//!
//! - [`toc`] turns a markdown document into a nested list of links to its
//!   headings (a table of contents), assigning each heading a unique anchor.
//! - [`rewrite`] wraps every node matching a pattern in a fresh container
//!   element, e.g. rendered mermaid diagrams in `div.mermaid-container`.
//!
//! [`pipeline`] sequences them into a build: the outline artifact is
//! written once before compilation, and the wrap runs as the last stage of
//! the transforms applied to each rendered page.
//!
//! ## Examples
//!
//! ```rust
//! use wayfinder_lib::config::WayfinderConfig;
//! use wayfinder_lib::pipeline::TransformPipeline;
//! use wayfinder_lib::toc::{OutlineOptions, extract_outline};
//!
//! let outline = extract_outline("# Guide\n\n## Usage", &OutlineOptions::default()).unwrap();
//! assert!(outline.contains("[Usage](#usage)"));
//!
//! let pipeline = TransformPipeline::standard(&WayfinderConfig::default()).unwrap();
//! let page = pipeline.run_html(r#"<svg id="mermaid-0"></svg>"#).unwrap();
//! assert_eq!(page, r#"<div class="mermaid-container"><svg id="mermaid-0"></svg></div>"#);
//! ```

pub mod config;
pub mod error;
pub mod html;
pub mod markdown;
pub mod pipeline;
pub mod rewrite;
pub mod toc;
pub mod tree;

pub use config::WayfinderConfig;
pub use error::{WayfinderError, WayfinderResult};
pub use rewrite::{WrapPattern, WrapperTemplate, wrap_matches};
pub use toc::{HeadingEntry, OutlineOptions, extract_outline};
pub use tree::{NodeKind, SyntaxNode};

//! Sequencing of the build steps.
//!
//! Two pieces live here:
//!
//! - [`TocArtifact`] runs the outline extractor once before compilation and
//!   persists its output to a fixed location.
//! - [`TransformPipeline`] is an ordered list of named [`TreeTransform`]
//!   stages applied to every rendered document. The standard pipeline ends
//!   with the `mermaid-wrap` stage; stages that render diagrams or highlight
//!   code are registered in front of it with
//!   [`TransformPipeline::insert_before`], so the wrap sees their output.
//!
//! ## Examples
//!
//! ```rust
//! use wayfinder_lib::config::WayfinderConfig;
//! use wayfinder_lib::pipeline::{FnStage, TransformPipeline};
//! use wayfinder_lib::tree::SyntaxNode;
//!
//! let mut pipeline = TransformPipeline::standard(&WayfinderConfig::default()).unwrap();
//! pipeline
//!     .insert_before(
//!         "mermaid-wrap",
//!         FnStage::new("render-diagrams", |tree: &mut SyntaxNode| {
//!             tree.children.push(SyntaxNode::element("svg").with_property("id", "mermaid-0"));
//!             Ok(())
//!         }),
//!     )
//!     .unwrap();
//!
//! let html = pipeline.run_html("<h1>Title</h1>").unwrap();
//! assert!(html.contains(r#"<div class="mermaid-container"><svg id="mermaid-0"></svg></div>"#));
//! ```

mod artifact;
mod stages;

pub use artifact::{TocArtifact, write_atomic};
pub use stages::{
    AUTOLINK_HEADINGS, AutolinkHeadingsStage, HEADING_SLUG, HeadingSlugStage, MERMAID_WRAP,
    WrapStage, heading_level,
};

use std::fmt;

use crate::config::WayfinderConfig;
use crate::error::{WayfinderError, WayfinderResult};
use crate::html::{parse_fragment, to_html};
use crate::tree::SyntaxNode;

/// A named, in-place transformation of a document tree.
pub trait TreeTransform: Send + Sync {
    /// Stable identifier used for ordering and error reporting.
    fn name(&self) -> &str;

    /// Applies the transformation.
    fn apply(&self, tree: &mut SyntaxNode) -> WayfinderResult<()>;
}

type TransformFn = dyn Fn(&mut SyntaxNode) -> WayfinderResult<()> + Send + Sync;

/// Adapts a closure into a [`TreeTransform`].
pub struct FnStage {
    name: String,
    transform: Box<TransformFn>,
}

impl FnStage {
    pub fn new<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&mut SyntaxNode) -> WayfinderResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            transform: Box::new(transform),
        }
    }
}

impl TreeTransform for FnStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, tree: &mut SyntaxNode) -> WayfinderResult<()> {
        (self.transform)(tree)
    }
}

impl fmt::Debug for FnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

/// An ordered list of uniquely named stages.
#[derive(Default)]
pub struct TransformPipeline {
    stages: Vec<Box<dyn TreeTransform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `heading-slug → autolink-headings → mermaid-wrap` from config.
    ///
    /// The autolink stage is left out when `[autolink] enabled = false`.
    ///
    /// ## Errors
    ///
    /// Fails if the configured selector or wrapper template is invalid.
    pub fn standard(config: &WayfinderConfig) -> WayfinderResult<Self> {
        let mut pipeline = Self::new();
        pipeline.push(HeadingSlugStage)?;
        if config.autolink.enabled {
            pipeline.push(AutolinkHeadingsStage::from_config(&config.autolink))?;
        }
        pipeline.push(WrapStage::from_config(&config.wrap)?)?;
        Ok(pipeline)
    }

    /// Appends a stage.
    ///
    /// ## Errors
    ///
    /// Returns [`WayfinderError::DuplicateStage`] if the name is taken.
    pub fn push<T: TreeTransform + 'static>(&mut self, stage: T) -> WayfinderResult<&mut Self> {
        self.ensure_unique(stage.name())?;
        self.stages.push(Box::new(stage));
        Ok(self)
    }

    /// Inserts a stage directly in front of the stage named `anchor`.
    ///
    /// ## Errors
    ///
    /// Returns [`WayfinderError::UnknownStage`] if `anchor` is not registered
    /// and [`WayfinderError::DuplicateStage`] if the new name is taken.
    pub fn insert_before<T: TreeTransform + 'static>(
        &mut self,
        anchor: &str,
        stage: T,
    ) -> WayfinderResult<&mut Self> {
        let index = self.position(anchor)?;
        self.ensure_unique(stage.name())?;
        self.stages.insert(index, Box::new(stage));
        Ok(self)
    }

    /// Inserts a stage directly after the stage named `anchor`.
    pub fn insert_after<T: TreeTransform + 'static>(
        &mut self,
        anchor: &str,
        stage: T,
    ) -> WayfinderResult<&mut Self> {
        let index = self.position(anchor)?;
        self.ensure_unique(stage.name())?;
        self.stages.insert(index + 1, Box::new(stage));
        Ok(self)
    }

    /// Removes the stage named `name`, returning it.
    pub fn remove(&mut self, name: &str) -> WayfinderResult<Box<dyn TreeTransform>> {
        let index = self.position(name)?;
        Ok(self.stages.remove(index))
    }

    /// Stage names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Applies every stage in order, stopping at the first failure.
    #[tracing::instrument(skip_all, fields(stages = self.stages.len()))]
    pub fn run(&self, tree: &mut SyntaxNode) -> WayfinderResult<()> {
        for stage in &self.stages {
            tracing::debug!(stage = stage.name(), "Running stage");
            stage.apply(tree)?;
        }
        Ok(())
    }

    /// Parses an HTML fragment, runs the pipeline and serializes the result.
    pub fn run_html(&self, html: &str) -> WayfinderResult<String> {
        let mut tree = parse_fragment(html);
        self.run(&mut tree)?;
        Ok(to_html(&tree))
    }

    fn position(&self, name: &str) -> WayfinderResult<usize> {
        self.stages
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| WayfinderError::UnknownStage {
                name: name.to_string(),
            })
    }

    fn ensure_unique(&self, name: &str) -> WayfinderResult<()> {
        if self.stages.iter().any(|s| s.name() == name) {
            return Err(WayfinderError::DuplicateStage {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("stages", &self.names())
            .finish()
    }
}

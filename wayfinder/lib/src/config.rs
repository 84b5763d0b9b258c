//! Build configuration read from `wayfinder.toml`.
//!
//! Every section and key is optional; an absent file behaves like an empty
//! one. Relative paths are resolved against the build root the file was
//! loaded from.
//!
//! ```toml
//! [toc]
//! input = "src/home.mdx"
//! output = "build/home.toc.md"
//! max_depth = 3
//! skip = "table of contents"
//!
//! [wrap]
//! selector = "svg[id^='mermaid-']"
//! wrapper = "div.mermaid-container"
//!
//! [autolink]
//! enabled = true
//! class = "toc-link"
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{WayfinderError, WayfinderResult};
use crate::rewrite::{
    DEFAULT_MERMAID_SELECTOR, DEFAULT_MERMAID_WRAPPER, WrapPattern, WrapperTemplate,
};
use crate::toc::OutlineOptions;

/// Name of the config file looked up in the build root.
pub const CONFIG_FILE_NAME: &str = "wayfinder.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WayfinderConfig {
    pub toc: TocConfig,
    pub wrap: WrapConfig,
    pub autolink: AutolinkConfig,
}

/// The `[toc]` section: where the outline comes from and goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub options: OutlineOptions,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("src/home.mdx"),
            output: PathBuf::from("build/home.toc.md"),
            options: OutlineOptions::default(),
        }
    }
}

/// The `[wrap]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapConfig {
    pub selector: String,
    pub wrapper: String,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            selector: DEFAULT_MERMAID_SELECTOR.to_string(),
            wrapper: DEFAULT_MERMAID_WRAPPER.to_string(),
        }
    }
}

impl WrapConfig {
    /// Parses the configured selector.
    pub fn pattern(&self) -> WayfinderResult<WrapPattern> {
        WrapPattern::selector(&self.selector)
    }

    /// Parses the configured wrapper template.
    pub fn template(&self) -> WayfinderResult<WrapperTemplate> {
        WrapperTemplate::parse(&self.wrapper)
    }
}

/// The `[autolink]` section: links wrapped around rendered heading content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutolinkConfig {
    pub enabled: bool,
    pub class: String,
}

impl Default for AutolinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            class: "toc-link".to_string(),
        }
    }
}

impl WayfinderConfig {
    /// Parses TOML text; `path` is only used for error reporting.
    ///
    /// ## Errors
    ///
    /// Returns [`WayfinderError::Config`] if the text is not valid TOML or
    /// does not fit the expected shape.
    pub fn parse(content: &str, path: &Path) -> WayfinderResult<Self> {
        toml::from_str(content).map_err(|source| WayfinderError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> WayfinderResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "Loaded config");
                Self::parse(&content, path)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(WayfinderError::io(path, e)),
        }
    }

    /// Loads `wayfinder.toml` from a build root.
    pub fn load_from_root(root: &Path) -> WayfinderResult<Self> {
        Self::load(&root.join(CONFIG_FILE_NAME))
    }

    /// Outline input document, resolved against `root`.
    pub fn toc_input(&self, root: &Path) -> PathBuf {
        resolve(root, &self.toc.input)
    }

    /// Outline artifact path, resolved against `root`.
    pub fn toc_output(&self, root: &Path) -> PathBuf {
        resolve(root, &self.toc.output)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

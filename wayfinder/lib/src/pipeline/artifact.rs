//! The pre-build outline artifact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::WayfinderConfig;
use crate::error::{WayfinderError, WayfinderResult};
use crate::toc::{OutlineOptions, extract_outline};

/// Reads a markdown document and writes its outline to a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocArtifact {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: OutlineOptions,
}

impl TocArtifact {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            options: OutlineOptions::default(),
        }
    }

    /// Builds the artifact description from config, resolving paths
    /// against the build root.
    pub fn from_config(config: &WayfinderConfig, root: &Path) -> Self {
        Self {
            input: config.toc_input(root),
            output: config.toc_output(root),
            options: config.toc.options.clone(),
        }
    }

    /// Extracts the outline without touching the output path.
    ///
    /// ## Errors
    ///
    /// Invalid options are reported before the input is read; a read
    /// failure is a [`WayfinderError::Io`].
    pub fn render(&self) -> WayfinderResult<String> {
        self.options.validate()?;
        let content =
            fs::read_to_string(&self.input).map_err(|e| WayfinderError::io(&self.input, e))?;
        extract_outline(&content, &self.options)
    }

    /// Extracts the outline and writes it to the output path.
    ///
    /// The file is written to a temporary sibling first and renamed over the
    /// target, so readers see either the previous artifact or the complete
    /// new one. Returns the written text.
    #[tracing::instrument(
        skip(self),
        fields(input = %self.input.display(), output = %self.output.display())
    )]
    pub fn generate(&self) -> WayfinderResult<String> {
        let outline = self.render()?;
        write_atomic(&self.output, &outline)?;
        tracing::info!(bytes = outline.len(), "Wrote outline artifact");
        Ok(outline)
    }
}

/// Writes `content` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, content: &str) -> WayfinderResult<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| WayfinderError::io(parent, e))?;

    let mut file = NamedTempFile::new_in(parent).map_err(|e| WayfinderError::io(parent, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| WayfinderError::io(path, e))?;
    file.flush().map_err(|e| WayfinderError::io(path, e))?;
    file.persist(path)
        .map_err(|e| WayfinderError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_writes_outline_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("home.md");
        fs::write(&input, "# Home\n\n## Install\n").unwrap();
        let output = dir.path().join("build/nested/home.toc.md");

        let artifact = TocArtifact::new(&input, &output);
        let outline = artifact.generate().unwrap();

        assert!(outline.contains("[Install](#install)"));
        assert_eq!(fs::read_to_string(&output).unwrap(), outline);
    }

    #[test]
    fn test_no_headings_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("plain.md");
        fs::write(&input, "Nothing but prose.").unwrap();
        let output = dir.path().join("toc.md");

        assert_eq!(TocArtifact::new(&input, &output).generate().unwrap(), "");
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_missing_input_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("toc.md");
        fs::write(&output, "previous").unwrap();

        let err = TocArtifact::new(dir.path().join("missing.md"), &output)
            .generate()
            .unwrap_err();

        assert!(matches!(err, WayfinderError::Io { .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
    }

    #[test]
    fn test_invalid_options_fail_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = TocArtifact::new(dir.path().join("missing.md"), dir.path().join("o.md"));
        artifact.options.max_depth = 9;

        let err = artifact.generate().unwrap_err();
        assert!(matches!(err, WayfinderError::InvalidOption { .. }));
        assert!(!dir.path().join("o.md").exists());
    }

    #[test]
    fn test_generate_replaces_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        let output = dir.path().join("toc.md");
        fs::write(&output, "stale outline").unwrap();
        fs::write(&input, "# Fresh").unwrap();

        TocArtifact::new(&input, &output).generate().unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("[Fresh](#fresh)"));
        assert!(!written.contains("stale"));
    }

    #[test]
    fn test_from_config_resolves_paths() {
        let mut config = WayfinderConfig::default();
        config.toc.options.max_depth = 2;
        let artifact = TocArtifact::from_config(&config, Path::new("/site"));

        assert_eq!(artifact.input, PathBuf::from("/site/src/home.mdx"));
        assert_eq!(artifact.output, PathBuf::from("/site/build/home.toc.md"));
        assert_eq!(artifact.options.max_depth, 2);
    }
}

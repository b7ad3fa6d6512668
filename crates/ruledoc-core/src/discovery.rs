//! Source file discovery
//!
//! Expands the input paths of a run into the Kotlin files to scan. Files
//! named explicitly are always kept; directories are walked and filtered by
//! the configured include/exclude globs and by ignore files (`.gitignore`
//! plus the configured ones) found in the walked directory.

use crate::config::{FilesConfiguration, RuledocConfig};
use crate::{Result, RuledocError};
use glob::Pattern;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Discovers Kotlin sources under a set of input paths
#[derive(Debug, Clone)]
pub struct SourceDiscovery {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    ignore_files: Vec<String>,
}

impl SourceDiscovery {
    /// Compile the patterns of a files configuration
    pub fn new(files: &FilesConfiguration) -> Result<Self> {
        let defaults = FilesConfiguration::default();
        let include = files
            .include
            .as_ref()
            .or(defaults.include.as_ref())
            .map(|patterns| compile_patterns(patterns, "include"))
            .transpose()?
            .unwrap_or_default();
        let exclude = files
            .exclude
            .as_ref()
            .map(|patterns| compile_patterns(patterns, "exclude"))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            include,
            exclude,
            ignore_files: files.ignore_files.clone().unwrap_or_default(),
        })
    }

    pub fn from_config(config: &RuledocConfig) -> Result<Self> {
        Self::new(&config.files_config())
    }

    /// Expand files and directories into a sorted, deduplicated file list
    pub fn discover(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = BTreeSet::new();

        for input in inputs {
            if input.is_file() {
                files.insert(input.clone());
            } else if input.is_dir() {
                files.extend(self.discover_in_dir(input));
            } else {
                return Err(RuledocError::discovery_error(format!(
                    "Path does not exist: {}",
                    input.display()
                )));
            }
        }

        info!("Discovered {} Kotlin files", files.len());
        debug!("Files: {:?}", files);

        Ok(files.into_iter().collect())
    }

    /// Check a path relative to its input directory against include/exclude
    pub fn should_include(&self, relative: &Path) -> bool {
        let matches_include = self
            .include
            .iter()
            .any(|pattern| pattern.matches_path(relative));
        matches_include && !is_ignored(relative, &self.exclude)
    }

    fn discover_in_dir(&self, root: &Path) -> Vec<PathBuf> {
        let ignore_patterns = self.load_ignore_patterns(root);

        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.into_path();
                let relative = path.strip_prefix(root).ok()?.to_path_buf();
                let keep = self.should_include(&relative)
                    && !is_ignored(&relative, &ignore_patterns);
                keep.then_some(path)
            })
            .collect()
    }

    /// Load ignore patterns from .gitignore and custom ignore files
    fn load_ignore_patterns(&self, root: &Path) -> Vec<Pattern> {
        let mut patterns = Vec::new();

        let names = std::iter::once(".gitignore").chain(self.ignore_files.iter().map(String::as_str));
        for name in names {
            let path = root.join(name);
            if !path.is_file() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    let before = patterns.len();
                    patterns.extend(parse_ignore_file(&content));
                    debug!("Loaded {} patterns from {}", patterns.len() - before, name);
                }
                Err(e) => warn!("Failed to read ignore file {}: {}", path.display(), e),
            }
        }

        patterns
    }
}

fn compile_patterns(patterns: &[String], what: &str) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| RuledocError::ConfigError {
                message: format!("Invalid {what} pattern '{p}': {e}"),
            })
        })
        .collect()
}

fn is_ignored(relative: &Path, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|pattern| pattern.matches_path(relative))
}

/// Convert gitignore-style lines into glob patterns
///
/// `dir/` becomes `dir/**`, a bare name matches at any depth and lines with
/// wildcards are used as they are. Negations are not supported.
fn parse_ignore_file(content: &str) -> Vec<Pattern> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let line = line.trim_start_matches('/');
            let glob = if let Some(dir) = line.strip_suffix('/') {
                if dir.contains('/') {
                    format!("{dir}/**")
                } else {
                    format!("**/{dir}/**")
                }
            } else if !line.contains(['*', '?']) && !line.contains('/') {
                format!("**/{line}")
            } else {
                line.to_string()
            };
            Pattern::new(&glob).ok()
        })
        .collect()
}

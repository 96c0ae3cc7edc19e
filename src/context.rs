//! Project context gathered once per run to ground every model prompt.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const UNKNOWN_PROJECT: &str = "Unknown Project";
pub const DEFAULT_README_CHAR_LIMIT: usize = 3000;

const MANIFEST_FILE: &str = "package.json";
const README_CANDIDATES: &[&str] = &["README.md", "readme.md", "README"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub name: String,
    pub description: String,
    pub dependency_names: Vec<String>,
    pub readme_excerpt: String,
}

impl Default for ProjectContext {
    fn default() -> Self {
        Self {
            name: UNKNOWN_PROJECT.to_string(),
            description: String::new(),
            dependency_names: Vec::new(),
            readme_excerpt: String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContextReadError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    dependencies: Map<String, Value>,
    #[serde(default)]
    dev_dependencies: Map<String, Value>,
}

pub struct ContextCollector {
    root: PathBuf,
    readme_char_limit: usize,
}

impl ContextCollector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), readme_char_limit: DEFAULT_README_CHAR_LIMIT }
    }

    pub fn with_readme_limit(mut self, limit: usize) -> Self {
        self.readme_char_limit = limit;
        self
    }

    /// Never fails: unreadable inputs are logged and contribute defaults.
    pub fn collect(&self) -> ProjectContext {
        let mut context = ProjectContext::default();

        match self.read_manifest() {
            Ok(Some(manifest)) => {
                if let Some(name) = manifest.name.filter(|n| !n.trim().is_empty()) {
                    context.name = name;
                }
                context.description = manifest.description.unwrap_or_default();
                context.dependency_names = manifest
                    .dependencies
                    .keys()
                    .chain(manifest.dev_dependencies.keys())
                    .fold(Vec::new(), |mut names, name| {
                        if !names.contains(name) {
                            names.push(name.clone());
                        }
                        names
                    });
            }
            Ok(None) => debug!("no {} in {}", MANIFEST_FILE, self.root.display()),
            Err(e) => warn!("project metadata ignored: {}", e),
        }

        match self.read_readme() {
            Ok(Some(text)) => context.readme_excerpt = truncate_chars(&text, self.readme_char_limit),
            Ok(None) => debug!("no readme in {}", self.root.display()),
            Err(e) => warn!("readme ignored: {}", e),
        }

        context
    }

    fn read_manifest(&self) -> Result<Option<PackageManifest>, ContextReadError> {
        let path = self.root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = read(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ContextReadError::Parse { path, source })
    }

    fn read_readme(&self) -> Result<Option<String>, ContextReadError> {
        match README_CANDIDATES.iter().map(|name| self.root.join(name)).find(|p| p.is_file()) {
            Some(path) => read(&path).map(Some),
            None => Ok(None),
        }
    }
}

fn read(path: &Path) -> Result<String, ContextReadError> {
    fs::read_to_string(path).map_err(|source| ContextReadError::Read { path: path.to_path_buf(), source })
}

/// Cuts `text` to at most `limit` characters without splitting a code point.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_directory_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let context = ContextCollector::new(dir.path()).collect();
        assert_eq!(context, ProjectContext::default());
        assert_eq!(context.name, "Unknown Project");
    }

    #[test]
    fn reads_manifest_and_readme() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "name": "task-board",
                "description": "Kanban board for small teams",
                "dependencies": {"react": "^18.2.0", "react-router-dom": "^6.0.0"},
                "devDependencies": {"vite": "^5.0.0", "react": "^18.2.0"}
            }"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "# Task Board\nDrag cards between columns.").unwrap();

        let context = ContextCollector::new(dir.path()).collect();
        assert_eq!(context.name, "task-board");
        assert_eq!(context.description, "Kanban board for small teams");
        assert_eq!(context.dependency_names, vec!["react", "react-router-dom", "vite"]);
        assert!(context.readme_excerpt.starts_with("# Task Board"));
    }

    #[test]
    fn malformed_manifest_degrades_but_keeps_readme() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        fs::write(dir.path().join("README.md"), "hello").unwrap();

        let context = ContextCollector::new(dir.path()).collect();
        assert_eq!(context.name, UNKNOWN_PROJECT);
        assert!(context.dependency_names.is_empty());
        assert_eq!(context.readme_excerpt, "hello");
    }

    #[test]
    fn readme_is_truncated_to_limit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "é".repeat(5000)).unwrap();

        let context = ContextCollector::new(dir.path()).collect();
        assert_eq!(context.readme_excerpt.chars().count(), 3000);

        let short = ContextCollector::new(dir.path()).with_readme_limit(10).collect();
        assert_eq!(short.readme_excerpt.chars().count(), 10);
    }

    #[test]
    fn truncate_chars_leaves_short_text_alone() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}

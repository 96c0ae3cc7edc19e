//! Stylesheet discovery for generated preview entries.

use globset::Glob;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::error::{PreviewError, Result};

const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist"];

fn is_skipped(entry: &DirEntry, extra: &str) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name) || name == extra)
            .unwrap_or(false)
}

/// Project-relative, forward-slashed paths of files under `root` matching
/// `pattern`, sorted so repeated builds emit identical imports.
pub fn discover_css(root: &Path, pattern: &str, output_dir: &str) -> Result<Vec<String>> {
    let matcher = Glob::new(pattern)
        .map_err(|e| PreviewError::Configuration(format!("invalid CSS glob `{pattern}`: {e}")))?
        .compile_matcher();

    let mut found = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_skipped(e, output_dir)) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if matcher.is_match(&relative) {
            found.push(relative);
        }
    }
    found.sort();
    Ok(found)
}

//! Preview scaffolding: one entry module and one host page per analyzed
//! component, written under the project's preview output directory.

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::analysis::{AnalysisArtifact, ComponentAnalysis};
use crate::error::{PreviewError, Result};

pub mod entry;
pub mod host_page;
pub mod interceptor;

pub use entry::{EntryModule, Wrapper};
pub use host_page::render_host_page;
pub use interceptor::{render_fetch_shim, resolve, MockResolution, DEFAULT_MOCK_LATENCY_MS};

/// Generated files for one artifact entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    pub safe_name: String,
    pub entry_script_path: PathBuf,
    pub host_page_path: PathBuf,
    /// Root-absolute URL of the host page.
    pub url: String,
    pub original_path: String,
}

/// File stem of the path's basename. Two inputs with the same basename map
/// to the same name.
pub fn safe_name(original_path: &str) -> String {
    Path::new(original_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "component".to_string())
}

/// Time-varying token appended to generated script URLs.
pub fn build_token() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// Module specifier the bundler resolves from the project root.
pub fn module_specifier(root: &Path, original_path: &str) -> String {
    let path = Path::new(original_path);
    if path.is_absolute() {
        return match path.strip_prefix(root) {
            Ok(relative) => format!("/{}", forward_slashed(relative)),
            Err(_) => format!("/@fs/{}", forward_slashed(path)),
        };
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return format!("/@fs/{}", forward_slashed(&root.join(path)));
    }
    format!("/{}", forward_slashed(path))
}

fn forward_slashed(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub struct ScaffoldGenerator {
    root: PathBuf,
    output_dir: String,
    css_imports: Vec<String>,
    build_token: String,
    mock_latency_ms: u64,
}

impl ScaffoldGenerator {
    pub fn new(root: impl Into<PathBuf>, output_dir: impl Into<String>, build_token: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            output_dir: output_dir.into(),
            css_imports: Vec::new(),
            build_token: build_token.into(),
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
        }
    }

    /// Project-relative stylesheet paths, as returned by
    /// [`crate::styles::discover_css`].
    pub fn with_css_files(mut self, css_files: &[String]) -> Self {
        self.css_imports = css_files.iter().map(|css| module_specifier(&self.root, css)).collect();
        self
    }

    pub fn with_mock_latency(mut self, latency_ms: u64) -> Self {
        self.mock_latency_ms = latency_ms;
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("/{}/{}", self.output_dir.trim_matches('/'), file_name)
    }

    pub fn entry_module(&self, original_path: &str, analysis: &ComponentAnalysis) -> EntryModule {
        EntryModule {
            title: safe_name(original_path),
            component_import: module_specifier(&self.root, original_path),
            css_imports: self.css_imports.clone(),
            wrapper_chain: Wrapper::chain(&analysis.wrappers_or_default()),
            mock_props: analysis.props.clone(),
            network_mocks: analysis.mocks().to_vec(),
            mock_latency_ms: self.mock_latency_ms,
        }
    }

    pub fn generate(&self, original_path: &str, analysis: &ComponentAnalysis) -> Result<PreviewEntry> {
        let out_dir = self.output_path();
        fs::create_dir_all(&out_dir).map_err(|e| PreviewError::io(e, &out_dir))?;

        let name = safe_name(original_path);
        let script_file = format!("{name}.jsx");
        let page_file = format!("{name}.html");
        let entry_script_path = out_dir.join(&script_file);
        let host_page_path = out_dir.join(&page_file);

        let module = self.entry_module(original_path, analysis);
        write_file(&entry_script_path, &module.render())?;
        write_file(
            &host_page_path,
            &render_host_page(&name, &self.url_for(&script_file), &self.build_token),
        )?;
        debug!("scaffolded {} -> {}", original_path, host_page_path.display());

        Ok(PreviewEntry {
            safe_name: name,
            entry_script_path,
            host_page_path,
            url: self.url_for(&page_file),
            original_path: original_path.to_string(),
        })
    }

    /// Scaffolds every artifact entry in artifact order.
    pub fn generate_all(&self, artifact: &AnalysisArtifact) -> Result<Vec<PreviewEntry>> {
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut entries = Vec::with_capacity(artifact.len());
        for (path, analysis) in artifact.iter() {
            let entry = self.generate(path, analysis)?;
            if let Some(previous) = seen.insert(entry.safe_name.clone(), path.to_string()) {
                warn!(
                    "{} and {} share the preview name `{}`; the later one overwrites the earlier files",
                    previous, path, entry.safe_name
                );
            }
            entries.push(entry);
        }
        Ok(entries)
    }
}

pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PreviewError::io(e, parent))?;
    }
    fs::write(path, content).map_err(|e| PreviewError::io(e, path))
}

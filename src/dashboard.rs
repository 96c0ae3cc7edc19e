//! Dashboard listing every generated preview.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{PreviewError, Result};
use crate::scaffold::{render_host_page, write_file, PreviewEntry};

pub const DASHBOARD_KEY: &str = "dashboard";
pub const MANIFEST_FILE: &str = "manifest.js";
pub const DASHBOARD_ENTRY_FILE: &str = "dashboard.jsx";
pub const DASHBOARD_PAGE_FILE: &str = "index.html";
pub const DASHBOARD_VIEW_FILE: &str = "Dashboard.jsx";

const ASSETS_SUBDIR: &str = "dashboard";
/// Import specifier in the shipped view that gets pointed at the manifest.
const MANIFEST_IMPORT_PLACEHOLDER: &str = "'./previews.js'";
const MANIFEST_IMPORT: &str = "'../manifest.js'";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestItem {
    pub name: String,
    pub url: String,
    pub original_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DashboardManifest(pub Vec<ManifestItem>);

impl DashboardManifest {
    pub fn from_entries(entries: &[PreviewEntry]) -> Self {
        Self(
            entries
                .iter()
                .map(|entry| ManifestItem {
                    name: entry.safe_name.clone(),
                    url: entry.url.clone(),
                    original_path: entry.original_path.clone(),
                })
                .collect(),
        )
    }

    pub fn render_module(&self) -> String {
        let json = serde_json::to_string_pretty(self).unwrap_or_else(|_| "[]".to_string());
        format!("// Generated by smart-preview. Do not edit.\nexport default {json};\n")
    }
}

#[derive(Debug, Clone)]
pub struct DashboardFiles {
    pub manifest_path: PathBuf,
    pub entry_script_path: PathBuf,
    pub host_page_path: PathBuf,
    pub copied_assets: Vec<PathBuf>,
}

pub struct DashboardAssembler {
    output_path: PathBuf,
    url_prefix: String,
    assets_dir: PathBuf,
    build_token: String,
}

impl DashboardAssembler {
    /// `tool_root` is the installation directory shipping `dashboard/`.
    pub fn new(root: &Path, output_dir: &str, tool_root: &Path, build_token: impl Into<String>) -> Self {
        Self {
            output_path: root.join(output_dir),
            url_prefix: format!("/{}", output_dir.trim_matches('/')),
            assets_dir: tool_root.join(ASSETS_SUBDIR),
            build_token: build_token.into(),
        }
    }

    pub fn host_page_path(&self) -> PathBuf {
        self.output_path.join(DASHBOARD_PAGE_FILE)
    }

    pub fn assemble(&self, entries: &[PreviewEntry]) -> Result<DashboardFiles> {
        let manifest_path = self.output_path.join(MANIFEST_FILE);
        write_file(&manifest_path, &DashboardManifest::from_entries(entries).render_module())?;

        let copied_assets = self.copy_assets()?;

        let entry_script_path = self.output_path.join(DASHBOARD_ENTRY_FILE);
        write_file(&entry_script_path, &render_dashboard_entry())?;

        let host_page_path = self.host_page_path();
        write_file(
            &host_page_path,
            &render_host_page(
                "Dashboard",
                &format!("{}/{}", self.url_prefix, DASHBOARD_ENTRY_FILE),
                &self.build_token,
            ),
        )?;

        Ok(DashboardFiles { manifest_path, entry_script_path, host_page_path, copied_assets })
    }

    fn copy_assets(&self) -> Result<Vec<PathBuf>> {
        if !self.assets_dir.is_dir() {
            return Err(PreviewError::Scaffold(format!(
                "dashboard assets not found at {}",
                self.assets_dir.display()
            )));
        }

        let target_dir = self.output_path.join(ASSETS_SUBDIR);
        let mut copied = Vec::new();
        let mut rewrote_view = false;
        for entry in WalkDir::new(&self.assets_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.assets_dir).map_err(|e| {
                PreviewError::Scaffold(format!("unexpected asset path {}: {e}", entry.path().display()))
            })?;
            let dest = target_dir.join(relative);

            if relative == Path::new(DASHBOARD_VIEW_FILE) {
                let source = fs::read_to_string(entry.path()).map_err(|e| PreviewError::io(e, entry.path()))?;
                write_file(&dest, &rewrite_manifest_import(&source)?)?;
                rewrote_view = true;
            } else {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent).map_err(|e| PreviewError::io(e, parent))?;
                }
                fs::copy(entry.path(), &dest).map_err(|e| PreviewError::io(e, &dest))?;
            }
            debug!("copied dashboard asset {}", dest.display());
            copied.push(dest);
        }

        if !rewrote_view {
            return Err(PreviewError::Scaffold(format!(
                "{} missing from {}",
                DASHBOARD_VIEW_FILE,
                self.assets_dir.display()
            )));
        }
        Ok(copied)
    }
}

/// Points the view's manifest import at the generated manifest. The
/// placeholder must occur exactly once.
pub fn rewrite_manifest_import(source: &str) -> Result<String> {
    match source.matches(MANIFEST_IMPORT_PLACEHOLDER).count() {
        1 => Ok(source.replacen(MANIFEST_IMPORT_PLACEHOLDER, MANIFEST_IMPORT, 1)),
        n => Err(PreviewError::Scaffold(format!(
            "expected exactly one {MANIFEST_IMPORT_PLACEHOLDER} import in {DASHBOARD_VIEW_FILE}, found {n}"
        ))),
    }
}

fn render_dashboard_entry() -> String {
    format!(
        "import React from 'react';\n\
         import ReactDOM from 'react-dom/client';\n\
         import Dashboard from './{ASSETS_SUBDIR}/{DASHBOARD_VIEW_FILE}';\n\
         \n\
         ReactDOM.createRoot(document.getElementById('root')).render(<Dashboard />);\n"
    )
}

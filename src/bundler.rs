//! Bundler configuration and invocation.
//!
//! The bundler is an external collaborator: given an entry-point map it either
//! produces a build or fails with its own diagnostics on the inherited
//! terminal.

use duct::cmd;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::BundlerConfig;
use crate::dashboard::DASHBOARD_KEY;
use crate::error::{PreviewError, Result};
use crate::scaffold::{write_file, PreviewEntry};

/// Packages always resolved from the tool's own `node_modules` so the
/// preview never loads two copies of React.
pub const PINNED_PACKAGES: &[&str] = &[
    "react",
    "react-dom",
    "react-router-dom",
    "react-redux",
    "redux",
    "@tanstack/react-query",
];

#[derive(Debug, Clone, PartialEq)]
pub struct BundleConfig {
    root: PathBuf,
    out_dir: PathBuf,
    inputs: Vec<(String, PathBuf)>,
    aliases: Vec<(String, PathBuf)>,
}

impl BundleConfig {
    pub fn new(root: impl Into<PathBuf>, out_dir: impl Into<PathBuf>, tool_root: &Path) -> Self {
        let modules = tool_root.join("node_modules");
        Self {
            root: root.into(),
            out_dir: out_dir.into(),
            inputs: Vec::new(),
            aliases: PINNED_PACKAGES.iter().map(|pkg| (pkg.to_string(), modules.join(pkg))).collect(),
        }
    }

    /// Dashboard first under its reserved key, then every preview page in
    /// order.
    pub fn with_previews(mut self, dashboard_page: &Path, entries: &[PreviewEntry]) -> Self {
        self.add_input(DASHBOARD_KEY.to_string(), dashboard_page.to_path_buf());
        for entry in entries {
            self.add_input(input_key(&entry.safe_name), entry.host_page_path.clone());
        }
        self
    }

    fn add_input(&mut self, key: String, page: PathBuf) {
        match self.inputs.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = page,
            None => self.inputs.push((key, page)),
        }
    }

    pub fn inputs(&self) -> &[(String, PathBuf)] {
        &self.inputs
    }

    pub fn render(&self) -> String {
        let inputs = path_map(&self.inputs);
        let aliases = path_map(&self.aliases);
        let dedupe: Vec<Value> = self.aliases.iter().map(|(pkg, _)| Value::String(pkg.clone())).collect();

        let mut out = String::new();
        out.push_str("// Generated by smart-preview. Do not edit.\n");
        out.push_str("import { defineConfig } from 'vite';\n");
        out.push_str("import react from '@vitejs/plugin-react';\n\n");
        out.push_str("export default defineConfig({\n");
        out.push_str(&format!("  root: {},\n", path_value(&self.root)));
        out.push_str("  plugins: [react()],\n");
        out.push_str("  resolve: {\n");
        out.push_str(&format!("    alias: {},\n", nested(&Value::Object(aliases), 4)));
        out.push_str(&format!("    dedupe: {},\n", Value::Array(dedupe)));
        out.push_str("  },\n");
        out.push_str("  server: { headers: { 'Cache-Control': 'no-store' } },\n");
        out.push_str("  preview: { headers: { 'Cache-Control': 'no-store' } },\n");
        out.push_str("  build: {\n");
        out.push_str(&format!("    outDir: {},\n", path_value(&self.out_dir)));
        out.push_str("    emptyOutDir: true,\n");
        out.push_str("    rollupOptions: {\n");
        out.push_str(&format!("      input: {},\n", nested(&Value::Object(inputs), 6)));
        out.push_str("    },\n");
        out.push_str("  },\n");
        out.push_str("});\n");
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_file(path, &self.render())
    }
}

/// Rollup input key for a preview; the dashboard key is reserved.
pub fn input_key(safe_name: &str) -> String {
    if safe_name == DASHBOARD_KEY {
        format!("{DASHBOARD_KEY}-component")
    } else {
        safe_name.to_string()
    }
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn path_map(pairs: &[(String, PathBuf)]) -> Map<String, Value> {
    pairs.iter().map(|(key, path)| (key.clone(), path_value(path))).collect()
}

/// Pretty JSON whose continuation lines are shifted right by `indent`.
fn nested(value: &Value, indent: usize) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let pad = " ".repeat(indent);
    pretty.lines().enumerate().fold(String::new(), |mut acc, (i, line)| {
        if i > 0 {
            acc.push('\n');
            acc.push_str(&pad);
        }
        acc.push_str(line);
        acc
    })
}

pub trait Bundler {
    /// Runs a production build with the config at `config_path`. The build
    /// runs in `working_dir`, the tool root, so the bundler and its plugins
    /// resolve from the same install as the pinned framework packages.
    fn build(&self, config_path: &Path, working_dir: &Path) -> Result<()>;

    /// Command the operator runs afterwards to serve the build.
    fn preview_command(&self, config_path: &Path) -> String;
}

#[derive(Debug, Clone)]
pub struct ViteBundler {
    program: String,
    args: Vec<String>,
    preview_args: Vec<String>,
}

impl ViteBundler {
    pub fn new(config: &BundlerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            preview_args: config.preview_args.clone(),
        }
    }

    fn command_line(&self, args: &[String], config_path: &Path) -> Vec<String> {
        let mut line = args.to_vec();
        line.push("--config".to_string());
        line.push(config_path.to_string_lossy().into_owned());
        line
    }
}

impl Bundler for ViteBundler {
    fn build(&self, config_path: &Path, working_dir: &Path) -> Result<()> {
        let args = self.command_line(&self.args, config_path);
        let invocation = format!("{} {}", self.program, args.join(" "));
        info!("running {} in {}", invocation, working_dir.display());

        let output = cmd(self.program.as_str(), &args)
            .dir(working_dir)
            .unchecked()
            .run()
            .map_err(|e| PreviewError::Bundler(format!("could not launch `{invocation}`: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PreviewError::Bundler(format!("`{invocation}` exited with {}", output.status)))
        }
    }

    fn preview_command(&self, config_path: &Path) -> String {
        let args = self.command_line(&self.preview_args, config_path);
        let invocation = format!("{} {}", self.program, args.join(" "));
        match config_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => format!("cd {} && {}", dir.display(), invocation),
            None => invocation,
        }
    }
}

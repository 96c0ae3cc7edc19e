//! The analyze, build and preview operations behind the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::analysis::AnalysisArtifact;
use crate::api::{AIProvider, ApiClient, ModelClient};
use crate::bundler::{BundleConfig, Bundler};
use crate::config::{AiConfig, Config};
use crate::context::ContextCollector;
use crate::dashboard::{DashboardAssembler, DashboardFiles};
use crate::error::{PreviewError, Result};
use crate::orchestrator::{BatchOrchestrator, BatchReport};
use crate::prompt::PromptBuilder;
use crate::scaffold::{PreviewEntry, ScaffoldGenerator};
use crate::styles::discover_css;

/// Builds the model client. Hosted providers fail fast without a credential;
/// a local Ollama server needs none.
pub fn create_client(ai: &AiConfig) -> Result<ApiClient> {
    let provider = ai.provider()?;
    let api_key = match provider {
        AIProvider::Ollama => ai.api_key().unwrap_or_default(),
        AIProvider::Gemini | AIProvider::OpenAI => ai.api_key()?,
    };
    ApiClient::new(
        provider,
        ai.endpoint()?,
        api_key,
        ai.model.clone(),
        Duration::from_secs(ai.timeout_secs),
    )
    .map_err(|e| PreviewError::Configuration(e.to_string()))
}

pub fn require_files(files: &[String]) -> Result<()> {
    if files.is_empty() {
        return Err(PreviewError::Configuration(
            "no component files given; usage: smart-preview analyze ./src/YourComponent.jsx".to_string(),
        ));
    }
    Ok(())
}

pub fn artifact_path(config: &Config, root: &Path) -> PathBuf {
    root.join(&config.analysis.artifact_path)
}

/// Analyzes `files` and persists the artifact, replacing any previous one.
pub async fn analyze(
    config: &Config,
    root: &Path,
    files: &[String],
    client: &dyn ModelClient,
    show_spinner: bool,
) -> Result<BatchReport> {
    require_files(files)?;

    let context = ContextCollector::new(root)
        .with_readme_limit(config.analysis.readme_char_limit)
        .collect();
    info!("project context: {} ({} dependencies)", context.name, context.dependency_names.len());

    let report = BatchOrchestrator::new(client, context, root)
        .with_prompt_builder(PromptBuilder::new(config.analysis.prompt_variant))
        .with_delay(Duration::from_millis(config.analysis.delay_ms))
        .with_spinner(show_spinner)
        .run(files)
        .await;

    report.persist(&artifact_path(config, root))?;
    Ok(report)
}

#[derive(Debug, Clone)]
pub struct ScaffoldOutput {
    pub previews: Vec<PreviewEntry>,
    pub dashboard: DashboardFiles,
    pub config_path: PathBuf,
    /// Directory the bundler runs in.
    pub tool_root: PathBuf,
}

/// Generates previews, dashboard and bundler config without running the
/// bundler.
pub fn scaffold(config: &Config, root: &Path, build_token: &str) -> Result<ScaffoldOutput> {
    let artifact = AnalysisArtifact::load(&artifact_path(config, root))?;
    let output_dir = config.scaffold.output_dir.as_str();
    let tool_root = config.bundler.tool_root();

    let css_files = discover_css(root, &config.scaffold.css_glob, output_dir)?;
    info!("{} stylesheet(s) matched {}", css_files.len(), config.scaffold.css_glob);

    let previews = ScaffoldGenerator::new(root, output_dir, build_token)
        .with_css_files(&css_files)
        .with_mock_latency(config.scaffold.mock_latency_ms)
        .generate_all(&artifact)?;

    let dashboard = DashboardAssembler::new(root, output_dir, &tool_root, build_token).assemble(&previews)?;

    let config_path = tool_root.join(&config.bundler.config_file);
    BundleConfig::new(root, root.join(&config.bundler.out_dir), &tool_root)
        .with_previews(&dashboard.host_page_path, &previews)
        .write(&config_path)?;
    info!("bundler config written to {}", config_path.display());

    Ok(ScaffoldOutput { previews, dashboard, config_path, tool_root })
}

/// Scaffolds everything and runs the bundler from the tool root.
pub fn build(config: &Config, root: &Path, bundler: &dyn Bundler, build_token: &str) -> Result<ScaffoldOutput> {
    let output = scaffold(config, root, build_token)?;
    bundler.build(&output.config_path, &output.tool_root)?;
    Ok(output)
}

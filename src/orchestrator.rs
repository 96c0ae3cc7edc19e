//! Sequential analysis of a batch of component files.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisArtifact, ComponentAnalysis};
use crate::api::ModelClient;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::normalizer::normalize;
use crate::prompt::{AnalysisRequest, PromptBuilder, RUBRIC_VERSION};

/// Minimum pause between two model calls.
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Analyzed,
    /// Recorded as the fallback record; carries the reason.
    Fallback(String),
    /// Not on disk; no artifact entry.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: String,
    pub status: FileStatus,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub artifact: AnalysisArtifact,
    pub outcomes: Vec<FileOutcome>,
    pub model_calls: usize,
}

impl BatchReport {
    pub fn fallback_count(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o.status, FileStatus::Fallback(_))).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status == FileStatus::Skipped).count()
    }

    /// Writes the artifact in one shot.
    pub fn persist(&self, path: &Path) -> Result<()> {
        self.artifact.save(path)?;
        info!("analysis artifact written to {} ({} entries)", path.display(), self.artifact.len());
        Ok(())
    }
}

pub struct BatchOrchestrator<'a> {
    client: &'a dyn ModelClient,
    context: ProjectContext,
    prompts: PromptBuilder,
    root: PathBuf,
    delay: Duration,
    show_spinner: bool,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(client: &'a dyn ModelClient, context: ProjectContext, root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            context,
            prompts: PromptBuilder::default(),
            root: root.into(),
            delay: DEFAULT_CALL_DELAY,
            show_spinner: false,
        }
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_spinner(mut self, show: bool) -> Self {
        self.show_spinner = show;
        self
    }

    /// Analyzes `paths` in order. Paths are resolved against the project root
    /// but recorded under their original spelling.
    pub async fn run(&self, paths: &[String]) -> BatchReport {
        let mut artifact = AnalysisArtifact::new();
        let mut outcomes = Vec::with_capacity(paths.len());
        let mut model_calls = 0usize;
        let total = paths.len();
        debug!("prompt rubric v{} ({:?})", RUBRIC_VERSION, self.prompts);

        for (index, path) in paths.iter().enumerate() {
            let disk_path = self.root.join(path);
            if !disk_path.exists() {
                debug!("skipping {}: not found on disk", path);
                outcomes.push(FileOutcome { path: path.clone(), status: FileStatus::Skipped });
                continue;
            }

            info!("[{}/{}] analyzing {}", index + 1, total, path);
            let source = match fs::read_to_string(&disk_path) {
                Ok(source) => source,
                Err(e) => {
                    warn!("cannot read {}: {}; recording fallback", path, e);
                    artifact.insert(path.clone(), ComponentAnalysis::fallback());
                    outcomes.push(FileOutcome {
                        path: path.clone(),
                        status: FileStatus::Fallback(format!("unreadable source: {e}")),
                    });
                    continue;
                }
            };

            if model_calls > 0 && !self.delay.is_zero() {
                debug!("waiting {:?} before the next model call", self.delay);
                tokio::time::sleep(self.delay).await;
            }
            model_calls += 1;

            let (analysis, status) = self.analyze_one(AnalysisRequest::new(path.clone(), source)).await;
            artifact.insert(path.clone(), analysis);
            outcomes.push(FileOutcome { path: path.clone(), status });
        }

        BatchReport { artifact, outcomes, model_calls }
    }

    async fn analyze_one(&self, request: AnalysisRequest) -> (ComponentAnalysis, FileStatus) {
        let prompt = self.prompts.build(&self.context, &request);

        let spinner = self.spinner(&request.filename);
        let result = self.client.generate(&prompt).await;
        spinner.finish_and_clear();

        match result {
            Ok(raw) => {
                let normalized = normalize(&raw);
                match normalized.issue {
                    None => {
                        info!(
                            "{}: {} props, {} network mocks",
                            request.file_path,
                            normalized.analysis.props.len(),
                            normalized.analysis.mocks().len()
                        );
                        (normalized.analysis, FileStatus::Analyzed)
                    }
                    Some(issue) => {
                        warn!("{}: unusable model output ({}); recording fallback", request.file_path, issue);
                        (normalized.analysis, FileStatus::Fallback(issue.to_string()))
                    }
                }
            }
            Err(e) => {
                warn!("{}: model call failed ({}); recording fallback", request.file_path, e);
                (ComponentAnalysis::fallback(), FileStatus::Fallback(e.to_string()))
            }
        }
    }

    fn spinner(&self, filename: &str) -> ProgressBar {
        if !self.show_spinner {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Asking the model about {filename}..."));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

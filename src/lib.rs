// Library exports for the smart-preview CLI

pub mod analysis;
pub mod api;
pub mod bundler;
pub mod commands;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod normalizer;
pub mod orchestrator;
pub mod output;
pub mod prompt;
pub mod scaffold;
pub mod styles;

// Re-export commonly used types
pub use analysis::{AnalysisArtifact, ComponentAnalysis, NetworkMock, Wrappers};
pub use api::{AIProvider, ApiClient, ModelClient, ModelError};
pub use bundler::{BundleConfig, Bundler, ViteBundler};
pub use config::Config;
pub use context::{ContextCollector, ProjectContext};
pub use dashboard::{DashboardAssembler, DashboardManifest};
pub use error::{PreviewError, Result};
pub use normalizer::{normalize, FormatIssue, NormalizedResponse};
pub use orchestrator::{BatchOrchestrator, BatchReport, FileOutcome, FileStatus};
pub use output::OutputHandler;
pub use prompt::{AnalysisRequest, PromptBuilder, PromptVariant};
pub use scaffold::{PreviewEntry, ScaffoldGenerator};

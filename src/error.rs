use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of an analyze/build run.
///
/// Per-file failures (model transport, malformed responses, unreadable project
/// metadata) never surface here; they degrade to fallbacks and are logged.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("analysis artifact not found at {}; run `smart-preview analyze <files>` first", path.display())]
    ArtifactMissing { path: PathBuf },
    #[error("analysis artifact at {} is not valid: {reason}", path.display())]
    ArtifactInvalid { path: PathBuf, reason: String },
    #[error("I/O error: {source} (path: {})", path.display())]
    Io { source: std::io::Error, path: PathBuf },
    #[error("scaffold error: {0}")]
    Scaffold(String),
    #[error("bundler failed: {0}")]
    Bundler(String),
}

pub type Result<T> = std::result::Result<T, PreviewError>;

impl PreviewError {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        PreviewError::Io { source, path: path.into() }
    }
}

impl From<walkdir::Error> for PreviewError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("<unknown>"));
        match e.into_io_error() {
            Some(source) => PreviewError::Io { source, path },
            None => PreviewError::Scaffold(format!("filesystem loop detected at {}", path.display())),
        }
    }
}

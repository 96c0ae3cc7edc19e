use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::AIProvider;
use crate::error::{PreviewError, Result};
use crate::prompt::PromptVariant;

const CONFIG_DIR: &str = ".smart-preview";
const CONFIG_FILE: &str = "config.yaml";
const HOME_ENV: &str = "SMART_PREVIEW_HOME";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub analysis: AnalysisConfig,
    pub scaffold: ScaffoldConfig,
    pub bundler: BundlerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: String,
    pub model: String,
    /// Empty means the provider's public endpoint.
    pub api_url: String,
    /// Name of the environment variable holding the credential.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_url: String::new(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl AiConfig {
    pub fn provider(&self) -> Result<AIProvider> {
        self.provider.parse()
    }

    pub fn endpoint(&self) -> Result<String> {
        if self.api_url.is_empty() {
            Ok(self.provider()?.default_endpoint().to_string())
        } else {
            Ok(self.api_url.trim_end_matches('/').to_string())
        }
    }

    /// Reads the credential from the process environment.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(PreviewError::Configuration(format!(
                "missing API credential: set the {} environment variable",
                self.api_key_env
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub artifact_path: PathBuf,
    pub delay_ms: u64,
    pub readme_char_limit: usize,
    pub prompt_variant: PromptVariant,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("analysis.json"),
            delay_ms: 4000,
            readme_char_limit: 3000,
            prompt_variant: PromptVariant::NetworkAware,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    pub output_dir: String,
    pub css_glob: String,
    pub mock_latency_ms: u64,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            output_dir: "preview".to_string(),
            css_glob: "src/**/*.css".to_string(),
            mock_latency_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub preview_args: Vec<String>,
    pub tool_root: Option<PathBuf>,
    pub config_file: String,
    pub out_dir: String,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            args: vec!["vite".to_string(), "build".to_string()],
            preview_args: vec!["vite".to_string(), "preview".to_string()],
            tool_root: None,
            config_file: "vite.preview.config.mjs".to_string(),
            out_dir: "dist".to_string(),
        }
    }
}

impl BundlerConfig {
    /// Installation directory holding the bundler toolchain and dashboard
    /// assets: explicit config, then `SMART_PREVIEW_HOME`, then the bundled
    /// `runtime/` directory.
    pub fn tool_root(&self) -> PathBuf {
        if let Some(root) = &self.tool_root {
            return root.clone();
        }
        match std::env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => Path::new(env!("CARGO_MANIFEST_DIR")).join("runtime"),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PreviewError::io(e, path))?;
        serde_yaml::from_str(&content).map_err(|e| {
            PreviewError::Configuration(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    pub fn get_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads `explicit` if given (it must exist), otherwise the user config
    /// file when present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

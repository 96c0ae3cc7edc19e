//! Analysis data model shared by the analyze and build phases.
//!
//! The persisted artifact is a JSON object keyed by the original file path, in
//! the order the files were requested.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{PreviewError, Result};

/// Environment providers a component needs in order to render.
///
/// Flags keep exactly what the model said: an absent flag stays absent and an
/// explicit `false` is persisted as such. Unknown keys ride along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wrappers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redux: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Wrappers {
    pub fn needs_router(&self) -> bool {
        self.router.unwrap_or(false)
    }

    pub fn needs_redux(&self) -> bool {
        self.redux.unwrap_or(false)
    }

    pub fn needs_query(&self) -> bool {
        self.query.unwrap_or(false)
    }

    pub fn any(&self) -> bool {
        self.needs_router() || self.needs_redux() || self.needs_query()
    }
}

/// One mocked network response rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMock {
    pub url_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub response: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NetworkMock {
    pub fn new(url_pattern: impl Into<String>, response: Value) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            method: Some("GET".to_string()),
            response,
            extra: Map::new(),
        }
    }
}

/// Normalized model output for a single component.
///
/// Sections the model left out stay `None` so a persisted record reads back
/// exactly as the model produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAnalysis {
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrappers: Option<Wrappers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_mocks: Option<Vec<NetworkMock>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentAnalysis {
    /// The empty-but-valid record substituted whenever a file could not be
    /// analyzed.
    pub fn fallback() -> Self {
        Self {
            props: Map::new(),
            wrappers: Some(Wrappers::default()),
            network_mocks: Some(Vec::new()),
            extra: Map::new(),
        }
    }

    pub fn wrappers_or_default(&self) -> Wrappers {
        self.wrappers.clone().unwrap_or_default()
    }

    pub fn mocks(&self) -> &[NetworkMock] {
        self.network_mocks.as_deref().unwrap_or(&[])
    }
}

/// Insertion-ordered mapping from original file path to its analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisArtifact {
    entries: Vec<(String, ComponentAnalysis)>,
}

impl AnalysisArtifact {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `path`. A replaced entry keeps its
    /// original position.
    pub fn insert(&mut self, path: impl Into<String>, analysis: ComponentAnalysis) {
        let path = path.into();
        match self.entries.iter_mut().find(|(key, _)| *key == path) {
            Some((_, slot)) => *slot = analysis,
            None => self.entries.push((path, analysis)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&ComponentAnalysis> {
        self.entries.iter().find(|(key, _)| key == path).map(|(_, analysis)| analysis)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentAnalysis)> {
        self.entries.iter().map(|(key, analysis)| (key.as_str(), analysis))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the whole artifact as pretty-printed JSON, replacing any
    /// previous file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PreviewError::io(e, parent))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| PreviewError::ArtifactInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| PreviewError::io(e, path))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PreviewError::ArtifactMissing { path: path.to_path_buf() });
        }
        let content = fs::read_to_string(path).map_err(|e| PreviewError::io(e, path))?;
        serde_json::from_str(&content).map_err(|e| PreviewError::ArtifactInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Serialize for AnalysisArtifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, analysis) in &self.entries {
            map.serialize_entry(path, analysis)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AnalysisArtifact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // serde_json's preserve_order keeps the file's key order here.
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut artifact = AnalysisArtifact::new();
        for (path, value) in raw {
            let analysis = serde_json::from_value(value)
                .map_err(|e| D::Error::custom(format!("entry `{path}`: {e}")))?;
            artifact.insert(path, analysis);
        }
        Ok(artifact)
    }
}

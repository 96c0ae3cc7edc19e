//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use smart_preview::{ModelClient, ModelError};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tokio::time::Instant;

/// Scripted model client recording every prompt it receives.
pub struct MockModelClient {
    responses: Mutex<VecDeque<Result<String, ModelError>>>,
    default_response: String,
    pub calls: Mutex<Vec<(String, Instant)>>,
}

impl MockModelClient {
    /// Answers every call with `response`.
    pub fn always(response: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response: response.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers calls in order from `responses`, then with `{"props":{}}`.
    pub fn scripted(responses: Vec<Result<String, ModelError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            default_response: r#"{"props":{}}"#.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push((prompt.to_string(), Instant::now()));
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

pub fn write_component(root: &Path, relative: &str, name: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        path,
        format!(
            "export default function {name}({{ user }}) {{\n  return <div>{{user.name}}</div>;\n}}\n"
        ),
    )
    .unwrap();
}

/// Installs the shipped dashboard assets into a scratch tool root.
pub fn tool_root_with_dashboard(tool_root: &Path) {
    let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("runtime").join("dashboard");
    let target = tool_root.join("dashboard");
    fs::create_dir_all(&target).unwrap();
    for entry in fs::read_dir(shipped).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), target.join(entry.file_name())).unwrap();
    }
}

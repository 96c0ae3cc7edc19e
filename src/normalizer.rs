//! Turns raw model text into a [`ComponentAnalysis`].
//!
//! Normalization never fails: anything that cannot be trusted collapses to the
//! fallback record, and the reason is carried alongside so the caller can
//! report it.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::analysis::{ComponentAnalysis, NetworkMock, Wrappers};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatIssue {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),
    #[error("response JSON is not an object")]
    NotAnObject,
    #[error("response JSON has no `props` key")]
    MissingProps,
    #[error("response JSON has an unexpected shape: {0}")]
    InvalidShape(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub analysis: ComponentAnalysis,
    /// Set when `analysis` is the fallback record.
    pub issue: Option<FormatIssue>,
}

impl NormalizedResponse {
    fn parsed(analysis: ComponentAnalysis) -> Self {
        Self { analysis, issue: None }
    }

    fn fallback(issue: FormatIssue) -> Self {
        Self { analysis: ComponentAnalysis::fallback(), issue: Some(issue) }
    }

    pub fn is_fallback(&self) -> bool {
        self.issue.is_some()
    }
}

/// Removes every code-fence marker and trims the result.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace(JSON_FENCE, "").replace(FENCE, "").trim().to_string()
}

/// Only a missing or non-object `props` rejects a response. Off-shape
/// `wrappers` and `networkMocks` sections degrade to their defaults with a
/// warning, and malformed mock entries are dropped one by one.
pub fn normalize(raw: &str) -> NormalizedResponse {
    let cleaned = strip_code_fences(raw);

    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(e) => return NormalizedResponse::fallback(FormatIssue::NotJson(e.to_string())),
    };

    let mut object = match value {
        Value::Object(object) => object,
        _ => return NormalizedResponse::fallback(FormatIssue::NotAnObject),
    };

    let props = match object.remove("props") {
        Some(Value::Object(props)) => props,
        Some(other) => {
            return NormalizedResponse::fallback(FormatIssue::InvalidShape(format!(
                "`props` is {}, expected an object",
                json_kind(&other)
            )))
        }
        None => return NormalizedResponse::fallback(FormatIssue::MissingProps),
    };
    let wrappers = object.remove("wrappers").map(lenient_wrappers);
    let network_mocks = object.remove("networkMocks").map(lenient_mocks);

    NormalizedResponse::parsed(ComponentAnalysis { props, wrappers, network_mocks, extra: object })
}

fn lenient_wrappers(value: Value) -> Wrappers {
    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            warn!("ignoring `wrappers`: expected an object, got {}", json_kind(&other));
            return Wrappers::default();
        }
    };

    let mut wrappers = Wrappers::default();
    for (key, flag) in fields {
        let slot = match key.as_str() {
            "router" => &mut wrappers.router,
            "redux" => &mut wrappers.redux,
            "query" => &mut wrappers.query,
            _ => {
                wrappers.extra.insert(key, flag);
                continue;
            }
        };
        match flag {
            Value::Bool(flag) => *slot = Some(flag),
            other => warn!("ignoring wrappers.{}: expected a boolean, got {}", key, json_kind(&other)),
        }
    }
    wrappers
}

fn lenient_mocks(value: Value) -> Vec<NetworkMock> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            warn!("ignoring `networkMocks`: expected an array, got {}", json_kind(&other));
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<NetworkMock>(item) {
            Ok(mock) => Some(mock),
            Err(e) => {
                warn!("dropping networkMocks[{}]: {}", index, e);
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Fetch interception installed into every preview entry.
//!
//! [`resolve`] is the reference for the routing rule the JavaScript shim
//! applies: first mock whose `urlPattern` is `"*"` or a substring of the URL,
//! otherwise the first mock, and only an empty list reaches the network.

use crate::analysis::NetworkMock;

pub const WILDCARD: &str = "*";
pub const DEFAULT_MOCK_LATENCY_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockResolution<'a> {
    Matched(&'a NetworkMock),
    /// Nothing matched; the first mock is served anyway.
    FirstMock(&'a NetworkMock),
    PassThrough,
}

impl<'a> MockResolution<'a> {
    pub fn mock(&self) -> Option<&'a NetworkMock> {
        match self {
            MockResolution::Matched(mock) | MockResolution::FirstMock(mock) => Some(mock),
            MockResolution::PassThrough => None,
        }
    }
}

/// Rust statement of [`JS_MOCK_LOOKUP`]. Generated previews never call it;
/// it exists so the routing rule shipped in the shim can be checked here.
pub fn resolve<'a>(mocks: &'a [NetworkMock], url: &str) -> MockResolution<'a> {
    let Some(first) = mocks.first() else {
        return MockResolution::PassThrough;
    };
    mocks
        .iter()
        .find(|mock| mock.url_pattern == WILDCARD || url.contains(mock.url_pattern.as_str()))
        .map(MockResolution::Matched)
        .unwrap_or(MockResolution::FirstMock(first))
}

/// The lookup expression the shim evaluates per request. Scans in list
/// order, then falls back to the first mock.
pub const JS_MOCK_LOOKUP: &str =
    "mocks.find((m) => m.urlPattern === '*' || url.includes(m.urlPattern)) || mocks[0]";

const FETCH_SHIM: &str = r#"const MOCK_LATENCY_MS = __MOCK_LATENCY_MS__;

function installFetchInterceptor(mocks) {
  if (mocks.length === 0) {
    return;
  }
  window.fetch = async (input) => {
    const url = typeof input === 'string' ? input : input instanceof URL ? input.href : input.url;
    const mock = __MOCK_LOOKUP__;
    console.info('[smart-preview] mocked fetch', url, '->', mock.urlPattern);
    await new Promise((resolve) => setTimeout(resolve, MOCK_LATENCY_MS));
    return new Response(JSON.stringify(mock.response), {
      status: 200,
      headers: { 'Content-Type': 'application/json' },
    });
  };
}
"#;

pub fn render_fetch_shim(latency_ms: u64) -> String {
    FETCH_SHIM
        .replace("__MOCK_LATENCY_MS__", &latency_ms.to_string())
        .replace("__MOCK_LOOKUP__", JS_MOCK_LOOKUP)
}

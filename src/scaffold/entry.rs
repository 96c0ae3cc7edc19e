//! Structured model of a preview entry module and its deterministic rendering.

use serde_json::{Map, Value};
use std::fmt::Write;

use super::interceptor::render_fetch_shim;
use crate::analysis::{NetworkMock, Wrappers};

const RUNTIME_IMPORTS: &[&str] = &[
    "import React from 'react';",
    "import ReactDOM from 'react-dom/client';",
];

/// Environment provider wrapped around the previewed component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    Redux,
    Query,
    Router,
}

impl Wrapper {
    /// Providers required by `flags`, outermost first.
    pub fn chain(flags: &Wrappers) -> Vec<Wrapper> {
        let mut chain = Vec::new();
        if flags.needs_redux() {
            chain.push(Wrapper::Redux);
        }
        if flags.needs_query() {
            chain.push(Wrapper::Query);
        }
        if flags.needs_router() {
            chain.push(Wrapper::Router);
        }
        chain
    }

    fn imports(&self) -> &'static [&'static str] {
        match self {
            Wrapper::Redux => &[
                "import { Provider as ReduxProvider } from 'react-redux';",
                "import { legacy_createStore as createStore } from 'redux';",
            ],
            Wrapper::Query => &["import { QueryClient, QueryClientProvider } from '@tanstack/react-query';"],
            Wrapper::Router => &["import { BrowserRouter } from 'react-router-dom';"],
        }
    }

    fn setup(&self) -> Option<&'static str> {
        match self {
            Wrapper::Redux => Some("const previewStore = createStore((state = {}) => state);"),
            Wrapper::Query => Some(
                "const previewQueryClient = new QueryClient({ defaultOptions: { queries: { retry: false } } });",
            ),
            Wrapper::Router => None,
        }
    }

    fn open_tag(&self) -> &'static str {
        match self {
            Wrapper::Redux => "<ReduxProvider store={previewStore}>",
            Wrapper::Query => "<QueryClientProvider client={previewQueryClient}>",
            Wrapper::Router => "<BrowserRouter>",
        }
    }

    fn close_tag(&self) -> &'static str {
        match self {
            Wrapper::Redux => "</ReduxProvider>",
            Wrapper::Query => "</QueryClientProvider>",
            Wrapper::Router => "</BrowserRouter>",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryModule {
    pub title: String,
    /// Module specifier of the previewed component.
    pub component_import: String,
    /// Root-absolute specifiers of stylesheets to load first.
    pub css_imports: Vec<String>,
    pub wrapper_chain: Vec<Wrapper>,
    pub mock_props: Map<String, Value>,
    pub network_mocks: Vec<NetworkMock>,
    pub mock_latency_ms: u64,
}

impl EntryModule {
    /// Import lines in emission order: runtime, stylesheets, wrappers, then
    /// the component itself.
    pub fn imports(&self) -> Vec<String> {
        let mut lines: Vec<String> = RUNTIME_IMPORTS.iter().map(|s| s.to_string()).collect();
        lines.extend(self.css_imports.iter().map(|css| format!("import {};", js_string(css))));
        for wrapper in &self.wrapper_chain {
            lines.extend(wrapper.imports().iter().map(|s| s.to_string()));
        }
        lines.push(format!("import TargetComponent from {};", js_string(&self.component_import)));
        lines
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.imports() {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');

        for setup in self.wrapper_chain.iter().filter_map(Wrapper::setup) {
            out.push_str(setup);
            out.push('\n');
        }
        if self.wrapper_chain.iter().any(|w| w.setup().is_some()) {
            out.push('\n');
        }

        let _ = writeln!(out, "const networkMocks = {};\n", js_literal(&self.network_mocks));
        out.push_str(&render_fetch_shim(self.mock_latency_ms));
        out.push_str("\ninstallFetchInterceptor(networkMocks);\n\n");

        let _ = writeln!(out, "const mockProps = {};\n", js_literal(&self.mock_props));

        out.push_str("ReactDOM.createRoot(document.getElementById('root')).render(\n");
        out.push_str("  <div style={{ padding: '20px', fontFamily: 'sans-serif' }}>\n");
        let _ = writeln!(out, "    <h1>{{{}}}</h1>", js_string(&self.title));

        let base = 4;
        for (depth, wrapper) in self.wrapper_chain.iter().enumerate() {
            let _ = writeln!(out, "{}{}", indent(base + depth * 2), wrapper.open_tag());
        }
        let _ = writeln!(
            out,
            "{}<TargetComponent {{...mockProps}} />",
            indent(base + self.wrapper_chain.len() * 2)
        );
        for (depth, wrapper) in self.wrapper_chain.iter().enumerate().rev() {
            let _ = writeln!(out, "{}{}", indent(base + depth * 2), wrapper.close_tag());
        }

        out.push_str("  </div>\n");
        out.push_str(");\n");
        out
    }
}

fn indent(width: usize) -> String {
    " ".repeat(width)
}

/// JSON is a valid JavaScript expression for every value serde_json emits.
fn js_literal<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

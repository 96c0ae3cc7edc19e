//! Instruction template sent to the model for each component file.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

use crate::context::ProjectContext;

/// Bumped whenever the rubric text changes.
pub const RUBRIC_VERSION: u32 = 3;

/// Output rules appended to every prompt.
const OUTPUT_RULES: &str = "
RULES:
- Use realistic data: real-looking names, emails, prices, dates and sentences. Never use placeholders like \"foo\", \"test\" or \"Lorem ipsum\".
- Any list-shaped value (arrays of items, rows, cards) must contain between 3 and 5 entries.
- Image URLs must use the form https://picsum.photos/seed/<word>/<width>/<height>.
- Callback props (onClick, onChange, onSubmit, ...) must be omitted; they cannot be expressed as JSON.
- Output ONLY one valid JSON object. No markdown, no code fences, no commentary before or after it.
";

const NETWORK_RULES: &str = "
NETWORK:
- Find every fetch/axios/data-loading call in the component.
- Infer the response shape from how the fetched data is destructured and rendered in the component body, and produce a matching realistic response.
- \"urlPattern\" must be a distinctive substring of the requested URL (for example \"/api/users\"), or \"*\" to match anything.
";

/// Which rubric to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptVariant {
    /// Props and wrappers only.
    Basic,
    /// Also asks for network mocks.
    #[default]
    NetworkAware,
}

/// One file to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub file_path: String,
    pub filename: String,
    pub source_text: String,
    pub is_typed_variant: bool,
}

impl AnalysisRequest {
    pub fn new(file_path: impl Into<String>, source_text: impl Into<String>) -> Self {
        let file_path = file_path.into();
        let path = Path::new(&file_path);
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.clone());
        let is_typed_variant = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("ts") | Some("tsx") | Some("mts") | Some("cts")
        );
        Self { file_path, filename, source_text: source_text.into(), is_typed_variant }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    variant: PromptVariant,
}

impl PromptBuilder {
    pub fn new(variant: PromptVariant) -> Self {
        Self { variant }
    }

    pub fn build(&self, context: &ProjectContext, request: &AnalysisRequest) -> String {
        let mut prompt = String::new();
        prompt.push_str("You are an expert React engineer generating preview data for a single UI component.\n\n");

        prompt.push_str("PROJECT CONTEXT:\n");
        let _ = writeln!(prompt, "Name: {}", context.name);
        if !context.description.is_empty() {
            let _ = writeln!(prompt, "Description: {}", context.description);
        }
        if !context.dependency_names.is_empty() {
            let _ = writeln!(prompt, "Dependencies: {}", context.dependency_names.join(", "));
        }
        if !context.readme_excerpt.is_empty() {
            let _ = writeln!(prompt, "README excerpt:\n{}", context.readme_excerpt);
        }

        prompt.push_str("\nCOMPONENT:\n");
        let _ = writeln!(prompt, "Filename: {}", request.filename);
        let _ = writeln!(
            prompt,
            "Language: {}",
            if request.is_typed_variant { "TypeScript (use the declared prop types)" } else { "JavaScript" }
        );

        prompt.push_str("\nOUTPUT SHAPE:\n");
        prompt.push_str("{\n  \"props\": { <realistic mock value for every prop the component reads> },\n");
        prompt.push_str("  \"wrappers\": { \"router\": <true if it uses react-router, Link, useNavigate, useParams>, \"redux\": <true if it uses react-redux, useSelector, useDispatch>, \"query\": <true if it uses react-query / @tanstack/react-query> }");
        match self.variant {
            PromptVariant::Basic => prompt.push_str("\n}\n"),
            PromptVariant::NetworkAware => {
                prompt.push_str(",\n  \"networkMocks\": [ { \"urlPattern\": \"<url substring>\", \"method\": \"GET\", \"response\": <json body> } ]\n}\n");
            }
        }

        prompt.push_str(OUTPUT_RULES);
        if self.variant == PromptVariant::NetworkAware {
            prompt.push_str(NETWORK_RULES);
        }

        let _ = write!(prompt, "\nComponent source:\n{}\n", request.source_text);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ProjectContext {
        ProjectContext {
            name: "shop-ui".to_string(),
            description: "Storefront components".to_string(),
            dependency_names: vec!["react".to_string(), "react-router-dom".to_string()],
            readme_excerpt: "Shop UI kit".to_string(),
        }
    }

    #[test]
    fn request_detects_typed_variant() {
        assert!(AnalysisRequest::new("src/Card.tsx", "").is_typed_variant);
        assert!(!AnalysisRequest::new("src/Card.jsx", "").is_typed_variant);
        assert_eq!(AnalysisRequest::new("./src/ui/Card.jsx", "").filename, "Card.jsx");
    }

    #[test]
    fn prompt_embeds_context_file_and_source() {
        let request = AnalysisRequest::new(
            "src/ProductCard.tsx",
            "export default function ProductCard({ title }) { return <h2>{title}</h2>; }",
        );
        let prompt = PromptBuilder::default().build(&context(), &request);

        assert!(prompt.contains("Name: shop-ui"));
        assert!(prompt.contains("Dependencies: react, react-router-dom"));
        assert!(prompt.contains("README excerpt:\nShop UI kit"));
        assert!(prompt.contains("Filename: ProductCard.tsx"));
        assert!(prompt.contains("Language: TypeScript"));
        assert!(prompt.ends_with(&format!("{}\n", request.source_text)));
    }

    #[test]
    fn rubric_is_present() {
        let request = AnalysisRequest::new("src/List.jsx", "x");
        let prompt = PromptBuilder::default().build(&context(), &request);
        assert!(prompt.contains("between 3 and 5 entries"));
        assert!(prompt.contains("https://picsum.photos/seed/"));
        assert!(prompt.contains("Output ONLY one valid JSON object"));
        assert!(prompt.contains("destructured"));
    }

    #[test]
    fn basic_variant_omits_network_section() {
        let request = AnalysisRequest::new("src/List.jsx", "x");
        let prompt = PromptBuilder::new(PromptVariant::Basic).build(&context(), &request);
        assert!(!prompt.contains("networkMocks"));
        assert!(!prompt.contains("NETWORK:"));
    }

    #[test]
    fn build_is_deterministic() {
        let request = AnalysisRequest::new("src/List.jsx", "const a = 1;");
        let builder = PromptBuilder::default();
        assert_eq!(builder.build(&context(), &request), builder.build(&context(), &request));
    }
}

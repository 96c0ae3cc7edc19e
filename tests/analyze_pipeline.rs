mod common;

use common::{write_component, MockModelClient};
use pretty_assertions::assert_eq;
use smart_preview::config::Config;
use smart_preview::{
    commands, AnalysisArtifact, BatchOrchestrator, ComponentAnalysis, DashboardManifest, FileStatus, ModelError,
    ProjectContext, ScaffoldGenerator,
};
use std::time::Duration;
use tokio::time::Instant;

const GOOD_RESPONSE: &str = r#"```json
{"props": {"user": {"name": "Ada"}}, "wrappers": {"router": true}, "networkMocks": []}
```"#;

fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn missing_files_are_skipped_without_entries() {
    let dir = tempfile::tempdir().unwrap();
    write_component(dir.path(), "src/A.jsx", "A");
    write_component(dir.path(), "src/C.jsx", "C");
    let client = MockModelClient::always(GOOD_RESPONSE);

    let report = BatchOrchestrator::new(&client, ProjectContext::default(), dir.path())
        .with_delay(Duration::ZERO)
        .run(&paths(&["src/A.jsx", "src/Missing.jsx", "src/C.jsx"]))
        .await;

    assert_eq!(report.artifact.keys().collect::<Vec<_>>(), vec!["src/A.jsx", "src/C.jsx"]);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.model_calls, 2);
    assert_eq!(client.call_count(), 2);
    assert_eq!(report.outcomes[1].status, FileStatus::Skipped);
}

#[tokio::test(start_paused = true)]
async fn model_calls_are_spaced_by_the_delay() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["A", "B", "C"] {
        write_component(dir.path(), &format!("src/{name}.jsx"), name);
    }
    let client = MockModelClient::always(GOOD_RESPONSE);

    let started = Instant::now();
    BatchOrchestrator::new(&client, ProjectContext::default(), dir.path())
        .with_delay(Duration::from_secs(4))
        .run(&paths(&["src/A.jsx", "src/B.jsx", "src/C.jsx"]))
        .await;

    assert!(started.elapsed() >= Duration::from_secs(8));
    let instants = client.call_instants();
    assert_eq!(instants.len(), 3);
    for pair in instants.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(4));
    }
}

#[tokio::test(start_paused = true)]
async fn single_file_is_not_delayed() {
    let dir = tempfile::tempdir().unwrap();
    write_component(dir.path(), "src/A.jsx", "A");
    let client = MockModelClient::always(GOOD_RESPONSE);

    let started = Instant::now();
    BatchOrchestrator::new(&client, ProjectContext::default(), dir.path())
        .with_delay(Duration::from_secs(4))
        .run(&paths(&["src/A.jsx"]))
        .await;

    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn failures_become_fallback_entries_and_the_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["A", "B", "C", "D"] {
        write_component(dir.path(), &format!("src/{name}.jsx"), name);
    }
    let client = MockModelClient::scripted(vec![
        Ok("Sorry, I cannot help with that.".to_string()),
        Err(ModelError::Api { provider: "gemini", status: 429, body: "quota".to_string() }),
        Ok(r#"{"wrappers": {}}"#.to_string()),
        Ok(GOOD_RESPONSE.to_string()),
    ]);

    let report = BatchOrchestrator::new(&client, ProjectContext::default(), dir.path())
        .with_delay(Duration::ZERO)
        .run(&paths(&["src/A.jsx", "src/B.jsx", "src/C.jsx", "src/D.jsx"]))
        .await;

    assert_eq!(report.artifact.len(), 4);
    assert_eq!(report.fallback_count(), 3);
    for path in ["src/A.jsx", "src/B.jsx", "src/C.jsx"] {
        let entry = report.artifact.get(path).unwrap();
        assert!(entry.props.is_empty());
        assert_eq!(entry, &ComponentAnalysis::fallback());
    }
    let good = report.artifact.get("src/D.jsx").unwrap();
    assert_eq!(good.props["user"]["name"], "Ada");
    assert!(good.wrappers_or_default().needs_router());
    assert_eq!(report.outcomes[3].status, FileStatus::Analyzed);
}

#[tokio::test]
async fn prompts_carry_project_context_and_source() {
    let dir = tempfile::tempdir().unwrap();
    write_component(dir.path(), "src/UserCard.tsx", "UserCard");
    let context = ProjectContext {
        name: "shop-ui".to_string(),
        description: "Storefront".to_string(),
        dependency_names: vec!["react".to_string(), "redux".to_string()],
        readme_excerpt: "A demo shop".to_string(),
    };
    let client = MockModelClient::always(GOOD_RESPONSE);

    BatchOrchestrator::new(&client, context, dir.path())
        .with_delay(Duration::ZERO)
        .run(&paths(&["src/UserCard.tsx"]))
        .await;

    let prompt = &client.prompts()[0];
    assert!(prompt.contains("shop-ui"));
    assert!(prompt.contains("redux"));
    assert!(prompt.contains("UserCard.tsx"));
    assert!(prompt.contains("export default function UserCard"));
}

#[tokio::test]
async fn input_order_survives_into_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["Zeta", "Alpha", "Mid"] {
        write_component(dir.path(), &format!("src/{name}.jsx"), name);
    }
    let client = MockModelClient::always(GOOD_RESPONSE);
    let order = paths(&["src/Zeta.jsx", "src/Alpha.jsx", "src/Mid.jsx"]);

    let report = BatchOrchestrator::new(&client, ProjectContext::default(), dir.path())
        .with_delay(Duration::ZERO)
        .run(&order)
        .await;
    let artifact_path = dir.path().join("analysis.json");
    report.persist(&artifact_path).unwrap();
    let reloaded = AnalysisArtifact::load(&artifact_path).unwrap();

    let entries = ScaffoldGenerator::new(dir.path(), "preview", "1").generate_all(&reloaded).unwrap();
    let manifest = DashboardManifest::from_entries(&entries);
    let names: Vec<&str> = manifest.0.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
}

#[tokio::test]
async fn analyze_replaces_the_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write_component(dir.path(), "src/A.jsx", "A");
    write_component(dir.path(), "src/B.jsx", "B");
    let mut config = Config::default();
    config.analysis.delay_ms = 0;
    let client = MockModelClient::always(GOOD_RESPONSE);

    commands::analyze(&config, dir.path(), &paths(&["src/A.jsx"]), &client, false).await.unwrap();
    commands::analyze(&config, dir.path(), &paths(&["src/B.jsx"]), &client, false).await.unwrap();

    let artifact = AnalysisArtifact::load(&commands::artifact_path(&config, dir.path())).unwrap();
    assert_eq!(artifact.keys().collect::<Vec<_>>(), vec!["src/B.jsx"]);
}

#[tokio::test]
async fn analyze_with_only_missing_files_writes_an_empty_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.analysis.delay_ms = 0;
    let client = MockModelClient::always(GOOD_RESPONSE);

    let report = commands::analyze(&config, dir.path(), &paths(&["src/Nope.jsx"]), &client, false)
        .await
        .unwrap();

    assert_eq!(client.call_count(), 0);
    assert!(report.artifact.is_empty());
    let raw = std::fs::read_to_string(commands::artifact_path(&config, dir.path())).unwrap();
    assert_eq!(raw.trim(), "{}");
}

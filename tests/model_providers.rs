use assert_matches::assert_matches;
use serde_json::json;
use smart_preview::{AIProvider, ApiClient, ModelClient, ModelError};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(provider: AIProvider, server: &MockServer, model: &str) -> ApiClient {
    ApiClient::new(provider, format!("{}/", server.uri()), "test-key", model, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn gemini_concatenates_candidate_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "describe UserCard" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"props\":" }, { "text": " {}}" }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(AIProvider::Gemini, &server, "gemini-2.5-flash")
        .generate("describe UserCard")
        .await
        .unwrap();

    assert_eq!(text, "{\"props\": {}}");
}

#[tokio::test]
async fn openai_reads_first_choice_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"props\":{\"title\":\"Hi\"}}" } }]
        })))
        .mount(&server)
        .await;

    let text = client(AIProvider::OpenAI, &server, "gpt-4o-mini").generate("p").await.unwrap();

    assert_eq!(text, "{\"props\":{\"title\":\"Hi\"}}");
}

#[tokio::test]
async fn ollama_disables_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "llama3", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "{\"props\":{}}", "done": true })))
        .mount(&server)
        .await;

    let text = client(AIProvider::Ollama, &server, "llama3").generate("p").await.unwrap();

    assert_eq!(text, "{\"props\":{}}");
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Resource has been exhausted"))
        .mount(&server)
        .await;

    let err = client(AIProvider::Gemini, &server, "gemini-2.5-flash").generate("p").await.unwrap_err();

    assert_matches!(err, ModelError::Api { status: 429, ref body, .. } if body.contains("exhausted"));
}

#[tokio::test]
async fn server_error_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = client(AIProvider::OpenAI, &server, "gpt-4o-mini").generate("p").await.unwrap_err();

    assert_matches!(err, ModelError::Api { status: 500, .. });
}

#[tokio::test]
async fn missing_text_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client(AIProvider::Gemini, &server, "gemini-2.5-flash").generate("p").await.unwrap_err();

    assert_matches!(err, ModelError::EmptyResponse { .. });
}

#[tokio::test]
async fn malformed_body_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(AIProvider::Ollama, &server, "llama3").generate("p").await.unwrap_err();

    assert_matches!(err, ModelError::Transport(_));
}

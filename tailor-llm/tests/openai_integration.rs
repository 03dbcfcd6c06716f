mod common;
use serde_json::json;
use tailor_common::{Result, TailorError};
use tailor_llm::openai::OpenAiClient;
use tailor_llm::traits::LlmClient;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gpt-4o-mini";

fn responses_body(text: &str) -> serde_json::Value {
    json!({
        "id": "resp_123",
        "object": "response",
        "created_at": 1_700_000_000,
        "status": "completed",
        "model": MODEL,
        "output": [{
            "id": "msg_1",
            "type": "message",
            "status": "completed",
            "content": [{ "type": "output_text", "text": text }]
        }],
        "usage": { "total_tokens": 42 }
    })
}

#[tokio::test]
async fn generate_forwards_budget_and_reads_output_text() -> Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": MODEL,
            "instructions": "Output only the extracted text.",
            "max_output_tokens": 4096,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses_body("Senior Rust Engineer")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::with_endpoint(
        "sk-test".into(),
        MODEL.into(),
        &format!("{}/v1", server.uri()),
    )?;
    let resp = client
        .generate(
            "Extract the job",
            Some("Output only the extracted text."),
            Some(4096),
            Some(0.2),
        )
        .await?;

    assert_eq!(resp.text, "Senior Rust Engineer");
    assert_eq!(resp.model.as_deref(), Some(MODEL));
    assert_eq!(resp.tokens_used, Some(42));
    Ok(())
}

#[tokio::test]
async fn api_errors_become_provider_errors() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let client = OpenAiClient::with_endpoint(
        "sk-wrong".into(),
        MODEL.into(),
        &format!("{}/v1/", server.uri()),
    )
    .unwrap();
    let err = client.generate("hi", None, None, None).await.unwrap_err();

    match err {
        TailorError::Provider(msg) => assert!(msg.contains("Incorrect API key"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
#[ignore]
async fn openai_generate_smoketest() -> Result<()> {
    common::init_test_tracing();
    let Ok(key) = std::env::var("OPENAI_API_KEY") else {
        tracing::debug!("Skipping: OPENAI_API_KEY not set");
        return Ok(());
    };
    let client = OpenAiClient::new(key, MODEL.to_string())?;

    let response = client.generate("Say Ok", None, Some(16), Some(0.2)).await?;
    tracing::debug!("OpenAi response is: {}", response.text);

    assert!(
        !response.text.trim().is_empty(),
        "response text should not be empty"
    );
    Ok(())
}

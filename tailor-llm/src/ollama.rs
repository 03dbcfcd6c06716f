use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tailor_common::{Result, TailorError};
use tailor_http::{HttpClient, HttpError, RequestOpts};

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

const GENERATE_TIMEOUT: Duration = Duration::from_secs(300);
const PULL_TIMEOUT: Duration = Duration::from_secs(1800);

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
pub struct OllamaClient {
    client: HttpClient,
    model: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize, Default)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    eval_count: Option<u32>,
}

impl OllamaClient {
    /// Create a new client and verify server/model availability.
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let client = HttpClient::new(&base)
            .map_err(|e| TailorError::Config(format!("Failed to create HTTP client: {e}")))?;

        let ollama_client = Self { client, model };
        ollama_client.ensure_model_available().await?;
        Ok(ollama_client)
    }

    async fn fetch_available_models(&self) -> Result<Vec<String>> {
        let tags: TagsResponse = self
            .client
            .get_json("api/tags", RequestOpts::default())
            .await
            .map_err(|_| TailorError::Provider(OLLAMA_CONNECTION_ERROR.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn ensure_model_available(&self) -> Result<()> {
        let models = self.fetch_available_models().await?;
        if models.iter().any(|m| m == &self.model) {
            return Ok(());
        }

        tracing::info!(model=%self.model, "llm.ollama.pulling_model");
        let opts = RequestOpts {
            timeout: Some(PULL_TIMEOUT),
            retries: Some(0),
            ..Default::default()
        };
        let _: serde_json::Value = self
            .client
            .post_json_opts(
                "api/pull",
                &PullRequest {
                    model: &self.model,
                    stream: false,
                },
                opts,
            )
            .await
            .map_err(|e| TailorError::Provider(format!("Failed to pull model: {e}")))?;
        tracing::info!(model=%self.model, "llm.ollama.model_pulled");
        Ok(())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            system: system_prompt,
            stream: false,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
            },
        };
        let opts = RequestOpts {
            timeout: Some(GENERATE_TIMEOUT),
            ..Default::default()
        };

        let resp: GenerateResponse = self
            .client
            .post_json_opts("api/generate", &req, opts)
            .await
            .map_err(|e| match e {
                HttpError::Timeout(_) => TailorError::Timeout,
                other => TailorError::Provider(format!("Generate request failed: {other}")),
            })?;

        Ok(LlmResponse {
            text: resp.response,
            model: Some(self.model.clone()),
            tokens_used: resp.eval_count,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.fetch_available_models().await.is_ok())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

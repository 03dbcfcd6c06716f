use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tailor_common::{Result, TailorError};
use tailor_http::{HttpClient, HttpError};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const DEFAULT_INSTRUCTIONS: &str = "You are a careful assistant. Follow the instructions exactly.";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the OpenAI Responses API (or a compatible gateway).
pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ResponsesApiRequest<'a> {
    model: &'a str,
    input: &'a str,
    instructions: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiResponse {
    model: String,
    #[serde(default)]
    output: Vec<ResponseMessage>,
    #[serde(default)]
    usage: Option<ResponseUsage>,
}

/// One element in the `output` array
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

/// One part of the message `content`
#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    total_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Create a client against the public OpenAI endpoint.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_endpoint(api_key, model, OPENAI_API_BASE)
    }

    /// Create a client against any OpenAI-compatible base URL
    /// (e.g. `https://gateway.internal/v1`).
    pub fn with_endpoint(api_key: String, model: String, endpoint: &str) -> Result<Self> {
        let base = format!("{}/", endpoint.trim_end_matches('/'));
        let client = HttpClient::new(&base)
            .map_err(|e| TailorError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(REQUEST_TIMEOUT);

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        tracing::debug!(
            model=%self.model,
            prompt_chars=prompt.len(),
            ?max_tokens,
            ?temperature,
            "llm.openai.generate"
        );

        let req = ResponsesApiRequest {
            model: &self.model,
            input: prompt,
            instructions: system_prompt.unwrap_or(DEFAULT_INSTRUCTIONS),
            max_output_tokens: max_tokens,
            temperature,
        };

        let resp: ResponsesApiResponse = self
            .client
            .post_json("responses", Some(&self.api_key), &req)
            .await
            .map_err(http_to_tailor)?;

        let text = resp
            .output
            .iter()
            .flat_map(|msg| &msg.content)
            .filter(|c| c.kind == "output_text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        Ok(LlmResponse {
            text,
            model: Some(resp.model),
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .generate("Respond with just 'OK'", None, Some(16), Some(0.0))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(error=%e, "llm.openai.health_check_failed");
                Ok(false)
            }
        }
    }
}

fn http_to_tailor(e: HttpError) -> TailorError {
    match e {
        HttpError::Timeout(_) => TailorError::Timeout,
        other => TailorError::Provider(format!("openai: {other}")),
    }
}

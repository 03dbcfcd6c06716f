use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use tailor_common::{Result, TailorError};

/// Stand-in used when no provider is configured.
///
/// Every call fails, so callers that fall back to raw text keep working.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledClient;

#[async_trait]
impl LlmClient for DisabledClient {
    async fn generate(
        &self,
        _prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        Err(TailorError::Config("No LLM configured".to_string()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn model_name(&self) -> &str {
        "disabled"
    }
}

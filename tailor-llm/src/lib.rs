//! Provider-agnostic completion clients for Tailor.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! provider implementations for Ollama and OpenAI, plus a
//! [`disabled::DisabledClient`] for runs without a provider. Use
//! [`ensure_llm_ready`] to build a client from a [`tailor_common::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use tailor_common::{LlmConfig, Result};
//! use tailor_llm::ensure_llm_ready;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let cfg = LlmConfig::Ollama {
//!     endpoint: "http://localhost:11434".into(),
//!     model: tailor_llm::DEFAULT_OLLAMA_MODEL.into(),
//! };
//! let client = ensure_llm_ready(&cfg).await?;
//! assert!(!client.model_name().is_empty());
//! # Ok(())
//! # }
//! ```
pub mod disabled;
pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;
use tailor_common::{LlmConfig, TailorError};
use traits::LlmClient;

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Build a ready-to-use client (probing the server and pulling models if needed).
pub async fn ensure_llm_ready(
    config: &LlmConfig,
) -> tailor_common::Result<Arc<dyn LlmClient>> {
    tracing::info!(provider = config.provider_name(), "llm.init");
    match config {
        #[cfg(feature = "ollama")]
        LlmConfig::Ollama { endpoint, model } => {
            let client = ollama::OllamaClient::new(endpoint.clone(), model.clone()).await?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "openai")]
        LlmConfig::Openai {
            model,
            auth_token,
            endpoint,
        } => {
            let client =
                openai::OpenAiClient::with_endpoint(auth_token.clone(), model.clone(), endpoint)?;
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(TailorError::Config("No LLM configured".to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(TailorError::Config("LLM provider not enabled".to_string())),
    }
}

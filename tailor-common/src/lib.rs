//! Common types and utilities shared across the Tailor crates.
//!
//! This crate defines the provider-agnostic LLM configuration, observability
//! helpers, and the shared error type used throughout the workspace. It stays
//! dependency-light so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`LlmConfig`]: which completion provider to talk to
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`TailorError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use tailor_common::LlmConfig;
//!
//! let cfg = LlmConfig::default();
//! assert!(matches!(cfg, LlmConfig::None));
//! assert_eq!(cfg.provider_name(), "none");
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Configuration for the completion provider used by the model fallbacks.
///
/// The enum is tagged by `provider` so it reads naturally from YAML:
///
/// ```yaml
/// llm:
///   provider: openai
///   model: gpt-4o-mini
///   auth_token: ${OPENAI_API_KEY}
/// ```
///
/// Feature flags control which variants are compiled in. See the
/// `tailor-llm` crate for the concrete clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    #[cfg(feature = "openai")]
    Openai {
        model: String,
        auth_token: String,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
    },
    #[cfg(feature = "ollama")]
    Ollama {
        model: String,
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
    },
    /// No provider; model fallbacks fail and the pipeline degrades to raw text.
    #[default]
    None,
}

impl LlmConfig {
    /// Short provider label used in logs.
    pub fn provider_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "openai")]
            LlmConfig::Openai { .. } => "openai",
            #[cfg(feature = "ollama")]
            LlmConfig::Ollama { .. } => "ollama",
            LlmConfig::None => "none",
        }
    }
}

#[cfg(feature = "openai")]
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}

#[cfg(feature = "ollama")]
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".into()
}

/// Error types used across the Tailor workspace.
#[derive(thiserror::Error, Debug)]
pub enum TailorError {
    /// A completion provider failed to answer a request.
    #[error("Provider error: {0}")]
    Provider(String),

    /// An unexpected failure bubbled up from a lower layer.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded its time budget.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`TailorError`].
pub type Result<T> = std::result::Result<T, TailorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_provider_section_defaults_to_none() {
        let cfg: LlmConfig = serde_json::from_str(r#"{"provider":"none"}"#).unwrap();
        assert_eq!(cfg, LlmConfig::None);
    }

    #[cfg(feature = "openai")]
    #[test]
    fn openai_endpoint_is_defaulted() {
        let cfg: LlmConfig = serde_json::from_str(
            r#"{"provider":"openai","model":"gpt-4o-mini","auth_token":"sk-test"}"#,
        )
        .unwrap();
        match cfg {
            LlmConfig::Openai { endpoint, .. } => assert_eq!(endpoint, "https://api.openai.com/v1"),
            other => panic!("unexpected config: {other:?}"),
        }
    }

    #[test]
    fn provider_error_message_is_readable() {
        let err = TailorError::Provider("quota exhausted".into());
        assert_eq!(err.to_string(), "Provider error: quota exhausted");
    }
}

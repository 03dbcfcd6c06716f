use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tailor_common::LlmConfig;
use tailor_common::observability::{LogConfig, LogFormat};
use tailor_config::{ExtractionSettings, LoggingSettings, TailorConfig};
use tailor_extract::{ExtractionLimits, ExtractionOrchestrator};
use tailor_llm::{disabled::DisabledClient, ensure_llm_ready, traits::LlmClient};
use tailor_store::{JobStore, MemoryJobStore, SqliteJobStore};

use crate::handlers::Handlers;

pub fn log_config(settings: &LoggingSettings) -> LogConfig {
    LogConfig {
        app_name: "tailor",
        log_dir: settings.dir.as_ref().map(PathBuf::from),
        emit_stderr: settings.stderr,
        format: LogFormat::parse(&settings.format),
        default_filter: settings.level.clone(),
    }
}

pub fn limits_from(settings: &ExtractionSettings) -> ExtractionLimits {
    let d = ExtractionLimits::default();
    ExtractionLimits {
        fetch_timeout: settings
            .fetch_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(d.fetch_timeout),
        fetch_max_bytes: settings.fetch_max_bytes.unwrap_or(d.fetch_max_bytes),
        min_text_chars: settings.min_text_chars.unwrap_or(d.min_text_chars),
        min_raw_html_chars: settings.min_raw_html_chars.unwrap_or(d.min_raw_html_chars),
        html_snippet_chars: settings.html_snippet_chars.unwrap_or(d.html_snippet_chars),
        model_text_threshold_chars: settings
            .model_text_threshold_chars
            .unwrap_or(d.model_text_threshold_chars),
        max_output_chars: settings.max_output_chars.unwrap_or(d.max_output_chars),
    }
}

/// A provider that is missing or fails to come up is replaced by
/// [`DisabledClient`]; extraction then runs on raw text only.
pub async fn build_llm_client(cfg: &LlmConfig) -> Arc<dyn LlmClient> {
    if matches!(cfg, LlmConfig::None) {
        tracing::info!("app.llm.disabled");
        return Arc::new(DisabledClient);
    }
    match ensure_llm_ready(cfg).await {
        Ok(client) => client,
        Err(err) => {
            tracing::warn!(provider = cfg.provider_name(), error = %err, "app.llm.unavailable");
            Arc::new(DisabledClient)
        }
    }
}

pub async fn build_store(database_url: Option<&str>) -> Result<Arc<dyn JobStore>> {
    match database_url {
        Some(url) => Ok(Arc::new(SqliteJobStore::connect(url).await?)),
        None => {
            tracing::info!("app.store.memory");
            Ok(Arc::new(MemoryJobStore::new()))
        }
    }
}

pub async fn build_from_config(cfg: &TailorConfig) -> Result<Handlers> {
    let llm = build_llm_client(&cfg.llm).await;
    let orchestrator = ExtractionOrchestrator::with_llm(llm, limits_from(&cfg.extraction))?;
    let store = build_store(cfg.store.database_url.as_deref()).await?;
    Ok(Handlers::new(orchestrator, store))
}

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

use tailor_common::observability::{LogConfig, LogFormat};
use tailor_common::TailorError;
use tailor_extract::{
    ExtractionLimits, ExtractionOrchestrator, FetchError, ModelExtractor, PageSource, RawPage,
};
use tailor_llm::traits::{LlmClient, LlmResponse};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "tailor-extract-tests",
            log_dir: Some(std::env::temp_dir().join("tailor-extract-tests")),
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "debug".to_string(),
        };
        tailor_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// One recorded completion request.
#[derive(Debug, Clone)]
pub struct Call {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Replies from a queue, one entry per call; an exhausted queue is a provider error.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, TailorError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedLlm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replying(replies: impl IntoIterator<Item = Result<String, TailorError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> tailor_common::Result<LlmResponse> {
        self.calls.lock().unwrap().push(Call {
            prompt: prompt.to_string(),
            system_prompt: system_prompt.map(str::to_string),
            max_tokens,
        });
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(LlmResponse::text(text)),
            Some(Err(err)) => Err(err),
            None => Err(TailorError::Provider("no scripted reply".into())),
        }
    }

    async fn health_check(&self) -> tailor_common::Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Serves one fixed body (or error) for every URL.
pub struct StaticPages {
    body: Result<String, FetchError>,
}

impl StaticPages {
    pub fn body(body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            body: Ok(body.into()),
        })
    }

    pub fn failing(err: FetchError) -> Arc<Self> {
        Arc::new(Self { body: Err(err) })
    }
}

#[async_trait]
impl PageSource for StaticPages {
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let body = self.body.clone()?;
        Ok(RawPage {
            url: url.to_string(),
            body,
            truncated: false,
        })
    }
}

pub fn orchestrator(pages: Arc<StaticPages>, llm: Arc<ScriptedLlm>) -> ExtractionOrchestrator {
    init_test_tracing();
    ExtractionOrchestrator::new(pages, ModelExtractor::new(llm), ExtractionLimits::default())
}

/// `<p>`-wrapped text whose normalized form is exactly `chars` characters.
pub fn paragraph_page(chars: usize) -> (String, String) {
    let text: String = "lorem ipsum dolor sit amet "
        .chars()
        .cycle()
        .take(chars)
        .collect();
    let text = text.trim().to_string();
    let padded = format!("{text}{}", "x".repeat(chars - text.chars().count()));
    (format!("<html><body><p>{padded}</p></body></html>"), padded)
}

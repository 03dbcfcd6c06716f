//! The ordered fallback chain from URL to job text.
use crate::error::ExtractionError;
use crate::fetch::{PageFetcher, PageSource, RawPage};
use crate::limits::ExtractionLimits;
use crate::model::ModelExtractor;
use crate::normalize::normalize;
use crate::text::{char_len, truncate_chars};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tailor_llm::traits::LlmClient;

/// Which path produced the returned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    DirectText,
    HtmlModelFallback,
    TextModelFallback,
    RawTextFallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provenance::DirectText => "direct-text",
            Provenance::HtmlModelFallback => "html-model-fallback",
            Provenance::TextModelFallback => "text-model-fallback",
            Provenance::RawTextFallback => "raw-text-fallback",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionOutcome {
    pub text: String,
    pub provenance: Provenance,
}

/// Content strategies, tried in declaration order until one yields usable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentStrategy {
    DirectText,
    HtmlModel,
}

impl ContentStrategy {
    const ORDER: [ContentStrategy; 2] = [ContentStrategy::DirectText, ContentStrategy::HtmlModel];
}

pub struct ExtractionOrchestrator {
    pages: Arc<dyn PageSource>,
    model: ModelExtractor,
    limits: ExtractionLimits,
}

impl ExtractionOrchestrator {
    pub fn new(pages: Arc<dyn PageSource>, model: ModelExtractor, limits: ExtractionLimits) -> Self {
        Self {
            pages,
            model,
            limits,
        }
    }

    /// Production wiring: a [`PageFetcher`] built from `limits` in front of `llm`.
    pub fn with_llm(
        llm: Arc<dyn LlmClient>,
        limits: ExtractionLimits,
    ) -> tailor_common::Result<Self> {
        let fetcher = PageFetcher::new(&limits)?;
        Ok(Self::new(Arc::new(fetcher), ModelExtractor::new(llm), limits))
    }

    pub fn limits(&self) -> &ExtractionLimits {
        &self.limits
    }

    pub async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        self.extract_outcome(url).await.map(|outcome| outcome.text)
    }

    /// Like [`extract`](Self::extract), also reporting which path produced the text.
    pub async fn extract_outcome(&self, url: &str) -> Result<ExtractionOutcome, ExtractionError> {
        let page = self.pages.fetch(url).await?;
        let normalized = normalize(&page.body);
        tracing::debug!(
            url = %page.url,
            raw_chars = char_len(&page.body),
            normalized_chars = char_len(&normalized),
            truncated = page.truncated,
            "extract.normalized"
        );

        let mut usable = None;
        for strategy in ContentStrategy::ORDER {
            if let Some(found) = self.try_content(strategy, &page, &normalized).await {
                usable = Some(found);
                break;
            }
        }
        let Some(usable) = usable else {
            tracing::info!(url = %page.url, "extract.insufficient_content");
            return Err(ExtractionError::InsufficientContent);
        };

        let outcome = self.route_by_size(usable).await;
        tracing::info!(
            url = %page.url,
            provenance = %outcome.provenance,
            chars = char_len(&outcome.text),
            "extract.done"
        );
        Ok(outcome)
    }

    async fn try_content(
        &self,
        strategy: ContentStrategy,
        page: &RawPage,
        normalized: &str,
    ) -> Option<ExtractionOutcome> {
        match strategy {
            ContentStrategy::DirectText => self.is_usable(normalized).then(|| ExtractionOutcome {
                text: normalized.to_string(),
                provenance: Provenance::DirectText,
            }),
            ContentStrategy::HtmlModel => self.html_model_fallback(page).await,
        }
    }

    async fn html_model_fallback(&self, page: &RawPage) -> Option<ExtractionOutcome> {
        // Measured before trimming.
        if char_len(&page.body) < self.limits.min_raw_html_chars {
            tracing::debug!(url = %page.url, "extract.html_fallback.skipped");
            return None;
        }

        let snippet = truncate_chars(page.body.trim(), self.limits.html_snippet_chars);
        let text = match self.model.extract_from_html(snippet).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(url = %page.url, error = %err, "extract.html_fallback.failed");
                return None;
            }
        };

        self.is_usable(&text).then_some(ExtractionOutcome {
            text,
            provenance: Provenance::HtmlModelFallback,
        })
    }

    fn is_usable(&self, text: &str) -> bool {
        !text.is_empty() && char_len(text) >= self.limits.min_text_chars
    }

    /// Long text goes through the text model; a model failure keeps the raw text.
    async fn route_by_size(&self, usable: ExtractionOutcome) -> ExtractionOutcome {
        let max = self.limits.max_output_chars;
        if char_len(&usable.text) <= self.limits.model_text_threshold_chars {
            return ExtractionOutcome {
                text: truncate_chars(&usable.text, max).to_string(),
                provenance: usable.provenance,
            };
        }

        match self.model.extract_from_text(&usable.text).await {
            Ok(text) => ExtractionOutcome {
                text: truncate_chars(&text, max).to_string(),
                provenance: Provenance::TextModelFallback,
            },
            Err(err) => {
                tracing::warn!(error = %err, "extract.text_fallback.failed");
                ExtractionOutcome {
                    text: truncate_chars(&usable.text, max).to_string(),
                    provenance: Provenance::RawTextFallback,
                }
            }
        }
    }
}

//! Model-assisted extraction.
//!
//! Two entry points over the same completion call, differing in prompt,
//! token budget and how they treat inputs and empty answers.
use crate::error::ModelError;
use crate::prompts::{
    DOCUMENT_SEPARATOR, EXTRACT_JOB_FROM_HTML_PROMPT, EXTRACT_JOB_FROM_PAGE_PROMPT,
    HTML_SYSTEM_PROMPT, NOT_FOUND_SENTINEL, PAGE_SYSTEM_PROMPT,
};
use crate::text::{char_len, truncate_chars};
use std::borrow::Cow;
use std::sync::Arc;
use tailor_llm::traits::LlmClient;

pub const HTML_MAX_TOKENS: u32 = 4096;
pub const TEXT_MAX_TOKENS: u32 = 8192;
pub const TEMPERATURE: f32 = 0.2;
/// Page text beyond this many characters is cut before submission.
pub const TEXT_INPUT_MAX_CHARS: usize = 30_000;
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";
/// Characters of input returned when the text model answers with nothing.
pub const EMPTY_ANSWER_FALLBACK_CHARS: usize = 8_000;

#[derive(Clone)]
pub struct ModelExtractor {
    llm: Arc<dyn LlmClient>,
}

impl ModelExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Pull a job description out of raw HTML (meta tags, embedded JSON, ...).
    ///
    /// The caller bounds the snippet size. Returns an empty string when the
    /// model finds nothing.
    ///
    /// Note: "nothing found" is a case-insensitive substring match on
    /// [`NOT_FOUND_SENTINEL`], so a posting that quotes the phrase verbatim is
    /// also reported as empty.
    pub async fn extract_from_html(&self, html_snippet: &str) -> Result<String, ModelError> {
        let prompt = format!("{EXTRACT_JOB_FROM_HTML_PROMPT}{DOCUMENT_SEPARATOR}{html_snippet}");
        let answer = self
            .complete(&prompt, HTML_SYSTEM_PROMPT, HTML_MAX_TOKENS)
            .await?;

        if answer.is_empty() || answer.to_lowercase().contains(NOT_FOUND_SENTINEL) {
            tracing::debug!(answer_chars = char_len(&answer), "extract.model.html_nothing_found");
            return Ok(String::new());
        }
        Ok(answer)
    }

    /// Narrow noisy page text down to the job posting.
    ///
    /// Never reports "nothing found": an empty answer falls back to the head
    /// of the (possibly truncated) input.
    pub async fn extract_from_text(&self, page_text: &str) -> Result<String, ModelError> {
        let input: Cow<'_, str> = if char_len(page_text) > TEXT_INPUT_MAX_CHARS {
            Cow::Owned(format!(
                "{}{TRUNCATION_MARKER}",
                truncate_chars(page_text, TEXT_INPUT_MAX_CHARS)
            ))
        } else {
            Cow::Borrowed(page_text)
        };

        let prompt = format!("{EXTRACT_JOB_FROM_PAGE_PROMPT}{DOCUMENT_SEPARATOR}{input}");
        let answer = self
            .complete(&prompt, PAGE_SYSTEM_PROMPT, TEXT_MAX_TOKENS)
            .await?;

        if answer.is_empty() {
            tracing::debug!("extract.model.text_empty_answer");
            return Ok(truncate_chars(&input, EMPTY_ANSWER_FALLBACK_CHARS).to_string());
        }
        Ok(answer)
    }

    async fn complete(
        &self,
        prompt: &str,
        system_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ModelError> {
        tracing::debug!(
            model = self.llm.model_name(),
            prompt_chars = char_len(prompt),
            max_tokens,
            "extract.model.request"
        );
        let response = self
            .llm
            .generate(
                prompt,
                Some(system_prompt),
                Some(max_tokens),
                Some(TEMPERATURE),
            )
            .await?;
        Ok(response.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tailor_common::TailorError;
    use tailor_llm::traits::LlmResponse;

    /// Answers every prompt with the same text and keeps the last request.
    struct FixedAnswer {
        answer: Option<&'static str>,
        last: Mutex<Option<(String, Option<String>, Option<u32>, Option<f32>)>>,
    }

    impl FixedAnswer {
        fn new(answer: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                last: Mutex::new(None),
            })
        }

        fn last_prompt(&self) -> String {
            self.last.lock().unwrap().as_ref().unwrap().0.clone()
        }
    }

    #[async_trait]
    impl LlmClient for FixedAnswer {
        async fn generate(
            &self,
            prompt: &str,
            system_prompt: Option<&str>,
            max_tokens: Option<u32>,
            temperature: Option<f32>,
        ) -> tailor_common::Result<LlmResponse> {
            *self.last.lock().unwrap() = Some((
                prompt.to_string(),
                system_prompt.map(str::to_string),
                max_tokens,
                temperature,
            ));
            match self.answer {
                Some(text) => Ok(LlmResponse::text(text)),
                None => Err(TailorError::Provider("quota exceeded".into())),
            }
        }

        async fn health_check(&self) -> tailor_common::Result<bool> {
            Ok(true)
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn html_answer_is_trimmed_and_request_is_shaped() {
        let llm = FixedAnswer::new(Some("  Rust Engineer at Ferris Inc.\n"));
        let extractor = ModelExtractor::new(llm.clone());

        let out = extractor.extract_from_html("<meta name=x>").await.unwrap();
        assert_eq!(out, "Rust Engineer at Ferris Inc.");

        let (prompt, system, max_tokens, temperature) =
            llm.last.lock().unwrap().clone().unwrap();
        assert!(prompt.starts_with(EXTRACT_JOB_FROM_HTML_PROMPT));
        assert!(prompt.ends_with("\n\n---\n\n<meta name=x>"));
        assert_eq!(system.as_deref(), Some(HTML_SYSTEM_PROMPT));
        assert_eq!(max_tokens, Some(4096));
        assert_eq!(temperature, Some(0.2));
    }

    #[tokio::test]
    async fn html_sentinel_means_nothing_found() {
        for answer in ["No job description found.", "Sorry: NO JOB DESCRIPTION FOUND", "   "] {
            let extractor = ModelExtractor::new(FixedAnswer::new(Some(answer)));
            assert_eq!(extractor.extract_from_html("<html/>").await.unwrap(), "");
        }
    }

    #[tokio::test]
    async fn text_input_is_truncated_with_marker() {
        let llm = FixedAnswer::new(Some("Job"));
        let extractor = ModelExtractor::new(llm.clone());
        let page = "é".repeat(TEXT_INPUT_MAX_CHARS + 10);

        extractor.extract_from_text(&page).await.unwrap();

        let prompt = llm.last_prompt();
        let document = prompt.split(DOCUMENT_SEPARATOR).nth(1).unwrap();
        assert!(document.ends_with("[Content truncated...]"));
        assert_eq!(char_len(document), TEXT_INPUT_MAX_CHARS + char_len(TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn short_text_input_is_sent_verbatim() {
        let llm = FixedAnswer::new(Some("Job"));
        let extractor = ModelExtractor::new(llm.clone());

        extractor.extract_from_text("short page").await.unwrap();

        let (prompt, system, max_tokens, _) = llm.last.lock().unwrap().clone().unwrap();
        assert!(prompt.ends_with("\n\n---\n\nshort page"));
        assert_eq!(system.as_deref(), Some(PAGE_SYSTEM_PROMPT));
        assert_eq!(max_tokens, Some(8192));
    }

    #[tokio::test]
    async fn empty_text_answer_falls_back_to_input_head() {
        let extractor = ModelExtractor::new(FixedAnswer::new(Some("\n")));
        let page = "x".repeat(20_000);

        let out = extractor.extract_from_text(&page).await.unwrap();
        assert_eq!(out, "x".repeat(EMPTY_ANSWER_FALLBACK_CHARS));
    }

    #[tokio::test]
    async fn text_sentinel_is_not_special() {
        let extractor =
            ModelExtractor::new(FixedAnswer::new(Some("No job description found")));
        assert_eq!(
            extractor.extract_from_text("page").await.unwrap(),
            "No job description found"
        );
    }

    #[tokio::test]
    async fn provider_failures_surface_as_model_errors() {
        let extractor = ModelExtractor::new(FixedAnswer::new(None));
        assert!(matches!(
            extractor.extract_from_html("<html/>").await,
            Err(ModelError::Completion(_))
        ));
        assert!(matches!(
            extractor.extract_from_text("page").await,
            Err(ModelError::Completion(_))
        ));
    }
}

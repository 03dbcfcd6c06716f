//! Request validation and response shaping for the CLI commands.
use serde::Serialize;
use std::sync::Arc;
use tailor_extract::ExtractionOrchestrator;
use tailor_extract::limits::MIN_TEXT_CHARS;
use tailor_store::{JobRecord, JobStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    /// Caller input or page content problem; the message is user-facing.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestEcho {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_descriptions: Option<Vec<String>>,
    pub resume_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobResponse {
    pub message: &'static str,
    pub job_id: Vec<String>,
    pub request: RequestEcho,
}

pub struct Handlers {
    orchestrator: ExtractionOrchestrator,
    store: Arc<dyn JobStore>,
}

impl Handlers {
    pub fn new(orchestrator: ExtractionOrchestrator, store: Arc<dyn JobStore>) -> Self {
        Self {
            orchestrator,
            store,
        }
    }

    pub async fn from_url(
        &self,
        url: &str,
        resume_id: Option<&str>,
    ) -> Result<JobResponse, HandlerError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(HandlerError::BadRequest("Job URL is required".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(HandlerError::BadRequest(
                "URL must start with http:// or https://".into(),
            ));
        }

        let text = self
            .orchestrator
            .extract(url)
            .await
            .map_err(|err| HandlerError::BadRequest(err.to_string()))?;
        if text.chars().count() < MIN_TEXT_CHARS {
            return Err(HandlerError::BadRequest(
                "Could not extract enough job description from the URL. Please paste the job description instead.".into(),
            ));
        }

        let record = self.store.create_job(&text, resume_id).await?;
        tracing::info!(job_id = %record.job_id, %url, "app.from_url.stored");
        Ok(JobResponse {
            message: "Job description extracted and stored",
            job_id: vec![record.job_id],
            request: RequestEcho {
                url: Some(url.to_string()),
                job_descriptions: None,
                resume_id: resume_id.map(str::to_string),
            },
        })
    }

    pub async fn upload(
        &self,
        job_descriptions: &[String],
        resume_id: Option<&str>,
    ) -> Result<JobResponse, HandlerError> {
        if job_descriptions.is_empty() {
            return Err(HandlerError::BadRequest("No job descriptions provided".into()));
        }
        if job_descriptions.iter().any(|jd| jd.trim().is_empty()) {
            return Err(HandlerError::BadRequest("Empty job description".into()));
        }

        let mut job_ids = Vec::with_capacity(job_descriptions.len());
        for jd in job_descriptions {
            let record = self.store.create_job(jd.trim(), resume_id).await?;
            job_ids.push(record.job_id);
        }
        tracing::info!(count = job_ids.len(), "app.upload.stored");

        Ok(JobResponse {
            message: "data successfully processed",
            job_id: job_ids,
            request: RequestEcho {
                url: None,
                job_descriptions: Some(job_descriptions.to_vec()),
                resume_id: resume_id.map(str::to_string),
            },
        })
    }

    pub async fn show(&self, job_id: &str) -> Result<JobRecord, HandlerError> {
        self.store
            .get_job(job_id)
            .await?
            .ok_or_else(|| HandlerError::NotFound("Job not found".into()))
    }
}

//! Persistence for extracted job descriptions.
//!
//! A job is an opaque id plus the final text and an optional link to a
//! resume. Ids are assigned here, never by callers.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryJobStore;
pub use sqlite::SqliteJobStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub job_id: String,
    pub content: String,
    pub resume_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    fn new(content: &str, resume_id: Option<&str>) -> Self {
        Self {
            job_id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            resume_id: resume_id.map(str::to_string),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt row {job_id}: {reason}")]
    Corrupt { job_id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create_job(&self, content: &str, resume_id: Option<&str>) -> Result<JobRecord>;

    async fn get_job(&self, job_id: &str) -> Result<Option<JobRecord>>;
}

use crate::{JobRecord, JobStore, Result, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

const CREATE_JOBS: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    job_id     TEXT PRIMARY KEY,
    content    TEXT NOT NULL,
    resume_id  TEXT NULL,
    created_at TEXT NOT NULL
)
"#;

pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    ///
    /// In-memory URLs get a single connection so every query sees the same
    /// database.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") || url.contains("mode=memory") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        tracing::info!(%url, max_connections, "store.sqlite.connected");
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_JOBS).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn create_job(&self, content: &str, resume_id: Option<&str>) -> Result<JobRecord> {
        let record = JobRecord::new(content, resume_id);
        sqlx::query(
            r#"
            INSERT INTO jobs (job_id, content, resume_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&record.job_id)
        .bind(&record.content)
        .bind(&record.resume_id)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        tracing::debug!(job_id = %record.job_id, chars = record.content.chars().count(), "store.sqlite.create_job");
        Ok(record)
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<JobRecord>> {
        let row = sqlx::query(
            "SELECT job_id, content, resume_id, created_at FROM jobs WHERE job_id = ?",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw_created: String = row.try_get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&raw_created)
            .map_err(|e| StoreError::Corrupt {
                job_id: job_id.to_string(),
                reason: format!("created_at: {e}"),
            })?
            .with_timezone(&Utc);

        Ok(Some(JobRecord {
            job_id: row.try_get("job_id")?,
            content: row.try_get("content")?,
            resume_id: row.try_get("resume_id")?,
            created_at,
        }))
    }
}

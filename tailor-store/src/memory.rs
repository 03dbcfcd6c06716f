use crate::{JobRecord, JobStore, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create_job(&self, content: &str, resume_id: Option<&str>) -> Result<JobRecord> {
        let record = JobRecord::new(content, resume_id);
        self.jobs
            .write()
            .await
            .insert(record.job_id.clone(), record.clone());
        tracing::debug!(job_id = %record.job_id, "store.memory.create_job");
        Ok(record)
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<JobRecord>> {
        Ok(self.jobs.read().await.get(job_id).cloned())
    }
}

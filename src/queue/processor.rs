use async_trait::async_trait;

use crate::models::job::JobRecord;

/// Failure raised by a job processor. The message lands in the job's
/// `last_error` field and the job travels the retry path.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ProcessorError(String);

impl ProcessorError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for ProcessorError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for ProcessorError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// A caller-supplied handler for one job type. Implementations receive a
/// snapshot of the job record and return their output as JSON.
///
/// Cancellation is cooperative: a long-running processor should
/// periodically re-fetch its job via `JobQueue::get_job` and stop early
/// when the status has flipped to `cancelled`. The engine never
/// preempts a running processor.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(&self, job: JobRecord) -> Result<serde_json::Value, ProcessorError>;
}

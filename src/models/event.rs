use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::JobId;

/// Lifecycle event kinds recorded in the rolling history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    Enqueued,
    Started,
    Completed,
    Failed,
    Retried,
    Cancelled,
    DeadLettered,
}

/// One entry in the append-only event history used for rolling-window
/// metrics (throughput, error rate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: JobEventKind,
    pub job_id: JobId,
}

impl JobEvent {
    pub fn now(kind: JobEventKind, job_id: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            job_id: job_id.to_string(),
        }
    }
}

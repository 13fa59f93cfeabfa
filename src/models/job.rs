use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::config::QueueConfig;

/// Identifier of a job. Derived from the job type, payload, and creation
/// time via a collision-resistant hash (see [`JobRecord::new`]).
pub type JobId = String;

/// Dispatch priority of a job. Immutable after creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Critical,
    High,
    Normal,
    Low,
}

impl JobPriority {
    /// All priorities in strict dispatch order.
    pub const DISPATCH_ORDER: [JobPriority; 4] = [
        JobPriority::Critical,
        JobPriority::High,
        JobPriority::Normal,
        JobPriority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::Critical => "critical",
            JobPriority::High => "high",
            JobPriority::Normal => "normal",
            JobPriority::Low => "low",
        }
    }
}

/// Status of a job in the queue lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Queued,
    Processing,
    Completed,
    Failed,
    Retrying,
    Cancelled,
    DeadLetter,
}

impl JobStatus {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled | JobStatus::DeadLetter
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Retrying => "retrying",
            JobStatus::Cancelled => "cancelled",
            JobStatus::DeadLetter => "dead_letter",
        }
    }
}

/// Ownership, provenance, and lifecycle bookkeeping for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetadata {
    pub workspace_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Earliest time the job becomes dispatch-eligible.
    pub scheduled_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub estimated_duration_ms: Option<u64>,
    pub actual_duration_ms: Option<u64>,
}

/// Caller-supplied options for `enqueue`.
#[derive(Debug, Clone, Default)]
pub struct EnqueueOptions {
    pub priority: Option<JobPriority>,
    pub workspace_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub source: Option<String>,
    pub max_attempts: Option<u32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub dependencies: Vec<JobId>,
    pub tags: Vec<String>,
    pub estimated_duration_ms: Option<u64>,
}

/// One unit of work and its lifecycle metadata. The engine's job map is
/// the source of truth for every field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub job_type: String,
    pub priority: JobPriority,
    pub status: JobStatus,
    pub payload: serde_json::Value,
    pub metadata: JobMetadata,
    /// Ids of jobs that must complete before this job is dispatched.
    #[serde(default)]
    pub dependencies: Vec<JobId>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Processor output, set on completion.
    pub result: Option<serde_json::Value>,
}

// Disambiguates jobs submitted within the same nanosecond with an
// identical type and payload.
static JOB_SEQ: AtomicU64 = AtomicU64::new(0);

fn generate_job_id(job_type: &str, payload: &serde_json::Value, created_at: DateTime<Utc>) -> JobId {
    let mut hasher = Sha256::new();
    hasher.update(job_type.as_bytes());
    hasher.update(payload.to_string().as_bytes());
    hasher.update(
        created_at
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    hasher.update(JOB_SEQ.fetch_add(1, Ordering::Relaxed).to_le_bytes());

    let digest = hasher.finalize();
    let mut id = String::with_capacity(32);
    for byte in digest.iter().take(16) {
        let _ = write!(id, "{byte:02x}");
    }
    id
}

impl JobRecord {
    /// Build a new job record. Status starts as `pending` when
    /// `scheduled_at` lies in the future, otherwise `queued`.
    pub fn new(
        job_type: &str,
        payload: serde_json::Value,
        opts: EnqueueOptions,
        config: &QueueConfig,
    ) -> Self {
        let now = Utc::now();
        let id = generate_job_id(job_type, &payload, now);

        let status = match opts.scheduled_at {
            Some(at) if at > now => JobStatus::Pending,
            _ => JobStatus::Queued,
        };

        Self {
            id,
            job_type: job_type.to_string(),
            priority: opts.priority.unwrap_or(config.default_priority),
            status,
            payload,
            metadata: JobMetadata {
                workspace_id: opts.workspace_id,
                user_id: opts.user_id,
                source: opts.source,
                created_at: now,
                updated_at: now,
                started_at: None,
                completed_at: None,
                scheduled_at: opts.scheduled_at,
                attempts: 0,
                max_attempts: opts.max_attempts.unwrap_or(config.retry.max_attempts),
                last_error: None,
                estimated_duration_ms: opts.estimated_duration_ms,
                actual_duration_ms: None,
            },
            dependencies: opts.dependencies,
            tags: opts.tags,
            result: None,
        }
    }

    /// Whether the job's scheduled time (if any) has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.metadata.scheduled_at.map(|at| at <= now).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_submissions_get_distinct_ids() {
        let config = QueueConfig::default();
        let payload = serde_json::json!({"doc": "report.pdf"});

        let a = JobRecord::new("pdf_extraction", payload.clone(), EnqueueOptions::default(), &config);
        let b = JobRecord::new("pdf_extraction", payload, EnqueueOptions::default(), &config);

        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 32);
    }

    #[test]
    fn future_schedule_starts_pending() {
        let config = QueueConfig::default();
        let opts = EnqueueOptions {
            scheduled_at: Some(Utc::now() + chrono::Duration::minutes(5)),
            ..Default::default()
        };
        let job = JobRecord::new("embedding", serde_json::json!({}), opts, &config);
        assert_eq!(job.status, JobStatus::Pending);

        let past = EnqueueOptions {
            scheduled_at: Some(Utc::now() - chrono::Duration::minutes(5)),
            ..Default::default()
        };
        let job = JobRecord::new("embedding", serde_json::json!({}), past, &config);
        assert_eq!(job.status, JobStatus::Queued);
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::DeadLetter.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Retrying.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }
}

//! Shared test helpers: fast engine configs and instrumented processors.
#![allow(dead_code)]

use async_trait::async_trait;
use batch_queue::config::{QueueConfig, RetryPolicyConfig};
use batch_queue::models::job::{JobRecord, JobStatus};
use batch_queue::queue::{JobProcessor, JobQueue, ProcessorError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Engine config with tight timers so tests run in milliseconds.
pub fn fast_config() -> QueueConfig {
    QueueConfig {
        tick_interval_ms: 10,
        retry: RetryPolicyConfig {
            max_attempts: 3,
            base_delay_ms: 20,
            max_delay_ms: 200,
            backoff_multiplier: 2.0,
            jitter_enabled: false,
        },
        ..QueueConfig::default()
    }
}

/// Poll until a job reaches `status` or the timeout elapses.
pub async fn wait_for_status(
    queue: &JobQueue,
    job_id: &str,
    status: JobStatus,
    timeout: Duration,
) -> JobRecord {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(job) = queue.get_job(job_id).await {
            if job.status == status {
                return job;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for job {job_id} to reach {status:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Records dispatch order, then succeeds after a fixed delay.
pub struct RecordingProcessor {
    pub order: Arc<Mutex<Vec<String>>>,
    pub delay: Duration,
}

impl RecordingProcessor {
    pub fn new(delay: Duration) -> (Arc<Self>, Arc<Mutex<Vec<String>>>) {
        let order = Arc::new(Mutex::new(Vec::new()));
        (
            Arc::new(Self {
                order: Arc::clone(&order),
                delay,
            }),
            order,
        )
    }
}

#[async_trait]
impl JobProcessor for RecordingProcessor {
    async fn process(&self, job: JobRecord) -> Result<serde_json::Value, ProcessorError> {
        self.order.lock().unwrap().push(job.id.clone());
        tokio::time::sleep(self.delay).await;
        Ok(serde_json::json!({"ok": true}))
    }
}

/// Fails every invocation, counting calls.
pub struct FailingProcessor {
    pub calls: Arc<AtomicUsize>,
}

impl FailingProcessor {
    pub fn new() -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Self {
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }
}

#[async_trait]
impl JobProcessor for FailingProcessor {
    async fn process(&self, _job: JobRecord) -> Result<serde_json::Value, ProcessorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProcessorError::msg("boom"))
    }
}

/// Fails while the flag is set, succeeds once it is cleared.
pub struct FlakyProcessor {
    pub failing: Arc<AtomicBool>,
}

impl FlakyProcessor {
    pub fn new() -> (Arc<Self>, Arc<AtomicBool>) {
        let failing = Arc::new(AtomicBool::new(true));
        (
            Arc::new(Self {
                failing: Arc::clone(&failing),
            }),
            failing,
        )
    }
}

#[async_trait]
impl JobProcessor for FlakyProcessor {
    async fn process(&self, _job: JobRecord) -> Result<serde_json::Value, ProcessorError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ProcessorError::msg("transient failure"))
        } else {
            Ok(serde_json::json!({"recovered": true}))
        }
    }
}

/// Tracks the high-water mark of concurrent invocations.
pub struct ConcurrencyProbe {
    current: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
    delay: Duration,
}

impl ConcurrencyProbe {
    pub fn new(delay: Duration) -> (Arc<Self>, Arc<AtomicUsize>) {
        let peak = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Self {
                current: Arc::new(AtomicUsize::new(0)),
                peak: Arc::clone(&peak),
                delay,
            }),
            peak,
        )
    }
}

#[async_trait]
impl JobProcessor for ConcurrencyProbe {
    async fn process(&self, _job: JobRecord) -> Result<serde_json::Value, ProcessorError> {
        let running = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(serde_json::json!({}))
    }
}

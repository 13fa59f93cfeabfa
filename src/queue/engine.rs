use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::QueueConfig;
use crate::db::job_store::{JobStore, StoreError};
use crate::models::event::JobEventKind;
use crate::models::job::{EnqueueOptions, JobId, JobPriority, JobRecord, JobStatus};
use crate::queue::dead_letter::DeadLetterStore;
use crate::queue::dependency::dependencies_satisfied;
use crate::queue::metrics::{compute_metrics, EventHistory, QueueMetrics};
use crate::queue::processor::{JobProcessor, ProcessorError};
use crate::queue::retry::retry_delay;

/// Per-priority queue depths plus headline counts.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatus {
    pub depth_by_priority: HashMap<String, usize>,
    pub in_flight: usize,
    pub dead_letter: usize,
    pub total_jobs: usize,
}

/// Outcome of a drain-on-shutdown. Jobs still running past the timeout
/// are reported, never force-terminated.
#[derive(Debug, Clone)]
pub struct DrainReport {
    pub clean: bool,
    pub still_running: Vec<JobId>,
}

/// Results and retry timers are delivered to the scheduler task over a
/// channel so that all state mutation stays single-writer.
enum EngineEvent {
    Finished {
        job_id: JobId,
        outcome: Result<serde_json::Value, ProcessorError>,
    },
    RetryDue {
        job_id: JobId,
    },
}

struct QueueState {
    jobs: HashMap<JobId, JobRecord>,
    ready: HashMap<JobPriority, VecDeque<JobId>>,
    dead_letter: DeadLetterStore,
    history: EventHistory,
    in_flight: HashSet<JobId>,
    draining: bool,
}

impl QueueState {
    fn new(config: &QueueConfig) -> Self {
        let ready = JobPriority::DISPATCH_ORDER
            .iter()
            .map(|p| (*p, VecDeque::new()))
            .collect();
        Self {
            jobs: HashMap::new(),
            ready,
            dead_letter: DeadLetterStore::new(config.dead_letter_capacity),
            history: EventHistory::new(config.event_history_limit),
            in_flight: HashSet::new(),
            draining: false,
        }
    }

    fn push_ready(&mut self, priority: JobPriority, job_id: JobId) {
        if let Some(list) = self.ready.get_mut(&priority) {
            list.push_back(job_id);
        }
    }

    fn ready_depth(&self) -> usize {
        self.ready.values().map(|q| q.len()).sum()
    }
}

/// In-process asynchronous batch job queue.
///
/// One periodic tick owns every scheduling decision; processors run as
/// spawned tasks and report back over a channel. Construct with
/// [`JobQueue::new`] (memory only) or [`JobQueue::with_store`]
/// (periodic snapshots plus startup recovery), register processors,
/// then call [`JobQueue::start`]. The handle is cheap to clone and all
/// clones share one engine.
#[derive(Clone)]
pub struct JobQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    config: QueueConfig,
    state: RwLock<QueueState>,
    processors: RwLock<HashMap<String, Arc<dyn JobProcessor>>>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<EngineEvent>>>,
    store: Option<Arc<dyn JobStore>>,
    shutdown_tx: watch::Sender<bool>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl JobQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self::build(config, None)
    }

    pub fn with_store(config: QueueConfig, store: Arc<dyn JobStore>) -> Self {
        Self::build(config, Some(store))
    }

    fn build(config: QueueConfig, store: Option<Arc<dyn JobStore>>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(QueueInner {
                state: RwLock::new(QueueState::new(&config)),
                config,
                processors: RwLock::new(HashMap::new()),
                events_tx,
                events_rx: Mutex::new(Some(events_rx)),
                store,
                shutdown_tx,
                scheduler: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    /// Associate a processor with a job type. At most one processor per
    /// type; re-registration is an error.
    pub async fn register_processor(
        &self,
        job_type: &str,
        processor: Arc<dyn JobProcessor>,
    ) -> Result<(), QueueError> {
        let mut processors = self.inner.processors.write().await;
        if processors.contains_key(job_type) {
            return Err(QueueError::DuplicateProcessor(job_type.to_string()));
        }
        processors.insert(job_type.to_string(), processor);
        Ok(())
    }

    /// Submit a job. Returns its id, or `QueueError::QueueFull` when the
    /// live job count is at the configured ceiling.
    pub async fn enqueue(
        &self,
        job_type: &str,
        payload: serde_json::Value,
        opts: EnqueueOptions,
    ) -> Result<JobId, QueueError> {
        self.inner.enqueue(job_type, payload, opts).await
    }

    pub async fn get_job(&self, job_id: &str) -> Option<JobRecord> {
        self.inner.state.read().await.jobs.get(job_id).cloned()
    }

    pub async fn jobs_by_status(&self, status: JobStatus) -> Vec<JobRecord> {
        self.inner
            .state
            .read()
            .await
            .jobs
            .values()
            .filter(|j| j.status == status)
            .cloned()
            .collect()
    }

    pub async fn jobs_by_workspace(&self, workspace_id: uuid::Uuid) -> Vec<JobRecord> {
        self.inner
            .state
            .read()
            .await
            .jobs
            .values()
            .filter(|j| j.metadata.workspace_id == Some(workspace_id))
            .cloned()
            .collect()
    }

    pub async fn queue_status(&self) -> QueueStatus {
        let state = self.inner.state.read().await;
        QueueStatus {
            depth_by_priority: JobPriority::DISPATCH_ORDER
                .iter()
                .map(|p| {
                    let depth = state.ready.get(p).map(|q| q.len()).unwrap_or(0);
                    (p.as_str().to_string(), depth)
                })
                .collect(),
            in_flight: state.in_flight.len(),
            dead_letter: state.dead_letter.len(),
            total_jobs: state.jobs.len(),
        }
    }

    pub async fn metrics_snapshot(&self) -> QueueMetrics {
        let state = self.inner.state.read().await;
        compute_metrics(
            &state.jobs,
            &state.ready,
            state.in_flight.len(),
            state.dead_letter.len(),
            &state.history,
        )
    }

    pub async fn dead_letter_jobs(&self) -> Vec<JobRecord> {
        let state = self.inner.state.read().await;
        state
            .dead_letter
            .ids()
            .filter_map(|id| state.jobs.get(id))
            .cloned()
            .collect()
    }

    /// Cancel a job. Queued and pending jobs are cancelled synchronously;
    /// a processing job only gets its status flipped — the running
    /// processor is expected to notice and stop cooperatively. Returns
    /// `false` for unknown ids and jobs already in a terminal state.
    pub async fn cancel(&self, job_id: &str) -> bool {
        self.inner.cancel(job_id).await
    }

    /// Delete terminal jobs (`completed`/`failed`/`cancelled`) whose
    /// `updated_at` is older than `max_age`. Returns the count removed.
    pub async fn cleanup(&self, max_age: chrono::Duration) -> usize {
        self.inner.cleanup(max_age).await
    }

    /// Re-queue a dead-lettered job with a fresh attempt budget.
    pub async fn retry_dead_letter(&self, job_id: &str) -> Result<(), QueueError> {
        self.inner.retry_dead_letter(job_id).await
    }

    /// Load recoverable jobs from the store: everything whose persisted
    /// status is `pending`, `queued`, `processing`, or `retrying`.
    /// Previously-`processing` jobs are reset to `queued` (in-flight work
    /// from a dead process is assumed lost); `retrying` jobs get their
    /// backoff timer re-armed. Returns the number of jobs restored.
    pub async fn recover(&self) -> Result<usize, QueueError> {
        self.inner.recover().await
    }

    /// Spawn the scheduler task. Idempotent; later calls are no-ops.
    pub async fn start(&self) {
        let Some(mut events_rx) = self.inner.events_rx.lock().await.take() else {
            return;
        };

        let engine = Arc::clone(&self.inner);
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            let mut tick =
                tokio::time::interval(Duration::from_millis(engine.config.tick_interval_ms.max(1)));
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut persist = tokio::time::interval(Duration::from_millis(
                engine.config.persistence_interval_ms.max(1),
            ));
            persist.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let persistence_active = engine.config.persistence_enabled && engine.store.is_some();

            loop {
                tokio::select! {
                    _ = tick.tick() => engine.run_tick().await,
                    Some(event) = events_rx.recv() => engine.apply_event(event).await,
                    _ = persist.tick(), if persistence_active => engine.persist_snapshot().await,
                    _ = shutdown_rx.changed() => break,
                }
            }

            // Apply results that raced with the stop signal.
            while let Ok(event) = events_rx.try_recv() {
                engine.apply_event(event).await;
            }
            if persistence_active {
                engine.persist_snapshot().await;
            }
        });

        *self.inner.scheduler.lock().await = Some(handle);
        tracing::info!(
            max_concurrency = self.inner.config.max_concurrency,
            tick_interval_ms = self.inner.config.tick_interval_ms,
            "job queue started"
        );
    }

    /// Stop admitting dispatches and wait up to `timeout` for in-flight
    /// jobs to finish. Jobs still running past the timeout are reported
    /// in the [`DrainReport`], not force-terminated.
    pub async fn shutdown(&self, timeout: Duration) -> DrainReport {
        self.inner.state.write().await.draining = true;
        tracing::info!(timeout_ms = timeout.as_millis() as u64, "job queue draining");

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.inner.state.read().await.in_flight.is_empty() {
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let _ = self.inner.shutdown_tx.send(true);
        if let Some(handle) = self.inner.scheduler.lock().await.take() {
            let _ = handle.await;
        }

        let still_running: Vec<JobId> = {
            let state = self.inner.state.read().await;
            state.in_flight.iter().cloned().collect()
        };
        if !still_running.is_empty() {
            tracing::warn!(
                in_flight = still_running.len(),
                "shutdown timeout elapsed with jobs still running"
            );
        }
        DrainReport {
            clean: still_running.is_empty(),
            still_running,
        }
    }
}

impl QueueInner {
    async fn enqueue(
        &self,
        job_type: &str,
        payload: serde_json::Value,
        opts: EnqueueOptions,
    ) -> Result<JobId, QueueError> {
        let mut state = self.state.write().await;
        if state.jobs.len() >= self.config.max_size {
            return Err(QueueError::QueueFull {
                max: self.config.max_size,
            });
        }

        let job = JobRecord::new(job_type, payload, opts, &self.config);
        let job_id = job.id.clone();
        let priority = job.priority;

        if job.status == JobStatus::Queued {
            state.push_ready(priority, job_id.clone());
        }
        state.history.record(JobEventKind::Enqueued, &job_id);
        state.jobs.insert(job_id.clone(), job);

        if self.config.metrics_enabled {
            metrics::counter!("batch_queue_jobs_enqueued_total").increment(1);
        }
        tracing::debug!(
            job_id = %job_id,
            job_type = %job_type,
            priority = priority.as_str(),
            "job enqueued"
        );
        Ok(job_id)
    }

    async fn cancel(&self, job_id: &str) -> bool {
        let mut state = self.state.write().await;

        let (status, priority) = match state.jobs.get(job_id) {
            Some(job) => (job.status, job.priority),
            None => return false,
        };
        if status.is_terminal() {
            return false;
        }

        if status == JobStatus::Queued {
            if let Some(list) = state.ready.get_mut(&priority) {
                list.retain(|id| id != job_id);
            }
        }
        if let Some(job) = state.jobs.get_mut(job_id) {
            job.status = JobStatus::Cancelled;
            job.metadata.updated_at = Utc::now();
        }
        state.history.record(JobEventKind::Cancelled, job_id);

        tracing::info!(job_id = %job_id, previous_status = status.as_str(), "job cancelled");
        true
    }

    async fn cleanup(&self, max_age: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let expired: Vec<JobId> = {
            let mut state = self.state.write().await;
            let expired: Vec<JobId> = state
                .jobs
                .values()
                .filter(|j| {
                    matches!(
                        j.status,
                        JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
                    ) && j.metadata.updated_at < cutoff
                })
                .map(|j| j.id.clone())
                .collect();
            for id in &expired {
                state.jobs.remove(id);
            }
            expired
        };

        if !expired.is_empty() {
            if let Some(store) = &self.store {
                if let Err(error) = store.delete_jobs(&expired).await {
                    tracing::warn!(error = %error, "cleanup: failed to delete persisted jobs");
                }
            }
            tracing::info!(removed = expired.len(), "cleanup sweep removed terminal jobs");
        }
        expired.len()
    }

    async fn retry_dead_letter(&self, job_id: &str) -> Result<(), QueueError> {
        let mut state = self.state.write().await;

        let priority = match state.jobs.get(job_id) {
            None => return Err(QueueError::UnknownJob(job_id.to_string())),
            Some(job) if job.status != JobStatus::DeadLetter => {
                return Err(QueueError::NotDeadLetter(job_id.to_string()))
            }
            Some(job) => job.priority,
        };

        state.dead_letter.remove(job_id);
        if let Some(job) = state.jobs.get_mut(job_id) {
            job.status = JobStatus::Queued;
            job.metadata.attempts = 0;
            job.metadata.last_error = None;
            job.metadata.updated_at = Utc::now();
        }
        state.push_ready(priority, job_id.to_string());
        state.history.record(JobEventKind::Retried, job_id);

        tracing::info!(job_id = %job_id, "dead-lettered job re-queued");
        Ok(())
    }

    async fn recover(&self) -> Result<usize, QueueError> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let mut records = store.load_recoverable().await?;
        records.sort_by_key(|j| j.metadata.created_at);

        let mut state = self.state.write().await;
        let mut restored = 0usize;
        for mut job in records {
            if state.jobs.contains_key(&job.id) {
                continue;
            }
            if job.status == JobStatus::Processing {
                job.status = JobStatus::Queued;
                job.metadata.started_at = None;
                job.metadata.updated_at = Utc::now();
            }

            match job.status {
                JobStatus::Queued => state.push_ready(job.priority, job.id.clone()),
                JobStatus::Retrying => {
                    self.arm_retry_timer(&job.id, retry_delay(job.metadata.attempts, &self.config.retry));
                }
                // Pending jobs wait for the promotion pass.
                _ => {}
            }
            state.jobs.insert(job.id.clone(), job);
            restored += 1;
        }

        tracing::info!(restored, "recovered persisted jobs");
        Ok(restored)
    }

    // One pass of the scheduling loop: promote due scheduled jobs, then
    // dispatch while a concurrency slot is free.
    async fn run_tick(&self) {
        let mut to_launch: Vec<JobRecord> = Vec::new();
        {
            let mut state = self.state.write().await;
            if state.draining {
                return;
            }

            Self::promote_due_jobs(&mut state);

            while state.in_flight.len() < self.config.max_concurrency {
                let Some(job_id) = Self::select_next(&mut state) else {
                    break;
                };
                let Some(job) = state.jobs.get_mut(&job_id) else {
                    continue;
                };

                let now = Utc::now();
                job.status = JobStatus::Processing;
                job.metadata.started_at = Some(now);
                job.metadata.updated_at = now;
                job.metadata.attempts += 1;
                let snapshot = job.clone();

                state.in_flight.insert(job_id.clone());
                state.history.record(JobEventKind::Started, &job_id);
                to_launch.push(snapshot);
            }

            if self.config.metrics_enabled {
                metrics::gauge!("batch_queue_depth").set(state.ready_depth() as f64);
                metrics::gauge!("batch_queue_in_flight").set(state.in_flight.len() as f64);
            }
        }

        for job in to_launch {
            self.launch(job).await;
        }
    }

    // Move every due pending job to its priority list, ordered by
    // ascending scheduled time with creation-order tie-breaks.
    fn promote_due_jobs(state: &mut QueueState) {
        let now = Utc::now();
        let mut due: Vec<(DateTime<Utc>, DateTime<Utc>, JobId, JobPriority)> = state
            .jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending && j.is_due(now))
            .map(|j| {
                (
                    j.metadata.scheduled_at.unwrap_or(j.metadata.created_at),
                    j.metadata.created_at,
                    j.id.clone(),
                    j.priority,
                )
            })
            .collect();
        due.sort_by_key(|(scheduled, created, _, _)| (*scheduled, *created));

        for (_, _, job_id, priority) in due {
            if let Some(job) = state.jobs.get_mut(&job_id) {
                job.status = JobStatus::Queued;
                job.metadata.updated_at = now;
            }
            state.push_ready(priority, job_id.clone());
            tracing::debug!(job_id = %job_id, "scheduled job promoted to queue");
        }
    }

    // Highest-priority eligible job id, strict FIFO within a priority.
    // Only the head of each list is considered: a blocked head skips the
    // whole list for this tick rather than scanning deeper (priority over
    // fairness, and no unbounded head-of-line scans). Stale ids (jobs no
    // longer `queued`) are dropped as they surface.
    fn select_next(state: &mut QueueState) -> Option<JobId> {
        for priority in JobPriority::DISPATCH_ORDER {
            let Some(list) = state.ready.get_mut(&priority) else {
                continue;
            };
            loop {
                let Some(head) = list.front() else {
                    break;
                };
                match state.jobs.get(head) {
                    None => {
                        list.pop_front();
                    }
                    Some(job) if job.status != JobStatus::Queued => {
                        list.pop_front();
                    }
                    Some(job) => {
                        if dependencies_satisfied(job, &state.jobs) {
                            return list.pop_front();
                        }
                        break;
                    }
                }
            }
        }
        None
    }

    // Hand a dispatched job to its processor without blocking the tick.
    // A missing processor is routed through the normal failure path and
    // counts as an attempt.
    async fn launch(&self, job: JobRecord) {
        let processor = self.processors.read().await.get(&job.job_type).cloned();
        let job_id = job.id.clone();

        match processor {
            None => {
                let error =
                    ProcessorError::msg(format!("no processor registered for type '{}'", job.job_type));
                let _ = self.events_tx.send(EngineEvent::Finished {
                    job_id,
                    outcome: Err(error),
                });
            }
            Some(processor) => {
                let events_tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = processor.process(job).await;
                    let _ = events_tx.send(EngineEvent::Finished { job_id, outcome });
                });
            }
        }
    }

    async fn apply_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Finished { job_id, outcome } => match outcome {
                Ok(result) => self.complete_job(&job_id, result).await,
                Err(error) => self.fail_job(&job_id, &error.to_string()).await,
            },
            EngineEvent::RetryDue { job_id } => self.requeue_after_retry(&job_id).await,
        }
    }

    async fn complete_job(&self, job_id: &str, result: serde_json::Value) {
        let mut state = self.state.write().await;
        state.in_flight.remove(job_id);

        let Some(job) = state.jobs.get_mut(job_id) else {
            return;
        };
        if job.status != JobStatus::Processing {
            // Cancelled mid-flight; the terminal status stands.
            tracing::debug!(job_id = %job_id, status = job.status.as_str(), "late result discarded");
            return;
        }

        let now = Utc::now();
        let duration_ms = job
            .metadata
            .started_at
            .map(|s| (now - s).num_milliseconds().max(0) as u64);
        job.status = JobStatus::Completed;
        job.metadata.completed_at = Some(now);
        job.metadata.updated_at = now;
        job.metadata.actual_duration_ms = duration_ms;
        job.result = Some(result);

        state.history.record(JobEventKind::Completed, job_id);
        if self.config.metrics_enabled {
            metrics::counter!("batch_queue_jobs_completed_total").increment(1);
            if let Some(ms) = duration_ms {
                metrics::histogram!("batch_queue_job_duration_seconds").record(ms as f64 / 1_000.0);
            }
        }
        tracing::info!(
            job_id = %job_id,
            duration_ms = duration_ms.unwrap_or(0),
            "job completed"
        );
    }

    async fn fail_job(&self, job_id: &str, error: &str) {
        let mut state = self.state.write().await;
        state.in_flight.remove(job_id);

        let (attempts, max_attempts) = {
            let Some(job) = state.jobs.get_mut(job_id) else {
                return;
            };
            if job.status != JobStatus::Processing {
                tracing::debug!(job_id = %job_id, status = job.status.as_str(), "late failure discarded");
                return;
            }
            job.metadata.last_error = Some(error.to_string());
            job.metadata.updated_at = Utc::now();
            (job.metadata.attempts, job.metadata.max_attempts)
        };

        if self.config.metrics_enabled {
            metrics::counter!("batch_queue_jobs_failed_total").increment(1);
        }

        if attempts >= max_attempts {
            if self.config.dead_letter_enabled {
                if let Some(job) = state.jobs.get_mut(job_id) {
                    job.status = JobStatus::DeadLetter;
                }
                state.history.record(JobEventKind::DeadLettered, job_id);
                if let Some(evicted) = state.dead_letter.push(job_id.to_string()) {
                    state.jobs.remove(&evicted);
                    tracing::debug!(job_id = %evicted, "dead-letter store full, oldest entry evicted");
                }
                if self.config.metrics_enabled {
                    metrics::counter!("batch_queue_jobs_dead_lettered_total").increment(1);
                }
                tracing::warn!(
                    job_id = %job_id,
                    attempts,
                    error = %error,
                    "job exhausted retries, moved to dead-letter"
                );
            } else {
                if let Some(job) = state.jobs.get_mut(job_id) {
                    job.status = JobStatus::Failed;
                }
                state.history.record(JobEventKind::Failed, job_id);
                tracing::warn!(job_id = %job_id, attempts, error = %error, "job failed permanently");
            }
            return;
        }

        if let Some(job) = state.jobs.get_mut(job_id) {
            job.status = JobStatus::Retrying;
        }
        state.history.record(JobEventKind::Failed, job_id);

        let delay = retry_delay(attempts, &self.config.retry);
        self.arm_retry_timer(job_id, delay);
        tracing::info!(
            job_id = %job_id,
            attempts,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "job failed, retry scheduled"
        );
    }

    fn arm_retry_timer(&self, job_id: &str, delay: Duration) {
        let events_tx = self.events_tx.clone();
        let job_id = job_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events_tx.send(EngineEvent::RetryDue { job_id });
        });
    }

    async fn requeue_after_retry(&self, job_id: &str) {
        let mut state = self.state.write().await;

        let priority = match state.jobs.get(job_id) {
            // Cancelled (or otherwise moved on) while the timer ran.
            Some(job) if job.status != JobStatus::Retrying => return,
            Some(job) => job.priority,
            None => return,
        };

        if let Some(job) = state.jobs.get_mut(job_id) {
            job.status = JobStatus::Queued;
            job.metadata.updated_at = Utc::now();
        }
        state.push_ready(priority, job_id.to_string());
        state.history.record(JobEventKind::Retried, job_id);
        tracing::debug!(job_id = %job_id, "retry delay elapsed, job re-queued");
    }

    // Best-effort snapshot of every live job. Store failures are logged
    // and never affect the in-memory queue.
    async fn persist_snapshot(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let jobs: Vec<JobRecord> = {
            let state = self.state.read().await;
            state.jobs.values().cloned().collect()
        };
        if jobs.is_empty() {
            return;
        }
        if let Err(error) = store.upsert_jobs(&jobs).await {
            tracing::warn!(error = %error, jobs = jobs.len(), "job snapshot write failed");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue is full (max: {max})")]
    QueueFull { max: usize },

    #[error("processor already registered for job type '{0}'")]
    DuplicateProcessor(String),

    #[error("unknown job: {0}")]
    UnknownJob(String),

    #[error("job {0} is not in the dead-letter store")]
    NotDeadLetter(String),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),
}

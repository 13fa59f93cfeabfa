use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

use crate::models::event::{JobEvent, JobEventKind};
use crate::models::job::{JobId, JobPriority, JobRecord, JobStatus};

/// Size-capped, append-only log of lifecycle events.
#[derive(Debug)]
pub struct EventHistory {
    events: VecDeque<JobEvent>,
    limit: usize,
}

impl EventHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            events: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn record(&mut self, kind: JobEventKind, job_id: &str) {
        self.events.push_back(JobEvent::now(kind, job_id));
        if self.events.len() > self.limit {
            self.events.pop_front();
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &JobEvent> {
        self.events.iter()
    }
}

/// Point-in-time statistics derived from the live job set and the
/// rolling event history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueMetrics {
    pub jobs_by_status: HashMap<String, usize>,
    pub depth_by_priority: HashMap<String, usize>,
    pub in_flight: usize,
    pub dead_letter: usize,
    pub total_jobs: usize,
    /// Mean wall-clock duration of completed jobs, in milliseconds.
    pub avg_duration_ms: f64,
    /// Completions observed in the last 60 seconds.
    pub throughput_last_minute: usize,
    /// dead-lettered / (dead-lettered + completed) over the last 60
    /// seconds; 0.0 when the window is empty.
    pub error_rate_last_minute: f64,
}

pub fn compute_metrics(
    jobs: &HashMap<JobId, JobRecord>,
    ready: &HashMap<JobPriority, VecDeque<JobId>>,
    in_flight: usize,
    dead_letter: usize,
    history: &EventHistory,
) -> QueueMetrics {
    let mut jobs_by_status: HashMap<String, usize> = HashMap::new();
    let mut duration_total_ms = 0u64;
    let mut duration_count = 0u64;

    for job in jobs.values() {
        *jobs_by_status.entry(job.status.as_str().to_string()).or_default() += 1;
        if job.status == JobStatus::Completed {
            if let Some(ms) = job.metadata.actual_duration_ms {
                duration_total_ms += ms;
                duration_count += 1;
            }
        }
    }

    let depth_by_priority = JobPriority::DISPATCH_ORDER
        .iter()
        .map(|p| {
            let depth = ready.get(p).map(|q| q.len()).unwrap_or(0);
            (p.as_str().to_string(), depth)
        })
        .collect();

    let window_start = Utc::now() - Duration::seconds(60);
    let mut completed_in_window = 0usize;
    let mut dead_lettered_in_window = 0usize;
    for event in history.events() {
        if event.timestamp < window_start {
            continue;
        }
        match event.kind {
            JobEventKind::Completed => completed_in_window += 1,
            JobEventKind::DeadLettered => dead_lettered_in_window += 1,
            _ => {}
        }
    }

    let window_total = completed_in_window + dead_lettered_in_window;
    let error_rate = if window_total == 0 {
        0.0
    } else {
        dead_lettered_in_window as f64 / window_total as f64
    };

    QueueMetrics {
        jobs_by_status,
        depth_by_priority,
        in_flight,
        dead_letter,
        total_jobs: jobs.len(),
        avg_duration_ms: if duration_count == 0 {
            0.0
        } else {
            duration_total_ms as f64 / duration_count as f64
        },
        throughput_last_minute: completed_in_window,
        error_rate_last_minute: error_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_capped() {
        let mut history = EventHistory::new(3);
        for i in 0..5 {
            history.record(JobEventKind::Enqueued, &format!("job-{i}"));
        }
        let ids: Vec<_> = history.events().map(|e| e.job_id.clone()).collect();
        assert_eq!(ids, vec!["job-2", "job-3", "job-4"]);
    }

    #[test]
    fn error_rate_counts_only_window_events() {
        let mut history = EventHistory::new(100);
        history.record(JobEventKind::Completed, "a");
        history.record(JobEventKind::Completed, "b");
        history.record(JobEventKind::Completed, "c");
        history.record(JobEventKind::DeadLettered, "d");

        let metrics = compute_metrics(&HashMap::new(), &HashMap::new(), 0, 1, &history);
        assert_eq!(metrics.throughput_last_minute, 3);
        assert!((metrics.error_rate_last_minute - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_window_has_zero_error_rate() {
        let history = EventHistory::new(10);
        let metrics = compute_metrics(&HashMap::new(), &HashMap::new(), 0, 0, &history);
        assert_eq!(metrics.error_rate_last_minute, 0.0);
        assert_eq!(metrics.throughput_last_minute, 0);
    }
}

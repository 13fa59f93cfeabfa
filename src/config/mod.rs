use serde::Deserialize;

use crate::models::job::JobPriority;

/// Retry/backoff policy parameters.
#[derive(Debug, Clone)]
pub struct RetryPolicyConfig {
    /// Default attempt budget per job (overridable at enqueue time).
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Ceiling on any computed delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Exponential growth factor applied per attempt.
    pub backoff_multiplier: f64,
    /// When enabled, delays are scaled by a uniform factor in [0.5, 1.0].
    pub jitter_enabled: bool,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
            backoff_multiplier: 2.0,
            jitter_enabled: true,
        }
    }
}

/// Queue engine configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Ceiling on live (non-purged) job count; enqueue fails beyond it.
    pub max_size: usize,
    /// Maximum number of jobs in `processing` at any instant.
    pub max_concurrency: usize,
    /// Priority assigned when the caller does not specify one.
    pub default_priority: JobPriority,
    /// Scheduling loop interval in milliseconds.
    pub tick_interval_ms: u64,
    pub retry: RetryPolicyConfig,
    /// When disabled, jobs that exhaust their attempts end as `failed`
    /// instead of entering the dead-letter store.
    pub dead_letter_enabled: bool,
    /// Oldest entries are evicted once the dead-letter store exceeds this.
    pub dead_letter_capacity: usize,
    pub persistence_enabled: bool,
    /// Snapshot interval in milliseconds.
    pub persistence_interval_ms: u64,
    /// Controls emission of `metrics` facade series.
    pub metrics_enabled: bool,
    /// Cap on the rolling event-history log.
    pub event_history_limit: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_size: 10_000,
            max_concurrency: 4,
            default_priority: JobPriority::Normal,
            tick_interval_ms: 100,
            retry: RetryPolicyConfig::default(),
            dead_letter_enabled: true,
            dead_letter_capacity: 1_000,
            persistence_enabled: false,
            persistence_interval_ms: 30_000,
            metrics_enabled: true,
            event_history_limit: 10_000,
        }
    }
}

/// Worker process configuration, loaded from the environment.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string. Optional; without it the worker runs
    /// purely in memory (no snapshots, no recovery).
    pub database_url: Option<String>,

    /// Prometheus exporter listen address.
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,

    #[serde(default = "default_max_size")]
    pub queue_max_size: usize,

    #[serde(default = "default_max_concurrency")]
    pub queue_max_concurrency: usize,

    #[serde(default = "default_tick_interval_ms")]
    pub queue_tick_interval_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub queue_max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub queue_base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub queue_max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub queue_backoff_multiplier: f64,

    #[serde(default = "default_true")]
    pub queue_jitter_enabled: bool,

    #[serde(default = "default_true")]
    pub queue_dead_letter_enabled: bool,

    #[serde(default = "default_dead_letter_capacity")]
    pub queue_dead_letter_capacity: usize,

    #[serde(default = "default_persistence_interval_ms")]
    pub queue_persistence_interval_ms: u64,

    /// Terminal-job retention window for the cleanup sweep, in seconds.
    #[serde(default = "default_retention_seconds")]
    pub queue_retention_seconds: u64,
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9100".to_string()
}

fn default_max_size() -> usize {
    10_000
}

fn default_max_concurrency() -> usize {
    4
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_dead_letter_capacity() -> usize {
    1_000
}

fn default_persistence_interval_ms() -> u64 {
    30_000
}

fn default_retention_seconds() -> u64 {
    3_600
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Derive the engine configuration from the environment values.
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            max_size: self.queue_max_size,
            max_concurrency: self.queue_max_concurrency,
            default_priority: JobPriority::Normal,
            tick_interval_ms: self.queue_tick_interval_ms,
            retry: RetryPolicyConfig {
                max_attempts: self.queue_max_attempts,
                base_delay_ms: self.queue_base_delay_ms,
                max_delay_ms: self.queue_max_delay_ms,
                backoff_multiplier: self.queue_backoff_multiplier,
                jitter_enabled: self.queue_jitter_enabled,
            },
            dead_letter_enabled: self.queue_dead_letter_enabled,
            dead_letter_capacity: self.queue_dead_letter_capacity,
            persistence_enabled: self.database_url.is_some(),
            persistence_interval_ms: self.queue_persistence_interval_ms,
            metrics_enabled: true,
            event_history_limit: 10_000,
        }
    }
}

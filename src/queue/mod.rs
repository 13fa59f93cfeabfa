//! The queue engine: priority dispatch, retry/backoff, dependency
//! gating, dead-lettering, metrics, and snapshot persistence.

pub mod dead_letter;
pub mod dependency;
pub mod engine;
pub mod metrics;
pub mod processor;
pub mod retry;

pub use engine::{DrainReport, JobQueue, QueueError, QueueStatus};
pub use metrics::QueueMetrics;
pub use processor::{JobProcessor, ProcessorError};

//! In-process asynchronous batch job queue.
//!
//! This library provides a priority-based job scheduler with bounded
//! concurrency, exponential-backoff retries, inter-job dependency gating,
//! a bounded dead-letter store, periodic persistence with crash recovery,
//! and live metrics. Job processors are supplied by the caller and keyed
//! by job type.

pub mod config;
pub mod db;
pub mod models;
pub mod queue;

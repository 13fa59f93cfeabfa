//! Durable snapshot storage for the queue. The engine talks to the
//! [`job_store::JobStore`] trait; [`job_store::PgJobStore`] is the
//! PostgreSQL implementation behind it.

pub mod job_store;

use async_trait::async_trait;
use batch_queue::{
    config::AppConfig,
    db::job_store::PgJobStore,
    queue::{JobProcessor, JobQueue, ProcessorError},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const CLEANUP_INTERVAL_SECS: u64 = 60;
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Built-in smoke-test processor: echoes the payload back as the result.
struct EchoProcessor;

#[async_trait]
impl JobProcessor for EchoProcessor {
    async fn process(
        &self,
        job: batch_queue::models::job::JobRecord,
    ) -> Result<serde_json::Value, ProcessorError> {
        Ok(job.payload)
    }
}

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting batch queue worker");

    // Load configuration
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");
    let queue_config = config.queue_config();

    // Initialize Prometheus metrics exporter
    let metrics_addr: SocketAddr = config
        .metrics_addr
        .parse()
        .expect("Invalid metrics listen address");
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .expect("Failed to install Prometheus metrics exporter");

    // Register application metrics
    metrics::describe_counter!(
        "batch_queue_jobs_enqueued_total",
        "Total jobs submitted to the queue"
    );
    metrics::describe_counter!(
        "batch_queue_jobs_completed_total",
        "Total jobs completed successfully"
    );
    metrics::describe_counter!(
        "batch_queue_jobs_failed_total",
        "Total job attempts that failed"
    );
    metrics::describe_counter!(
        "batch_queue_jobs_dead_lettered_total",
        "Total jobs that exhausted their retry budget"
    );
    metrics::describe_gauge!(
        "batch_queue_depth",
        "Current number of jobs waiting in the priority queues"
    );
    metrics::describe_gauge!("batch_queue_in_flight", "Jobs currently processing");
    metrics::describe_histogram!(
        "batch_queue_job_duration_seconds",
        "Wall-clock time spent processing a job"
    );

    // Build the queue, with a PostgreSQL snapshot store when configured
    let queue = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to PostgreSQL snapshot store");
            let store = PgJobStore::connect(database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Running database migrations");
            store
                .migrate()
                .await
                .expect("Failed to run database migrations");

            JobQueue::with_store(queue_config, Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running without persistence");
            JobQueue::new(queue_config)
        }
    };

    queue
        .register_processor("echo", Arc::new(EchoProcessor))
        .await
        .expect("Failed to register echo processor");

    // Reload any jobs a previous process left behind
    let restored = queue.recover().await.expect("Failed to recover persisted jobs");
    if restored > 0 {
        tracing::info!(restored, "resumed jobs from a previous run");
    }

    queue.start().await;
    tracing::info!("Worker ready, queue is dispatching");

    // Retention sweep loop alongside the engine
    let retention = chrono::Duration::seconds(config.queue_retention_seconds as i64);
    let cleanup_queue = queue.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let removed = cleanup_queue.cleanup(retention).await;
            let status = cleanup_queue.queue_status().await;
            tracing::debug!(
                removed,
                in_flight = status.in_flight,
                dead_letter = status.dead_letter,
                total_jobs = status.total_jobs,
                "retention sweep complete"
            );
        }
    });

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    tracing::info!("Shutdown signal received, draining queue");

    let report = queue.shutdown(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS)).await;
    if report.clean {
        tracing::info!("Drain complete, all jobs finished");
    } else {
        tracing::warn!(
            still_running = report.still_running.len(),
            "drain timeout elapsed, in-flight jobs abandoned"
        );
    }
}

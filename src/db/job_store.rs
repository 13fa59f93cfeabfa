use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::job::{JobId, JobRecord};

/// Durable store boundary for the queue's snapshot/recovery cycle.
///
/// The engine treats the store as best-effort: write failures are logged
/// and never affect in-memory correctness.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Upsert a batch of serialized job records, keyed by job id.
    async fn upsert_jobs(&self, jobs: &[JobRecord]) -> Result<(), StoreError>;

    /// All records whose stored status is non-terminal (`pending`,
    /// `queued`, `processing`, `retrying`), ordered by creation time.
    async fn load_recoverable(&self) -> Result<Vec<JobRecord>, StoreError>;

    /// Remove records for purged jobs.
    async fn delete_jobs(&self, ids: &[JobId]) -> Result<(), StoreError>;
}

const RECOVERABLE_STATUSES: [&str; 4] = ["pending", "queued", "processing", "retrying"];

/// PostgreSQL-backed job store.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a pool sized for the snapshot cycle: the writer loop
    /// holds one connection at a time, with recovery loads and cleanup
    /// deletes alongside it.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply the `queue_jobs` schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn upsert_jobs(&self, jobs: &[JobRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for job in jobs {
            let record = serde_json::to_value(job)?;
            sqlx::query(
                r#"
                INSERT INTO queue_jobs (id, status, created_at, record)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE
                SET status = EXCLUDED.status,
                    record = EXCLUDED.record
                "#,
            )
            .bind(&job.id)
            .bind(job.status.as_str())
            .bind(job.metadata.created_at)
            .bind(record)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn load_recoverable(&self) -> Result<Vec<JobRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT record FROM queue_jobs
            WHERE status = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(
            RECOVERABLE_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<String>>(),
        )
        .fetch_all(&self.pool)
        .await?;

        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows {
            let record: serde_json::Value = row.try_get("record")?;
            jobs.push(serde_json::from_value(record)?);
        }
        Ok(jobs)
    }

    async fn delete_jobs(&self, ids: &[JobId]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM queue_jobs WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory job store for tests and store-less deployments.
#[derive(Default)]
pub struct MemoryJobStore {
    records: RwLock<HashMap<JobId, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (test observability).
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn upsert_jobs(&self, jobs: &[JobRecord]) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        for job in jobs {
            records.insert(job.id.clone(), job.clone());
        }
        Ok(())
    }

    async fn load_recoverable(&self) -> Result<Vec<JobRecord>, StoreError> {
        let records = self.records.read().await;
        let mut jobs: Vec<JobRecord> = records
            .values()
            .filter(|j| RECOVERABLE_STATUSES.contains(&j.status.as_str()))
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.metadata.created_at);
        Ok(jobs)
    }

    async fn delete_jobs(&self, ids: &[JobId]) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        for id in ids {
            records.remove(id);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Free-form failure, used by store doubles in tests.
    #[error("{0}")]
    Other(String),
}

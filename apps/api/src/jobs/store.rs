use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::jobs::stats::{bucket_case_sql, order_buckets, JobTotals, ScoreBucket};
use crate::jobs::status::JobStatus;
use crate::models::job::{JobFilter, JobRow, JobVersionRow, StatusChange};

/// Persistence collaborator for job rows.
///
/// Implementations must make `update_status` atomic per row; concurrent
/// transitions on the same job id are serialized by the store, not the app.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_job(&self, id: i64) -> Result<Option<JobRow>, sqlx::Error>;

    /// Sets the status and refreshes `updated_at`. `None` if the job does not exist.
    async fn update_status(
        &self,
        id: i64,
        status: JobStatus,
    ) -> Result<Option<StatusChange>, sqlx::Error>;

    /// All attempts for one `(owner, company, role)` identity.
    async fn list_versions(
        &self,
        owner: &str,
        company: &str,
        role: &str,
    ) -> Result<Vec<JobVersionRow>, sqlx::Error>;

    /// Newest first.
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRow>, sqlx::Error>;

    /// Dashboard totals, optionally scoped to one owner.
    async fn stats_totals(&self, owner: Option<&str>) -> Result<JobTotals, sqlx::Error>;

    /// Counts of positive scores per bucket, in display order. Empty buckets are omitted.
    async fn score_buckets(&self, owner: Option<&str>) -> Result<Vec<ScoreBucket>, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn get_job(&self, id: i64) -> Result<Option<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_status(
        &self,
        id: i64,
        status: JobStatus,
    ) -> Result<Option<StatusChange>, sqlx::Error> {
        // Single statement: the row lock taken by the sub-select makes the
        // read of the previous status and the write one atomic step.
        sqlx::query_as::<_, StatusChange>(
            r#"
            UPDATE jobs AS j
            SET status = $1, updated_at = NOW()
            FROM (SELECT id, status AS previous_status FROM jobs WHERE id = $2 FOR UPDATE) AS prev
            WHERE j.id = prev.id
            RETURNING j.id, j.status, j.updated_at, prev.previous_status
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_versions(
        &self,
        owner: &str,
        company: &str,
        role: &str,
    ) -> Result<Vec<JobVersionRow>, sqlx::Error> {
        sqlx::query_as::<_, JobVersionRow>(
            r#"
            SELECT id, version, score, status, created_at
            FROM jobs
            WHERE owner = $1 AND company = $2 AND role = $3
            ORDER BY version DESC
            "#,
        )
        .bind(owner)
        .bind(company)
        .bind(role)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>(
            r#"
            SELECT *
            FROM jobs
            WHERE ($1::text IS NULL OR owner = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::float8 IS NULL OR score >= $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.owner.as_deref())
        .bind(filter.status)
        .bind(filter.min_score)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn stats_totals(&self, owner: Option<&str>) -> Result<JobTotals, sqlx::Error> {
        sqlx::query_as::<_, JobTotals>(
            r#"
            SELECT
                COUNT(*) AS total_jobs,
                COUNT(*) FILTER (WHERE status = $2) AS resumes_generated,
                COUNT(*) FILTER (WHERE status = $3) AS scored,
                COUNT(*) FILTER (WHERE status = $4) AS ineligible,
                ROUND(AVG(score)::numeric, 1)::float8 AS avg_score,
                MAX(score) AS max_score,
                MIN(score) FILTER (WHERE score > 0) AS min_score
            FROM jobs
            WHERE ($1::text IS NULL OR owner = $1)
            "#,
        )
        .bind(owner)
        .bind(JobStatus::ResumeGenerated)
        .bind(JobStatus::Scored)
        .bind(JobStatus::Ineligible)
        .fetch_one(&self.pool)
        .await
    }

    async fn score_buckets(&self, owner: Option<&str>) -> Result<Vec<ScoreBucket>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT bucket AS "range", COUNT(*) AS count
            FROM (
                SELECT {} AS bucket
                FROM jobs
                WHERE score > 0 AND ($1::text IS NULL OR owner = $1)
            ) AS scored_jobs
            GROUP BY bucket
            "#,
            bucket_case_sql()
        );

        let buckets = sqlx::query_as::<_, ScoreBucket>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(order_buckets(buckets))
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::jobs::status::JobStatus;

/// One submission attempt. `(owner, company, role, version)` is unique.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub owner: String,
    pub company: String,
    pub role: String,
    pub version: i32,
    pub status: JobStatus,
    pub score: Option<f64>,
    pub match_level: Option<String>,
    /// `s3://bucket/key` or a legacy local path. Written once by the pipeline.
    pub artifact_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRow {
    /// Whether the dashboard should offer a resume download for this job.
    pub fn has_resume(&self) -> bool {
        self.artifact_path.is_some() && self.status != JobStatus::Ineligible
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobVersionRow {
    pub id: i64,
    pub version: i32,
    pub score: Option<f64>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusChange {
    pub id: i64,
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub previous_status: JobStatus,
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub owner: Option<String>,
    pub status: Option<JobStatus>,
    pub min_score: Option<f64>,
    pub limit: i64,
    pub offset: i64,
}
